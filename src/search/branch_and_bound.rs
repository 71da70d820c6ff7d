use crate::basic_types::Domain;
use crate::model::Problem;
use crate::search::delegate_search_state;
use crate::search::Exhaustive;
use crate::search::Fitness;
use crate::search::Optimization;
use crate::search::SearchAlgorithm;
use crate::search::SearchCore;

/// Branch-and-bound optimization over the solutions of a problem.
///
/// Enumerates like [`Backtracking`](crate::Backtracking) but only descends into partial
/// assignments whose *estimation* can still beat the best *evaluation* found so far, and only
/// emits complete assignments which actually do. Each step therefore produces the next solution
/// of a strictly improving sequence; iterating until exhaustion yields the optimum last.
///
/// Minimization and maximization are normalized internally by a sign flip, so both search for
/// the largest normalized score. The estimation of the enclosing level is pushed onto a score
/// stack and handed to the fitness functions as their incoming score, which lets them compute
/// incrementally.
pub struct BranchAndBound<'a, D: Domain, P = ()> {
    problem: &'a Problem<D, P>,
    core: SearchCore<D::Value>,
    cursors: Vec<isize>,
    index: isize,
    estimation: Fitness<D::Value>,
    evaluation: Fitness<D::Value>,
    /// `+1.0` for maximization, `-1.0` for minimization.
    sign: f64,
    score_stack: Vec<f64>,
    best_score: f64,
}

impl<'a, D: Domain, P> BranchAndBound<'a, D, P> {
    /// Creates a minimizing instance; `estimation` receives partial assignments and must lower-
    /// bound the reachable evaluations, `evaluation` scores complete assignments.
    pub fn minimizing(
        problem: &'a Problem<D, P>,
        estimation: impl Fn(&crate::Solution<D::Value>, usize, f64) -> f64 + Send + Sync + 'static,
        evaluation: impl Fn(&crate::Solution<D::Value>, usize, f64) -> f64 + Send + Sync + 'static,
    ) -> BranchAndBound<'a, D, P> {
        BranchAndBound::new(problem, -1.0, Box::new(estimation), Box::new(evaluation))
    }

    /// Creates a maximizing instance; `estimation` must upper-bound the reachable evaluations.
    pub fn maximizing(
        problem: &'a Problem<D, P>,
        estimation: impl Fn(&crate::Solution<D::Value>, usize, f64) -> f64 + Send + Sync + 'static,
        evaluation: impl Fn(&crate::Solution<D::Value>, usize, f64) -> f64 + Send + Sync + 'static,
    ) -> BranchAndBound<'a, D, P> {
        BranchAndBound::new(problem, 1.0, Box::new(estimation), Box::new(evaluation))
    }

    fn new(
        problem: &'a Problem<D, P>,
        sign: f64,
        estimation: Fitness<D::Value>,
        evaluation: Fitness<D::Value>,
    ) -> BranchAndBound<'a, D, P> {
        BranchAndBound {
            problem,
            core: SearchCore::new(problem.variable_count()),
            cursors: vec![-1; problem.variable_count()],
            index: 0,
            estimation,
            evaluation,
            sign,
            score_stack: vec![0.0; problem.variable_count()],
            best_score: f64::NEG_INFINITY,
        }
    }
}

impl<D: Domain, P> SearchAlgorithm for BranchAndBound<'_, D, P> {
    type Value = D::Value;

    fn step(&mut self) {
        self.core.begin_step();
        let problem = self.problem;
        let last = self.cursors.len() as isize - 1;
        while self.core.should_continue() && self.index > -1 && last >= 0 {
            let variable = self.index as usize;
            let domain = problem.domain(variable);
            if self.cursors[variable] + 1 < domain.len() as isize {
                self.cursors[variable] += 1;
                let value = domain.get(self.cursors[variable] as usize);
                self.core.solution.assign(variable, value);
                if !problem.has_conflicts_with(&self.core.solution, variable) {
                    let incoming = self.score_stack[variable];
                    if self.index == last {
                        let evaluation = self.sign
                            * (self.evaluation)(&self.core.solution, variable, incoming);
                        if evaluation > self.best_score {
                            self.best_score = evaluation;
                            self.core.post_solution();
                            return;
                        }
                    } else {
                        let estimation =
                            (self.estimation)(&self.core.solution, variable, incoming);
                        if self.sign * estimation > self.best_score {
                            self.score_stack[variable + 1] = estimation;
                            self.index += 1;
                        }
                    }
                }
            } else {
                self.cursors[variable] = -1;
                self.core.solution.unassign(variable);
                self.index -= 1;
            }
        }
        self.core.finish();
    }

    delegate_search_state!();

    fn reset(&mut self) {
        self.core.reset();
        self.cursors.fill(-1);
        self.index = 0;
        self.score_stack.fill(0.0);
        self.best_score = f64::NEG_INFINITY;
    }
}

impl<D: Domain, P> Exhaustive for BranchAndBound<'_, D, P> {
    fn in_final_state(&self) -> bool {
        self.index == -1
    }
}

impl<D: Domain, P> Optimization for BranchAndBound<'_, D, P> {
    fn is_minimize(&self) -> bool {
        self.sign < 0.0
    }

    fn objective_value(&self) -> f64 {
        self.sign * self.best_score
    }
}

impl<D: Domain, P> std::fmt::Debug for BranchAndBound<'_, D, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchAndBound")
            .field("index", &self.index)
            .field("best_score", &self.best_score)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::IntervalDomain;
    use crate::basic_types::Solution;
    use crate::model::ProblemBuilder;

    fn partial_sum(solution: &Solution<i32>, variable: usize, _score: f64) -> f64 {
        (0..=variable)
            .filter(|&index| solution.is_assigned(index))
            .map(|index| *solution.value(index) as f64)
            .sum()
    }

    #[test]
    fn maximization_emits_a_strictly_improving_sequence() {
        let problem =
            ProblemBuilder::with_shared_domain("sum", 2, IntervalDomain::range(1, 2)).build();
        // The estimation upper-bounds by granting the unassigned variable its maximum.
        let mut algorithm = BranchAndBound::maximizing(
            &problem,
            |solution, variable, score| partial_sum(solution, variable, score) + 2.0,
            partial_sum,
        );
        assert!(algorithm.is_maximize());

        let mut scores = Vec::new();
        loop {
            algorithm.step();
            if !algorithm.is_successful() {
                break;
            }
            assert!(problem.is_satisfied(algorithm.solution()));
            scores.push(algorithm.objective_value());
        }

        assert!(algorithm.in_final_state());
        assert_eq!(scores, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn minimization_prunes_by_the_lower_bound() {
        let problem =
            ProblemBuilder::with_shared_domain("sum", 2, IntervalDomain::range(1, 3)).build();
        // The estimation lower-bounds by granting the unassigned variable its minimum.
        let mut algorithm = BranchAndBound::minimizing(
            &problem,
            |solution, variable, score| partial_sum(solution, variable, score) + 1.0,
            partial_sum,
        );
        assert!(algorithm.is_minimize());

        algorithm.step();
        assert!(algorithm.is_successful());
        assert_eq!(algorithm.objective_value(), 2.0);
        assert_eq!(algorithm.solution().to_string(), "{ 1 1 }");

        // (1, 1) is already optimal: the rest of the space is pruned.
        algorithm.step();
        assert!(!algorithm.is_successful());
        assert!(algorithm.in_final_state());
    }
}
