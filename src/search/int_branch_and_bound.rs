use crate::basic_types::Domain;
use crate::integer::IntProblem;
use crate::search::delegate_search_state;
use crate::search::Exhaustive;
use crate::search::Fitness;
use crate::search::Optimization;
use crate::search::SearchAlgorithm;
use crate::search::SearchCore;

/// Branch-and-bound optimization over an [`IntProblem`].
///
/// Branches over the base variables in declaration order while the auxiliary variables follow
/// through the checked cascade; the bounding scheme is the one of
/// [`BranchAndBound`](crate::BranchAndBound): descend only when the partial estimation can still
/// beat the best evaluation, emit one strictly improving solution per step.
pub struct IntBranchAndBound<'a, P = ()> {
    problem: &'a IntProblem<P>,
    core: SearchCore<i32>,
    cursors: Vec<isize>,
    index: isize,
    estimation: Fitness<i32>,
    evaluation: Fitness<i32>,
    sign: f64,
    score_stack: Vec<f64>,
    best_score: f64,
}

impl<'a, P> IntBranchAndBound<'a, P> {
    /// Creates a minimizing instance; `estimation` receives partial assignments and must lower-
    /// bound the reachable evaluations, `evaluation` scores complete assignments.
    pub fn minimizing(
        problem: &'a IntProblem<P>,
        estimation: impl Fn(&crate::Solution<i32>, usize, f64) -> f64 + Send + Sync + 'static,
        evaluation: impl Fn(&crate::Solution<i32>, usize, f64) -> f64 + Send + Sync + 'static,
    ) -> IntBranchAndBound<'a, P> {
        IntBranchAndBound::new(problem, -1.0, Box::new(estimation), Box::new(evaluation))
    }

    /// Creates a maximizing instance; `estimation` must upper-bound the reachable evaluations.
    pub fn maximizing(
        problem: &'a IntProblem<P>,
        estimation: impl Fn(&crate::Solution<i32>, usize, f64) -> f64 + Send + Sync + 'static,
        evaluation: impl Fn(&crate::Solution<i32>, usize, f64) -> f64 + Send + Sync + 'static,
    ) -> IntBranchAndBound<'a, P> {
        IntBranchAndBound::new(problem, 1.0, Box::new(estimation), Box::new(evaluation))
    }

    fn new(
        problem: &'a IntProblem<P>,
        sign: f64,
        estimation: Fitness<i32>,
        evaluation: Fitness<i32>,
    ) -> IntBranchAndBound<'a, P> {
        let original = problem.original_variable_count();
        IntBranchAndBound {
            problem,
            core: SearchCore::new(problem.variable_count()),
            cursors: vec![-1; original],
            index: 0,
            estimation,
            evaluation,
            sign,
            score_stack: vec![0.0; original],
            best_score: f64::NEG_INFINITY,
        }
    }
}

impl<P> SearchAlgorithm for IntBranchAndBound<'_, P> {
    type Value = i32;

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
                if problem.assign_and_check(&mut self.core.solution, variable, value) {
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
                } else {
                    // Withdraw the failed cascade so the next candidate starts clean.
                    problem.unassign(&mut self.core.solution, variable);
                }
            } else {
                self.cursors[variable] = -1;
                problem.unassign(&mut self.core.solution, variable);
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

impl<P> Exhaustive for IntBranchAndBound<'_, P> {
    fn in_final_state(&self) -> bool {
        self.index == -1
    }
}

impl<P> Optimization for IntBranchAndBound<'_, P> {
    fn is_minimize(&self) -> bool {
        self.sign < 0.0
    }

    fn objective_value(&self) -> f64 {
        self.sign * self.best_score
    }
}

impl<P> std::fmt::Debug for IntBranchAndBound<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntBranchAndBound")
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
    use crate::integer::IntProblemBuilder;

    fn base_sum(solution: &Solution<i32>, variable: usize, _score: f64) -> f64 {
        (0..=variable)
            .filter(|&index| solution.is_assigned(index))
            .map(|index| *solution.value(index) as f64)
            .sum()
    }

    #[test]
    fn maximizes_under_an_arithmetic_constraint() {
        let mut builder =
            IntProblemBuilder::with_shared_domain("sum", 2, IntervalDomain::range(0, 5));
        // v0 + v1 <= 6, maximizing v0 + v1.
        builder.constrain_var(0).plus_var(1).less_or_equals(6);
        let problem = builder.build();
        let mut algorithm = IntBranchAndBound::maximizing(
            &problem,
            |solution, variable, score| base_sum(solution, variable, score) + 5.0,
            base_sum,
        );

        let mut best = f64::NEG_INFINITY;
        loop {
            algorithm.step();
            if !algorithm.is_successful() {
                break;
            }
            assert!(problem.is_satisfied(algorithm.solution()));
            assert!(algorithm.objective_value() > best);
            best = algorithm.objective_value();
        }

        assert!(algorithm.in_final_state());
        assert_eq!(best, 6.0);
    }
}
