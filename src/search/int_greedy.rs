use crate::basic_types::Domain;
use crate::integer::IntProblem;
use crate::search::delegate_search_state;
use crate::search::Fitness;
use crate::search::SearchAlgorithm;
use crate::search::SearchCore;

/// Greedy construction over an [`IntProblem`]: one sweep over the base variables in declaration
/// order, assigning each the highest-scoring value whose checked cascade goes through.
pub struct IntGreedy<'a, P = ()> {
    problem: &'a IntProblem<P>,
    core: SearchCore<i32>,
    heuristic: Fitness<i32>,
}

impl<'a, P> IntGreedy<'a, P> {
    pub fn new(
        problem: &'a IntProblem<P>,
        heuristic: impl Fn(&crate::Solution<i32>, usize, f64) -> f64 + Send + Sync + 'static,
    ) -> IntGreedy<'a, P> {
        IntGreedy {
            problem,
            core: SearchCore::new(problem.variable_count()),
            heuristic: Box::new(heuristic),
        }
    }
}

impl<P> SearchAlgorithm for IntGreedy<'_, P> {
    type Value = i32;

    fn step(&mut self) {
        self.core.begin_step();
        let problem = self.problem;
        for variable in 0..problem.original_variable_count() {
            if !self.core.should_continue() {
                return;
            }
            let domain = problem.domain(variable);
            let mut best_score = f64::NEG_INFINITY;
            let mut best_value = None;
            for value in domain.iter() {
                if problem.assign_and_check(&mut self.core.solution, variable, value) {
                    let score = (self.heuristic)(&self.core.solution, variable, best_score);
                    if score > best_score {
                        best_score = score;
                        best_value = Some(value);
                    }
                }
                problem.unassign(&mut self.core.solution, variable);
            }
            match best_value {
                Some(value) => problem.assign(&mut self.core.solution, variable, value),
                None => {
                    problem.unassign(&mut self.core.solution, variable);
                    self.core.finish();
                    return;
                }
            }
        }
        self.core.post_solution();
    }

    delegate_search_state!();

    fn reset(&mut self) {
        self.core.reset();
    }
}

impl<P> std::fmt::Debug for IntGreedy<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntGreedy").finish_non_exhaustive()
    }
}
