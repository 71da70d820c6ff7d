use crate::basic_types::Domain;
use crate::model::Problem;
use crate::search::delegate_search_state;
use crate::search::Fitness;
use crate::search::SearchAlgorithm;
use crate::search::SearchCore;

/// Greedy construction: one sweep over the variables in declaration order, assigning each the
/// conflict-free value its heuristic scores highest.
///
/// The heuristic is evaluated with the candidate value temporarily assigned and receives the
/// best score seen so far for the variable as its incoming score. A variable without any
/// conflict-free value fails the whole sweep; greedy construction does not backtrack.
pub struct Greedy<'a, D: Domain, P = ()> {
    problem: &'a Problem<D, P>,
    core: SearchCore<D::Value>,
    heuristic: Fitness<D::Value>,
}

impl<'a, D: Domain, P> Greedy<'a, D, P> {
    pub fn new(
        problem: &'a Problem<D, P>,
        heuristic: impl Fn(&crate::Solution<D::Value>, usize, f64) -> f64 + Send + Sync + 'static,
    ) -> Greedy<'a, D, P> {
        Greedy {
            problem,
            core: SearchCore::new(problem.variable_count()),
            heuristic: Box::new(heuristic),
        }
    }
}

impl<D: Domain, P> SearchAlgorithm for Greedy<'_, D, P> {
    type Value = D::Value;

    fn step(&mut self) {
        self.core.begin_step();
        let problem = self.problem;
        for variable in 0..problem.variable_count() {
            if !self.core.should_continue() {
                return;
            }
            let domain = problem.domain(variable);
            let mut best_score = f64::NEG_INFINITY;
            let mut best_value = None;
            for value in domain.iter() {
                self.core.solution.assign(variable, value.clone());
                if !problem.has_conflicts_with(&self.core.solution, variable) {
                    let score = (self.heuristic)(&self.core.solution, variable, best_score);
                    if score > best_score {
                        best_score = score;
                        best_value = Some(value);
                    }
                }
            }
            match best_value {
                Some(value) => self.core.solution.assign(variable, value),
                None => {
                    self.core.solution.unassign(variable);
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

impl<D: Domain, P> std::fmt::Debug for Greedy<'_, D, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Greedy").finish_non_exhaustive()
    }
}
