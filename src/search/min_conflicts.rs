use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::basic_types::Domain;
use crate::model::Problem;
use crate::search::delegate_search_state;
use crate::search::SearchAlgorithm;
use crate::search::SearchCore;

/// Min-conflicts local search: start from a uniformly random complete assignment, then
/// repeatedly reassign the most conflicted variable to the value minimizing its conflict count.
///
/// In *global* mode the search runs until no variable has a conflict, escaping plateaus (steps
/// which leave the whole conflict vector unchanged) by kicking one random variable to a random
/// value, and gives up unsuccessfully once an iteration budget of `2·n·Σ|Dᵢ| + 2·|C|` is spent.
/// In *local* mode a plateau is accepted as a (possibly conflicted) local optimum and reported
/// as success. Recommended for large instances and over-constrained problems where partial
/// optima are acceptable.
#[derive(Debug)]
pub struct MinConflicts<'a, D: Domain, P = ()> {
    problem: &'a Problem<D, P>,
    core: SearchCore<D::Value>,
    global: bool,
    conflicts: Vec<usize>,
    rng: SmallRng,
    iteration_limit: u64,
}

impl<'a, D: Domain, P> MinConflicts<'a, D, P> {
    /// Searches for a conflict-free assignment (global optimum).
    pub fn global_optimum_of(problem: &'a Problem<D, P>) -> MinConflicts<'a, D, P> {
        MinConflicts::new(problem, true)
    }

    /// Searches for a local optimum, accepting plateaus.
    pub fn local_optimum_of(problem: &'a Problem<D, P>) -> MinConflicts<'a, D, P> {
        MinConflicts::new(problem, false)
    }

    fn new(problem: &'a Problem<D, P>, global: bool) -> MinConflicts<'a, D, P> {
        let variable_count = problem.variable_count();
        let total_domain_size: u64 = (0..variable_count)
            .map(|variable| problem.domain(variable).len() as u64)
            .sum();
        MinConflicts {
            problem,
            core: SearchCore::new(variable_count),
            global,
            conflicts: vec![0; variable_count],
            rng: SmallRng::from_entropy(),
            iteration_limit: 2 * variable_count as u64 * total_domain_size
                + 2 * problem.constraint_count() as u64,
        }
    }

    /// Replaces the random generator with a seeded one, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> MinConflicts<'a, D, P> {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Recomputes every conflict count; true when no entry changed (a plateau).
    fn recompute_conflicts(&mut self) -> bool {
        let mut unchanged = true;
        for variable in 0..self.conflicts.len() {
            let count = self
                .problem
                .count_conflicts_with(&self.core.solution, variable);
            unchanged &= self.conflicts[variable] == count;
            self.conflicts[variable] = count;
        }
        unchanged
    }

    fn most_conflicted_variable(&self) -> Option<usize> {
        let mut best = None;
        let mut best_count = 0;
        for (variable, &count) in self.conflicts.iter().enumerate() {
            if count > best_count {
                best_count = count;
                best = Some(variable);
            }
        }
        best
    }

    /// Reassigns `variable` to the domain value minimizing its conflict count.
    fn reassign_minimizing(&mut self, variable: usize) {
        let domain = self.problem.domain(variable);
        let mut best_count = usize::MAX;
        let mut best_value = None;
        for value in domain.iter() {
            self.core.solution.assign(variable, value.clone());
            let count = self
                .problem
                .count_conflicts_with(&self.core.solution, variable);
            if count < best_count {
                best_count = count;
                best_value = Some(value);
            }
        }
        self.core
            .solution
            .assign(variable, best_value.expect("non-empty domain"));
    }

    fn kick_random_variable(&mut self) {
        let variable = self.rng.gen_range(0..self.conflicts.len());
        let domain = self.problem.domain(variable);
        let position = self.rng.gen_range(0..domain.len());
        self.core.solution.assign(variable, domain.get(position));
    }
}

impl<D: Domain, P> SearchAlgorithm for MinConflicts<'_, D, P> {
    type Value = D::Value;

    fn step(&mut self) {
        self.core.begin_step();
        let problem = self.problem;
        for variable in 0..problem.variable_count() {
            let domain = problem.domain(variable);
            if domain.is_empty() {
                self.core.finish();
                return;
            }
            let position = self.rng.gen_range(0..domain.len());
            self.core.solution.assign(variable, domain.get(position));
        }
        let _ = self.recompute_conflicts();
        if self.global {
            let mut iterations: u64 = 0;
            while self.core.should_continue() {
                let Some(variable) = self.most_conflicted_variable() else {
                    break;
                };
                iterations += 1;
                if iterations > self.iteration_limit {
                    self.core.finish();
                    return;
                }
                self.reassign_minimizing(variable);
                while self.core.should_continue() && self.recompute_conflicts() {
                    self.kick_random_variable();
                }
            }
        } else {
            while self.core.should_continue() {
                let Some(variable) = self.most_conflicted_variable() else {
                    break;
                };
                self.reassign_minimizing(variable);
                if self.recompute_conflicts() {
                    // A plateau is a local optimum; accept the current assignment.
                    self.core.post_solution();
                    return;
                }
            }
        }
        if self.core.should_continue() {
            self.core.post_solution();
        } else {
            self.core.finish();
        }
    }

    delegate_search_state!();

    fn reset(&mut self) {
        self.core.reset();
        self.conflicts.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::IntervalDomain;
    use crate::model::conditions;
    use crate::model::ProblemBuilder;

    #[test]
    fn global_mode_finds_a_conflict_free_assignment() {
        let mut builder =
            ProblemBuilder::with_shared_domain("all-different", 4, IntervalDomain::range(1, 4));
        builder.constrain_each_two(conditions::not_equal());
        let problem = builder.build();
        let mut algorithm = MinConflicts::global_optimum_of(&problem).with_seed(42);

        algorithm.step();
        assert!(algorithm.is_successful());
        assert!(problem.is_satisfied(algorithm.solution()));
    }

    #[test]
    fn local_mode_reports_a_complete_assignment() {
        let mut builder =
            ProblemBuilder::with_shared_domain("local", 3, IntervalDomain::range(1, 3));
        builder.constrain_each_two(conditions::not_equal());
        let problem = builder.build();
        let mut algorithm = MinConflicts::local_optimum_of(&problem).with_seed(7);

        algorithm.step();
        assert!(algorithm.is_successful());
        assert!(algorithm.solution().is_complete());
    }

    #[test]
    fn an_empty_domain_fails_immediately() {
        let problem = ProblemBuilder::with_domains(
            "empty",
            vec![IntervalDomain::range(1, 2), IntervalDomain::new()],
        )
        .build();
        let mut algorithm = MinConflicts::global_optimum_of(&problem).with_seed(1);

        algorithm.step();
        assert!(!algorithm.is_successful());
        assert!(!algorithm.is_running());
    }
}
