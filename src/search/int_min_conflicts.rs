use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::basic_types::Domain;
use crate::integer::IntProblem;
use crate::search::delegate_search_state;
use crate::search::SearchAlgorithm;
use crate::search::SearchCore;

/// Min-conflicts local search over an [`IntProblem`].
///
/// Operates on the base variables (the conflict vector and the iteration budget range over them
/// alone) while every assignment cascades through the auxiliaries. A base variable's conflict
/// count covers the constraints incident to it *and* those incident to any auxiliary derived
/// from it, so constraints pinned to the tail of an expression chain steer the search like any
/// other constraint. Modes as in [`MinConflicts`](crate::MinConflicts): global mode kicks
/// through plateaus and gives up at the iteration budget, local mode accepts a plateau as a
/// local optimum.
#[derive(Debug)]
pub struct IntMinConflicts<'a, P = ()> {
    problem: &'a IntProblem<P>,
    core: SearchCore<i32>,
    global: bool,
    conflicts: Vec<usize>,
    /// Per base variable, the constraints its reassignment can affect: its own arcs plus the
    /// arcs of every auxiliary transitively derived from it.
    watched: Vec<Vec<usize>>,
    rng: SmallRng,
    iteration_limit: u64,
}

impl<'a, P> IntMinConflicts<'a, P> {
    /// Searches for a conflict-free assignment (global optimum).
    pub fn global_optimum_of(problem: &'a IntProblem<P>) -> IntMinConflicts<'a, P> {
        IntMinConflicts::new(problem, true)
    }

    /// Searches for a local optimum, accepting plateaus.
    pub fn local_optimum_of(problem: &'a IntProblem<P>) -> IntMinConflicts<'a, P> {
        IntMinConflicts::new(problem, false)
    }

    fn new(problem: &'a IntProblem<P>, global: bool) -> IntMinConflicts<'a, P> {
        let original = problem.original_variable_count();
        let total_domain_size: u64 = (0..original)
            .map(|variable| problem.domain(variable).len() as u64)
            .sum();
        IntMinConflicts {
            problem,
            core: SearchCore::new(problem.variable_count()),
            global,
            conflicts: vec![0; original],
            watched: Self::index_watched_constraints(problem),
            rng: SmallRng::from_entropy(),
            iteration_limit: 2 * original as u64 * total_domain_size
                + 2 * problem.constraint_count() as u64,
        }
    }

    /// For every base variable, the indices of the constraints whose violation status its value
    /// can influence, auxiliary derivation chains included.
    fn index_watched_constraints(problem: &IntProblem<P>) -> Vec<Vec<usize>> {
        let original = problem.original_variable_count();
        let total = problem.variable_count();
        // The base variables each auxiliary is (transitively) derived from; auxiliaries are in
        // dependency order, so one ascending pass settles chains.
        let mut derived_from: Vec<Vec<usize>> = vec![Vec::new(); total];
        for index in original..total {
            let relation = problem
                .variable(index)
                .relation()
                .expect("variables after the originals are auxiliaries");
            let mut bases = Vec::new();
            for input in relation.inputs() {
                if input < original {
                    bases.push(input);
                } else {
                    bases.extend(derived_from[input].iter().copied());
                }
            }
            bases.sort_unstable();
            bases.dedup();
            derived_from[index] = bases;
        }
        let mut watched: Vec<Vec<usize>> = vec![Vec::new(); original];
        for (constraint_index, constraint) in problem.constraints().iter().enumerate() {
            let mut bases = Vec::new();
            for &variable in constraint.scope() {
                if variable < original {
                    bases.push(variable);
                } else {
                    bases.extend(derived_from[variable].iter().copied());
                }
            }
            bases.sort_unstable();
            bases.dedup();
            for base in bases {
                watched[base].push(constraint_index);
            }
        }
        watched
    }

    /// Replaces the random generator with a seeded one, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> IntMinConflicts<'a, P> {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    fn conflict_count(&self, variable: usize) -> usize {
        let problem = self.problem;
        self.watched[variable]
            .iter()
            .filter(|&&index| {
                problem.constraints()[index]
                    .is_violated(problem.variables(), &self.core.solution)
            })
            .count()
    }

    fn recompute_conflicts(&mut self) -> bool {
        let mut unchanged = true;
        for variable in 0..self.conflicts.len() {
            let count = self.conflict_count(variable);
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

    fn reassign_minimizing(&mut self, variable: usize) {
        let problem = self.problem;
        let domain = problem.domain(variable);
        let mut best_count = usize::MAX;
        let mut best_value = None;
        for value in domain.iter() {
            problem.assign(&mut self.core.solution, variable, value);
            let count = self.conflict_count(variable);
            if count < best_count {
                best_count = count;
                best_value = Some(value);
            }
        }
        problem.assign(
            &mut self.core.solution,
            variable,
            best_value.expect("non-empty domain"),
        );
    }

    fn kick_random_variable(&mut self) {
        let variable = self.rng.gen_range(0..self.conflicts.len());
        let domain = self.problem.domain(variable);
        let position = self.rng.gen_range(0..domain.len());
        self.problem
            .assign(&mut self.core.solution, variable, domain.get(position));
    }
}

impl<P> SearchAlgorithm for IntMinConflicts<'_, P> {
    type Value = i32;

    fn step(&mut self) {
        self.core.begin_step();
        let problem = self.problem;
        for variable in 0..problem.original_variable_count() {
            let domain = problem.domain(variable);
            if domain.is_empty() {
                self.core.finish();
                return;
            }
            let position = self.rng.gen_range(0..domain.len());
            problem.assign(&mut self.core.solution, variable, domain.get(position));
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
