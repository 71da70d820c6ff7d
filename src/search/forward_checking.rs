use crate::basic_types::Domain;
use crate::basic_types::IntervalDomain;
use crate::model::Constraint;
use crate::model::Problem;
use crate::model::Variable;
use crate::search::delegate_search_state;
use crate::search::Exhaustive;
use crate::search::SearchAlgorithm;
use crate::search::SearchCore;

/// Forward checking with minimum-remaining-values variable ordering.
///
/// After every assignment, the still-live values of every unassigned variable are tested against
/// the partial solution; values in conflict are pruned into per-variable *removed* mark sets.
/// The prunings caused at each search level are recorded in an undo table and rolled back when
/// that level backtracks. The next variable is always the unassigned one with the fewest live
/// values (ties broken by index order); a variable running out of live values rejects the
/// current assignment. The first variable is selected after folding unary constraints into the
/// mark sets; those level-zero prunings are permanent for the lifetime of the search.
#[derive(Debug)]
pub struct ForwardChecking<'a, D: Domain, P = ()> {
    problem: &'a Problem<D, P>,
    core: SearchCore<D::Value>,
    /// The variables of the current search path, in assignment order.
    stack: Vec<usize>,
    /// Depth of the search path; `-1` before the first variable has been selected, `0` once the
    /// search space is exhausted (or was infeasible from the start).
    depth: isize,
    cursors: Vec<isize>,
    /// Per variable, the domain positions currently pruned.
    removed: Vec<IntervalDomain>,
    /// `undo[variable][level]` records the positions pruned from `variable` on account of the
    /// assignment at `level`.
    undo: Vec<Vec<Option<IntervalDomain>>>,
}

impl<'a, D: Domain, P> ForwardChecking<'a, D, P> {
    pub fn new(problem: &'a Problem<D, P>) -> ForwardChecking<'a, D, P> {
        let variable_count = problem.variable_count();
        ForwardChecking {
            problem,
            core: SearchCore::new(variable_count),
            stack: vec![0; variable_count],
            depth: -1,
            cursors: vec![-1; variable_count],
            removed: (0..variable_count).map(|_| IntervalDomain::new()).collect(),
            undo: (0..variable_count)
                .map(|_| (0..variable_count).map(|_| None).collect())
                .collect(),
        }
    }

    fn live_size(&self, variable: usize) -> usize {
        self.problem.domain(variable).len() - self.removed[variable].len()
    }

    /// Folds the unary constraints into the mark sets and picks the variable with the smallest
    /// live domain; `None` when some variable has no live value at all.
    fn select_first_variable(&mut self) -> Option<usize> {
        if self.cursors.is_empty() {
            return None;
        }
        let problem = self.problem;
        let mut best_variable = 0;
        let mut best_size = problem.domain(0).len();
        for variable in 1..self.cursors.len() {
            let size = problem.domain(variable).len();
            if size < best_size {
                best_size = size;
                best_variable = variable;
            }
        }
        for constraint in problem.constraints() {
            if constraint.degree() != Constraint::<D::Value, Variable<P>>::DEGREE_UNARY {
                continue;
            }
            let variable = constraint.scope()[0];
            let domain = problem.domain(variable);
            for (position, value) in domain.iter().enumerate() {
                if self.removed[variable].contains(&(position as i32)) {
                    continue;
                }
                self.core.solution.assign(variable, value);
                if constraint.is_violated(problem.variables(), &self.core.solution) {
                    self.removed[variable].insert(position as i32);
                }
            }
            self.core.solution.unassign(variable);
            let live = self.live_size(variable);
            if live == 0 {
                return None;
            }
            if live < best_size {
                best_size = live;
                best_variable = variable;
            }
        }
        Some(best_variable)
    }

    /// Prunes the live values of every unassigned variable against the partial solution,
    /// recording the prunings under `level`. Returns the unassigned variable with the fewest
    /// live values, or `None` when some variable ran dry (the caller rolls `level` back).
    fn forward_check(&mut self, level: usize) -> Option<usize> {
        let problem = self.problem;
        let mut best: Option<(usize, usize)> = None;
        for variable in 0..self.cursors.len() {
            if self.core.solution.is_assigned(variable) {
                continue;
            }
            let domain = problem.domain(variable);
            for (position, value) in domain.iter().enumerate() {
                if self.removed[variable].contains(&(position as i32)) {
                    continue;
                }
                self.core.solution.assign(variable, value);
                if problem.has_conflicts_with(&self.core.solution, variable) {
                    self.removed[variable].insert(position as i32);
                    self.undo[variable][level]
                        .get_or_insert_with(IntervalDomain::new)
                        .insert(position as i32);
                }
            }
            self.core.solution.unassign(variable);
            let live = self.live_size(variable);
            if live == 0 {
                return None;
            }
            if best.map_or(true, |(_, best_size)| live < best_size) {
                best = Some((variable, live));
            }
        }
        best.map(|(variable, _)| variable)
    }

    /// Rolls back every pruning recorded under `level`.
    fn undo_prunings(&mut self, level: usize) {
        for variable in 0..self.cursors.len() {
            if self.core.solution.is_assigned(variable) {
                continue;
            }
            if let Some(pruned) = self.undo[variable][level].take() {
                for position in pruned.iter() {
                    let _ = self.removed[variable].remove_value(&position);
                }
            }
        }
    }
}

impl<D: Domain, P> SearchAlgorithm for ForwardChecking<'_, D, P> {
    type Value = D::Value;

    fn step(&mut self) {
        self.core.begin_step();
        if self.depth == -1 {
            match self.select_first_variable() {
                Some(first) => {
                    self.stack[0] = first;
                    self.depth = 1;
                }
                None => self.depth = 0,
            }
        }
        while self.core.should_continue() && self.depth > 0 {
            let current = self.stack[self.depth as usize - 1];
            let domain = self.problem.domain(current);
            if self.cursors[current] + 1 < domain.len() as isize {
                self.cursors[current] += 1;
                let position = self.cursors[current] as usize;
                if self.removed[current].contains(&(position as i32)) {
                    continue;
                }
                let value = domain.get(position);
                self.core.solution.assign(current, value);
                if self.depth as usize == self.cursors.len() {
                    self.core.post_solution();
                    return;
                }
                match self.forward_check(current) {
                    Some(next) => {
                        self.stack[self.depth as usize] = next;
                        self.depth += 1;
                    }
                    None => self.undo_prunings(current),
                }
            } else {
                self.cursors[current] = -1;
                self.core.solution.unassign(current);
                self.depth -= 1;
                if self.depth > 0 {
                    self.undo_prunings(self.stack[self.depth as usize - 1]);
                }
            }
        }
        self.core.finish();
    }

    delegate_search_state!();

    fn reset(&mut self) {
        self.core.reset();
        self.depth = -1;
        self.cursors.fill(-1);
        for marks in &mut self.removed {
            marks.clear();
        }
        for table in &mut self.undo {
            table.fill_with(|| None);
        }
    }
}

impl<D: Domain, P> Exhaustive for ForwardChecking<'_, D, P> {
    fn in_final_state(&self) -> bool {
        self.depth == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::conditions;
    use crate::model::ProblemBuilder;

    #[test]
    fn starts_from_the_smallest_domain() {
        let mut builder = ProblemBuilder::with_domains(
            "mrv",
            vec![
                IntervalDomain::range(1, 5),
                IntervalDomain::range(1, 2),
                IntervalDomain::range(1, 4),
            ],
        );
        builder.constrain_each_two(conditions::not_equal());
        let problem = builder.build();
        let mut algorithm = ForwardChecking::new(&problem);

        algorithm.step();
        assert!(algorithm.is_successful());
        // The first solution assigns the middle (smallest-domain) variable its first value.
        assert_eq!(*algorithm.solution().value(1), 1);
        assert!(problem.is_satisfied(algorithm.solution()));
    }

    #[test]
    fn unary_constraints_are_folded_in_before_the_first_assignment() {
        let mut builder = ProblemBuilder::with_domains(
            "unary",
            vec![IntervalDomain::range(1, 4), IntervalDomain::range(1, 4)],
        );
        builder
            .constrain(|a| *a.value(0) > 3, &[0])
            .constrain(conditions::not_equal(), &[0, 1]);
        let problem = builder.build();
        let mut algorithm = ForwardChecking::new(&problem);

        let mut solutions = Vec::new();
        loop {
            algorithm.step();
            if !algorithm.is_successful() {
                break;
            }
            solutions.push((
                *algorithm.solution().value(0),
                *algorithm.solution().value(1),
            ));
        }

        assert!(algorithm.in_final_state());
        assert_eq!(solutions, vec![(4, 1), (4, 2), (4, 3)]);
    }

    #[test]
    fn infeasible_unary_constraints_finish_the_search_immediately() {
        let mut builder =
            ProblemBuilder::with_shared_domain("infeasible", 2, IntervalDomain::range(1, 3));
        builder.constrain(|a| *a.value(0) > 5, &[1]);
        let problem = builder.build();
        let mut algorithm = ForwardChecking::new(&problem);

        algorithm.step();
        assert!(!algorithm.is_successful());
        assert!(algorithm.in_final_state());
    }
}
