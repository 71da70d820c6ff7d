use crate::basic_types::Domain;
use crate::basic_types::IntervalDomain;
use crate::integer::IntProblem;
use crate::integer::IntVariable;
use crate::model::Constraint;
use crate::search::delegate_search_state;
use crate::search::Exhaustive;
use crate::search::SearchAlgorithm;
use crate::search::SearchCore;

/// Forward checking with minimum-remaining-values ordering over an [`IntProblem`].
///
/// Searches only the base variables; auxiliary variables ride along through the cascade, so
/// assigning a base variable also derives and checks every auxiliary that became ready, and the
/// forward prunings reject candidate values whose cascades conflict. A solution is posted once
/// the cascade has completed the whole solution. Prunings are undone per level through the same
/// undo trail as the generic variant.
#[derive(Debug)]
pub struct IntForwardChecking<'a, P = ()> {
    problem: &'a IntProblem<P>,
    core: SearchCore<i32>,
    stack: Vec<usize>,
    depth: isize,
    cursors: Vec<isize>,
    removed: Vec<IntervalDomain>,
    undo: Vec<Vec<Option<IntervalDomain>>>,
}

impl<'a, P> IntForwardChecking<'a, P> {
    pub fn new(problem: &'a IntProblem<P>) -> IntForwardChecking<'a, P> {
        let original = problem.original_variable_count();
        IntForwardChecking {
            problem,
            core: SearchCore::new(problem.variable_count()),
            stack: vec![0; original],
            depth: -1,
            cursors: vec![-1; original],
            removed: (0..original).map(|_| IntervalDomain::new()).collect(),
            undo: (0..original)
                .map(|_| (0..original).map(|_| None).collect())
                .collect(),
        }
    }

    fn live_size(&self, variable: usize) -> usize {
        self.problem.domain(variable).len() - self.removed[variable].len()
    }

    /// Folds the unary constraints on base variables into the mark sets and picks the base
    /// variable with the smallest live domain; `None` when some variable has no live value.
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
            if constraint.degree() != Constraint::<i32, IntVariable<P>>::DEGREE_UNARY {
                continue;
            }
            let variable = constraint.scope()[0];
            if problem.variable(variable).is_auxiliary() {
                continue;
            }
            let domain = problem.domain(variable);
            for (position, value) in domain.iter().enumerate() {
                if self.removed[variable].contains(&(position as i32)) {
                    continue;
                }
                problem.assign(&mut self.core.solution, variable, value);
                if constraint.is_violated(problem.variables(), &self.core.solution) {
                    self.removed[variable].insert(position as i32);
                }
            }
            problem.unassign(&mut self.core.solution, variable);
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

    /// Prunes the live values of every unassigned base variable whose checked cascade fails,
    /// recording the prunings under `level`. Returns the unassigned base variable with the
    /// fewest live values, or `None` when one ran dry.
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
                if !problem.assign_and_check(&mut self.core.solution, variable, value) {
                    self.removed[variable].insert(position as i32);
                    self.undo[variable][level]
                        .get_or_insert_with(IntervalDomain::new)
                        .insert(position as i32);
                }
                problem.unassign(&mut self.core.solution, variable);
            }
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

impl<P> SearchAlgorithm for IntForwardChecking<'_, P> {
    type Value = i32;

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
                if self
                    .problem
                    .assign_and_check_auxiliaries(&mut self.core.solution, current, value)
                {
                    if self.core.solution.is_complete() {
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
                    self.problem.unassign(&mut self.core.solution, current);
                }
            } else {
                self.problem.unassign(&mut self.core.solution, current);
                self.cursors[current] = -1;
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

impl<P> Exhaustive for IntForwardChecking<'_, P> {
    fn in_final_state(&self) -> bool {
        self.depth == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::IntProblemBuilder;

    #[test]
    fn enumerates_solutions_through_auxiliary_cascades() {
        let mut builder =
            IntProblemBuilder::with_shared_domain("sum", 2, IntervalDomain::range(0, 3));
        // v0 + v1 == 3.
        builder.constrain_var(0).plus_var(1).equals(3);
        let problem = builder.build();
        let mut algorithm = IntForwardChecking::new(&problem);

        let mut solutions = Vec::new();
        loop {
            algorithm.step();
            if !algorithm.is_successful() {
                break;
            }
            assert!(problem.is_satisfied(algorithm.solution()));
            solutions.push((
                *algorithm.solution().value(0),
                *algorithm.solution().value(1),
            ));
        }

        assert!(algorithm.in_final_state());
        solutions.sort_unstable();
        assert_eq!(solutions, vec![(0, 3), (1, 2), (2, 1), (3, 0)]);
    }

    #[test]
    fn unary_constraints_on_base_variables_shape_the_first_selection() {
        let mut builder =
            IntProblemBuilder::with_shared_domain("bounded", 2, IntervalDomain::range(0, 9));
        builder.constrain_var(0).greater_than(7);
        builder.constrain_var(0).not_equals_var(1);
        let problem = builder.build();
        let mut algorithm = IntForwardChecking::new(&problem);

        algorithm.step();
        assert!(algorithm.is_successful());
        assert!(*algorithm.solution().value(0) > 7);
    }

    #[test]
    fn infeasible_chains_exhaust_without_solutions() {
        let mut builder =
            IntProblemBuilder::with_shared_domain("infeasible", 1, IntervalDomain::range(0, 4));
        builder.constrain_var(0).multiplied_by(2).equals(9);
        let problem = builder.build();
        let mut algorithm = IntForwardChecking::new(&problem);

        algorithm.step();
        assert!(!algorithm.is_successful());
        assert!(algorithm.in_final_state());
    }
}
