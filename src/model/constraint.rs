use std::fmt;
use std::sync::Arc;

use crate::basic_types::ScopedAssignments;
use crate::basic_types::Solution;

/// The predicate of a [`Constraint`], evaluated over the projected view of its variable tuple.
///
/// Conditions are shared (the convenience builder methods attach one condition to many
/// constraints), hence the [`Arc`].
pub type Condition<T, V> = Arc<dyn Fn(&ScopedAssignments<'_, T, V>) -> bool + Send + Sync>;

/// A constraint: an identity, an ordered tuple of variable indices and a condition over the
/// currently assigned values of that tuple.
///
/// A constraint is inactive while any variable of its tuple is unassigned; once the whole tuple
/// is assigned it is violated exactly when its condition is false.
pub struct Constraint<T, V> {
    id: u32,
    scope: Box<[usize]>,
    condition: Condition<T, V>,
}

impl<T: Clone, V> Constraint<T, V> {
    /// The degree of a unary constraint.
    pub const DEGREE_UNARY: usize = 1;
    /// The degree of a binary constraint.
    pub const DEGREE_BINARY: usize = 2;

    pub(crate) fn new(id: u32, scope: Box<[usize]>, condition: Condition<T, V>) -> Constraint<T, V> {
        Constraint {
            id,
            scope,
            condition,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// The number of variables in the tuple of this constraint.
    pub fn degree(&self) -> usize {
        self.scope.len()
    }

    /// The variable indices this constraint ranges over, in formal order.
    pub fn scope(&self) -> &[usize] {
        &self.scope
    }

    pub(crate) fn scope_mut(&mut self) -> &mut [usize] {
        &mut self.scope
    }

    /// True when the tuple is fully assigned in `solution` and the condition rejects it.
    pub fn is_violated(&self, variables: &[V], solution: &Solution<T>) -> bool {
        if self
            .scope
            .iter()
            .any(|&variable| !solution.is_assigned(variable))
        {
            return false;
        }
        let assignments = ScopedAssignments::new(&self.scope, variables, solution.slots());
        !(self.condition)(&assignments)
    }
}

impl<T, V> PartialEq for Constraint<T, V> {
    fn eq(&self, other: &Constraint<T, V>) -> bool {
        self.id == other.id
    }
}

impl<T, V> Eq for Constraint<T, V> {}

impl<T, V> fmt::Debug for Constraint<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn not_equal() -> Constraint<i32, ()> {
        Constraint::new(
            1,
            Box::new([0, 2]),
            Arc::new(|assignments| assignments.value(0) != assignments.value(1)),
        )
    }

    #[test]
    fn partially_assigned_tuples_are_not_violated() {
        let constraint = not_equal();
        let variables = [(), (), ()];
        let mut solution: Solution<i32> = Solution::new(3);

        assert!(!constraint.is_violated(&variables, &solution));

        solution.assign(0, 4);
        assert!(!constraint.is_violated(&variables, &solution));

        solution.assign(2, 4);
        assert!(constraint.is_violated(&variables, &solution));

        solution.assign(2, 5);
        assert!(!constraint.is_violated(&variables, &solution));
    }
}
