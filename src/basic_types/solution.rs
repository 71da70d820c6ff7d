use std::fmt;

use crate::gherkin_assert_simple;

/// A (partial) assignment from variables to values.
///
/// Every slot is either assigned to a value or unassigned; the number of assigned slots is
/// cached. A solution is *complete* when every slot is assigned. The search algorithms mutate a
/// single solution in place; callers receive clones as stable snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Solution<T> {
    slots: Vec<Option<T>>,
    assigned_count: usize,
}

impl<T: Clone> Solution<T> {
    /// Creates a fully unassigned solution over `variable_count` variables.
    pub fn new(variable_count: usize) -> Solution<T> {
        Solution {
            slots: vec![None; variable_count],
            assigned_count: 0,
        }
    }

    /// The number of variables, assigned or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The number of currently assigned variables.
    pub fn assigned_count(&self) -> usize {
        self.assigned_count
    }

    /// True when every variable is assigned.
    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.slots.len()
    }

    pub fn is_assigned(&self, variable: usize) -> bool {
        self.slots[variable].is_some()
    }

    /// The value of the variable at `variable`.
    ///
    /// Panics when the variable is unassigned.
    pub fn value(&self, variable: usize) -> &T {
        gherkin_assert_simple!(
            self.slots[variable].is_some(),
            "variable at index {variable} is unassigned"
        );
        self.slots[variable].as_ref().unwrap()
    }

    /// The value of the variable at `variable`, or `None` when unassigned.
    pub fn get(&self, variable: usize) -> Option<&T> {
        self.slots[variable].as_ref()
    }

    pub fn assign(&mut self, variable: usize, value: T) {
        if self.slots[variable].is_none() {
            self.assigned_count += 1;
        }
        self.slots[variable] = Some(value);
    }

    pub fn unassign(&mut self, variable: usize) {
        if self.slots[variable].is_some() {
            self.assigned_count -= 1;
        }
        self.slots[variable] = None;
    }

    /// Unassigns every variable.
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.assigned_count = 0;
    }

    /// Iterates the values of a complete solution in variable order.
    ///
    /// Panics when the solution is not complete.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        gherkin_assert_simple!(
            self.is_complete(),
            "iterating the values of an incomplete solution ({} of {} assigned)",
            self.assigned_count,
            self.slots.len()
        );
        self.slots.iter().map(|slot| slot.as_ref().unwrap())
    }

    pub(crate) fn slots(&self) -> &[Option<T>] {
        &self.slots
    }
}

impl<T: fmt::Display> fmt::Display for Solution<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for slot in &self.slots {
            match slot {
                Some(value) => write!(f, "{value} ")?,
                None => f.write_str("_ ")?,
            }
        }
        f.write_str("}")
    }
}

/// The view a constraint condition receives: the values (and variables) of the constraint's
/// tuple, addressed by *formal* index `0..degree`.
///
/// The view borrows the current assignment for the duration of one condition call, which is what
/// lets the same condition be reused across many variable tuples.
#[derive(Debug)]
pub struct ScopedAssignments<'a, T, V> {
    scope: &'a [usize],
    variables: &'a [V],
    slots: &'a [Option<T>],
}

impl<'a, T, V> ScopedAssignments<'a, T, V> {
    pub(crate) fn new(
        scope: &'a [usize],
        variables: &'a [V],
        slots: &'a [Option<T>],
    ) -> ScopedAssignments<'a, T, V> {
        ScopedAssignments {
            scope,
            variables,
            slots,
        }
    }

    /// The value assigned to the variable at the given formal index.
    pub fn value(&self, formal_index: usize) -> &T {
        gherkin_assert_simple!(
            formal_index < self.scope.len(),
            "formal index {formal_index} out of range for a constraint of degree {}",
            self.scope.len()
        );
        let variable = self.scope[formal_index];
        gherkin_assert_simple!(
            self.slots[variable].is_some(),
            "variable at index {variable} is unassigned"
        );
        self.slots[variable].as_ref().unwrap()
    }

    /// The variable at the given formal index.
    pub fn variable(&self, formal_index: usize) -> &'a V {
        gherkin_assert_simple!(
            formal_index < self.scope.len(),
            "formal index {formal_index} out of range for a constraint of degree {}",
            self.scope.len()
        );
        &self.variables[self.scope[formal_index]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_tracks_the_assigned_count() {
        let mut solution: Solution<i32> = Solution::new(3);
        assert!(!solution.is_complete());

        solution.assign(0, 5);
        solution.assign(2, 7);
        solution.assign(2, 8);
        assert_eq!(solution.assigned_count(), 2);

        solution.unassign(2);
        solution.unassign(2);
        assert_eq!(solution.assigned_count(), 1);

        solution.assign(1, 1);
        solution.assign(2, 2);
        assert!(solution.is_complete());

        solution.clear();
        assert_eq!(solution.assigned_count(), 0);
    }

    #[test]
    fn display_shows_values_in_variable_order() {
        let mut solution: Solution<i32> = Solution::new(3);
        solution.assign(0, 2);
        solution.assign(2, 1);
        assert_eq!(solution.to_string(), "{ 2 _ 1 }");

        solution.assign(1, 4);
        assert_eq!(solution.to_string(), "{ 2 4 1 }");
    }

    #[test]
    #[should_panic(expected = "unassigned")]
    fn reading_an_unassigned_value_panics() {
        let solution: Solution<i32> = Solution::new(2);
        let _ = solution.value(1);
    }

    #[test]
    fn scoped_assignments_address_by_formal_index() {
        let mut solution: Solution<i32> = Solution::new(4);
        solution.assign(1, 10);
        solution.assign(3, 30);

        let scope = [3, 1];
        let variables = ["a", "b", "c", "d"];
        let view = ScopedAssignments::new(&scope, &variables, solution.slots());

        assert_eq!(*view.value(0), 30);
        assert_eq!(*view.value(1), 10);
        assert_eq!(*view.variable(0), "d");
    }
}
