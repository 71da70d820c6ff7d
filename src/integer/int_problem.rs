use crate::basic_types::IntervalDomain;
use crate::basic_types::Solution;
use crate::containers::KeyedVec;
use crate::integer::IntVariable;
use crate::model::Constraint;
use crate::model::ConstraintGraph;
use crate::model::DomainId;

/// A CSP over integer variables with interval domains, extended with the auxiliary variables the
/// expression builder synthesizes.
///
/// The variable vector holds the `original_variable_count` base variables first, followed by the
/// auxiliaries. Assignments *cascade*: assigning a base variable derives the value of every
/// auxiliary whose inputs are now all assigned, and unassigning it withdraws every auxiliary
/// that depended on it. The auxiliary suffix is in dependency order (an auxiliary is appended
/// after everything it reads), so one ascending sweep settles arbitrarily long derivation
/// chains.
///
/// Built through [`IntProblemBuilder`](crate::IntProblemBuilder).
#[derive(Debug)]
pub struct IntProblem<P = ()> {
    pub(crate) name: String,
    pub(crate) graph: ConstraintGraph<i32, IntVariable<P>>,
    pub(crate) domains: KeyedVec<DomainId, IntervalDomain>,
    pub(crate) original_variable_count: usize,
}

impl<P> IntProblem<P> {
    pub(crate) fn new(
        name: String,
        original_variable_count: usize,
        variables: Vec<IntVariable<P>>,
        constraints: Vec<Constraint<i32, IntVariable<P>>>,
        domains: KeyedVec<DomainId, IntervalDomain>,
    ) -> IntProblem<P> {
        IntProblem {
            name,
            graph: ConstraintGraph::new(variables, constraints),
            domains,
            original_variable_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The total number of variables, auxiliaries included.
    pub fn variable_count(&self) -> usize {
        self.graph.variables.len()
    }

    /// The number of base variables; the auxiliaries occupy the indices from here on.
    pub fn original_variable_count(&self) -> usize {
        self.original_variable_count
    }

    pub fn variable(&self, index: usize) -> &IntVariable<P> {
        &self.graph.variables[index]
    }

    pub fn variables(&self) -> &[IntVariable<P>] {
        &self.graph.variables
    }

    /// The domain of the base variable at `variable`. Panics for auxiliary variables.
    pub fn domain(&self, variable: usize) -> &IntervalDomain {
        &self.domains[self.graph.variables[variable].domain_id()]
    }

    pub fn degree_of(&self, variable: usize) -> usize {
        self.graph.degree_of(variable)
    }

    pub fn constraint_count(&self) -> usize {
        self.graph.constraints.len()
    }

    pub fn constraints(&self) -> &[Constraint<i32, IntVariable<P>>] {
        &self.graph.constraints
    }

    /// True when `solution` is complete and violates no constraint.
    pub fn is_satisfied(&self, solution: &Solution<i32>) -> bool {
        self.graph.is_satisfied(solution)
    }

    pub fn has_conflicts(&self, solution: &Solution<i32>) -> bool {
        self.graph.has_conflicts(solution)
    }

    pub fn has_conflicts_with(&self, solution: &Solution<i32>, variable: usize) -> bool {
        self.graph.has_conflicts_with(solution, variable)
    }

    pub fn count_conflicts(&self, solution: &Solution<i32>) -> usize {
        self.graph.count_conflicts(solution)
    }

    pub fn count_conflicts_with(&self, solution: &Solution<i32>, variable: usize) -> usize {
        self.graph.count_conflicts_with(solution, variable)
    }

    /// Assigns `value` to the variable at `variable` and cascades through the auxiliaries,
    /// without any conflict checking.
    pub fn assign(&self, solution: &mut Solution<i32>, variable: usize, value: i32) {
        solution.assign(variable, value);
        let _ = self.cascade_assign_auxiliaries(solution, false);
    }

    /// Assigns `value` to the variable at `variable`, checks the constraints incident to it,
    /// then cascades through the auxiliaries checking each derived assignment.
    ///
    /// Returns false as soon as a conflict is detected; the assignments made so far are left in
    /// place, exactly as a failed direct assignment would be.
    pub fn assign_and_check(&self, solution: &mut Solution<i32>, variable: usize, value: i32) -> bool {
        solution.assign(variable, value);
        if self.has_conflicts_with(solution, variable) {
            return false;
        }
        self.cascade_assign_auxiliaries(solution, true)
    }

    /// Assigns `value` to the variable at `variable` and cascades with conflict checks on the
    /// derived auxiliary assignments only; conflicts on `variable` itself are not checked.
    pub fn assign_and_check_auxiliaries(
        &self,
        solution: &mut Solution<i32>,
        variable: usize,
        value: i32,
    ) -> bool {
        solution.assign(variable, value);
        self.cascade_assign_auxiliaries(solution, true)
    }

    /// Unassigns the variable at `variable` and withdraws every auxiliary that depended on it,
    /// transitively.
    pub fn unassign(&self, solution: &mut Solution<i32>, variable: usize) {
        solution.unassign(variable);
        for index in self.original_variable_count..self.variable_count() {
            let relation = self.graph.variables[index]
                .relation()
                .expect("variables after the originals are auxiliaries");
            if solution.is_assigned(index) && !relation.is_ready(solution) {
                solution.unassign(index);
            }
        }
    }

    /// One ascending sweep over the auxiliary suffix: every auxiliary whose inputs are all
    /// assigned is (re)derived. With `check`, each derived assignment is tested against its
    /// incident constraints; the sweep stops at the first conflict.
    fn cascade_assign_auxiliaries(&self, solution: &mut Solution<i32>, check: bool) -> bool {
        for index in self.original_variable_count..self.variable_count() {
            let relation = self.graph.variables[index]
                .relation()
                .expect("variables after the originals are auxiliaries");
            if !relation.is_ready(solution) {
                continue;
            }
            solution.assign(index, relation.evaluate(solution));
            if check && self.has_conflicts_with(solution, index) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::basic_types::IntervalDomain;
    use crate::basic_types::Solution;
    use crate::integer::IntProblemBuilder;

    #[test]
    fn assignments_cascade_through_auxiliary_chains() {
        let mut builder =
            IntProblemBuilder::with_shared_domain("chain", 2, IntervalDomain::range(0, 10));
        // v0 + 3 == v1, via one auxiliary.
        builder.constrain_var(0).plus(3).equals_var(1);
        let problem = builder.build();
        assert_eq!(problem.variable_count(), 3);

        let mut solution: Solution<i32> = Solution::new(problem.variable_count());
        problem.assign(&mut solution, 0, 4);
        assert_eq!(*solution.value(2), 7);

        problem.unassign(&mut solution, 0);
        assert!(!solution.is_assigned(2));
    }

    #[test]
    fn cascades_settle_chains_regardless_of_assignment_order() {
        let mut builder =
            IntProblemBuilder::with_shared_domain("order", 2, IntervalDomain::range(0, 20));
        // (v0 + 1) * v1 feeds two chained auxiliaries (indices 2 and 3).
        builder.constrain_var(0).plus(1).multiplied_by_var(1).equals(12);
        let problem = builder.build();
        assert_eq!(problem.variable_count(), 4);

        let mut solution: Solution<i32> = Solution::new(problem.variable_count());
        // Assign the inner input last: the chain must still complete.
        problem.assign(&mut solution, 1, 4);
        assert!(!solution.is_assigned(3));
        problem.assign(&mut solution, 0, 2);
        assert_eq!(*solution.value(2), 3);
        assert_eq!(*solution.value(3), 12);
        assert!(solution.is_complete());

        problem.unassign(&mut solution, 1);
        assert_eq!(*solution.value(2), 3);
        assert!(!solution.is_assigned(3));
    }

    #[test]
    fn failed_checked_assignments_report_the_conflict() {
        let mut builder =
            IntProblemBuilder::with_shared_domain("check", 1, IntervalDomain::range(0, 10));
        builder.constrain_var(0).plus(2).equals(5);
        let problem = builder.build();

        let mut solution: Solution<i32> = Solution::new(problem.variable_count());
        assert!(!problem.assign_and_check(&mut solution, 0, 7));

        solution.clear();
        assert!(problem.assign_and_check(&mut solution, 0, 3));
        assert!(problem.is_satisfied(&solution));
    }
}
