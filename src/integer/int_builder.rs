use std::sync::Arc;

use log::warn;

use crate::basic_types::IntervalDomain;
use crate::basic_types::ScopedAssignments;
use crate::containers::KeyedVec;
use crate::gherkin_assert_simple;
use crate::integer::int_variable::Relation;
use crate::integer::IntProblem;
use crate::integer::IntVariable;
use crate::model::impl_constrain_family;
use crate::model::Condition;
use crate::model::Constraint;
use crate::model::DomainId;

/// A comparison between two terms whose right-hand side may still grow; it is emitted as a
/// binary constraint once the right chain is finished (at the next [`IntProblemBuilder::constrain_var`],
/// the next comparison, or at [`IntProblemBuilder::build`]).
struct PendingComparison<P> {
    condition: Condition<i32, IntVariable<P>>,
    left: usize,
    right: usize,
}

/// Assembles an [`IntProblem`]: variables through one of the constructors, plain constraints
/// through the `constrain_*` family, and arithmetic constraints through
/// [`IntProblemBuilder::constrain_var`] expression chains.
///
/// An expression chain such as `constrain_var(i).plus(5).multiplied_by_var(j).equals(40)` is
/// decomposed left to right: each arithmetic operator appends an auxiliary variable pinned to
/// its inputs by a binary or ternary equality constraint, and the closing comparison constrains
/// the final term. Auxiliary variables receive negative ids and follow the base variables in
/// the problem's variable vector.
pub struct IntProblemBuilder<P = ()> {
    name: String,
    domains: KeyedVec<DomainId, IntervalDomain>,
    variables: Vec<IntVariable<P>>,
    constraints: Vec<Constraint<i32, IntVariable<P>>>,
    next_constraint_id: u32,
    next_auxiliary_id: i32,
    original_variable_count: usize,
    pending_comparison: Option<PendingComparison<P>>,
}

impl IntProblemBuilder<()> {
    /// Creates a builder with `variable_count` variables all referencing the single given domain.
    pub fn with_shared_domain(
        name: impl Into<String>,
        variable_count: usize,
        domain: IntervalDomain,
    ) -> IntProblemBuilder<()> {
        let mut domains = KeyedVec::default();
        let shared = domains.push(domain);
        let variables = (0..variable_count)
            .map(|id| IntVariable::base(id as i32, None, shared))
            .collect();
        IntProblemBuilder::from_parts(name.into(), domains, variables)
    }

    /// Creates a builder with one variable per given domain.
    pub fn with_domains(
        name: impl Into<String>,
        variable_domains: impl IntoIterator<Item = IntervalDomain>,
    ) -> IntProblemBuilder<()> {
        let mut domains = KeyedVec::default();
        let variables = variable_domains
            .into_iter()
            .enumerate()
            .map(|(id, domain)| IntVariable::base(id as i32, None, domains.push(domain)))
            .collect();
        IntProblemBuilder::from_parts(name.into(), domains, variables)
    }
}

impl<P> IntProblemBuilder<P> {
    /// Creates a builder with one variable per payload, all referencing the single given domain.
    pub fn with_payloads(
        name: impl Into<String>,
        domain: IntervalDomain,
        payloads: impl IntoIterator<Item = P>,
    ) -> IntProblemBuilder<P> {
        let mut domains = KeyedVec::default();
        let shared = domains.push(domain);
        let variables = payloads
            .into_iter()
            .enumerate()
            .map(|(id, payload)| IntVariable::base(id as i32, Some(payload), shared))
            .collect();
        IntProblemBuilder::from_parts(name.into(), domains, variables)
    }

    /// Creates a builder with one variable per `(payload, domain)` entry.
    pub fn with_variables(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (P, IntervalDomain)>,
    ) -> IntProblemBuilder<P> {
        let mut domains = KeyedVec::default();
        let variables = entries
            .into_iter()
            .enumerate()
            .map(|(id, (payload, domain))| {
                IntVariable::base(id as i32, Some(payload), domains.push(domain))
            })
            .collect();
        IntProblemBuilder::from_parts(name.into(), domains, variables)
    }

    fn from_parts(
        name: String,
        domains: KeyedVec<DomainId, IntervalDomain>,
        variables: Vec<IntVariable<P>>,
    ) -> IntProblemBuilder<P> {
        if variables.is_empty() {
            warn!("the problem {name:?} was created without any variables");
        }
        IntProblemBuilder {
            name,
            domains,
            original_variable_count: variables.len(),
            variables,
            constraints: Vec::new(),
            next_constraint_id: 0,
            next_auxiliary_id: 0,
            pending_comparison: None,
        }
    }

    fn push_constraint(&mut self, condition: Condition<i32, IntVariable<P>>, indices: &[usize]) {
        gherkin_assert_simple!(!indices.is_empty(), "a constraint needs at least one variable");
        gherkin_assert_simple!(
            indices.iter().all(|&index| index < self.variables.len()),
            "constraint scope {indices:?} references a variable out of range (variable count {})",
            self.variables.len()
        );
        self.next_constraint_id += 1;
        self.constraints.push(Constraint::new(
            self.next_constraint_id,
            indices.into(),
            condition,
        ));
    }

    impl_constrain_family!(i32, IntVariable<P>);

    /// Opens an arithmetic expression chain on the variable at `variable`.
    pub fn constrain_var(&mut self, variable: usize) -> Term<'_, P> {
        gherkin_assert_simple!(
            variable < self.variables.len(),
            "variable index {variable} out of range (variable count {})",
            self.variables.len()
        );
        self.flush_pending_comparison();
        Term {
            builder: self,
            index: variable,
        }
    }

    fn flush_pending_comparison(&mut self) {
        if let Some(pending) = self.pending_comparison.take() {
            self.push_constraint(pending.condition, &[pending.left, pending.right]);
        }
    }

    fn push_auxiliary(&mut self, relation: Relation) -> usize {
        self.next_auxiliary_id -= 1;
        self.variables
            .push(IntVariable::auxiliary(self.next_auxiliary_id, relation));
        self.variables.len() - 1
    }

    /// Finalizes the builder into an [`IntProblem`].
    pub fn build(mut self) -> IntProblem<P> {
        self.flush_pending_comparison();
        IntProblem::new(
            self.name,
            self.original_variable_count,
            self.variables,
            self.constraints,
            self.domains,
        )
    }
}

impl<P> std::fmt::Debug for IntProblemBuilder<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntProblemBuilder")
            .field("name", &self.name)
            .field("variable_count", &self.variables.len())
            .field("constraint_count", &self.constraints.len())
            .finish_non_exhaustive()
    }
}

/// One term of an arithmetic expression chain.
///
/// Arithmetic operators (`plus`, `minus`, `multiplied_by`, `divided_by`, `max_with`, `min_with`,
/// `abs`, each with a `_var` form where applicable) extend the chain by an auxiliary variable.
/// Comparisons against a value (`equals(k)`, `greater_than(k)`, ...) close the chain with a
/// unary constraint; comparisons against a variable (`equals_var(j)`, ...) leave a pending
/// binary constraint between this term and the final term of the chain continuing from `j`.
#[derive(Debug)]
pub struct Term<'b, P> {
    builder: &'b mut IntProblemBuilder<P>,
    index: usize,
}

impl<'b, P> Term<'b, P> {
    fn derive_unary(
        self,
        condition: impl Fn(&ScopedAssignments<'_, i32, IntVariable<P>>) -> bool
            + Send
            + Sync
            + 'static,
        operator: impl Fn(i32) -> i32 + Send + Sync + 'static,
    ) -> Term<'b, P> {
        let input = self.index;
        let builder = self.builder;
        let auxiliary = builder.push_auxiliary(Relation::Unary {
            input,
            operator: Box::new(operator),
        });
        builder.push_constraint(Arc::new(condition), &[input, auxiliary]);
        if let Some(pending) = builder.pending_comparison.as_mut() {
            if pending.right == input {
                pending.right = auxiliary;
            }
        }
        Term {
            builder,
            index: auxiliary,
        }
    }

    fn derive_binary(
        self,
        other: usize,
        condition: impl Fn(&ScopedAssignments<'_, i32, IntVariable<P>>) -> bool
            + Send
            + Sync
            + 'static,
        operator: impl Fn(i32, i32) -> i32 + Send + Sync + 'static,
    ) -> Term<'b, P> {
        let input = self.index;
        let builder = self.builder;
        gherkin_assert_simple!(
            other < builder.variables.len(),
            "variable index {other} out of range (variable count {})",
            builder.variables.len()
        );
        let auxiliary = builder.push_auxiliary(Relation::Binary {
            input0: input,
            input1: other,
            operator: Box::new(operator),
        });
        builder.push_constraint(Arc::new(condition), &[input, other, auxiliary]);
        if let Some(pending) = builder.pending_comparison.as_mut() {
            if pending.right == input {
                pending.right = auxiliary;
            }
        }
        Term {
            builder,
            index: auxiliary,
        }
    }

    fn close_with(
        self,
        condition: impl Fn(&ScopedAssignments<'_, i32, IntVariable<P>>) -> bool
            + Send
            + Sync
            + 'static,
    ) {
        let index = self.index;
        let builder = self.builder;
        builder.flush_pending_comparison();
        builder.push_constraint(Arc::new(condition), &[index]);
    }

    fn pend(
        self,
        other: usize,
        condition: impl Fn(&ScopedAssignments<'_, i32, IntVariable<P>>) -> bool
            + Send
            + Sync
            + 'static,
    ) -> Term<'b, P> {
        let left = self.index;
        let builder = self.builder;
        gherkin_assert_simple!(
            other < builder.variables.len(),
            "variable index {other} out of range (variable count {})",
            builder.variables.len()
        );
        builder.flush_pending_comparison();
        builder.pending_comparison = Some(PendingComparison {
            condition: Arc::new(condition),
            left,
            right: other,
        });
        Term {
            builder,
            index: other,
        }
    }

    /// Extends the chain with `term + value`.
    pub fn plus(self, value: i32) -> Term<'b, P> {
        self.derive_unary(
            move |a| *a.value(0) + value == *a.value(1),
            move |input| input + value,
        )
    }

    /// Extends the chain with `term + var`.
    pub fn plus_var(self, other: usize) -> Term<'b, P> {
        self.derive_binary(
            other,
            |a| *a.value(0) + *a.value(1) == *a.value(2),
            |input0, input1| input0 + input1,
        )
    }

    /// Extends the chain with `term - value`.
    pub fn minus(self, value: i32) -> Term<'b, P> {
        self.derive_unary(
            move |a| *a.value(0) - value == *a.value(1),
            move |input| input - value,
        )
    }

    /// Extends the chain with `term - var`.
    pub fn minus_var(self, other: usize) -> Term<'b, P> {
        self.derive_binary(
            other,
            |a| *a.value(0) - *a.value(1) == *a.value(2),
            |input0, input1| input0 - input1,
        )
    }

    /// Extends the chain with `term * value`.
    pub fn multiplied_by(self, value: i32) -> Term<'b, P> {
        self.derive_unary(
            move |a| *a.value(0) * value == *a.value(1),
            move |input| input * value,
        )
    }

    /// Extends the chain with `term * var`.
    pub fn multiplied_by_var(self, other: usize) -> Term<'b, P> {
        self.derive_binary(
            other,
            |a| *a.value(0) * *a.value(1) == *a.value(2),
            |input0, input1| input0 * input1,
        )
    }

    /// Extends the chain with `term / value` (truncating integer division).
    ///
    /// Panics when `value` is zero.
    pub fn divided_by(self, value: i32) -> Term<'b, P> {
        gherkin_assert_simple!(value != 0, "division of a term by the constant zero");
        self.derive_unary(
            move |a| *a.value(0) / value == *a.value(1),
            move |input| input / value,
        )
    }

    /// Extends the chain with `term / var` (truncating integer division).
    ///
    /// Candidate values of zero for the divisor are rejected by the pinning constraint rather
    /// than evaluated.
    pub fn divided_by_var(self, other: usize) -> Term<'b, P> {
        self.derive_binary(
            other,
            |a| a.value(0).checked_div(*a.value(1)) == Some(*a.value(2)),
            |input0, input1| input0.checked_div(input1).unwrap_or(0),
        )
    }

    /// Extends the chain with `max(term, value)`.
    pub fn max_with(self, value: i32) -> Term<'b, P> {
        self.derive_unary(
            move |a| i32::max(*a.value(0), value) == *a.value(1),
            move |input| i32::max(input, value),
        )
    }

    /// Extends the chain with `max(term, var)`.
    pub fn max_with_var(self, other: usize) -> Term<'b, P> {
        self.derive_binary(
            other,
            |a| i32::max(*a.value(0), *a.value(1)) == *a.value(2),
            i32::max,
        )
    }

    /// Extends the chain with `min(term, value)`.
    pub fn min_with(self, value: i32) -> Term<'b, P> {
        self.derive_unary(
            move |a| i32::min(*a.value(0), value) == *a.value(1),
            move |input| i32::min(input, value),
        )
    }

    /// Extends the chain with `min(term, var)`.
    pub fn min_with_var(self, other: usize) -> Term<'b, P> {
        self.derive_binary(
            other,
            |a| i32::min(*a.value(0), *a.value(1)) == *a.value(2),
            i32::min,
        )
    }

    /// Extends the chain with `|term|`.
    pub fn abs(self) -> Term<'b, P> {
        self.derive_unary(|a| a.value(0).abs() == *a.value(1), |input| input.abs())
    }

    /// Closes the chain with `term == value`.
    pub fn equals(self, value: i32) {
        self.close_with(move |a| *a.value(0) == value);
    }

    /// Compares this chain with the chain starting at `other`: `term == other-chain`.
    pub fn equals_var(self, other: usize) -> Term<'b, P> {
        self.pend(other, |a| a.value(0) == a.value(1))
    }

    /// Closes the chain with `term != value`.
    pub fn not_equals(self, value: i32) {
        self.close_with(move |a| *a.value(0) != value);
    }

    /// Compares this chain with the chain starting at `other`: `term != other-chain`.
    pub fn not_equals_var(self, other: usize) -> Term<'b, P> {
        self.pend(other, |a| a.value(0) != a.value(1))
    }

    /// Closes the chain with `term > value`.
    pub fn greater_than(self, value: i32) {
        self.close_with(move |a| *a.value(0) > value);
    }

    /// Compares this chain with the chain starting at `other`: `term > other-chain`.
    pub fn greater_than_var(self, other: usize) -> Term<'b, P> {
        self.pend(other, |a| a.value(0) > a.value(1))
    }

    /// Closes the chain with `term >= value`.
    pub fn greater_or_equals(self, value: i32) {
        self.close_with(move |a| *a.value(0) >= value);
    }

    /// Compares this chain with the chain starting at `other`: `term >= other-chain`.
    pub fn greater_or_equals_var(self, other: usize) -> Term<'b, P> {
        self.pend(other, |a| a.value(0) >= a.value(1))
    }

    /// Closes the chain with `term < value`.
    pub fn less_than(self, value: i32) {
        self.close_with(move |a| *a.value(0) < value);
    }

    /// Compares this chain with the chain starting at `other`: `term < other-chain`.
    pub fn less_than_var(self, other: usize) -> Term<'b, P> {
        self.pend(other, |a| a.value(0) < a.value(1))
    }

    /// Closes the chain with `term <= value`.
    pub fn less_or_equals(self, value: i32) {
        self.close_with(move |a| *a.value(0) <= value);
    }

    /// Compares this chain with the chain starting at `other`: `term <= other-chain`.
    pub fn less_or_equals_var(self, other: usize) -> Term<'b, P> {
        self.pend(other, |a| a.value(0) <= a.value(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_operators_append_pinned_auxiliaries() {
        let mut builder =
            IntProblemBuilder::with_shared_domain("chain", 2, IntervalDomain::range(0, 9));
        builder
            .constrain_var(0)
            .plus(5)
            .multiplied_by_var(1)
            .equals(40);
        let problem = builder.build();

        // Two auxiliaries: v0 + 5 and (v0 + 5) * v1.
        assert_eq!(problem.variable_count(), 4);
        assert_eq!(problem.original_variable_count(), 2);
        assert_eq!(problem.variable(2).id(), -1);
        assert_eq!(problem.variable(3).id(), -2);
        assert!(problem.variable(3).is_auxiliary());

        let scopes: Vec<&[usize]> = problem
            .constraints()
            .iter()
            .map(|constraint| constraint.scope())
            .collect();
        assert_eq!(scopes, vec![&[0, 2][..], &[0, 1, 3][..], &[3][..]]);
    }

    #[test]
    fn variable_comparisons_bind_the_final_terms_of_both_chains() {
        let mut builder =
            IntProblemBuilder::with_shared_domain("infix", 3, IntervalDomain::range(0, 9));
        builder.constrain_var(0).equals_var(1);
        builder.constrain_var(2).plus(1).less_than_var(0).minus(2);
        let problem = builder.build();

        let scopes: Vec<&[usize]> = problem
            .constraints()
            .iter()
            .map(|constraint| constraint.scope())
            .collect();
        // The first comparison is emitted by the second constrain_var call and binds v0 to v1
        // directly; the second binds the two chain tails (auxiliaries 3 and 4) at build.
        assert_eq!(
            scopes,
            vec![&[0, 1][..], &[2, 3][..], &[0, 4][..], &[3, 4][..]]
        );
    }

    #[test]
    fn division_by_a_zero_divisor_candidate_is_rejected_not_evaluated() {
        let mut builder =
            IntProblemBuilder::with_shared_domain("division", 2, IntervalDomain::range(-2, 2));
        builder.constrain_var(0).divided_by_var(1).equals(2);
        let problem = builder.build();

        let mut solution = crate::basic_types::Solution::new(problem.variable_count());
        problem.assign(&mut solution, 0, 2);
        assert!(!problem.assign_and_check(&mut solution, 1, 0));
        problem.unassign(&mut solution, 1);
        assert!(problem.assign_and_check(&mut solution, 1, 1));
    }
}
