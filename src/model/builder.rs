use log::warn;

use crate::basic_types::Domain;
use crate::containers::KeyedVec;
use crate::model::Constraint;
use crate::model::DomainId;
use crate::model::Problem;
use crate::model::Variable;

/// Generates the `constrain_*` convenience family for a builder type; the builder must provide
/// `self.variables` and `fn push_constraint(&mut self, condition, indices)`.
///
/// The family attaches one shared condition to many variable tuples: to single variables
/// (`each`), to consecutive pairs (`sequentially`) or to all distinct pairs (`each_two`), each
/// over all variables, an explicit index list (`_of`) or an index range (`_in_range`).
macro_rules! impl_constrain_family {
    ($value:ty, $variable:ty) => {
        /// Adds an n-ary constraint with the given condition on the variables at `indices`.
        pub fn constrain(
            &mut self,
            condition: impl Fn(&$crate::ScopedAssignments<'_, $value, $variable>) -> bool
                + Send
                + Sync
                + 'static,
            indices: &[usize],
        ) -> &mut Self {
            self.push_constraint(std::sync::Arc::new(condition), indices);
            self
        }

        /// Constrains every variable with the given unary condition.
        pub fn constrain_each(
            &mut self,
            condition: impl Fn(&$crate::ScopedAssignments<'_, $value, $variable>) -> bool
                + Send
                + Sync
                + 'static,
        ) -> &mut Self {
            self.constrain_each_in_range(condition, 0..self.variables.len())
        }

        /// Constrains each of the given variables with the given unary condition.
        pub fn constrain_each_of(
            &mut self,
            condition: impl Fn(&$crate::ScopedAssignments<'_, $value, $variable>) -> bool
                + Send
                + Sync
                + 'static,
            indices: &[usize],
        ) -> &mut Self {
            let condition: $crate::model::Condition<$value, $variable> =
                std::sync::Arc::new(condition);
            for &index in indices {
                self.push_constraint(std::sync::Arc::clone(&condition), &[index]);
            }
            self
        }

        /// Constrains every variable in `range` with the given unary condition.
        pub fn constrain_each_in_range(
            &mut self,
            condition: impl Fn(&$crate::ScopedAssignments<'_, $value, $variable>) -> bool
                + Send
                + Sync
                + 'static,
            range: std::ops::Range<usize>,
        ) -> &mut Self {
            let condition: $crate::model::Condition<$value, $variable> =
                std::sync::Arc::new(condition);
            for index in range {
                self.push_constraint(std::sync::Arc::clone(&condition), &[index]);
            }
            self
        }

        /// Constrains every consecutive variable pair with the given binary condition.
        pub fn constrain_sequentially(
            &mut self,
            condition: impl Fn(&$crate::ScopedAssignments<'_, $value, $variable>) -> bool
                + Send
                + Sync
                + 'static,
        ) -> &mut Self {
            self.constrain_sequentially_in_range(condition, 0..self.variables.len())
        }

        /// Constrains each consecutive pair of the given variables with the given binary
        /// condition.
        pub fn constrain_sequentially_of(
            &mut self,
            condition: impl Fn(&$crate::ScopedAssignments<'_, $value, $variable>) -> bool
                + Send
                + Sync
                + 'static,
            indices: &[usize],
        ) -> &mut Self {
            let condition: $crate::model::Condition<$value, $variable> =
                std::sync::Arc::new(condition);
            for pair in indices.windows(2) {
                self.push_constraint(std::sync::Arc::clone(&condition), pair);
            }
            self
        }

        /// Constrains every consecutive variable pair in `range` with the given binary
        /// condition.
        pub fn constrain_sequentially_in_range(
            &mut self,
            condition: impl Fn(&$crate::ScopedAssignments<'_, $value, $variable>) -> bool
                + Send
                + Sync
                + 'static,
            range: std::ops::Range<usize>,
        ) -> &mut Self {
            let condition: $crate::model::Condition<$value, $variable> =
                std::sync::Arc::new(condition);
            for index in range.start..range.end.saturating_sub(1) {
                self.push_constraint(std::sync::Arc::clone(&condition), &[index, index + 1]);
            }
            self
        }

        /// Constrains every distinct variable pair with the given binary condition.
        pub fn constrain_each_two(
            &mut self,
            condition: impl Fn(&$crate::ScopedAssignments<'_, $value, $variable>) -> bool
                + Send
                + Sync
                + 'static,
        ) -> &mut Self {
            self.constrain_each_two_in_range(condition, 0..self.variables.len())
        }

        /// Constrains each distinct pair of the given variables with the given binary condition.
        pub fn constrain_each_two_of(
            &mut self,
            condition: impl Fn(&$crate::ScopedAssignments<'_, $value, $variable>) -> bool
                + Send
                + Sync
                + 'static,
            indices: &[usize],
        ) -> &mut Self {
            let condition: $crate::model::Condition<$value, $variable> =
                std::sync::Arc::new(condition);
            for i in 0..indices.len() {
                for j in i + 1..indices.len() {
                    self.push_constraint(
                        std::sync::Arc::clone(&condition),
                        &[indices[i], indices[j]],
                    );
                }
            }
            self
        }

        /// Constrains every distinct variable pair in `range` with the given binary condition.
        pub fn constrain_each_two_in_range(
            &mut self,
            condition: impl Fn(&$crate::ScopedAssignments<'_, $value, $variable>) -> bool
                + Send
                + Sync
                + 'static,
            range: std::ops::Range<usize>,
        ) -> &mut Self {
            let condition: $crate::model::Condition<$value, $variable> =
                std::sync::Arc::new(condition);
            for i in range.clone() {
                for j in i + 1..range.end {
                    self.push_constraint(std::sync::Arc::clone(&condition), &[i, j]);
                }
            }
            self
        }
    };
}

pub(crate) use impl_constrain_family;

/// Assembles a [`Problem`]: first variables (through one of the constructors), then constraints,
/// then [`ProblemBuilder::build`].
#[derive(Debug)]
pub struct ProblemBuilder<D: Domain, P = ()> {
    name: String,
    domains: KeyedVec<DomainId, D>,
    variables: Vec<Variable<P>>,
    constraints: Vec<Constraint<D::Value, Variable<P>>>,
    next_constraint_id: u32,
}

impl<D: Domain> ProblemBuilder<D, ()> {
    /// Creates a builder with `variable_count` variables all referencing the single given domain.
    pub fn with_shared_domain(
        name: impl Into<String>,
        variable_count: usize,
        domain: D,
    ) -> ProblemBuilder<D, ()> {
        let mut domains = KeyedVec::default();
        let shared = domains.push(domain);
        let variables = (0..variable_count)
            .map(|id| Variable::new(id as i32, None, shared))
            .collect();
        ProblemBuilder::from_parts(name.into(), domains, variables)
    }

    /// Creates a builder with one variable per given domain.
    pub fn with_domains(
        name: impl Into<String>,
        variable_domains: impl IntoIterator<Item = D>,
    ) -> ProblemBuilder<D, ()> {
        let mut domains = KeyedVec::default();
        let variables = variable_domains
            .into_iter()
            .enumerate()
            .map(|(id, domain)| Variable::new(id as i32, None, domains.push(domain)))
            .collect();
        ProblemBuilder::from_parts(name.into(), domains, variables)
    }
}

impl<D: Domain, P> ProblemBuilder<D, P> {
    /// Creates a builder with one variable per payload, all referencing the single given domain.
    pub fn with_payloads(
        name: impl Into<String>,
        domain: D,
        payloads: impl IntoIterator<Item = P>,
    ) -> ProblemBuilder<D, P> {
        let mut domains = KeyedVec::default();
        let shared = domains.push(domain);
        let variables = payloads
            .into_iter()
            .enumerate()
            .map(|(id, payload)| Variable::new(id as i32, Some(payload), shared))
            .collect();
        ProblemBuilder::from_parts(name.into(), domains, variables)
    }

    /// Creates a builder with one variable per `(payload, domain)` entry.
    pub fn with_variables(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (P, D)>,
    ) -> ProblemBuilder<D, P> {
        let mut domains = KeyedVec::default();
        let variables = entries
            .into_iter()
            .enumerate()
            .map(|(id, (payload, domain))| {
                Variable::new(id as i32, Some(payload), domains.push(domain))
            })
            .collect();
        ProblemBuilder::from_parts(name.into(), domains, variables)
    }

    fn from_parts(
        name: String,
        domains: KeyedVec<DomainId, D>,
        variables: Vec<Variable<P>>,
    ) -> ProblemBuilder<D, P> {
        if variables.is_empty() {
            warn!("the problem {name:?} was created without any variables");
        }
        ProblemBuilder {
            name,
            domains,
            variables,
            constraints: Vec::new(),
            next_constraint_id: 0,
        }
    }

    fn push_constraint(
        &mut self,
        condition: crate::model::Condition<D::Value, Variable<P>>,
        indices: &[usize],
    ) {
        crate::gherkin_assert_simple!(
            !indices.is_empty(),
            "a constraint needs at least one variable"
        );
        crate::gherkin_assert_simple!(
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

    impl_constrain_family!(D::Value, Variable<P>);

    /// Finalizes the builder into a [`Problem`].
    pub fn build(self) -> Problem<D, P> {
        Problem::new(self.name, self.variables, self.constraints, self.domains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::IntervalDomain;
    use crate::model::conditions;

    #[test]
    fn each_two_produces_all_distinct_pairs() {
        let mut builder =
            ProblemBuilder::with_shared_domain("pairs", 4, IntervalDomain::range(0, 1));
        builder.constrain_each_two(conditions::not_equal());
        let problem = builder.build();

        assert_eq!(problem.constraint_count(), 6);
        assert_eq!(problem.degree_of(0), 3);
    }

    #[test]
    fn sequential_constraints_chain_neighbours() {
        let mut builder =
            ProblemBuilder::with_shared_domain("chain", 3, IntervalDomain::range(0, 5));
        builder.constrain_sequentially(conditions::not_equal());
        let problem = builder.build();

        assert_eq!(problem.constraint_count(), 2);
        assert_eq!(problem.constraints()[0].scope(), &[0, 1]);
        assert_eq!(problem.constraints()[1].scope(), &[1, 2]);
    }

    #[test]
    fn shared_domains_reference_one_store_entry() {
        let mut builder =
            ProblemBuilder::with_shared_domain("shared", 3, IntervalDomain::range(1, 4));
        builder.constrain(conditions::equal(), &[0, 1]);
        let problem = builder.build();

        assert_eq!(problem.domain(0) as *const _, problem.domain(2) as *const _);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn constraining_an_unknown_variable_panics() {
        let mut builder = ProblemBuilder::with_shared_domain("bad", 2, IntervalDomain::range(0, 1));
        builder.constrain(conditions::equal(), &[0, 2]);
    }
}
