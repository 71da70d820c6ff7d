use crate::basic_types::Domain;
use crate::basic_types::Solution;
use crate::containers::KeyedVec;
use crate::model::Constraint;
use crate::model::ConstraintGraph;
use crate::model::DomainId;
use crate::model::Variable;

/// A CSP over generic finite domains: the named, immutable collection of variables and
/// constraints, together with the per-variable lists of incident constraints.
///
/// Domains live in a central store and variables reference them by [`DomainId`], so a domain may
/// be shared between variables. Search never mutates domains; only the consistency
/// pre-processing methods do, and those reject shared domains up front.
///
/// Built through [`ProblemBuilder`](crate::ProblemBuilder).
#[derive(Debug)]
pub struct Problem<D: Domain, P = ()> {
    pub(crate) name: String,
    pub(crate) graph: ConstraintGraph<D::Value, Variable<P>>,
    pub(crate) domains: KeyedVec<DomainId, D>,
}

impl<D: Domain, P> Problem<D, P> {
    pub(crate) fn new(
        name: String,
        variables: Vec<Variable<P>>,
        constraints: Vec<Constraint<D::Value, Variable<P>>>,
        domains: KeyedVec<DomainId, D>,
    ) -> Problem<D, P> {
        Problem {
            name,
            graph: ConstraintGraph::new(variables, constraints),
            domains,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable_count(&self) -> usize {
        self.graph.variables.len()
    }

    pub fn variable(&self, index: usize) -> &Variable<P> {
        &self.graph.variables[index]
    }

    pub fn variables(&self) -> &[Variable<P>] {
        &self.graph.variables
    }

    /// The domain of the variable at `variable`.
    pub fn domain(&self, variable: usize) -> &D {
        &self.domains[self.graph.variables[variable].domain_id()]
    }

    /// The number of constraints incident to the variable at `variable`.
    pub fn degree_of(&self, variable: usize) -> usize {
        self.graph.degree_of(variable)
    }

    pub fn constraint_count(&self) -> usize {
        self.graph.constraints.len()
    }

    pub fn constraints(&self) -> &[Constraint<D::Value, Variable<P>>] {
        &self.graph.constraints
    }

    /// True when `solution` is complete and violates no constraint.
    pub fn is_satisfied(&self, solution: &Solution<D::Value>) -> bool {
        self.graph.is_satisfied(solution)
    }

    /// True when `solution` violates any constraint whose tuple it fully assigns.
    pub fn has_conflicts(&self, solution: &Solution<D::Value>) -> bool {
        self.graph.has_conflicts(solution)
    }

    /// True when `solution` violates any constraint incident to the variable at `variable`.
    pub fn has_conflicts_with(&self, solution: &Solution<D::Value>, variable: usize) -> bool {
        self.graph.has_conflicts_with(solution, variable)
    }

    /// The number of constraints `solution` violates.
    pub fn count_conflicts(&self, solution: &Solution<D::Value>) -> usize {
        self.graph.count_conflicts(solution)
    }

    /// The number of constraints incident to `variable` which `solution` violates.
    pub fn count_conflicts_with(&self, solution: &Solution<D::Value>, variable: usize) -> usize {
        self.graph.count_conflicts_with(solution, variable)
    }
}
