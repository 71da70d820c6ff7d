use crate::basic_types::Solution;
use crate::model::Constraint;

/// The constraint graph shared by the generic and the integer problem types: the variable and
/// constraint vectors plus, per variable, the list of incident constraints (the variable's
/// *arcs*), stored as indices into the constraint vector.
#[derive(Debug)]
pub(crate) struct ConstraintGraph<T, V> {
    pub(crate) variables: Vec<V>,
    pub(crate) constraints: Vec<Constraint<T, V>>,
    pub(crate) arcs: Vec<Vec<usize>>,
}

impl<T: Clone, V> ConstraintGraph<T, V> {
    pub(crate) fn new(variables: Vec<V>, constraints: Vec<Constraint<T, V>>) -> Self {
        let mut graph = ConstraintGraph {
            arcs: Vec::new(),
            variables,
            constraints,
        };
        graph.rebuild_arcs();
        graph
    }

    pub(crate) fn rebuild_arcs(&mut self) {
        self.arcs = vec![Vec::new(); self.variables.len()];
        for (constraint_index, constraint) in self.constraints.iter().enumerate() {
            for &variable in constraint.scope() {
                self.arcs[variable].push(constraint_index);
            }
        }
    }

    /// The number of constraints incident to the variable at `variable`.
    pub(crate) fn degree_of(&self, variable: usize) -> usize {
        self.arcs[variable].len()
    }

    pub(crate) fn is_satisfied(&self, solution: &Solution<T>) -> bool {
        solution.is_complete() && !self.has_conflicts(solution)
    }

    pub(crate) fn has_conflicts(&self, solution: &Solution<T>) -> bool {
        self.constraints
            .iter()
            .any(|constraint| constraint.is_violated(&self.variables, solution))
    }

    pub(crate) fn has_conflicts_with(&self, solution: &Solution<T>, variable: usize) -> bool {
        self.arcs[variable]
            .iter()
            .any(|&index| self.constraints[index].is_violated(&self.variables, solution))
    }

    pub(crate) fn count_conflicts(&self, solution: &Solution<T>) -> usize {
        self.constraints
            .iter()
            .filter(|constraint| constraint.is_violated(&self.variables, solution))
            .count()
    }

    pub(crate) fn count_conflicts_with(&self, solution: &Solution<T>, variable: usize) -> usize {
        self.arcs[variable]
            .iter()
            .filter(|&&index| self.constraints[index].is_violated(&self.variables, solution))
            .count()
    }

    /// Drops all unary constraints; used after consistency pre-processing has folded them into
    /// the domains.
    pub(crate) fn retain_non_unary_constraints(&mut self) {
        self.constraints
            .retain(|constraint| constraint.degree() > Constraint::<T, V>::DEGREE_UNARY);
        self.rebuild_arcs();
    }

    /// Swaps the variables at `first` and `second`, rewriting every occurrence of either index
    /// inside the scopes of the incident constraints. Purely a re-labeling: the solution set is
    /// unchanged up to the same permutation.
    pub(crate) fn swap_variables(&mut self, first: usize, second: usize) {
        if first == second {
            return;
        }
        // A constraint incident to both variables must be rewritten exactly once.
        let mut incident: Vec<usize> = self.arcs[first]
            .iter()
            .chain(self.arcs[second].iter())
            .copied()
            .collect();
        incident.sort_unstable();
        incident.dedup();
        for constraint_index in incident {
            for index in self.constraints[constraint_index].scope_mut() {
                if *index == first {
                    *index = second;
                } else if *index == second {
                    *index = first;
                }
            }
        }
        self.arcs.swap(first, second);
        self.variables.swap(first, second);
    }
}
