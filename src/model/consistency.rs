//! Consistency pre-processing and variable reordering for the generic problem: node and arc
//! consistency in the AC-1 style, and minimal-width ordering.
//!
//! Both consistency procedures work in two phases. The marking phase walks the domains and
//! collects the *positions* of unsupported values into per-variable mark sets without touching
//! any domain; over-constrainedness is detected here and aborts with the problem untouched. The
//! removal phase then drops the marked positions through the domains' removing cursors and
//! elides the now redundant unary constraints.

use crate::basic_types::ConsistencyError;
use crate::basic_types::Domain;
use crate::basic_types::DomainCursor;
use crate::basic_types::IntervalDomain;
use crate::basic_types::Solution;
use crate::containers::StorageKey;
use crate::model::Constraint;
use crate::model::Problem;
use crate::model::Variable;

impl<D: Domain, P> Problem<D, P> {
    /// Achieves node consistency: removes every value which violates a unary constraint, then
    /// drops the unary constraints themselves.
    ///
    /// Fails with [`ConsistencyError::SharedDomain`] when two variables reference the same
    /// domain, and with [`ConsistencyError::Overconstrained`] when some variable would lose its
    /// whole domain. The problem is unchanged on failure.
    pub fn achieve_node_consistency(&mut self) -> Result<(), ConsistencyError> {
        self.ensure_no_shared_domains()?;
        let marks = self.mark_illegals_for_node()?;
        self.remove_marked_values(&marks);
        self.graph.retain_non_unary_constraints();
        Ok(())
    }

    /// Achieves arc consistency: first node consistency marking, then the AC-1 sweep over every
    /// binary constraint from both of its sides.
    ///
    /// Fails like [`Problem::achieve_node_consistency`], leaving the problem unchanged.
    pub fn achieve_arc_consistency(&mut self) -> Result<(), ConsistencyError> {
        self.ensure_no_shared_domains()?;
        let mut marks = self.mark_illegals_for_node()?;
        let mut scratch = Solution::new(self.variable_count());
        for constraint in &self.graph.constraints {
            if constraint.degree() == Constraint::<D::Value, Variable<P>>::DEGREE_BINARY {
                self.mark_unsupported_side(&mut scratch, constraint, 0, &mut marks)?;
                self.mark_unsupported_side(&mut scratch, constraint, 1, &mut marks)?;
            }
        }
        self.remove_marked_values(&marks);
        self.graph.retain_non_unary_constraints();
        Ok(())
    }

    /// Reorders the variables by descending degree, the minimal-width heuristic. Constraint
    /// scopes are rewritten along with the swaps, so the solution set is only permuted.
    pub fn achieve_minimal_width(&mut self) {
        if self.variable_count() > 1 {
            self.descending_quicksort(0, self.variable_count() - 1);
        }
    }

    fn ensure_no_shared_domains(&self) -> Result<(), ConsistencyError> {
        let mut owner: Vec<Option<usize>> = vec![None; self.domains.len()];
        for (variable, entry) in self.graph.variables.iter().enumerate() {
            let domain = entry.domain_id().index();
            match owner[domain] {
                Some(first) => {
                    return Err(ConsistencyError::SharedDomain {
                        first,
                        second: variable,
                    })
                }
                None => owner[domain] = Some(variable),
            }
        }
        Ok(())
    }

    fn mark_illegals_for_node(&self) -> Result<Vec<IntervalDomain>, ConsistencyError> {
        let mut marks: Vec<IntervalDomain> = (0..self.variable_count())
            .map(|_| IntervalDomain::new())
            .collect();
        let mut scratch = Solution::new(self.variable_count());
        for constraint in &self.graph.constraints {
            if constraint.degree() != Constraint::<D::Value, Variable<P>>::DEGREE_UNARY {
                continue;
            }
            let variable = constraint.scope()[0];
            let domain = self.domain(variable);
            for (position, value) in domain.iter().enumerate() {
                if marks[variable].contains(&(position as i32)) {
                    continue;
                }
                scratch.assign(variable, value);
                if constraint.is_violated(&self.graph.variables, &scratch) {
                    marks[variable].insert(position as i32);
                }
            }
            scratch.unassign(variable);
            if marks[variable].len() == domain.len() {
                return Err(ConsistencyError::Overconstrained { variable });
            }
        }
        Ok(marks)
    }

    /// Marks every unmarked value of the formal-`side` variable of `constraint` which no unmarked
    /// value of the opposite variable supports.
    fn mark_unsupported_side(
        &self,
        scratch: &mut Solution<D::Value>,
        constraint: &Constraint<D::Value, Variable<P>>,
        side: usize,
        marks: &mut [IntervalDomain],
    ) -> Result<(), ConsistencyError> {
        let this_variable = constraint.scope()[side];
        let other_variable = constraint.scope()[1 - side];
        let this_domain = self.domain(this_variable);
        let other_domain = self.domain(other_variable);
        for (position, value) in this_domain.iter().enumerate() {
            if marks[this_variable].contains(&(position as i32)) {
                continue;
            }
            scratch.assign(this_variable, value);
            let mut supported = false;
            for (other_position, other_value) in other_domain.iter().enumerate() {
                if marks[other_variable].contains(&(other_position as i32)) {
                    continue;
                }
                scratch.assign(other_variable, other_value);
                if !constraint.is_violated(&self.graph.variables, scratch) {
                    supported = true;
                    break;
                }
            }
            if !supported {
                marks[this_variable].insert(position as i32);
                if marks[this_variable].len() == this_domain.len() {
                    return Err(ConsistencyError::Overconstrained {
                        variable: this_variable,
                    });
                }
            }
        }
        scratch.unassign(this_variable);
        scratch.unassign(other_variable);
        Ok(())
    }

    fn remove_marked_values(&mut self, marks: &[IntervalDomain]) {
        for (variable, marked) in marks.iter().enumerate() {
            if marked.is_empty() {
                continue;
            }
            let domain_id = self.graph.variables[variable].domain_id();
            let domain = &mut self.domains[domain_id];
            let mut cursor = domain.cursor_mut();
            // Positions refer to the domain before any removal, hence the external counter.
            let mut position: i32 = 0;
            while cursor.advance().is_some() {
                if marked.contains(&position) {
                    cursor.remove();
                }
                position += 1;
            }
        }
    }

    fn descending_quicksort(&mut self, lower: usize, upper: usize) {
        let mut i = lower as isize;
        let mut j = upper as isize;
        let pivot = self.graph.degree_of((lower + upper) / 2);
        loop {
            while self.graph.degree_of(i as usize) > pivot {
                i += 1;
            }
            while self.graph.degree_of(j as usize) < pivot {
                j -= 1;
            }
            if i <= j {
                if self.graph.degree_of(i as usize) < self.graph.degree_of(j as usize) {
                    self.graph.swap_variables(i as usize, j as usize);
                }
                i += 1;
                j -= 1;
            }
            if i > j {
                break;
            }
        }
        if (lower as isize) < j {
            self.descending_quicksort(lower, j as usize);
        }
        if i < upper as isize {
            self.descending_quicksort(i as usize, upper);
        }
    }
}
