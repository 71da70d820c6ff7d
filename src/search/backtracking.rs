use crate::basic_types::Domain;
use crate::model::Problem;
use crate::search::delegate_search_state;
use crate::search::Exhaustive;
use crate::search::SearchAlgorithm;
use crate::search::SearchCore;

/// Chronological backtracking: depth-first enumeration of all solutions in variable declaration
/// order.
///
/// Each position keeps a cursor into its domain; a value is accepted when it conflicts with no
/// constraint incident to the current variable, and positions backtrack when their domain is
/// exhausted. The terminal state is reached when the first position has exhausted its domain.
#[derive(Debug)]
pub struct Backtracking<'a, D: Domain, P = ()> {
    problem: &'a Problem<D, P>,
    core: SearchCore<D::Value>,
    /// Per variable, the domain position of the value currently tried; `-1` before the first.
    cursors: Vec<isize>,
    index: isize,
}

impl<'a, D: Domain, P> Backtracking<'a, D, P> {
    pub fn new(problem: &'a Problem<D, P>) -> Backtracking<'a, D, P> {
        Backtracking {
            problem,
            core: SearchCore::new(problem.variable_count()),
            cursors: vec![-1; problem.variable_count()],
            index: 0,
        }
    }
}

impl<D: Domain, P> SearchAlgorithm for Backtracking<'_, D, P> {
    type Value = D::Value;

    fn step(&mut self) {
        self.core.begin_step();
        let problem = self.problem;
        let last = self.cursors.len() as isize - 1;
        while self.core.should_continue() && self.index > -1 && last >= 0 {
            let variable = self.index as usize;
            let domain = problem.domain(variable);
            if self.cursors[variable] + 1 < domain.len() as isize {
                self.cursors[variable] += 1;
                let value = domain.get(self.cursors[variable] as usize);
                self.core.solution.assign(variable, value);
                if !problem.has_conflicts_with(&self.core.solution, variable) {
                    if self.index == last {
                        self.core.post_solution();
                        return;
                    }
                    self.index += 1;
                }
            } else {
                self.cursors[variable] = -1;
                self.core.solution.unassign(variable);
                self.index -= 1;
            }
        }
        self.core.finish();
    }

    delegate_search_state!();

    fn reset(&mut self) {
        self.core.reset();
        self.cursors.fill(-1);
        self.index = 0;
    }
}

impl<D: Domain, P> Exhaustive for Backtracking<'_, D, P> {
    fn in_final_state(&self) -> bool {
        self.index == -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::IntervalDomain;
    use crate::model::conditions;
    use crate::model::ProblemBuilder;

    fn two_variable_problem() -> crate::model::Problem<IntervalDomain> {
        let mut builder = ProblemBuilder::with_shared_domain("two", 2, IntervalDomain::range(1, 2));
        builder.constrain(conditions::not_equal(), &[0, 1]);
        builder.build()
    }

    #[test]
    fn enumerates_all_solutions_in_declaration_order() {
        let problem = two_variable_problem();
        let mut algorithm = Backtracking::new(&problem);

        algorithm.step();
        assert!(algorithm.is_successful());
        assert!(problem.is_satisfied(algorithm.solution()));
        assert_eq!(algorithm.solution().to_string(), "{ 1 2 }");

        algorithm.step();
        assert!(algorithm.is_successful());
        assert_eq!(algorithm.solution().to_string(), "{ 2 1 }");

        algorithm.step();
        assert!(!algorithm.is_successful());
        assert!(algorithm.in_final_state());

        // Stepping in the final state stays unsuccessful.
        algorithm.step();
        assert!(!algorithm.is_successful());
    }

    #[test]
    fn reset_restarts_the_enumeration() {
        let problem = two_variable_problem();
        let mut algorithm = Backtracking::new(&problem);
        while {
            algorithm.step();
            algorithm.is_successful()
        } {}
        assert!(algorithm.in_final_state());

        algorithm.reset();
        algorithm.step();
        assert!(algorithm.is_successful());
        assert_eq!(algorithm.solution().to_string(), "{ 1 2 }");
    }

    #[test]
    #[should_panic(expected = "did not produce a solution")]
    fn solution_of_an_unsuccessful_step_panics() {
        let mut builder =
            ProblemBuilder::with_shared_domain("conflict", 2, IntervalDomain::singleton(1));
        builder.constrain(conditions::not_equal(), &[0, 1]);
        let problem = builder.build();
        let mut algorithm = Backtracking::new(&problem);

        algorithm.step();
        assert!(!algorithm.is_successful());
        let _ = algorithm.solution();
    }
}
