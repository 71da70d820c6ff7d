use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use crate::basic_types::Solution;
use crate::search::SearchAlgorithm;
use crate::statistics::SolverStatistics;

/// Drives a [`SearchAlgorithm`] and keeps cumulative statistics over its steps.
///
/// [`Solver::solve`] is reentrant: every successful call produces the *next* solution of the
/// algorithm's enumeration, and a false return means the search is over (or, for the stochastic
/// algorithms, that this attempt failed). [`Solver::solve_within`] bounds one step by a time
/// budget, using a single worker thread purely as a timeout mechanism.
///
/// # Example
/// ```
/// # use gherkin_solver::conditions;
/// # use gherkin_solver::ForwardChecking;
/// # use gherkin_solver::IntervalDomain;
/// # use gherkin_solver::ProblemBuilder;
/// # use gherkin_solver::Solver;
/// let mut builder = ProblemBuilder::with_shared_domain("pair", 2, IntervalDomain::range(0, 1));
/// builder.constrain(conditions::not_equal(), &[0, 1]);
/// let problem = builder.build();
///
/// let mut solver = Solver::new(ForwardChecking::new(&problem));
/// let solutions: Vec<_> = solver.solutions().collect();
/// assert_eq!(solutions.len(), 2);
/// assert_eq!(solver.statistics().num_solutions, 2);
/// ```
#[derive(Debug)]
pub struct Solver<A> {
    algorithm: A,
    statistics: SolverStatistics,
}

impl<A: SearchAlgorithm> Solver<A> {
    pub fn new(algorithm: A) -> Solver<A> {
        Solver {
            algorithm,
            statistics: SolverStatistics::default(),
        }
    }

    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Runs one search step and reports whether it produced a new solution.
    pub fn solve(&mut self) -> bool {
        let start = Instant::now();
        self.algorithm.step();
        self.statistics.time_spent += start.elapsed();
        self.record_outcome()
    }

    /// Runs one search step with a time budget; the step is interrupted once the budget runs
    /// out. A zero budget means unbounded.
    ///
    /// The step runs on one worker thread so that this call can wait with a timeout; the worker
    /// holds the algorithm exclusively until it observes the interrupt and returns.
    pub fn solve_within(&mut self, limit: Duration) -> bool
    where
        A: Send,
    {
        if limit.is_zero() {
            return self.solve();
        }
        let start = Instant::now();
        let stop = self.algorithm.interrupt_handle();
        let (finished, timeout) = mpsc::channel();
        let algorithm = &mut self.algorithm;
        thread::scope(|scope| {
            let _ = scope.spawn(move || {
                algorithm.step();
                let _ = finished.send(());
            });
            if timeout.recv_timeout(limit).is_err() {
                stop.interrupt();
            }
        });
        self.statistics.time_spent += start.elapsed();
        self.record_outcome()
    }

    fn record_outcome(&mut self) -> bool {
        if self.algorithm.is_successful() {
            self.statistics.num_solutions += 1;
            true
        } else {
            false
        }
    }

    /// A snapshot of the solution produced by the last successful step.
    ///
    /// Panics when the last step was not successful.
    pub fn current_solution(&self) -> Solution<A::Value> {
        self.algorithm.solution().clone()
    }

    /// Lazily yields the remaining solutions by solving until a step comes up empty. Finite for
    /// the exhaustive algorithms.
    pub fn solutions(&mut self) -> impl Iterator<Item = Solution<A::Value>> + '_ {
        std::iter::from_fn(move || {
            if self.solve() {
                Some(self.algorithm.solution().clone())
            } else {
                None
            }
        })
    }

    /// Like [`Solver::solutions`], but bounds every step by `limit`.
    pub fn solutions_within(
        &mut self,
        limit: Duration,
    ) -> impl Iterator<Item = Solution<A::Value>> + '_
    where
        A: Send,
    {
        std::iter::from_fn(move || {
            if self.solve_within(limit) {
                Some(self.algorithm.solution().clone())
            } else {
                None
            }
        })
    }

    /// Returns the algorithm to its initial state. The cumulative statistics are kept.
    pub fn reset(&mut self) {
        self.algorithm.reset();
    }

    /// Emits the cumulative statistics through the statistics logger.
    pub fn log_statistics(&self) {
        self.statistics.log();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::IntervalDomain;
    use crate::model::conditions;
    use crate::model::ProblemBuilder;
    use crate::search::Backtracking;
    use crate::search::Exhaustive;
    use crate::search::ForwardChecking;

    #[test]
    fn solve_counts_solutions_and_reports_exhaustion() {
        let mut builder =
            ProblemBuilder::with_shared_domain("pairs", 2, IntervalDomain::range(1, 3));
        builder.constrain(conditions::not_equal(), &[0, 1]);
        let problem = builder.build();
        let mut solver = Solver::new(Backtracking::new(&problem));

        let mut count = 0;
        while solver.solve() {
            assert!(problem.is_satisfied(&solver.current_solution()));
            count += 1;
        }

        assert_eq!(count, 6);
        assert_eq!(solver.statistics().num_solutions, 6);
        assert!(solver.algorithm().in_final_state());
    }

    #[test]
    fn solutions_iterator_is_lazy_and_resumable() {
        let mut builder =
            ProblemBuilder::with_shared_domain("pairs", 2, IntervalDomain::range(1, 3));
        builder.constrain(conditions::not_equal(), &[0, 1]);
        let problem = builder.build();
        let mut solver = Solver::new(ForwardChecking::new(&problem));

        let first_two: Vec<_> = solver.solutions().take(2).collect();
        assert_eq!(first_two.len(), 2);

        let rest: Vec<_> = solver.solutions().collect();
        assert_eq!(rest.len(), 4);
        assert!(rest.iter().all(|solution| !first_two.contains(solution)));
    }

    #[test]
    fn reset_restarts_while_statistics_accumulate() {
        let mut builder =
            ProblemBuilder::with_shared_domain("pair", 2, IntervalDomain::range(0, 1));
        builder.constrain(conditions::not_equal(), &[0, 1]);
        let problem = builder.build();
        let mut solver = Solver::new(Backtracking::new(&problem));

        assert_eq!(solver.solutions().count(), 2);
        solver.reset();
        assert_eq!(solver.solutions().count(), 2);
        assert_eq!(solver.statistics().num_solutions, 4);
    }

    #[test]
    fn a_timed_out_step_is_interrupted_without_a_result() {
        // An unsatisfiable problem whose only constraint sits between the first and the last
        // variable, forcing chronological backtracking through the whole 2^22 tree.
        let mut builder =
            ProblemBuilder::with_shared_domain("deep", 22, IntervalDomain::range(0, 1));
        builder.constrain(|_| false, &[0, 21]);
        let problem = builder.build();
        let mut solver = Solver::new(Backtracking::new(&problem));

        let solved = solver.solve_within(Duration::from_millis(5));

        assert!(!solved);
        assert!(!solver.algorithm().is_running());
        assert!(!solver.algorithm().in_final_state());
    }

    #[test]
    fn a_zero_budget_means_unbounded_solving() {
        let mut builder =
            ProblemBuilder::with_shared_domain("pair", 2, IntervalDomain::range(0, 1));
        builder.constrain(conditions::not_equal(), &[0, 1]);
        let problem = builder.build();
        let mut solver = Solver::new(Backtracking::new(&problem));

        assert!(solver.solve_within(Duration::ZERO));
        assert_eq!(solver.current_solution().to_string(), "{ 0 1 }");
    }
}
