//! The search algorithms: stateful, resumable generators over the solutions of a problem.
//!
//! Every algorithm follows the same shape. One [`SearchAlgorithm::step`] drives the search until
//! either the next solution has been produced (`is_successful()` becomes true and
//! [`SearchAlgorithm::solution`] exposes it) or the search space is exhausted. A further step
//! resumes *after* the last solution rather than re-emitting it. The step loop observes an
//! interrupt flag at every iteration, which is how the bounded-time solver mode cancels a search
//! from its timeout thread.

mod backtracking;
mod branch_and_bound;
mod forward_checking;
mod greedy;
mod int_branch_and_bound;
mod int_forward_checking;
mod int_greedy;
mod int_min_conflicts;
mod min_conflicts;

pub use backtracking::Backtracking;
pub use branch_and_bound::BranchAndBound;
pub use forward_checking::ForwardChecking;
pub use greedy::Greedy;
pub use int_branch_and_bound::IntBranchAndBound;
pub use int_forward_checking::IntForwardChecking;
pub use int_greedy::IntGreedy;
pub use int_min_conflicts::IntMinConflicts;
pub use min_conflicts::MinConflicts;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::basic_types::Solution;

/// A search algorithm over the solutions of one problem.
///
/// Not safe for concurrent stepping: a single instance is driven by one caller (or by the
/// solver's single timeout worker) at a time, and [`SearchAlgorithm::solution`] borrows state
/// the next step will mutate.
pub trait SearchAlgorithm {
    /// The value type of the solutions this algorithm produces.
    type Value: Clone;

    /// Runs the search until the next solution is found, the search space is exhausted, or the
    /// algorithm is interrupted.
    fn step(&mut self);

    /// A handle through which the current and any future step can be interrupted, also from
    /// another thread.
    fn interrupt_handle(&self) -> InterruptHandle;

    /// True while a step is being driven; false once it has returned or was interrupted.
    fn is_running(&self) -> bool;

    /// True when the last step produced a new solution.
    fn is_successful(&self) -> bool;

    /// The solution produced by the last step. The returned reference is only valid until the
    /// next step; clone it for a stable snapshot.
    ///
    /// Panics when the last step was not successful.
    fn solution(&self) -> &Solution<Self::Value>;

    /// Returns the algorithm to its initial state: flags cleared, solution unassigned, search
    /// position rewound.
    fn reset(&mut self);
}

/// Implemented by the algorithms which enumerate the whole search space (in contrast to the
/// stochastic ones): [`Backtracking`], [`ForwardChecking`], [`BranchAndBound`] and their integer
/// variants.
pub trait Exhaustive: SearchAlgorithm {
    /// True once the search space has been exhausted; stepping is a no-op from here on.
    fn in_final_state(&self) -> bool;
}

/// Implemented by the optimizing algorithms, [`BranchAndBound`] and [`IntBranchAndBound`].
pub trait Optimization: SearchAlgorithm {
    /// True when the objective is to minimize the evaluation.
    fn is_minimize(&self) -> bool;

    /// True when the objective is to maximize the evaluation.
    fn is_maximize(&self) -> bool {
        !self.is_minimize()
    }

    /// The evaluation of the best solution found so far.
    fn objective_value(&self) -> f64;
}

/// An incremental scoring function for the optimizing and greedy algorithms.
///
/// Receives the current (partial) solution, the index of the variable assigned last and the
/// score the enclosing search level was entered with, and returns the score including that last
/// assignment.
pub type Fitness<T> = Box<dyn Fn(&Solution<T>, usize, f64) -> f64 + Send + Sync>;

/// Interrupts a [`SearchAlgorithm`], possibly from another thread.
///
/// The algorithm observes the flag at every iteration of its step loop and returns at the next
/// check; interruption is cooperative and never raises an error.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    running: Arc<AtomicBool>,
}

impl InterruptHandle {
    /// Signals the algorithm to return from its current step as soon as possible.
    pub fn interrupt(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// The state every search algorithm carries: the solution being built, the shared running flag
/// and the successful flag.
#[derive(Debug)]
pub(crate) struct SearchCore<T> {
    pub(crate) solution: Solution<T>,
    running: Arc<AtomicBool>,
    successful: bool,
}

impl<T: Clone> SearchCore<T> {
    pub(crate) fn new(variable_count: usize) -> SearchCore<T> {
        SearchCore {
            solution: Solution::new(variable_count),
            running: Arc::new(AtomicBool::new(false)),
            successful: false,
        }
    }

    /// Marks the step as running and clears the previous success.
    pub(crate) fn begin_step(&mut self) {
        self.running.store(true, Ordering::Relaxed);
        self.successful = false;
    }

    /// True while neither the step has finished nor an interrupt arrived.
    pub(crate) fn should_continue(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Ends the step without a solution.
    pub(crate) fn finish(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Ends the step with the current solution as its result.
    pub(crate) fn post_solution(&mut self) {
        self.successful = true;
        self.running.store(false, Ordering::Relaxed);
    }

    pub(crate) fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle {
            running: Arc::clone(&self.running),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub(crate) fn is_successful(&self) -> bool {
        self.successful
    }

    pub(crate) fn solution(&self) -> &Solution<T> {
        crate::gherkin_assert_simple!(
            self.successful,
            "the last step did not produce a solution"
        );
        &self.solution
    }

    pub(crate) fn reset(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.successful = false;
        self.solution.clear();
    }
}

/// Delegates the flag-and-solution part of [`SearchAlgorithm`] to the algorithm's `core` field.
macro_rules! delegate_search_state {
    () => {
        fn interrupt_handle(&self) -> $crate::search::InterruptHandle {
            self.core.interrupt_handle()
        }

        fn is_running(&self) -> bool {
            self.core.is_running()
        }

        fn is_successful(&self) -> bool {
            self.core.is_successful()
        }

        fn solution(&self) -> &$crate::Solution<Self::Value> {
            self.core.solution()
        }
    };
}

pub(crate) use delegate_search_state;
