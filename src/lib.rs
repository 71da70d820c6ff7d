//! # Gherkin
//! Gherkin is a classic finite-domain CSP/CSOP engine which aims to be small, well-documented
//! and predictable.
//!
//! A problem is declared as a triple (Z, D, C): a set of variables, a finite domain per variable
//! ([`IntervalDomain`] for integers, [`ListDomain`] for anything else) and a set of constraints,
//! each a predicate over the currently assigned values of a chosen variable tuple. The engine
//! enumerates the complete assignments satisfying all constraints through a family of resumable
//! search algorithms (chronological backtracking, forward checking with MRV ordering, min
//! conflicts local search, greedy construction), optimizes with branch-and-bound, and can
//! tighten a problem before search with AC-1 node/arc consistency and minimal-width variable
//! ordering. An integer dialect adds an arithmetic expression layer which decomposes terms such
//! as `x + 5 == y * z` into auxiliary variables pinned by binary and ternary constraints.
//!
//! # Example of how to use Gherkin
//!
//! ```rust
//! # use gherkin_solver::conditions;
//! # use gherkin_solver::ForwardChecking;
//! # use gherkin_solver::IntervalDomain;
//! # use gherkin_solver::ProblemBuilder;
//! # use gherkin_solver::Solver;
//! // Three variables over [0, 2] which must all take different values.
//! let mut builder =
//!     ProblemBuilder::with_shared_domain("all-different", 3, IntervalDomain::range(0, 2));
//! builder.constrain_each_two(conditions::not_equal());
//! let problem = builder.build();
//!
//! // Enumerate all solutions with forward checking.
//! let mut solver = Solver::new(ForwardChecking::new(&problem));
//! let mut count = 0;
//! while solver.solve() {
//!     let solution = solver.current_solution();
//!     assert!(problem.is_satisfied(&solution));
//!     count += 1;
//! }
//! assert_eq!(count, 6);
//! ```

#[doc(hidden)]
pub mod asserts;

pub(crate) mod basic_types;
pub(crate) mod containers;
pub(crate) mod integer;
pub(crate) mod model;
pub(crate) mod search;

pub mod statistics;

// We declare a private module with public use, so that all exports from API are exports directly
// from the crate.
//
// Example:
// `use gherkin_solver::Solver;`
// vs.
// `use gherkin_solver::api::Solver;`
mod api;

pub use api::*;
