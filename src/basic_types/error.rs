use thiserror::Error;

/// The reasons consistency pre-processing can refuse to run or fail.
///
/// Both variants leave the problem untouched: domains are only shrunk after the whole marking
/// phase has succeeded.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// A variable's domain would become empty; the problem admits no solution as stated.
    #[error("the problem is over-constrained: the domain of the variable at index {variable} would become empty")]
    Overconstrained { variable: usize },

    /// Two variables reference the same domain instance, which pre-processing must reject since
    /// shrinking one variable's domain would silently shrink the other's.
    #[error("the variables at indices {first} and {second} share the same domain instance")]
    SharedDomain { first: usize, second: usize },
}
