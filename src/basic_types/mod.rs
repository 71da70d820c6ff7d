mod domain;
mod error;
mod interval_domain;
mod list_domain;
mod solution;

pub use domain::Domain;
pub use domain::DomainCursor;
pub use error::ConsistencyError;
pub use interval_domain::IntervalDomain;
pub use interval_domain::IntervalDomainCursor;
pub use list_domain::ListDomain;
pub use list_domain::ListDomainCursor;
pub use solution::ScopedAssignments;
pub use solution::Solution;
