mod builder;
pub mod conditions;
mod consistency;
mod constraint;
mod graph;
mod problem;
mod variable;

pub use builder::ProblemBuilder;
pub use constraint::Condition;
pub use constraint::Constraint;
pub use problem::Problem;
pub use variable::DomainId;
pub use variable::Variable;

pub(crate) use builder::impl_constrain_family;
pub(crate) use graph::ConstraintGraph;
