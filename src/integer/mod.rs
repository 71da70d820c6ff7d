mod int_builder;
mod int_problem;
mod int_variable;

pub use int_builder::IntProblemBuilder;
pub use int_builder::Term;
pub use int_problem::IntProblem;
pub use int_variable::BinaryOperator;
pub use int_variable::IntVariable;
pub use int_variable::Relation;
pub use int_variable::UnaryOperator;
