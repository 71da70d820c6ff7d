mod solver;

pub use solver::Solver;

pub use crate::basic_types::ConsistencyError;
pub use crate::basic_types::Domain;
pub use crate::basic_types::DomainCursor;
pub use crate::basic_types::IntervalDomain;
pub use crate::basic_types::IntervalDomainCursor;
pub use crate::basic_types::ListDomain;
pub use crate::basic_types::ListDomainCursor;
pub use crate::basic_types::ScopedAssignments;
pub use crate::basic_types::Solution;
pub use crate::integer::BinaryOperator;
pub use crate::integer::IntProblem;
pub use crate::integer::IntProblemBuilder;
pub use crate::integer::IntVariable;
pub use crate::integer::Relation;
pub use crate::integer::Term;
pub use crate::integer::UnaryOperator;
pub use crate::model::conditions;
pub use crate::model::Condition;
pub use crate::model::Constraint;
pub use crate::model::DomainId;
pub use crate::model::Problem;
pub use crate::model::ProblemBuilder;
pub use crate::model::Variable;
pub use crate::search::Backtracking;
pub use crate::search::BranchAndBound;
pub use crate::search::Exhaustive;
pub use crate::search::Fitness;
pub use crate::search::ForwardChecking;
pub use crate::search::Greedy;
pub use crate::search::IntBranchAndBound;
pub use crate::search::IntForwardChecking;
pub use crate::search::IntGreedy;
pub use crate::search::IntMinConflicts;
pub use crate::search::InterruptHandle;
pub use crate::search::MinConflicts;
pub use crate::search::Optimization;
pub use crate::search::SearchAlgorithm;
