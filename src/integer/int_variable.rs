use std::fmt;

use crate::basic_types::Solution;
use crate::model::DomainId;

/// The function pinning a unary-relation auxiliary to its single input.
pub type UnaryOperator = Box<dyn Fn(i32) -> i32 + Send + Sync>;
/// The function pinning a binary-relation auxiliary to its two inputs.
pub type BinaryOperator = Box<dyn Fn(i32, i32) -> i32 + Send + Sync>;

/// The relation pinning an auxiliary variable to the variables it is derived from.
pub enum Relation {
    /// The auxiliary is `operator(input)`.
    Unary {
        input: usize,
        operator: UnaryOperator,
    },
    /// The auxiliary is `operator(input0, input1)`.
    Binary {
        input0: usize,
        input1: usize,
        operator: BinaryOperator,
    },
}

impl Relation {
    /// The variable indices this relation reads.
    pub fn inputs(&self) -> impl Iterator<Item = usize> + '_ {
        let (first, second) = match self {
            Relation::Unary { input, .. } => (*input, None),
            Relation::Binary { input0, input1, .. } => (*input0, Some(*input1)),
        };
        std::iter::once(first).chain(second)
    }

    /// True when this relation reads the variable at `variable`.
    pub fn involves(&self, variable: usize) -> bool {
        self.inputs().any(|input| input == variable)
    }

    /// True when every input of this relation is assigned in `solution`.
    pub fn is_ready(&self, solution: &Solution<i32>) -> bool {
        self.inputs().all(|input| solution.is_assigned(input))
    }

    /// Computes the derived value from the inputs' current values.
    ///
    /// Must not be called with unassigned inputs; callers gate on [`Relation::is_ready`].
    pub fn evaluate(&self, solution: &Solution<i32>) -> i32 {
        match self {
            Relation::Unary { input, operator } => operator(*solution.value(*input)),
            Relation::Binary {
                input0,
                input1,
                operator,
            } => operator(*solution.value(*input0), *solution.value(*input1)),
        }
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Unary { input, .. } => f
                .debug_struct("Unary")
                .field("input", input)
                .finish_non_exhaustive(),
            Relation::Binary { input0, input1, .. } => f
                .debug_struct("Binary")
                .field("input0", input0)
                .field("input1", input1)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug)]
enum IntVariableKind {
    /// A variable declared by the user, drawing its values from a domain.
    Base { domain: DomainId },
    /// A variable synthesized by the expression builder; it has no domain, its value is derived
    /// through the relation whenever all inputs are assigned.
    Auxiliary { relation: Relation },
}

/// A variable of an integer problem: either a base variable with an [`IntervalDomain`] or an
/// auxiliary variable carrying the [`Relation`] it is derived by.
///
/// Base variables receive non-negative ids from the builder; auxiliaries receive negative ids
/// and are appended after all base variables. Two variables are equal exactly when their ids are
/// equal.
///
/// [`IntervalDomain`]: crate::IntervalDomain
#[derive(Debug)]
pub struct IntVariable<P> {
    id: i32,
    payload: Option<P>,
    kind: IntVariableKind,
}

impl<P> IntVariable<P> {
    pub(crate) fn base(id: i32, payload: Option<P>, domain: DomainId) -> IntVariable<P> {
        IntVariable {
            id,
            payload,
            kind: IntVariableKind::Base { domain },
        }
    }

    pub(crate) fn auxiliary(id: i32, relation: Relation) -> IntVariable<P> {
        IntVariable {
            id,
            payload: None,
            kind: IntVariableKind::Auxiliary { relation },
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn is_auxiliary(&self) -> bool {
        matches!(self.kind, IntVariableKind::Auxiliary { .. })
    }

    /// The relation of an auxiliary variable, or `None` for a base variable.
    pub fn relation(&self) -> Option<&Relation> {
        match &self.kind {
            IntVariableKind::Base { .. } => None,
            IntVariableKind::Auxiliary { relation } => Some(relation),
        }
    }

    /// The domain reference of a base variable. Panics for auxiliary variables, which have no
    /// domain of their own.
    pub(crate) fn domain_id(&self) -> DomainId {
        match &self.kind {
            IntVariableKind::Base { domain } => *domain,
            IntVariableKind::Auxiliary { .. } => {
                panic!("the auxiliary variable with id {} has no domain", self.id)
            }
        }
    }
}

impl<P> PartialEq for IntVariable<P> {
    fn eq(&self, other: &IntVariable<P>) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for IntVariable<P> {}
