use crate::containers::StorageKey;

/// Identifies a domain in the problem's central domain store.
///
/// Several variables may reference the same domain; this is how the builder models a domain
/// shared between variables, and what consistency pre-processing checks for before it shrinks
/// anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainId {
    id: u32,
}

impl StorageKey for DomainId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> DomainId {
        DomainId { id: index as u32 }
    }
}

/// A problem variable: an identity, an optional payload describing what the variable stands for,
/// and a reference to its domain.
///
/// Payloads are available to constraint conditions through the projected view, which is how e.g.
/// an n-queens model can attach the row number to each queen variable. Two variables are equal
/// exactly when their ids are equal.
#[derive(Debug)]
pub struct Variable<P> {
    id: i32,
    payload: Option<P>,
    domain: DomainId,
}

impl<P> Variable<P> {
    pub(crate) fn new(id: i32, payload: Option<P>, domain: DomainId) -> Variable<P> {
        Variable {
            id,
            payload,
            domain,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub(crate) fn domain_id(&self) -> DomainId {
        self.domain
    }
}

impl<P> PartialEq for Variable<P> {
    fn eq(&self, other: &Variable<P>) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for Variable<P> {}
