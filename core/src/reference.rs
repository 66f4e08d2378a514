//! Forward references to entities that may not be loaded yet.
//!
//! A decoded snapshot only knows identifiers. Rather than forcing a load
//! order, each slot holds `Unresolved(id)` until a single fix-up pass swaps
//! it for the live entity once the whole roster is in memory.

use crate::types::{PersonHandle, PersonId};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum Reference<T> {
    Resolved(T),
    Unresolved(Uuid),
}

pub type PersonRef = Reference<PersonHandle>;

impl<T> Reference<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unresolved(_)   => None,
        }
    }

    pub fn into_resolved(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unresolved(_)   => None,
        }
    }

    /// Swap a placeholder for the live entity.
    /// Already-resolved references are returned untouched without a lookup.
    /// On a miss the placeholder's id comes back as the error.
    pub fn resolve_with<F>(self, lookup: F) -> Result<Self, Uuid>
    where
        F: FnOnce(Uuid) -> Option<T>,
    {
        match self {
            Self::Resolved(_)    => Ok(self),
            Self::Unresolved(id) => lookup(id).map(Self::Resolved).ok_or(id),
        }
    }
}

impl PersonRef {
    pub fn person_id(&self) -> PersonId {
        match self {
            Self::Resolved(person) => person.borrow().id,
            Self::Unresolved(id)   => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_reference_skips_lookup() {
        let r: Reference<u32> = Reference::Resolved(7);
        let out = r.resolve_with(|_| panic!("lookup must not run")).unwrap();
        assert_eq!(out.resolved(), Some(&7));
    }

    #[test]
    fn missing_referent_returns_its_id() {
        let id = Uuid::from_u128(42);
        let r: Reference<u32> = Reference::Unresolved(id);
        assert_eq!(r.resolve_with(|_| None).unwrap_err(), id);
    }
}
