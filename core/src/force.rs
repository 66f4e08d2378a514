//! Organizational groupings units belong to.
//!
//! Membership is recorded on the unit (`Unit::force_id`), so a force never
//! has to be mutated when a unit joins or leaves it.

use crate::types::ForceId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Force {
    pub id:     ForceId,
    pub name:   String,
    pub parent: Option<ForceId>,
}

impl Force {
    pub fn new(id: ForceId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), parent: None }
    }

    pub fn with_parent(mut self, parent: ForceId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Zero and negative ids are "no force" in saved data.
pub fn normalize_force_id(raw: ForceId) -> Option<ForceId> {
    (raw > 0).then_some(raw)
}
