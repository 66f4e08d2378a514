//! People who crew and maintain units.
//!
//! A person's unit assignment lives on the person. Units keep handles to
//! their crew, but the back-reference here is the single source of truth
//! for "is this person assigned somewhere".

use crate::types::{PersonHandle, PersonId, UnitId};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, fmt, rc::Rc, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id:     PersonId,
    pub name:   String,
    pub status: PersonStatus,
    pub unit:   Option<UnitId>,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: PersonStatus::Active,
            unit: None,
        }
    }

    pub fn with_status(mut self, status: PersonStatus) -> Self {
        self.status = status;
        self
    }

    /// Wrap into a shared handle for the roster.
    pub fn into_handle(self) -> PersonHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_unassigned(&self) -> bool {
        self.unit.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonStatus {
    Active,
    OnLeave,
    Missing,
    Pow,
    Retired,
    Kia,
    Dead,
}

impl PersonStatus {
    /// Only `Active` people may be put back on a unit.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active  => "active",
            Self::OnLeave => "on_leave",
            Self::Missing => "missing",
            Self::Pow     => "pow",
            Self::Retired => "retired",
            Self::Kia     => "kia",
            Self::Dead    => "dead",
        }
    }
}

impl fmt::Display for PersonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active"   => Ok(Self::Active),
            "on_leave" => Ok(Self::OnLeave),
            "missing"  => Ok(Self::Missing),
            "pow"      => Ok(Self::Pow),
            "retired"  => Ok(Self::Retired),
            "kia"      => Ok(Self::Kia),
            "dead"     => Ok(Self::Dead),
            other      => Err(format!("unknown person status '{other}'")),
        }
    }
}
