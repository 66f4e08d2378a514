//! Shared primitive types used across the entire subsystem.

use std::{cell::RefCell, rc::Rc};
use uuid::Uuid;

use crate::person::Person;

/// A stable, unique identifier for a person.
pub type PersonId = Uuid;

/// A stable, unique identifier for a unit.
pub type UnitId = Uuid;

/// Forces are numbered, not UUID-keyed. Zero and below mean "no force".
pub type ForceId = i32;

/// Shared handle to a live person owned by the roster.
/// Units and snapshots hold clones of the handle, never the person itself.
pub type PersonHandle = Rc<RefCell<Person>>;

/// The canonical campaign identifier. Every stored row is scoped by it.
pub type CampaignId = String;
