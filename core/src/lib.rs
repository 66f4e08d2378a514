//! Mothball snapshots for campaign units.
//!
//! Capture a unit's crew, technician and force assignments when it is
//! deactivated, persist them as plain identifiers, and put them back when
//! the unit is reactivated, against whatever the campaign looks like by
//! then.
//!
//! Pipeline: capture → encode → store → decode (placeholders) →
//! resolve (one pass, after every person is loaded) → restore.

pub mod actions;
pub mod campaign;
pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod force;
pub mod person;
pub mod reference;
pub mod registry;
pub mod resolver;
pub mod restore;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod unit;
