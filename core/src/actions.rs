//! Player-facing unit actions.
//!
//! Outside GM mode a unit that does not crew itself needs an active
//! technician to be mothballed or reactivated. Without one the action is a
//! no-op, not an error, matching how the UI greys the option out.

use crate::{
    campaign::Roster,
    error::{MothballError, MothballResult},
    registry::PersonRegistry,
    restore::RestoreReport,
    types::{PersonId, UnitId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MothballUnitAction {
    pub tech:  Option<PersonId>,
    pub is_gm: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivateUnitAction {
    pub tech:  Option<PersonId>,
    pub is_gm: bool,
}

impl MothballUnitAction {
    pub fn new(tech: Option<PersonId>, is_gm: bool) -> Self {
        Self { tech, is_gm }
    }

    /// Returns whether the unit was mothballed.
    pub fn execute(&self, roster: &mut Roster, unit_id: UnitId) -> MothballResult<bool> {
        if unit_state(roster, unit_id)? {
            return Err(MothballError::AlreadyMothballed { unit_id });
        }
        if !has_required_tech(roster, unit_id, self.tech, self.is_gm)? {
            return Ok(false);
        }
        roster.mothball_unit(unit_id)?;
        Ok(true)
    }
}

impl ActivateUnitAction {
    pub fn new(tech: Option<PersonId>, is_gm: bool) -> Self {
        Self { tech, is_gm }
    }

    /// Returns the restore report, or `None` if nothing happened.
    pub fn execute(
        &self,
        roster: &mut Roster,
        unit_id: UnitId,
    ) -> MothballResult<Option<RestoreReport>> {
        if !unit_state(roster, unit_id)? {
            return Err(MothballError::NotMothballed { unit_id });
        }
        if !has_required_tech(roster, unit_id, self.tech, self.is_gm)? {
            return Ok(None);
        }
        roster.activate_unit(unit_id).map(Some)
    }
}

/// Whether the unit is mothballed. State errors win over a missing technician.
fn unit_state(roster: &Roster, unit_id: UnitId) -> MothballResult<bool> {
    roster
        .unit(unit_id)
        .map(|u| u.is_mothballed())
        .ok_or(MothballError::UnitNotFound { unit_id })
}

fn has_required_tech(
    roster: &Roster,
    unit_id: UnitId,
    tech: Option<PersonId>,
    is_gm: bool,
) -> MothballResult<bool> {
    let unit = roster
        .unit(unit_id)
        .ok_or(MothballError::UnitNotFound { unit_id })?;
    if is_gm || unit.self_crewed || !roster.config().require_tech_for_activation {
        return Ok(true);
    }
    let Some(person_id) = tech else {
        log::info!("Unit {unit_id} needs a technician for this action");
        return Ok(false);
    };
    let person = roster
        .lookup_person(person_id)
        .ok_or(MothballError::PersonNotFound { person_id })?;
    let active = person.borrow().is_active();
    if !active {
        log::info!("Technician {person_id} is not active; unit {unit_id} left as is");
    }
    Ok(active)
}
