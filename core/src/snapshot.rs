//! Mothball snapshot: what a unit looked like when it was deactivated.
//!
//! Captured once when the unit is mothballed, saved with the unit, and
//! consumed once by the restore engine when the unit is reactivated.
//! Slots hold `Resolved` handles on the capture path and `Unresolved`
//! ids straight after decoding.

use crate::{
    force::normalize_force_id,
    reference::{PersonRef, Reference},
    types::{ForceId, PersonHandle, PersonId},
    unit::Unit,
};
use serde::{Deserialize, Serialize};
use std::{fmt, rc::Rc};

#[derive(Debug, Clone, Default)]
pub struct MothballSnapshot {
    pub tech:         Option<PersonRef>,
    pub force_id:     Option<ForceId>,
    pub drivers:      Vec<PersonRef>,
    pub gunners:      Vec<PersonRef>,
    pub vessel_crew:  Vec<PersonRef>,
    pub tech_officer: Option<PersonRef>,
    pub navigator:    Option<PersonRef>,
}

/// A named relationship slot between a unit and a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewRole {
    Technician,
    Driver,
    Gunner,
    VesselCrew,
    TechOfficer,
    Navigator,
}

impl CrewRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Technician  => "tech",
            Self::Driver      => "driver",
            Self::Gunner      => "gunner",
            Self::VesselCrew  => "vessel crew",
            Self::TechOfficer => "tech officer",
            Self::Navigator   => "navigator",
        }
    }
}

impl fmt::Display for CrewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl MothballSnapshot {
    /// Copy the unit's current assignments. The unit is not touched.
    pub fn capture(unit: &Unit) -> Self {
        let resolved = |list: &[PersonHandle]| -> Vec<PersonRef> {
            list.iter().map(|p| Reference::Resolved(Rc::clone(p))).collect()
        };
        Self {
            tech:         unit.tech.clone().map(Reference::Resolved),
            force_id:     unit.force_id.and_then(normalize_force_id),
            drivers:      resolved(&unit.drivers),
            gunners:      resolved(&unit.gunners),
            vessel_crew:  resolved(&unit.vessel_crew),
            tech_officer: unit.tech_officer.clone().map(Reference::Resolved),
            navigator:    unit.navigator.clone().map(Reference::Resolved),
        }
    }

    /// All reference slots in role order, paired with their role.
    pub fn references(&self) -> impl Iterator<Item = (CrewRole, &PersonRef)> + '_ {
        single(CrewRole::Technician, &self.tech)
            .chain(many(CrewRole::Driver, &self.drivers))
            .chain(many(CrewRole::Gunner, &self.gunners))
            .chain(many(CrewRole::VesselCrew, &self.vessel_crew))
            .chain(single(CrewRole::TechOfficer, &self.tech_officer))
            .chain(single(CrewRole::Navigator, &self.navigator))
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.references().all(|(_, r)| r.is_resolved())
    }

    pub fn unresolved_count(&self) -> usize {
        self.references().filter(|(_, r)| !r.is_resolved()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.force_id.is_none() && self.references().next().is_none()
    }

    /// Ids referenced by this snapshot, in role order.
    pub fn person_ids(&self) -> Vec<(CrewRole, PersonId)> {
        self.references().map(|(role, r)| (role, r.person_id())).collect()
    }
}

fn single(role: CrewRole, slot: &Option<PersonRef>) -> impl Iterator<Item = (CrewRole, &PersonRef)> + '_ {
    slot.iter().map(move |r| (role, r))
}

fn many(role: CrewRole, list: &[PersonRef]) -> impl Iterator<Item = (CrewRole, &PersonRef)> + '_ {
    list.iter().map(move |r| (role, r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{person::Person, registry::CrewedUnit};
    use uuid::Uuid;

    #[test]
    fn capture_of_uncrewed_unit_is_empty() {
        let unit = Unit::new(Uuid::from_u128(1), "Empty Hangar Queen");
        let snapshot = MothballSnapshot::capture(&unit);
        assert!(snapshot.is_empty());
        assert!(snapshot.is_fully_resolved());
    }

    #[test]
    fn capture_copies_lists_without_touching_the_unit() {
        let mut unit = Unit::new(Uuid::from_u128(1), "Vedette");
        let driver = Person::new(Uuid::from_u128(10), "d").into_handle();
        unit.attach_driver(Rc::clone(&driver));

        let snapshot = MothballSnapshot::capture(&unit);
        unit.drivers.clear();

        assert_eq!(snapshot.drivers.len(), 1);
        assert!(Rc::ptr_eq(snapshot.drivers[0].resolved().unwrap(), &driver));
        assert_eq!(driver.borrow().unit, Some(unit.id));
    }

    #[test]
    fn force_zero_captures_as_no_force() {
        let mut unit = Unit::new(Uuid::from_u128(1), "Vedette");
        unit.force_id = Some(0);
        let snapshot = MothballSnapshot::capture(&unit);
        assert_eq!(snapshot.force_id, None);
        assert!(snapshot.is_empty());
    }
}
