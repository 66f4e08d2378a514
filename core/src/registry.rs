//! Narrow collaborator interfaces.
//!
//! RULE: The resolver and restore engine only ever see people, forces and
//! units through these traits. Registries are read-only from their side;
//! the only writes go through `CrewedUnit`.

use crate::{
    force::Force,
    snapshot::CrewRole,
    types::{ForceId, PersonHandle, PersonId, UnitId},
};
use std::collections::{BTreeMap, HashMap};

/// Lookup of live people by id. Absent people return `None`.
pub trait PersonRegistry {
    fn lookup_person(&self, id: PersonId) -> Option<PersonHandle>;
}

/// Lookup of forces by id. Absent forces return `None`.
pub trait ForceRegistry {
    fn lookup_force(&self, id: ForceId) -> Option<&Force>;
}

/// The unit mutation API the restore engine drives.
///
/// Every `attach_*` call is responsible for setting the person's unit
/// back-reference to this unit.
pub trait CrewedUnit {
    fn unit_id(&self) -> UnitId;
    /// Replaces any current technician. A unit the person was looking after
    /// before keeps its handle; only the back-reference moves here.
    fn attach_technician(&mut self, person: PersonHandle);
    fn attach_driver(&mut self, person: PersonHandle);
    fn attach_gunner(&mut self, person: PersonHandle);
    fn attach_vessel_crew(&mut self, person: PersonHandle);
    fn attach_tech_officer(&mut self, person: PersonHandle);
    fn attach_navigator(&mut self, person: PersonHandle);
    fn attach_to_force(&mut self, force: &Force);
    /// Recompute the derived engineer after crew composition changed.
    fn reset_engineer(&mut self);

    fn attach(&mut self, role: CrewRole, person: PersonHandle) {
        match role {
            CrewRole::Technician  => self.attach_technician(person),
            CrewRole::Driver      => self.attach_driver(person),
            CrewRole::Gunner      => self.attach_gunner(person),
            CrewRole::VesselCrew  => self.attach_vessel_crew(person),
            CrewRole::TechOfficer => self.attach_tech_officer(person),
            CrewRole::Navigator   => self.attach_navigator(person),
        }
    }
}

impl PersonRegistry for HashMap<PersonId, PersonHandle> {
    fn lookup_person(&self, id: PersonId) -> Option<PersonHandle> {
        self.get(&id).cloned()
    }
}

impl PersonRegistry for BTreeMap<PersonId, PersonHandle> {
    fn lookup_person(&self, id: PersonId) -> Option<PersonHandle> {
        self.get(&id).cloned()
    }
}

impl ForceRegistry for HashMap<ForceId, Force> {
    fn lookup_force(&self, id: ForceId) -> Option<&Force> {
        self.get(&id)
    }
}

impl ForceRegistry for BTreeMap<ForceId, Force> {
    fn lookup_force(&self, id: ForceId) -> Option<&Force> {
        self.get(&id)
    }
}
