//! Units and their crew roles.
//!
//! A unit is either Active (crewed, possibly in a force) or Mothballed, in
//! which case it holds exactly one snapshot of what it looked like before.

use crate::{
    force::Force,
    registry::CrewedUnit,
    snapshot::MothballSnapshot,
    types::{ForceId, PersonHandle, PersonId, UnitId},
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug)]
pub struct Unit {
    pub id:           UnitId,
    pub name:         String,
    /// Large craft crew themselves and need no technician to (de)activate.
    pub self_crewed:  bool,
    pub state:        MothballState,
    pub tech:         Option<PersonHandle>,
    pub drivers:      Vec<PersonHandle>,
    pub gunners:      Vec<PersonHandle>,
    pub vessel_crew:  Vec<PersonHandle>,
    pub tech_officer: Option<PersonHandle>,
    pub navigator:    Option<PersonHandle>,
    pub force_id:     Option<ForceId>,
    engineer:         Option<Engineer>,
}

#[derive(Debug, Default)]
pub enum MothballState {
    #[default]
    Active,
    Mothballed(MothballSnapshot),
}

/// Derived from crew composition. Stale until `reset_engineer()` runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Engineer {
    /// Small units: the assigned technician does the work.
    Tech { person_id: PersonId },
    /// Large craft: the vessel crew, led by the tech officer if there is one.
    VesselCrew { lead: PersonId, crew_size: usize },
}

impl Unit {
    pub fn new(id: UnitId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            self_crewed: false,
            state: MothballState::Active,
            tech: None,
            drivers: Vec::new(),
            gunners: Vec::new(),
            vessel_crew: Vec::new(),
            tech_officer: None,
            navigator: None,
            force_id: None,
            engineer: None,
        }
    }

    pub fn self_crewed(mut self) -> Self {
        self.self_crewed = true;
        self
    }

    pub fn is_mothballed(&self) -> bool {
        matches!(self.state, MothballState::Mothballed(_))
    }

    pub fn mothball_info(&self) -> Option<&MothballSnapshot> {
        match &self.state {
            MothballState::Mothballed(snapshot) => Some(snapshot),
            MothballState::Active => None,
        }
    }

    pub fn mothball_info_mut(&mut self) -> Option<&mut MothballSnapshot> {
        match &mut self.state {
            MothballState::Mothballed(snapshot) => Some(snapshot),
            MothballState::Active => None,
        }
    }

    /// Take the snapshot out, leaving the unit Active.
    pub fn take_mothball_info(&mut self) -> Option<MothballSnapshot> {
        match std::mem::take(&mut self.state) {
            MothballState::Mothballed(snapshot) => Some(snapshot),
            MothballState::Active => None,
        }
    }

    pub fn engineer(&self) -> Option<&Engineer> {
        self.engineer.as_ref()
    }

    /// Every person currently holding a crew role (technician excluded),
    /// in role order, without duplicates.
    pub fn crew(&self) -> Vec<PersonHandle> {
        let mut out: Vec<PersonHandle> = Vec::new();
        let roles = self
            .drivers
            .iter()
            .chain(&self.gunners)
            .chain(&self.vessel_crew)
            .chain(&self.tech_officer)
            .chain(&self.navigator);
        for person in roles {
            if !out.iter().any(|p| Rc::ptr_eq(p, person)) {
                out.push(Rc::clone(person));
            }
        }
        out
    }

    pub fn has_crew(&self) -> bool {
        !self.crew().is_empty()
    }

    /// Detach every person and the force. Back-references that still point
    /// at this unit are cleared; people reassigned elsewhere are left alone.
    pub fn strip_assignments(&mut self) {
        let mut everyone = self.crew();
        everyone.extend(self.tech.take());
        for person in everyone {
            let mut p = person.borrow_mut();
            if p.unit == Some(self.id) {
                p.unit = None;
            }
        }
        self.drivers.clear();
        self.gunners.clear();
        self.vessel_crew.clear();
        self.tech_officer = None;
        self.navigator = None;
        self.force_id = None;
        self.engineer = None;
    }

    /// Remove `person` from every role on this unit. The back-reference is
    /// left to the caller.
    pub fn release(&mut self, person: &PersonHandle) {
        let is_person = |p: &PersonHandle| Rc::ptr_eq(p, person);
        self.drivers.retain(|p| !is_person(p));
        self.gunners.retain(|p| !is_person(p));
        self.vessel_crew.retain(|p| !is_person(p));
        for slot in [&mut self.tech, &mut self.tech_officer, &mut self.navigator] {
            if slot.as_ref().is_some_and(is_person) {
                *slot = None;
            }
        }
    }

    fn claim(&self, person: &PersonHandle) {
        person.borrow_mut().unit = Some(self.id);
    }
}

fn push_unique(list: &mut Vec<PersonHandle>, person: PersonHandle) {
    if !list.iter().any(|p| Rc::ptr_eq(p, &person)) {
        list.push(person);
    }
}

impl CrewedUnit for Unit {
    fn unit_id(&self) -> UnitId {
        self.id
    }

    fn attach_technician(&mut self, person: PersonHandle) {
        if let Some(previous) = self.tech.take() {
            if !Rc::ptr_eq(&previous, &person) {
                let mut prev = previous.borrow_mut();
                if prev.unit == Some(self.id) {
                    prev.unit = None;
                }
            }
        }
        self.claim(&person);
        self.tech = Some(person);
    }

    fn attach_driver(&mut self, person: PersonHandle) {
        self.claim(&person);
        push_unique(&mut self.drivers, person);
    }

    fn attach_gunner(&mut self, person: PersonHandle) {
        self.claim(&person);
        push_unique(&mut self.gunners, person);
    }

    fn attach_vessel_crew(&mut self, person: PersonHandle) {
        self.claim(&person);
        push_unique(&mut self.vessel_crew, person);
    }

    fn attach_tech_officer(&mut self, person: PersonHandle) {
        self.claim(&person);
        self.tech_officer = Some(person);
    }

    fn attach_navigator(&mut self, person: PersonHandle) {
        self.claim(&person);
        self.navigator = Some(person);
    }

    fn attach_to_force(&mut self, force: &Force) {
        self.force_id = Some(force.id);
    }

    fn reset_engineer(&mut self) {
        let active_crew: Vec<&PersonHandle> = self
            .vessel_crew
            .iter()
            .filter(|p| p.borrow().is_active())
            .collect();

        self.engineer = if let Some(first) = active_crew.first() {
            let lead = self
                .tech_officer
                .as_ref()
                .map(|p| p.borrow().id)
                .unwrap_or_else(|| first.borrow().id);
            Some(Engineer::VesselCrew { lead, crew_size: active_crew.len() })
        } else {
            self.tech
                .as_ref()
                .map(|p| Engineer::Tech { person_id: p.borrow().id })
        };
    }
}
