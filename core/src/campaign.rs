//! The campaign roster: owner of every person, unit and force.
//!
//! The roster is the live entity graph. It implements both registries the
//! resolver and restore engine read from, and it drives the unit state
//! machine: Active --mothball--> Mothballed(snapshot) --activate--> Active.

use crate::{
    config::MothballConfig,
    error::{MothballError, MothballResult},
    event::MothballEvent,
    force::Force,
    person::Person,
    registry::{CrewedUnit, ForceRegistry, PersonRegistry},
    resolver::{resolve, MissingReference},
    restore::{restore, RestoreReport},
    snapshot::{CrewRole, MothballSnapshot},
    types::{CampaignId, ForceId, PersonHandle, PersonId, UnitId},
    unit::{MothballState, Unit},
};
use std::{collections::BTreeMap, rc::Rc};

pub struct Roster {
    pub campaign_id: CampaignId,
    config:          MothballConfig,
    people:          BTreeMap<PersonId, PersonHandle>,
    units:           BTreeMap<UnitId, Unit>,
    forces:          BTreeMap<ForceId, Force>,
    pending_events:  Vec<MothballEvent>,
}

impl Roster {
    pub fn new(campaign_id: CampaignId, config: MothballConfig) -> Self {
        Self {
            campaign_id,
            config,
            people: BTreeMap::new(),
            units: BTreeMap::new(),
            forces: BTreeMap::new(),
            pending_events: Vec::new(),
        }
    }

    pub fn config(&self) -> &MothballConfig {
        &self.config
    }

    // ── People ─────────────────────────────────────────────────

    pub fn add_person(&mut self, person: Person) -> PersonHandle {
        let handle = person.into_handle();
        let id = handle.borrow().id;
        self.people.insert(id, Rc::clone(&handle));
        handle
    }

    /// Remove a person from the campaign and from any active crew roles.
    /// Snapshots of mothballed units are not touched; a later save/load
    /// cycle reports the person as missing.
    pub fn remove_person(&mut self, id: PersonId) -> Option<PersonHandle> {
        let handle = self.people.remove(&id)?;
        for unit in self.units.values_mut() {
            unit.release(&handle);
        }
        handle.borrow_mut().unit = None;
        Some(handle)
    }

    pub fn people(&self) -> impl Iterator<Item = &PersonHandle> {
        self.people.values()
    }

    // ── Forces ─────────────────────────────────────────────────

    pub fn add_force(&mut self, force: Force) {
        self.forces.insert(force.id, force);
    }

    /// Units pointing at the removed force are left pointing at it; the
    /// restore engine treats the dangling id as "no force".
    pub fn remove_force(&mut self, id: ForceId) -> Option<Force> {
        self.forces.remove(&id)
    }

    pub fn forces(&self) -> impl Iterator<Item = &Force> {
        self.forces.values()
    }

    pub fn units_in_force(&self, id: ForceId) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.force_id == Some(id))
            .map(|u| u.id)
            .collect()
    }

    // ── Units ──────────────────────────────────────────────────

    pub fn add_unit(&mut self, unit: Unit) {
        self.units.insert(unit.id, unit);
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Put a person into a role on an active unit. Someone crewing a
    /// different unit is taken off it first; extra roles on the same unit
    /// are kept.
    pub fn assign(&mut self, unit_id: UnitId, role: CrewRole, person_id: PersonId) -> MothballResult<()> {
        let person = self
            .people
            .get(&person_id)
            .cloned()
            .ok_or(MothballError::PersonNotFound { person_id })?;
        match self.units.get(&unit_id) {
            None => return Err(MothballError::UnitNotFound { unit_id }),
            Some(unit) if unit.is_mothballed() => {
                return Err(MothballError::AlreadyMothballed { unit_id });
            }
            Some(_) => {}
        }

        let previous = person.borrow().unit;
        if let Some(other) = previous.filter(|other| *other != unit_id) {
            if let Some(old) = self.units.get_mut(&other) {
                old.release(&person);
                old.reset_engineer();
                log::debug!("{role} {person_id} moved from unit {other} to {unit_id}");
            }
        }

        let unit = self
            .units
            .get_mut(&unit_id)
            .ok_or(MothballError::UnitNotFound { unit_id })?;
        unit.attach(role, person);
        unit.reset_engineer();
        Ok(())
    }

    /// Mothballed units have no force until they are activated again.
    pub fn assign_force(&mut self, unit_id: UnitId, force_id: ForceId) -> MothballResult<()> {
        let force = self.forces.get(&force_id).ok_or_else(|| {
            MothballError::Other(anyhow::anyhow!("Force {force_id} not found"))
        })?;
        let unit = self
            .units
            .get_mut(&unit_id)
            .ok_or(MothballError::UnitNotFound { unit_id })?;
        if unit.is_mothballed() {
            return Err(MothballError::AlreadyMothballed { unit_id });
        }
        unit.attach_to_force(force);
        Ok(())
    }

    // ── State machine ──────────────────────────────────────────

    /// Active → Mothballed. Captures the snapshot, then detaches every
    /// person and the force from the unit.
    pub fn mothball_unit(&mut self, unit_id: UnitId) -> MothballResult<()> {
        let unit = self
            .units
            .get_mut(&unit_id)
            .ok_or(MothballError::UnitNotFound { unit_id })?;
        if unit.is_mothballed() {
            return Err(MothballError::AlreadyMothballed { unit_id });
        }

        let snapshot = MothballSnapshot::capture(unit);
        unit.strip_assignments();

        let references = snapshot.references().count();
        let force_id = snapshot.force_id;
        unit.state = MothballState::Mothballed(snapshot);

        log::info!("Unit {} ({unit_id}) mothballed with {references} crew references", unit.name);
        self.pending_events.push(MothballEvent::UnitMothballed {
            unit_id,
            references,
            force_id,
        });
        Ok(())
    }

    /// Mothballed → Active. Consumes the snapshot through the restore engine.
    pub fn activate_unit(&mut self, unit_id: UnitId) -> MothballResult<RestoreReport> {
        let unit = self
            .units
            .get_mut(&unit_id)
            .ok_or(MothballError::UnitNotFound { unit_id })?;
        match unit.mothball_info() {
            None => return Err(MothballError::NotMothballed { unit_id }),
            Some(snapshot) if !snapshot.is_fully_resolved() => {
                return Err(MothballError::UnresolvedSnapshot { unit_id });
            }
            Some(_) => {}
        }
        let snapshot = unit
            .take_mothball_info()
            .ok_or(MothballError::NotMothballed { unit_id })?;

        let report = restore(snapshot, unit, &self.forces, &self.config.restore_policy)?;

        for skipped in &report.skipped {
            self.pending_events.push(MothballEvent::ReattachmentSkipped {
                unit_id,
                role:      skipped.role,
                person_id: skipped.person_id,
                why:       skipped.why,
            });
        }
        if let Some(force_id) = report.missing_force {
            self.pending_events.push(MothballEvent::ForceMissing { unit_id, force_id });
        }
        self.pending_events.push(MothballEvent::UnitActivated {
            unit_id,
            attached: report.attached.len(),
            skipped:  report.skipped.len(),
        });
        log::info!(
            "Unit {unit_id} activated: {} restored, {} skipped",
            report.attached.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    // ── Load-time fix-up ───────────────────────────────────────

    /// The single resolution pass over every mothballed unit.
    ///
    /// Call exactly once per load, after every person has been added.
    /// Calling it again is harmless: resolved slots are not looked up twice.
    pub fn resolve_mothball_references(&mut self) -> Vec<(UnitId, MissingReference)> {
        let mut all = Vec::new();
        for unit in self.units.values_mut() {
            let unit_id = unit.id;
            let Some(snapshot) = unit.mothball_info_mut() else {
                continue;
            };
            for missing in resolve(snapshot, &self.people) {
                self.pending_events.push(MothballEvent::ReferenceMissing {
                    unit_id,
                    role:      missing.role,
                    person_id: missing.person_id,
                });
                all.push((unit_id, missing));
            }
        }
        if !all.is_empty() {
            log::warn!("{} mothball references could not be resolved", all.len());
        }
        all
    }

    // ── Events ─────────────────────────────────────────────────

    pub fn record(&mut self, event: MothballEvent) {
        self.pending_events.push(event);
    }

    pub fn pending_events(&self) -> &[MothballEvent] {
        &self.pending_events
    }

    pub fn drain_events(&mut self) -> Vec<MothballEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

impl PersonRegistry for Roster {
    fn lookup_person(&self, id: PersonId) -> Option<PersonHandle> {
        self.people.lookup_person(id)
    }
}

impl ForceRegistry for Roster {
    fn lookup_force(&self, id: ForceId) -> Option<&Force> {
        self.forces.get(&id)
    }
}
