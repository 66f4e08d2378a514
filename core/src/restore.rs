//! Restore engine: put a resolved snapshot back onto its unit.
//!
//! Best effort by contract. Each person is checked against the policy for
//! their role on their own; anyone who fails is skipped and the rest carry
//! on. A vanished force leaves the unit unassigned. Only a precondition
//! violation (a snapshot that was never resolved) is an error.

use crate::{
    config::{Ineligible, RestorePolicy},
    error::{MothballError, MothballResult},
    reference::PersonRef,
    registry::{CrewedUnit, ForceRegistry},
    snapshot::{CrewRole, MothballSnapshot},
    types::{ForceId, PersonId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedReattachment {
    pub role:      CrewRole,
    pub person_id: PersonId,
    #[serde(flatten)]
    pub why:       Ineligible,
}

/// What a restore actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReport {
    /// People put back, in the order they were attached.
    pub attached:      Vec<(CrewRole, PersonId)>,
    pub skipped:       Vec<SkippedReattachment>,
    pub force_id:      Option<ForceId>,
    /// Set when the snapshot named a force that no longer exists.
    pub missing_force: Option<ForceId>,
}

impl RestoreReport {
    pub fn attached_in(&self, role: CrewRole) -> usize {
        self.attached.iter().filter(|(r, _)| *r == role).count()
    }
}

/// Consume `snapshot` and reapply it to `unit`.
///
/// Sequence roles are processed in capture order. The unit's `attach_*`
/// calls set each person's back-reference. The derived engineer is
/// recomputed last.
pub fn restore<U, F>(
    snapshot: MothballSnapshot,
    unit: &mut U,
    forces: &F,
    policy: &RestorePolicy,
) -> MothballResult<RestoreReport>
where
    U: CrewedUnit + ?Sized,
    F: ForceRegistry + ?Sized,
{
    let target = unit.unit_id();
    if !snapshot.is_fully_resolved() {
        return Err(MothballError::UnresolvedSnapshot { unit_id: target });
    }

    let MothballSnapshot {
        tech,
        force_id,
        drivers,
        gunners,
        vessel_crew,
        tech_officer,
        navigator,
    } = snapshot;

    let tagged = |role: CrewRole| move |r: PersonRef| (role, r);
    let in_order = tech
        .into_iter()
        .map(tagged(CrewRole::Technician))
        .chain(drivers.into_iter().map(tagged(CrewRole::Driver)))
        .chain(gunners.into_iter().map(tagged(CrewRole::Gunner)))
        .chain(vessel_crew.into_iter().map(tagged(CrewRole::VesselCrew)))
        .chain(tech_officer.into_iter().map(tagged(CrewRole::TechOfficer)))
        .chain(navigator.into_iter().map(tagged(CrewRole::Navigator)));

    let mut report = RestoreReport::default();

    for (role, reference) in in_order {
        let Some(person) = reference.into_resolved() else {
            continue;
        };
        let p = person.borrow();
        let person_id = p.id;
        let verdict = policy.for_role(role).check(&p, target);
        drop(p);

        match verdict {
            Ok(()) => {
                unit.attach(role, person);
                report.attached.push((role, person_id));
            }
            Err(why) => {
                log::info!("Not restoring {role} {person_id} to unit {target}: {why:?}");
                report.skipped.push(SkippedReattachment { role, person_id, why });
            }
        }
    }

    if let Some(id) = force_id {
        match forces.lookup_force(id) {
            Some(force) => {
                unit.attach_to_force(force);
                report.force_id = Some(id);
            }
            None => {
                log::info!("Force {id} no longer exists; unit {target} restored without a force");
                report.missing_force = Some(id);
            }
        }
    }

    unit.reset_engineer();
    Ok(report)
}
