//! Reference fix-up pass for decoded snapshots.
//!
//! RULE: Run once per load, after every person for that load is in the
//! registry. Resolving against a half-loaded registry is a caller bug and
//! will report people as missing who simply have not been read yet.

use crate::{
    reference::PersonRef,
    registry::PersonRegistry,
    snapshot::{CrewRole, MothballSnapshot},
    types::PersonId,
};
use serde::{Deserialize, Serialize};

/// A snapshot slot whose person could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingReference {
    pub role:      CrewRole,
    pub person_id: PersonId,
}

/// Replace every placeholder with the live person from `registry`.
///
/// Missing single slots become `None`; missing list entries are dropped and
/// the survivors keep their order. Already-resolved slots are left exactly
/// as they are. Only the snapshot itself is modified.
pub fn resolve<R>(snapshot: &mut MothballSnapshot, registry: &R) -> Vec<MissingReference>
where
    R: PersonRegistry + ?Sized,
{
    let mut missing = Vec::new();

    resolve_single(&mut snapshot.tech, CrewRole::Technician, registry, &mut missing);
    resolve_list(&mut snapshot.drivers, CrewRole::Driver, registry, &mut missing);
    resolve_list(&mut snapshot.gunners, CrewRole::Gunner, registry, &mut missing);
    resolve_list(&mut snapshot.vessel_crew, CrewRole::VesselCrew, registry, &mut missing);
    resolve_single(&mut snapshot.tech_officer, CrewRole::TechOfficer, registry, &mut missing);
    resolve_single(&mut snapshot.navigator, CrewRole::Navigator, registry, &mut missing);

    missing
}

fn resolve_one<R>(
    r: PersonRef,
    role: CrewRole,
    registry: &R,
    missing: &mut Vec<MissingReference>,
) -> Option<PersonRef>
where
    R: PersonRegistry + ?Sized,
{
    match r.resolve_with(|id| registry.lookup_person(id)) {
        Ok(resolved) => Some(resolved),
        Err(person_id) => {
            log::error!("Mothball info references missing {role} {person_id}");
            missing.push(MissingReference { role, person_id });
            None
        }
    }
}

fn resolve_single<R>(
    slot: &mut Option<PersonRef>,
    role: CrewRole,
    registry: &R,
    missing: &mut Vec<MissingReference>,
) where
    R: PersonRegistry + ?Sized,
{
    *slot = slot
        .take()
        .and_then(|r| resolve_one(r, role, registry, missing));
}

fn resolve_list<R>(
    list: &mut Vec<PersonRef>,
    role: CrewRole,
    registry: &R,
    missing: &mut Vec<MissingReference>,
) where
    R: PersonRegistry + ?Sized,
{
    *list = std::mem::take(list)
        .into_iter()
        .filter_map(|r| resolve_one(r, role, registry, missing))
        .collect();
}
