//! Flat, identifier-only form of a mothball snapshot.
//!
//! A snapshot is written as an ordered list of (tag, value) entries.
//! Empty slots are omitted. Reading is lenient: tags are matched
//! case-insensitively, unknown tags are ignored, and a malformed value
//! drops only its own entry.

use crate::{
    force::normalize_force_id,
    reference::{PersonRef, Reference},
    snapshot::{CrewRole, MothballSnapshot},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TAG_TECH:         &str = "tech";
pub const TAG_FORCE:        &str = "forceID";
pub const TAG_DRIVER:       &str = "driver";
pub const TAG_GUNNER:       &str = "gunner";
pub const TAG_VESSEL_CREW:  &str = "vesselCrew";
pub const TAG_TECH_OFFICER: &str = "techOfficer";
pub const TAG_NAVIGATOR:    &str = "navigator";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub tag:   String,
    pub value: String,
}

impl SnapshotEntry {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self { tag: tag.into(), value: value.into() }
    }
}

/// An entry that was skipped while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeDiagnostic {
    pub tag:    String,
    pub value:  String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct DecodeOutcome {
    pub snapshot:    MothballSnapshot,
    pub diagnostics: Vec<DecodeDiagnostic>,
}

pub fn role_tag(role: CrewRole) -> &'static str {
    match role {
        CrewRole::Technician  => TAG_TECH,
        CrewRole::Driver      => TAG_DRIVER,
        CrewRole::Gunner      => TAG_GUNNER,
        CrewRole::VesselCrew  => TAG_VESSEL_CREW,
        CrewRole::TechOfficer => TAG_TECH_OFFICER,
        CrewRole::Navigator   => TAG_NAVIGATOR,
    }
}

enum Slot {
    Role(CrewRole),
    Force,
}

/// Map a tag onto its slot. Older saves suffix person tags with `Id`.
fn slot_for_tag(tag: &str) -> Option<Slot> {
    let tag = tag.trim().to_ascii_lowercase();
    let base = tag.strip_suffix("id").unwrap_or(&tag);
    let slot = match base {
        "tech"        => Slot::Role(CrewRole::Technician),
        "force"       => Slot::Force,
        "driver"      => Slot::Role(CrewRole::Driver),
        "gunner"      => Slot::Role(CrewRole::Gunner),
        "vesselcrew"  => Slot::Role(CrewRole::VesselCrew),
        "techofficer" => Slot::Role(CrewRole::TechOfficer),
        "navigator"   => Slot::Role(CrewRole::Navigator),
        _ => return None,
    };
    Some(slot)
}

/// The crew role a tag names, if any. `forceID` is not a role.
pub fn role_for_tag(tag: &str) -> Option<CrewRole> {
    match slot_for_tag(tag)? {
        Slot::Role(role) => Some(role),
        Slot::Force => None,
    }
}

pub fn encode(snapshot: &MothballSnapshot) -> Vec<SnapshotEntry> {
    let mut entries = Vec::new();

    if let Some(r) = &snapshot.tech {
        entries.push(person_entry(CrewRole::Technician, r));
    }
    if let Some(force_id) = snapshot.force_id.and_then(normalize_force_id) {
        entries.push(SnapshotEntry::new(TAG_FORCE, force_id.to_string()));
    }
    for (role, list) in [
        (CrewRole::Driver, &snapshot.drivers),
        (CrewRole::Gunner, &snapshot.gunners),
        (CrewRole::VesselCrew, &snapshot.vessel_crew),
    ] {
        entries.extend(list.iter().map(|r| person_entry(role, r)));
    }
    if let Some(r) = &snapshot.tech_officer {
        entries.push(person_entry(CrewRole::TechOfficer, r));
    }
    if let Some(r) = &snapshot.navigator {
        entries.push(person_entry(CrewRole::Navigator, r));
    }
    entries
}

fn person_entry(role: CrewRole, r: &PersonRef) -> SnapshotEntry {
    SnapshotEntry::new(role_tag(role), r.person_id().to_string())
}

pub fn decode(entries: &[SnapshotEntry]) -> DecodeOutcome {
    let mut out = DecodeOutcome::default();

    for entry in entries {
        let Some(slot) = slot_for_tag(&entry.tag) else {
            log::debug!("mothball info: ignoring unknown tag '{}'", entry.tag);
            continue;
        };
        let value = entry.value.trim();

        match slot {
            Slot::Force => match value.parse::<i32>() {
                Ok(raw) => out.snapshot.force_id = normalize_force_id(raw),
                Err(e) => skip(&mut out, entry, e.to_string()),
            },
            Slot::Role(role) => match Uuid::parse_str(value) {
                Ok(id) => assign(&mut out.snapshot, role, Reference::Unresolved(id)),
                Err(e) => skip(&mut out, entry, e.to_string()),
            },
        }
    }
    out
}

fn assign(snapshot: &mut MothballSnapshot, role: CrewRole, r: PersonRef) {
    match role {
        CrewRole::Technician  => snapshot.tech = Some(r),
        CrewRole::Driver      => snapshot.drivers.push(r),
        CrewRole::Gunner      => snapshot.gunners.push(r),
        CrewRole::VesselCrew  => snapshot.vessel_crew.push(r),
        CrewRole::TechOfficer => snapshot.tech_officer = Some(r),
        CrewRole::Navigator   => snapshot.navigator = Some(r),
    }
}

fn skip(out: &mut DecodeOutcome, entry: &SnapshotEntry, reason: String) {
    log::warn!(
        "mothball info: skipping malformed {} value '{}': {reason}",
        entry.tag, entry.value
    );
    out.diagnostics.push(DecodeDiagnostic {
        tag:    entry.tag.clone(),
        value:  entry.value.clone(),
        reason,
    });
}
