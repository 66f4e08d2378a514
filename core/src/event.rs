//! Audit trail for mothballing and reactivation.
//!
//! RULE: Every state transition and every non-fatal problem the subsystem
//! swallows (missing people, malformed saved entries, skipped crew, lost
//! forces) becomes an event. Nothing is dropped silently.

use crate::{
    config::Ineligible,
    snapshot::CrewRole,
    types::{CampaignId, ForceId, PersonId, UnitId},
};
use serde::{Deserialize, Serialize};

/// Variants are appended only, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MothballEvent {
    // ── Transitions ───────────────────────────────
    UnitMothballed {
        unit_id:     UnitId,
        references:  usize,
        force_id:    Option<ForceId>,
    },
    UnitActivated {
        unit_id:  UnitId,
        attached: usize,
        skipped:  usize,
    },

    // ── Load-time problems ────────────────────────
    MothballInfoMalformed {
        unit_id: UnitId,
        tag:     String,
        value:   String,
        reason:  String,
    },
    ReferenceMissing {
        unit_id:   UnitId,
        role:      CrewRole,
        person_id: PersonId,
    },

    // ── Restore outcomes ──────────────────────────
    ReattachmentSkipped {
        unit_id:   UnitId,
        role:      CrewRole,
        person_id: PersonId,
        why:       Ineligible,
    },
    ForceMissing {
        unit_id:  UnitId,
        force_id: ForceId,
    },
}

impl MothballEvent {
    pub fn unit_id(&self) -> UnitId {
        match self {
            Self::UnitMothballed { unit_id, .. }
            | Self::UnitActivated { unit_id, .. }
            | Self::MothballInfoMalformed { unit_id, .. }
            | Self::ReferenceMissing { unit_id, .. }
            | Self::ReattachmentSkipped { unit_id, .. }
            | Self::ForceMissing { unit_id, .. } => *unit_id,
        }
    }

    /// Stable name for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::UnitMothballed { .. }        => "unit_mothballed",
            Self::UnitActivated { .. }         => "unit_activated",
            Self::MothballInfoMalformed { .. } => "mothball_info_malformed",
            Self::ReferenceMissing { .. }      => "reference_missing",
            Self::ReattachmentSkipped { .. }   => "reattachment_skipped",
            Self::ForceMissing { .. }          => "force_missing",
        }
    }
}

/// A persisted row from the event_log table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:          Option<i64>,
    pub campaign_id: CampaignId,
    pub unit_id:     UnitId,
    pub event_type:  String,
    pub payload:     String, // JSON-serialized MothballEvent
}

impl EventLogEntry {
    pub fn decode(&self) -> serde_json::Result<MothballEvent> {
        serde_json::from_str(&self.payload)
    }
}
