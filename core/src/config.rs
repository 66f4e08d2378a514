//! Tunables for mothballing and reactivation.
//!
//! The per-role restore eligibility table lives here and nowhere else.
//! Changing who may be put back on a reactivated unit is a data change,
//! not a code change.

use crate::{
    person::{Person, PersonStatus},
    snapshot::CrewRole,
    types::UnitId,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Eligibility rule for reattaching one person to one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePolicy {
    /// Person must have active status.
    #[serde(default)]
    pub require_active: bool,
    /// Person must not be assigned to any unit.
    #[serde(default)]
    pub require_unassigned: bool,
    /// Relaxes `require_unassigned` when the assignment is the target unit.
    #[serde(default)]
    pub allow_same_unit: bool,
}

impl RolePolicy {
    pub const UNCONDITIONAL: Self = Self {
        require_active:     false,
        require_unassigned: false,
        allow_same_unit:    false,
    };

    pub const ACTIVE_UNASSIGNED: Self = Self {
        require_active:     true,
        require_unassigned: true,
        allow_same_unit:    false,
    };

    pub const ACTIVE_UNASSIGNED_OR_SAME_UNIT: Self = Self {
        require_active:     true,
        require_unassigned: true,
        allow_same_unit:    true,
    };

    pub fn check(&self, person: &Person, target: UnitId) -> Result<(), Ineligible> {
        if self.require_active && !person.is_active() {
            return Err(Ineligible::Inactive { status: person.status });
        }
        match person.unit {
            Some(unit) if self.require_unassigned && !(self.allow_same_unit && unit == target) => {
                Err(Ineligible::AssignedElsewhere { unit_id: unit })
            }
            _ => Ok(()),
        }
    }

    pub fn permits(&self, person: &Person, target: UnitId) -> bool {
        self.check(person, target).is_ok()
    }
}

/// Why a person was not put back on a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Ineligible {
    Inactive { status: PersonStatus },
    AssignedElsewhere { unit_id: UnitId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestorePolicy {
    pub technician:   RolePolicy,
    pub driver:       RolePolicy,
    /// Single-person units list the same pilot as driver and gunner, so a
    /// gunner already on the target unit still counts as eligible.
    pub gunner:       RolePolicy,
    pub vessel_crew:  RolePolicy,
    pub tech_officer: RolePolicy,
    pub navigator:    RolePolicy,
}

impl Default for RestorePolicy {
    fn default() -> Self {
        Self {
            // Technicians are put back even if they now look after another unit.
            technician:   RolePolicy::UNCONDITIONAL,
            driver:       RolePolicy::ACTIVE_UNASSIGNED,
            gunner:       RolePolicy::ACTIVE_UNASSIGNED_OR_SAME_UNIT,
            vessel_crew:  RolePolicy::ACTIVE_UNASSIGNED,
            tech_officer: RolePolicy::ACTIVE_UNASSIGNED,
            navigator:    RolePolicy::ACTIVE_UNASSIGNED,
        }
    }
}

impl RestorePolicy {
    pub fn for_role(&self, role: CrewRole) -> &RolePolicy {
        match role {
            CrewRole::Technician  => &self.technician,
            CrewRole::Driver      => &self.driver,
            CrewRole::Gunner      => &self.gunner,
            CrewRole::VesselCrew  => &self.vessel_crew,
            CrewRole::TechOfficer => &self.tech_officer,
            CrewRole::Navigator   => &self.navigator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MothballConfig {
    pub restore_policy: RestorePolicy,
    /// Without GM override, a unit that does not crew itself needs a
    /// technician to be mothballed or reactivated.
    pub require_tech_for_activation: bool,
}

impl Default for MothballConfig {
    fn default() -> Self {
        Self {
            restore_policy: RestorePolicy::default(),
            require_tech_for_activation: true,
        }
    }
}

impl MothballConfig {
    /// Load from the data/ directory. A missing file means built-in defaults.
    /// In tests, use MothballConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/mothball/restore_policy.json");
        if !Path::new(&path).exists() {
            log::info!("No {path}; using default restore policy");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: MothballConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    pub fn default_test() -> Self {
        Self::default()
    }
}
