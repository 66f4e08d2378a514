use serde::{Deserialize, Serialize};

use crate::{
    actions::{ActivateUnitAction, MothballUnitAction},
    campaign::Roster,
    error::MothballResult,
    restore::RestoreReport,
    types::{PersonId, UnitId},
};

/// Unit commands accepted from the runner.
/// Variants are appended over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum UnitCommand {
    Mothball {
        unit_id: UnitId,
        #[serde(default)]
        tech_id: Option<PersonId>,
        #[serde(default)]
        is_gm:   bool,
    },
    Activate {
        unit_id: UnitId,
        #[serde(default)]
        tech_id: Option<PersonId>,
        #[serde(default)]
        is_gm:   bool,
    },
}

/// What a command did, for the runner's JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Mothballed { unit_id: UnitId },
    Activated { unit_id: UnitId, report: RestoreReport },
    NoTechnician { unit_id: UnitId },
}

impl UnitCommand {
    pub fn execute(&self, roster: &mut Roster) -> MothballResult<CommandOutcome> {
        match *self {
            Self::Mothball { unit_id, tech_id, is_gm } => {
                let done = MothballUnitAction::new(tech_id, is_gm).execute(roster, unit_id)?;
                Ok(if done {
                    CommandOutcome::Mothballed { unit_id }
                } else {
                    CommandOutcome::NoTechnician { unit_id }
                })
            }
            Self::Activate { unit_id, tech_id, is_gm } => {
                let report = ActivateUnitAction::new(tech_id, is_gm).execute(roster, unit_id)?;
                Ok(match report {
                    Some(report) => CommandOutcome::Activated { unit_id, report },
                    None => CommandOutcome::NoTechnician { unit_id },
                })
            }
        }
    }
}
