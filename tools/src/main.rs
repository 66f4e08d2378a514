//! mothball-runner: headless driver for the mothball subsystem.
//!
//! Usage:
//!   mothball-runner demo     --db campaign.db
//!   mothball-runner list     --db campaign.db
//!   mothball-runner mothball <unit-id> --tech <person-id> --db campaign.db
//!   mothball-runner activate <unit-id> --gm --db campaign.db
//!
//! Common flags: --campaign <id> (default "demo"), --data-dir <dir>.

use anyhow::{bail, Context, Result};
use mothball_core::{
    campaign::Roster,
    command::UnitCommand,
    config::MothballConfig,
    force::Force,
    person::{Person, PersonStatus},
    snapshot::CrewRole,
    store::{CampaignStore, LoadReport},
    types::{PersonId, UnitId},
    unit::Unit,
};
use std::env;
use uuid::Uuid;

#[derive(serde::Serialize)]
struct UnitSummary {
    unit_id:    UnitId,
    name:       String,
    mothballed: bool,
    force_id:   Option<i32>,
    crew:       usize,
    /// People the stored snapshot still points at.
    snapshot:   Option<Vec<(CrewRole, PersonId)>>,
}

#[derive(serde::Serialize)]
struct LoadSummary {
    malformed_entries:  usize,
    missing_references: usize,
}

impl From<&LoadReport> for LoadSummary {
    fn from(report: &LoadReport) -> Self {
        Self {
            malformed_entries:  report.decode_diagnostics.len(),
            missing_references: report.missing.len(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or("mothball.db");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let campaign = flag_value(&args, "--campaign").unwrap_or("demo");
    let is_gm = args.iter().any(|a| a == "--gm");
    let tech = flag_value(&args, "--tech")
        .map(Uuid::parse_str)
        .transpose()
        .context("--tech expects a person id")?;

    let config = MothballConfig::load(data_dir)?;
    let store = CampaignStore::open(db)?;
    store.migrate()?;

    match args.get(1).map(String::as_str) {
        Some("demo") => run_demo(&store, campaign, config),
        Some("list") => {
            let (roster, report) = store.load_roster(campaign, config)?;
            print_units(&roster, &report)
        }
        Some("mothball") => {
            let unit_id = unit_arg(&args)?;
            run_command(&store, campaign, config, UnitCommand::Mothball { unit_id, tech_id: tech, is_gm })
        }
        Some("activate") => {
            let unit_id = unit_arg(&args)?;
            run_command(&store, campaign, config, UnitCommand::Activate { unit_id, tech_id: tech, is_gm })
        }
        other => bail!(
            "unknown subcommand {:?}; expected demo, list, mothball or activate",
            other.unwrap_or("")
        ),
    }
}

fn run_command(
    store: &CampaignStore,
    campaign: &str,
    config: MothballConfig,
    cmd: UnitCommand,
) -> Result<()> {
    let (mut roster, report) = store.load_roster(campaign, config)?;
    if !report.is_clean() {
        log::warn!(
            "Campaign {campaign} loaded with {} malformed entries and {} missing references",
            report.decode_diagnostics.len(),
            report.missing.len()
        );
    }

    let outcome = cmd.execute(&mut roster)?;
    store.save_roster(&roster)?;
    store.flush_events(&mut roster)?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Seed a small campaign, mothball its mech, then reload and reactivate it
/// so every stage of the round trip runs against the database.
fn run_demo(store: &CampaignStore, campaign: &str, config: MothballConfig) -> Result<()> {
    let mut roster = Roster::new(campaign.to_string(), config.clone());
    let (mech, dropship) = seed_demo(&mut roster)?;
    store.save_roster(&roster)?;
    store.flush_events(&mut roster)?;

    roster.mothball_unit(mech)?;
    roster.mothball_unit(dropship)?;
    // The gunner moves on while the mech sits in storage.
    roster.assign(Uuid::from_u128(0xA3), CrewRole::Gunner, Uuid::from_u128(2))?;
    store.save_roster(&roster)?;
    store.flush_events(&mut roster)?;

    let (mut loaded, report) = store.load_roster(campaign, config)?;
    let mech_report = loaded.activate_unit(mech)?;
    let dropship_report = loaded.activate_unit(dropship)?;
    store.save_roster(&loaded)?;
    store.flush_events(&mut loaded)?;

    let summary = serde_json::json!({
        "campaign": campaign,
        "load": LoadSummary::from(&report),
        "activated": {
            mech.to_string(): mech_report,
            dropship.to_string(): dropship_report,
        },
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn seed_demo(roster: &mut Roster) -> Result<(UnitId, UnitId)> {
    let person = |n: u128| Uuid::from_u128(n);
    roster.add_force(Force::new(1, "Command Lance"));
    roster.add_force(Force::new(2, "Transport Wing").with_parent(1));

    for (n, name) in [
        (1, "Jaime Wolf"),
        (2, "Natasha Kerensky"),
        (3, "Percival Hennessy"),
        (4, "Lin Tao"),
        (5, "Brenda Oyelaran"),
        (6, "Dmitri Sorokin"),
    ] {
        roster.add_person(Person::new(person(n), name));
    }
    roster.add_person(Person::new(person(7), "Ana Castillo").with_status(PersonStatus::OnLeave));

    let mech = Uuid::from_u128(0xA1);
    let dropship = Uuid::from_u128(0xA2);
    let spare = Uuid::from_u128(0xA3);
    roster.add_unit(Unit::new(mech, "Archer ARC-2R"));
    roster.add_unit(Unit::new(dropship, "Leopard").self_crewed());
    roster.add_unit(Unit::new(spare, "Wasp WSP-1A"));

    roster.assign(mech, CrewRole::Driver, person(1))?;
    roster.assign(mech, CrewRole::Gunner, person(1))?;
    roster.assign(mech, CrewRole::Gunner, person(2))?;
    roster.assign(mech, CrewRole::Technician, person(3))?;
    roster.assign_force(mech, 1)?;

    roster.assign(dropship, CrewRole::VesselCrew, person(4))?;
    roster.assign(dropship, CrewRole::VesselCrew, person(7))?;
    roster.assign(dropship, CrewRole::TechOfficer, person(5))?;
    roster.assign(dropship, CrewRole::Navigator, person(6))?;
    roster.assign_force(dropship, 2)?;

    Ok((mech, dropship))
}

fn print_units(roster: &Roster, report: &LoadReport) -> Result<()> {
    let units: Vec<UnitSummary> = roster
        .units()
        .map(|u| UnitSummary {
            unit_id:    u.id,
            name:       u.name.clone(),
            mothballed: u.is_mothballed(),
            force_id:   u.force_id,
            crew:       u.crew().len() + usize::from(u.tech.is_some()),
            snapshot:   u.mothball_info().map(|s| s.person_ids()),
        })
        .collect();
    let out = serde_json::json!({
        "campaign": roster.campaign_id,
        "load": LoadSummary::from(report),
        "units": units,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn unit_arg(args: &[String]) -> Result<UnitId> {
    let raw = args.get(2).context("missing unit id")?;
    Uuid::parse_str(raw).with_context(|| format!("'{raw}' is not a unit id"))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
