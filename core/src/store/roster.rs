use super::{mothball::write_mothball_entries, CampaignStore};
use crate::{
    campaign::Roster,
    codec::{decode, encode, role_for_tag, role_tag, DecodeDiagnostic},
    config::MothballConfig,
    error::{MothballError, MothballResult},
    event::MothballEvent,
    force::Force,
    person::{Person, PersonStatus},
    registry::{CrewedUnit, PersonRegistry},
    resolver::MissingReference,
    snapshot::CrewRole,
    types::{PersonHandle, UnitId},
    unit::{MothballState, Unit},
};
use rusqlite::params;
use std::rc::Rc;
use uuid::Uuid;

/// Everything the load swallowed instead of failing.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub decode_diagnostics: Vec<(UnitId, DecodeDiagnostic)>,
    pub missing:            Vec<(UnitId, MissingReference)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.decode_diagnostics.is_empty() && self.missing.is_empty()
    }
}

struct UnitRow {
    unit_id:     String,
    name:        String,
    self_crewed: bool,
    mothballed:  bool,
    force_id:    Option<i32>,
}

impl CampaignStore {
    // ── Save ──────────────────────────────────────────────────────

    /// Rewrite every row of the roster's campaign in one transaction.
    /// Mothballed units are written as flat snapshot entries; active units
    /// as their live crew rows.
    pub fn save_roster(&self, roster: &Roster) -> MothballResult<()> {
        let cid = roster.campaign_id.as_str();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO campaign (campaign_id, version) VALUES (?1, ?2)",
            params![cid, env!("CARGO_PKG_VERSION")],
        )?;
        for table in ["mothball_entry", "unit_crew", "unit", "forces", "person"] {
            tx.execute(&format!("DELETE FROM {table} WHERE campaign_id = ?1"), params![cid])?;
        }

        for person in roster.people() {
            let p = person.borrow();
            tx.execute(
                "INSERT INTO person (campaign_id, person_id, name, status, unit_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    cid,
                    p.id.to_string(),
                    p.name,
                    p.status.as_str(),
                    p.unit.map(|u| u.to_string()),
                ],
            )?;
        }

        for force in roster.forces() {
            tx.execute(
                "INSERT INTO forces (campaign_id, force_id, name, parent_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![cid, force.id, force.name, force.parent],
            )?;
        }

        for unit in roster.units() {
            tx.execute(
                "INSERT INTO unit (campaign_id, unit_id, name, self_crewed, mothballed, force_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    cid,
                    unit.id.to_string(),
                    unit.name,
                    unit.self_crewed as i32,
                    unit.is_mothballed() as i32,
                    unit.force_id,
                ],
            )?;

            if let Some(snapshot) = unit.mothball_info() {
                write_mothball_entries(&tx, cid, unit.id, &encode(snapshot))?;
                continue;
            }

            let crew = unit
                .tech
                .iter()
                .map(|p| (CrewRole::Technician, p))
                .chain(unit.drivers.iter().map(|p| (CrewRole::Driver, p)))
                .chain(unit.gunners.iter().map(|p| (CrewRole::Gunner, p)))
                .chain(unit.vessel_crew.iter().map(|p| (CrewRole::VesselCrew, p)))
                .chain(unit.tech_officer.iter().map(|p| (CrewRole::TechOfficer, p)))
                .chain(unit.navigator.iter().map(|p| (CrewRole::Navigator, p)));
            for (ordinal, (role, person)) in crew.enumerate() {
                tx.execute(
                    "INSERT INTO unit_crew (campaign_id, unit_id, ordinal, role, person_id)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        cid,
                        unit.id.to_string(),
                        ordinal as i64,
                        role_tag(role),
                        person.borrow().id.to_string(),
                    ],
                )?;
            }
        }

        tx.commit()?;
        log::debug!("Campaign {cid} saved");
        Ok(())
    }

    /// Drain the roster's pending events into the event log.
    pub fn flush_events(&self, roster: &mut Roster) -> MothballResult<()> {
        self.insert_campaign(&roster.campaign_id, env!("CARGO_PKG_VERSION"))?;
        let events = roster.drain_events();
        self.append_events(&roster.campaign_id, &events)
    }

    // ── Load ──────────────────────────────────────────────────────

    /// Two-phase load.
    ///
    /// Phase 1 reads people, forces and units. Mothball entries are decoded
    /// into placeholders without consulting anyone. Phase 2 runs the single
    /// resolution pass once every person is in the roster.
    pub fn load_roster(
        &self,
        campaign_id: &str,
        config: MothballConfig,
    ) -> MothballResult<(Roster, LoadReport)> {
        let mut roster = Roster::new(campaign_id.to_string(), config);
        let mut report = LoadReport::default();

        for person in self.load_people(campaign_id)? {
            roster.add_person(person);
        }
        for force in self.load_forces(campaign_id)? {
            roster.add_force(force);
        }

        let mut entries = self.mothball_entries_by_unit(campaign_id)?;
        for row in self.load_unit_rows(campaign_id)? {
            let entries_for_unit = entries.remove(&row.unit_id).unwrap_or_default();
            let unit_id = Uuid::parse_str(&row.unit_id)?;
            let mut unit = Unit::new(unit_id, row.name);
            unit.self_crewed = row.self_crewed;
            unit.force_id = row.force_id;

            if row.mothballed {
                let outcome = decode(&entries_for_unit);
                for d in outcome.diagnostics {
                    roster.record(MothballEvent::MothballInfoMalformed {
                        unit_id,
                        tag:    d.tag.clone(),
                        value:  d.value.clone(),
                        reason: d.reason.clone(),
                    });
                    report.decode_diagnostics.push((unit_id, d));
                }
                unit.state = MothballState::Mothballed(outcome.snapshot);
            }
            roster.add_unit(unit);
        }
        for orphan in entries.keys() {
            log::warn!("Mothball entries for unknown unit {orphan} ignored");
        }

        self.load_crew(campaign_id, &mut roster)?;

        // Barrier: every person of this load is in the roster now.
        report.missing = roster.resolve_mothball_references();

        log::info!(
            "Campaign {campaign_id} loaded: {} units, {} decode problems, {} missing references",
            roster.units().count(),
            report.decode_diagnostics.len(),
            report.missing.len()
        );
        Ok((roster, report))
    }

    fn load_people(&self, campaign_id: &str) -> MothballResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(
            "SELECT person_id, name, status, unit_id FROM person
             WHERE campaign_id = ?1 ORDER BY person_id",
        )?;
        let rows = stmt
            .query_map(params![campaign_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, status, unit)| -> MothballResult<Person> {
                let status: PersonStatus = status
                    .parse()
                    .map_err(|_| MothballError::CorruptRow { column: "person.status", value: status })?;
                Ok(Person {
                    id: Uuid::parse_str(&id)?,
                    name,
                    status,
                    unit: unit.as_deref().map(Uuid::parse_str).transpose()?,
                })
            })
            .collect()
    }

    fn load_forces(&self, campaign_id: &str) -> MothballResult<Vec<Force>> {
        let mut stmt = self.conn.prepare(
            "SELECT force_id, name, parent_id FROM forces
             WHERE campaign_id = ?1 ORDER BY force_id",
        )?;
        let rows = stmt.query_map(params![campaign_id], |row| {
            Ok(Force {
                id:     row.get(0)?,
                name:   row.get(1)?,
                parent: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn load_unit_rows(&self, campaign_id: &str) -> MothballResult<Vec<UnitRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT unit_id, name, self_crewed, mothballed, force_id FROM unit
             WHERE campaign_id = ?1 ORDER BY unit_id",
        )?;
        let rows = stmt.query_map(params![campaign_id], |row| {
            Ok(UnitRow {
                unit_id:     row.get(0)?,
                name:        row.get(1)?,
                self_crewed: row.get::<_, i32>(2)? != 0,
                mothballed:  row.get::<_, i32>(3)? != 0,
                force_id:    row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Rebuild live crew lists. Back-references were saved on the people
    /// themselves, so they are not rewritten here.
    fn load_crew(&self, campaign_id: &str, roster: &mut Roster) -> MothballResult<()> {
        let mut stmt = self.conn.prepare(
            "SELECT unit_id, role, person_id FROM unit_crew
             WHERE campaign_id = ?1 ORDER BY unit_id ASC, ordinal ASC",
        )?;
        let rows = stmt
            .query_map(params![campaign_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut touched = Vec::new();
        for (unit_id, role, person_id) in rows {
            let unit_id = Uuid::parse_str(&unit_id)?;
            let person_id = Uuid::parse_str(&person_id)?;
            let Some(role) = role_for_tag(&role) else {
                log::warn!("Unknown crew role '{role}' on unit {unit_id}; skipped");
                continue;
            };
            let Some(person) = roster.lookup_person(person_id) else {
                log::warn!("Unit {unit_id} lists missing {role} {person_id}; skipped");
                continue;
            };
            let Some(unit) = roster.unit_mut(unit_id) else {
                continue;
            };
            place(unit, role, person);
            touched.push(unit_id);
        }

        touched.dedup();
        for unit_id in touched {
            if let Some(unit) = roster.unit_mut(unit_id) {
                unit.reset_engineer();
            }
        }
        Ok(())
    }
}

fn place(unit: &mut Unit, role: CrewRole, person: PersonHandle) {
    let push = |list: &mut Vec<PersonHandle>, person: PersonHandle| {
        if !list.iter().any(|p| Rc::ptr_eq(p, &person)) {
            list.push(person);
        }
    };
    match role {
        CrewRole::Technician  => unit.tech = Some(person),
        CrewRole::Driver      => push(&mut unit.drivers, person),
        CrewRole::Gunner      => push(&mut unit.gunners, person),
        CrewRole::VesselCrew  => push(&mut unit.vessel_crew, person),
        CrewRole::TechOfficer => unit.tech_officer = Some(person),
        CrewRole::Navigator   => unit.navigator = Some(person),
    }
}
