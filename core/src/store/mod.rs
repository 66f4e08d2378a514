//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The roster and the mothball subsystem never execute SQL directly.

use crate::{
    error::MothballResult,
    event::{EventLogEntry, MothballEvent},
    types::UnitId,
};
use rusqlite::{params, Connection};

mod mothball;
mod roster;

pub use roster::LoadReport;

pub struct CampaignStore {
    conn: Connection,
}

impl CampaignStore {
    /// Open (or create) the campaign database at `path`.
    pub fn open(path: &str) -> MothballResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> MothballResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> MothballResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_roster.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_mothball.sql"))?;
        Ok(())
    }

    // ── Campaign ───────────────────────────────────────────────

    pub fn insert_campaign(&self, campaign_id: &str, version: &str) -> MothballResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO campaign (campaign_id, version) VALUES (?1, ?2)",
            params![campaign_id, version],
        )?;
        Ok(())
    }

    pub fn campaign_ids(&self) -> MothballResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT campaign_id FROM campaign ORDER BY campaign_id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, campaign_id: &str, event: &MothballEvent) -> MothballResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (campaign_id, unit_id, event_type, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                campaign_id,
                event.unit_id().to_string(),
                event.type_name(),
                serde_json::to_string(event)?,
            ],
        )?;
        Ok(())
    }

    pub fn append_events(&self, campaign_id: &str, events: &[MothballEvent]) -> MothballResult<()> {
        for event in events {
            self.append_event(campaign_id, event)?;
        }
        Ok(())
    }

    pub fn events_for_unit(
        &self,
        campaign_id: &str,
        unit_id: UnitId,
    ) -> MothballResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, campaign_id, event_type, payload
             FROM event_log WHERE campaign_id = ?1 AND unit_id = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![campaign_id, unit_id.to_string()], |row| {
                Ok(EventLogEntry {
                    id:          Some(row.get(0)?),
                    campaign_id: row.get(1)?,
                    unit_id,
                    event_type:  row.get(2)?,
                    payload:     row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, campaign_id: &str, event_type: &str) -> MothballResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE campaign_id = ?1 AND event_type = ?2",
            params![campaign_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
