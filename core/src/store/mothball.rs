use super::CampaignStore;
use crate::{codec::SnapshotEntry, error::MothballResult, types::UnitId};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

impl CampaignStore {
    // ── Mothball entries ──────────────────────────────────────────

    /// Replace the stored snapshot entries of one unit.
    pub fn replace_mothball_entries(
        &self,
        campaign_id: &str,
        unit_id: UnitId,
        entries: &[SnapshotEntry],
    ) -> MothballResult<()> {
        self.conn.execute(
            "DELETE FROM mothball_entry WHERE campaign_id = ?1 AND unit_id = ?2",
            params![campaign_id, unit_id.to_string()],
        )?;
        write_mothball_entries(&self.conn, campaign_id, unit_id, entries)
    }

    pub fn mothball_entries_for_unit(
        &self,
        campaign_id: &str,
        unit_id: UnitId,
    ) -> MothballResult<Vec<SnapshotEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT tag, value FROM mothball_entry
             WHERE campaign_id = ?1 AND unit_id = ?2
             ORDER BY ordinal ASC",
        )?;
        let rows = stmt.query_map(params![campaign_id, unit_id.to_string()], |row| {
            Ok(SnapshotEntry { tag: row.get(0)?, value: row.get(1)? })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every stored entry of the campaign, grouped by raw unit id text.
    pub(super) fn mothball_entries_by_unit(
        &self,
        campaign_id: &str,
    ) -> MothballResult<BTreeMap<String, Vec<SnapshotEntry>>> {
        let mut stmt = self.conn.prepare(
            "SELECT unit_id, tag, value FROM mothball_entry
             WHERE campaign_id = ?1
             ORDER BY unit_id ASC, ordinal ASC",
        )?;
        let rows = stmt.query_map(params![campaign_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                SnapshotEntry { tag: row.get(1)?, value: row.get(2)? },
            ))
        })?;

        let mut grouped: BTreeMap<String, Vec<SnapshotEntry>> = BTreeMap::new();
        for row in rows {
            let (unit_id, entry) = row?;
            grouped.entry(unit_id).or_default().push(entry);
        }
        Ok(grouped)
    }
}

pub(super) fn write_mothball_entries(
    conn: &Connection,
    campaign_id: &str,
    unit_id: UnitId,
    entries: &[SnapshotEntry],
) -> MothballResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO mothball_entry (campaign_id, unit_id, ordinal, tag, value)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (ordinal, entry) in entries.iter().enumerate() {
        stmt.execute(params![
            campaign_id,
            unit_id.to_string(),
            ordinal as i64,
            entry.tag,
            entry.value,
        ])?;
    }
    Ok(())
}
