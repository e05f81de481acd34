//! Storage layer for fleetwatch.
//!
//! A single `SQLite` database holds the vessel records (with their `user_*`
//! override columns), per-user flags and defect reports.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::defect::DefectReport;
use crate::error::{Error, Result};
use crate::flags::FlagColor;
use crate::vessel::{ScheduleField, VesselRecord};

const VESSEL_COLUMNS: &str = r"
    id, imo_number, name, status, vessel_type,
    eta, etb, etd, user_eta, user_etb, user_etd,
    psc_last_inspection_date, amsa_last_inspection_date, build_date,
    checklist_status, comments, quality_score
";

const DEFECT_COLUMNS: &str = r"
    id, vessel_id, equipment_name, description, planned_action,
    criticality, reported_date, target_date
";

/// Storage engine for fleet data.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories if they don't exist and brings the
    /// schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace a vessel record.
    ///
    /// A record with `id <= 0` is assigned a fresh id. Returns the stored id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upsert_vessel(&self, record: &VesselRecord) -> Result<i64> {
        let id = (record.id > 0).then_some(record.id);
        self.conn.execute(
            r"
            INSERT INTO vessels (
                id, imo_number, name, status, vessel_type,
                eta, etb, etd, user_eta, user_etb, user_etd,
                psc_last_inspection_date, amsa_last_inspection_date, build_date,
                checklist_status, comments, quality_score
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            ON CONFLICT(id) DO UPDATE SET
                imo_number = excluded.imo_number,
                name = excluded.name,
                status = excluded.status,
                vessel_type = excluded.vessel_type,
                eta = excluded.eta,
                etb = excluded.etb,
                etd = excluded.etd,
                user_eta = excluded.user_eta,
                user_etb = excluded.user_etb,
                user_etd = excluded.user_etd,
                psc_last_inspection_date = excluded.psc_last_inspection_date,
                amsa_last_inspection_date = excluded.amsa_last_inspection_date,
                build_date = excluded.build_date,
                checklist_status = excluded.checklist_status,
                comments = excluded.comments,
                quality_score = excluded.quality_score,
                updated_at = datetime('now')
            ",
            params![
                id,
                record.imo_number,
                record.name,
                record.status,
                record.vessel_type,
                record.eta,
                record.etb,
                record.etd,
                record.user_eta,
                record.user_etb,
                record.user_etd,
                record.psc_last_inspection_date,
                record.amsa_last_inspection_date,
                record.build_date,
                record.checklist_status,
                record.comments,
                record.quality_score,
            ],
        )?;

        let stored = id.unwrap_or_else(|| self.conn.last_insert_rowid());
        debug!("Stored vessel {}", stored);
        Ok(stored)
    }

    /// Insert or replace many vessel records in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is stored in that case.
    pub fn import_vessels(&self, records: &[VesselRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for record in records {
            self.upsert_vessel(record)?;
        }
        tx.commit()?;
        info!("Imported {} vessel records", records.len());
        Ok(records.len())
    }

    /// Get a vessel record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_vessel(&self, id: i64) -> Result<Option<VesselRecord>> {
        let sql = format!("SELECT {VESSEL_COLUMNS} FROM vessels WHERE id = ?1");
        let record = self
            .conn
            .query_row(&sql, [id], Self::row_to_vessel)
            .optional()?;
        Ok(record)
    }

    /// All vessel records, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_vessels(&self) -> Result<Vec<VesselRecord>> {
        let sql = format!("SELECT {VESSEL_COLUMNS} FROM vessels ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], Self::row_to_vessel)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Write one override column. `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VesselNotFound`] if no vessel has the id, or an error
    /// if the database operation fails.
    pub fn set_override(&self, id: i64, field: ScheduleField, value: Option<&str>) -> Result<()> {
        let sql = format!(
            "UPDATE vessels SET {} = ?1, updated_at = datetime('now') WHERE id = ?2",
            field.override_column()
        );
        let affected = self.conn.execute(&sql, params![value, id])?;
        if affected == 0 {
            return Err(Error::VesselNotFound { id });
        }
        debug!(vessel_id = id, %field, cleared = value.is_none(), "Override written");
        Ok(())
    }

    /// Count stored vessel records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vessels", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Flags one user has set, ordered by vessel id.
    ///
    /// Rows with an unrecognized color are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn flags_for_user(&self, user_id: &str) -> Result<Vec<(i64, FlagColor)>> {
        let mut stmt = self.conn.prepare(
            "SELECT vessel_id, color FROM flags WHERE user_id = ?1 ORDER BY vessel_id",
        )?;
        let rows = stmt
            .query_map([user_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(vessel_id, color)| match color.parse::<FlagColor>() {
                Ok(c) if !c.is_none() => Some((vessel_id, c)),
                _ => {
                    warn!(vessel_id, color = %color, "Ignoring unknown flag color");
                    None
                }
            })
            .collect())
    }

    /// Set a user's flag on a vessel. [`FlagColor::None`] removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upsert_flag(&self, vessel_id: i64, user_id: &str, color: FlagColor) -> Result<()> {
        if color.is_none() {
            self.delete_flag(vessel_id, user_id)?;
            return Ok(());
        }
        self.conn.execute(
            r"
            INSERT INTO flags (vessel_id, user_id, color) VALUES (?1, ?2, ?3)
            ON CONFLICT(vessel_id, user_id) DO UPDATE SET
                color = excluded.color,
                updated_at = datetime('now')
            ",
            params![vessel_id, user_id, color.as_str()],
        )?;
        Ok(())
    }

    /// Remove a user's flag. Returns `true` if one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_flag(&self, vessel_id: i64, user_id: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM flags WHERE vessel_id = ?1 AND user_id = ?2",
            params![vessel_id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Insert or replace a defect report. Returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upsert_defect(&self, defect: &DefectReport) -> Result<i64> {
        let id = (defect.id > 0).then_some(defect.id);
        self.conn.execute(
            r"
            INSERT OR REPLACE INTO defects (
                id, vessel_id, equipment_name, description, planned_action,
                criticality, reported_date, target_date
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                id,
                defect.vessel_id,
                defect.equipment_name,
                defect.description,
                defect.planned_action,
                defect.criticality,
                defect.reported_date,
                defect.target_date,
            ],
        )?;
        Ok(id.unwrap_or_else(|| self.conn.last_insert_rowid()))
    }

    /// Defect reports, optionally restricted to one vessel.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_defects(&self, vessel_id: Option<i64>) -> Result<Vec<DefectReport>> {
        let sql = format!(
            "SELECT {DEFECT_COLUMNS} FROM defects WHERE ?1 IS NULL OR vessel_id = ?1 ORDER BY id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let defects = stmt
            .query_map([vessel_id], |row| {
                Ok(DefectReport {
                    id: row.get(0)?,
                    vessel_id: row.get(1)?,
                    equipment_name: row.get(2)?,
                    description: row.get(3)?,
                    planned_action: row.get(4)?,
                    criticality: row.get(5)?,
                    reported_date: row.get(6)?,
                    target_date: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(defects)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_vessels = self.count()?;
        let active_vessels: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM vessels WHERE lower(trim(status)) = 'active'",
            [],
            |row| row.get(0),
        )?;
        let overridden_vessels: i64 = self.conn.query_row(
            r"
            SELECT COUNT(*) FROM vessels
            WHERE user_eta IS NOT NULL OR user_etb IS NOT NULL OR user_etd IS NOT NULL
            ",
            [],
            |row| row.get(0),
        )?;
        let total_flags: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM flags", [], |row| row.get(0))?;
        let total_defects: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM defects", [], |row| row.get(0))?;
        let last_updated: Option<String> = self
            .conn
            .query_row("SELECT MAX(updated_at) FROM vessels", [], |row| row.get(0))
            .optional()?
            .flatten();

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_vessels,
            active_vessels,
            overridden_vessels,
            total_flags,
            total_defects,
            last_updated,
            db_size_bytes,
        })
    }

    fn row_to_vessel(row: &rusqlite::Row) -> rusqlite::Result<VesselRecord> {
        Ok(VesselRecord {
            id: row.get(0)?,
            imo_number: row.get(1)?,
            name: row.get(2)?,
            status: row.get(3)?,
            vessel_type: row.get(4)?,
            eta: row.get(5)?,
            etb: row.get(6)?,
            etd: row.get(7)?,
            user_eta: row.get(8)?,
            user_etb: row.get(9)?,
            user_etd: row.get(10)?,
            psc_last_inspection_date: row.get(11)?,
            amsa_last_inspection_date: row.get(12)?,
            build_date: row.get(13)?,
            checklist_status: row.get(14)?,
            comments: row.get(15)?,
            quality_score: row.get(16)?,
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Number of vessel records.
    pub total_vessels: i64,
    /// Records with the active status.
    pub active_vessels: i64,
    /// Records with at least one override set.
    pub overridden_vessels: i64,
    /// Number of flags across all users.
    pub total_flags: i64,
    /// Number of defect reports.
    pub total_defects: i64,
    /// Most recent vessel write, as stored by `SQLite`.
    pub last_updated: Option<String>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// Read an import file holding a JSON array of records.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Json`] if
/// it is not a JSON array of `T`.
pub fn read_import_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = std::fs::read_to_string(path)?;
    let records: Vec<T> = serde_json::from_str(&text)?;
    debug!(path = %path.display(), count = records.len(), "Read import file");
    Ok(records)
}
