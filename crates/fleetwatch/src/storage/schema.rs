//! `SQLite` schema definitions for fleetwatch.

/// SQL statement to create the vessels table.
///
/// Each scheduling column has a sibling `user_*` column holding the override.
pub const CREATE_VESSELS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS vessels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    imo_number TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT '',
    vessel_type TEXT,
    eta TEXT,
    etb TEXT,
    etd TEXT,
    user_eta TEXT,
    user_etb TEXT,
    user_etd TEXT,
    psc_last_inspection_date TEXT,
    amsa_last_inspection_date TEXT,
    build_date TEXT,
    checklist_status TEXT,
    comments TEXT,
    quality_score REAL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the per-user flags table.
pub const CREATE_FLAGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flags (
    vessel_id INTEGER NOT NULL,
    user_id TEXT NOT NULL,
    color TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (vessel_id, user_id)
)
";

/// SQL statement to create the defect reports table.
pub const CREATE_DEFECTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS defects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vessel_id INTEGER NOT NULL,
    equipment_name TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    planned_action TEXT,
    criticality TEXT,
    reported_date TEXT,
    target_date TEXT
)
";

/// SQL statement to create an index on the owning vessel of a defect.
pub const CREATE_DEFECT_VESSEL_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_defects_vessel ON defects(vessel_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Index added in schema version 2 for IMO lookups.
pub const CREATE_IMO_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_vessels_imo ON vessels(imo_number)
";

/// All base schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_VESSELS_TABLE,
    CREATE_FLAGS_TABLE,
    CREATE_DEFECTS_TABLE,
    CREATE_DEFECT_VESSEL_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::ScheduleField;

    #[test]
    fn test_vessels_table_has_override_columns() {
        for field in ScheduleField::ALL {
            let base = format!("\n    {} TEXT", field.base_column());
            let user = format!("\n    {} TEXT", field.override_column());
            assert!(CREATE_VESSELS_TABLE.contains(&base));
            assert!(CREATE_VESSELS_TABLE.contains(&user));
        }
    }

    #[test]
    fn test_flags_keyed_by_vessel_and_user() {
        assert!(CREATE_FLAGS_TABLE.contains("PRIMARY KEY (vessel_id, user_id)"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
