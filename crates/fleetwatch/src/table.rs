//! Table rendering adapter.
//!
//! A table is configured as a map from field id to a [`FieldMappingEntry`]
//! (source attribute, kind, priority, width). [`build_columns`] turns the
//! map into ordered [`Column`]s, each bound to the renderer registered for
//! its [`FieldKind`]. Entries that are incomplete or name an attribute the
//! row type does not have are skipped.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::defect::DefectReport;
use crate::error::{Error, Result};
use crate::flags::FlagColor;
use crate::status::Severity;
use crate::vessel::ScheduleField;
use crate::view::EnrichedVessel;

/// Width used when a column does not configure one.
const DEFAULT_WIDTH: usize = 12;

/// Kind of cell a column renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A date, possibly overridden or invalid.
    Date,
    /// A traffic-light severity.
    Status,
    /// A value chosen from fixed options.
    Dropdown,
    /// Plain text.
    Text,
}

impl std::str::FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "status" => Ok(Self::Status),
            "dropdown" | "select" => Ok(Self::Dropdown),
            "text" => Ok(Self::Text),
            _ => Err(Error::unknown_value("field kind", s)),
        }
    }
}

/// One column entry as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMappingEntry {
    /// Row attribute to read.
    pub source: Option<String>,
    /// Cell kind name.
    pub kind: Option<String>,
    /// Lower sorts first; unset sorts last.
    pub priority: Option<i32>,
    /// Column width in characters.
    pub width: Option<usize>,
    /// Header text; defaults to the field id.
    pub label: Option<String>,
    /// Choices for dropdown columns.
    pub options: Vec<String>,
}

impl FieldMappingEntry {
    fn new(source: &str, kind: &str, priority: i32, width: usize, label: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            kind: Some(kind.to_string()),
            priority: Some(priority),
            width: Some(width),
            label: Some(label.to_string()),
            options: Vec::new(),
        }
    }

    fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| (*o).to_string()).collect();
        self
    }
}

/// A validated column mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Field id.
    pub id: String,
    /// Row attribute.
    pub source: String,
    /// Cell kind.
    pub kind: FieldKind,
    /// Sort priority.
    pub priority: i32,
    /// Display width.
    pub width: usize,
    /// Header text.
    pub label: String,
    /// Dropdown choices.
    pub options: Vec<String>,
}

impl FieldMapping {
    /// Validate a configured entry.
    ///
    /// Returns `None` for an entry without a source or with an unknown kind.
    #[must_use]
    pub fn parse(id: &str, entry: &FieldMappingEntry) -> Option<Self> {
        let source = entry.source.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let kind = entry.kind.as_deref()?.parse().ok()?;
        let label = entry.label.clone().unwrap_or_else(|| id.to_string());
        Some(Self {
            id: id.to_string(),
            source: source.to_string(),
            kind,
            priority: entry.priority.unwrap_or(i32::MAX),
            width: entry.width.unwrap_or(DEFAULT_WIDTH).max(label.chars().count()),
            label,
            options: entry.options.clone(),
        })
    }
}

/// A raw attribute read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// The row has no value.
    Missing,
    /// Free text.
    Text(String),
    /// A date with override and validity state.
    Date {
        /// Displayed value.
        value: String,
        /// Whether the value is a user override.
        overridden: bool,
        /// Validation message, if the value is invalid.
        message: Option<String>,
    },
    /// A severity.
    Severity(Severity),
}

/// A row type that can feed table cells.
pub trait CellSource {
    /// Whether the type exposes `name` as an attribute.
    fn has_attribute(name: &str) -> bool;

    /// Read an attribute.
    fn attribute(&self, name: &str) -> AttributeValue;
}

/// A rendered cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    /// Nothing to show.
    Empty,
    /// Plain text.
    Text {
        /// The text.
        value: String,
    },
    /// A date.
    Date {
        /// Displayed value.
        value: String,
        /// Whether the value is a user override.
        overridden: bool,
        /// Whether the value fails validation.
        invalid: bool,
        /// Validation message.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// A severity badge.
    Status {
        /// The severity.
        severity: Severity,
    },
    /// A dropdown with its current selection.
    Dropdown {
        /// Current value.
        selected: String,
        /// Available choices.
        options: Vec<String>,
    },
}

impl Cell {
    /// Plain-text rendering for terminal tables.
    ///
    /// Overridden dates carry a `*` suffix and invalid dates a `!` suffix.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text { value } => value.clone(),
            Self::Date {
                value,
                overridden,
                invalid,
                ..
            } => {
                let mut out = value.clone();
                if *overridden {
                    out.push('*');
                }
                if *invalid {
                    out.push('!');
                }
                out
            }
            Self::Status { severity } => severity.as_str().to_uppercase(),
            Self::Dropdown { selected, .. } => selected.clone(),
        }
    }
}

/// Function that turns an attribute into a cell.
pub type Renderer = fn(&AttributeValue, &FieldMapping) -> Cell;

fn render_date(value: &AttributeValue, _mapping: &FieldMapping) -> Cell {
    match value {
        AttributeValue::Date {
            value,
            overridden,
            message,
        } => Cell::Date {
            value: value.clone(),
            overridden: *overridden,
            invalid: message.is_some(),
            message: message.clone(),
        },
        AttributeValue::Text(value) => Cell::Date {
            value: value.clone(),
            overridden: false,
            invalid: false,
            message: None,
        },
        AttributeValue::Missing | AttributeValue::Severity(_) => Cell::Empty,
    }
}

fn render_status(value: &AttributeValue, _mapping: &FieldMapping) -> Cell {
    match value {
        AttributeValue::Severity(severity) => Cell::Status {
            severity: *severity,
        },
        AttributeValue::Text(text) => text.parse::<Severity>().map_or_else(
            |_| Cell::Text {
                value: text.clone(),
            },
            |severity| Cell::Status { severity },
        ),
        AttributeValue::Missing | AttributeValue::Date { .. } => Cell::Status {
            severity: Severity::Grey,
        },
    }
}

fn render_dropdown(value: &AttributeValue, mapping: &FieldMapping) -> Cell {
    let selected = match value {
        AttributeValue::Missing => String::new(),
        AttributeValue::Text(text) => text.clone(),
        AttributeValue::Date { value, .. } => value.clone(),
        AttributeValue::Severity(severity) => severity.to_string(),
    };
    Cell::Dropdown {
        selected,
        options: mapping.options.clone(),
    }
}

fn render_text(value: &AttributeValue, _mapping: &FieldMapping) -> Cell {
    match value {
        AttributeValue::Missing => Cell::Empty,
        AttributeValue::Text(text) if text.is_empty() => Cell::Empty,
        AttributeValue::Text(text) => Cell::Text {
            value: text.clone(),
        },
        AttributeValue::Date { value, .. } => Cell::Text {
            value: value.clone(),
        },
        AttributeValue::Severity(severity) => Cell::Text {
            value: severity.to_string(),
        },
    }
}

/// Renderers keyed by field kind.
#[derive(Debug, Clone)]
pub struct RendererRegistry {
    renderers: HashMap<FieldKind, Renderer>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        let mut registry = Self {
            renderers: HashMap::new(),
        };
        registry.register(FieldKind::Date, render_date);
        registry.register(FieldKind::Status, render_status);
        registry.register(FieldKind::Dropdown, render_dropdown);
        registry.register(FieldKind::Text, render_text);
        registry
    }
}

impl RendererRegistry {
    /// Register or replace the renderer for a kind.
    pub fn register(&mut self, kind: FieldKind, renderer: Renderer) {
        self.renderers.insert(kind, renderer);
    }

    /// Renderer for a kind.
    #[must_use]
    pub fn get(&self, kind: FieldKind) -> Option<Renderer> {
        self.renderers.get(&kind).copied()
    }
}

/// A column ready to render.
#[derive(Debug, Clone)]
pub struct Column {
    /// Validated mapping.
    pub mapping: FieldMapping,
    renderer: Renderer,
}

impl Column {
    /// Render this column's cell for a row.
    pub fn render<R: CellSource>(&self, row: &R) -> Cell {
        (self.renderer)(&row.attribute(&self.mapping.source), &self.mapping)
    }
}

/// Build ordered columns for row type `R` from a configured mapping.
///
/// Columns are ordered by priority, then field id.
#[must_use]
pub fn build_columns<R: CellSource>(
    mapping: &BTreeMap<String, FieldMappingEntry>,
    registry: &RendererRegistry,
) -> Vec<Column> {
    let mut columns: Vec<Column> = mapping
        .iter()
        .filter_map(|(id, entry)| {
            let Some(parsed) = FieldMapping::parse(id, entry) else {
                warn!(field = %id, "Skipping malformed column mapping");
                return None;
            };
            if !R::has_attribute(&parsed.source) {
                warn!(field = %id, source = %parsed.source, "Skipping column with unknown source");
                return None;
            }
            let Some(renderer) = registry.get(parsed.kind) else {
                warn!(field = %id, kind = ?parsed.kind, "No renderer registered");
                return None;
            };
            Some(Column {
                mapping: parsed,
                renderer,
            })
        })
        .collect();

    columns.sort_by(|a, b| {
        a.mapping
            .priority
            .cmp(&b.mapping.priority)
            .then_with(|| a.mapping.id.cmp(&b.mapping.id))
    });
    columns
}

/// Render rows as cells, one vector per row.
#[must_use]
pub fn render_rows<R: CellSource>(columns: &[Column], rows: &[R]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|row| columns.iter().map(|c| c.render(row)).collect())
        .collect()
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{text:<width$}")
    } else if width == 0 {
        String::new()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

/// Render rows as an aligned plain-text table with a header line.
#[must_use]
pub fn render_text_table<R: CellSource>(columns: &[Column], rows: &[R]) -> String {
    let mut out = String::new();

    let header: Vec<String> = columns
        .iter()
        .map(|c| fit(&c.mapping.label, c.mapping.width))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").trim_end());

    let rule: Vec<String> = columns.iter().map(|c| "-".repeat(c.mapping.width)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));

    for cells in render_rows(columns, rows) {
        let line: Vec<String> = columns
            .iter()
            .zip(&cells)
            .map(|(c, cell)| fit(&cell.display(), c.mapping.width))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}

/// Render rows as JSON objects keyed by field id.
#[must_use]
pub fn render_json_rows<R: CellSource>(columns: &[Column], rows: &[R]) -> serde_json::Value {
    let rendered = render_rows(columns, rows)
        .into_iter()
        .map(|cells| {
            let object: serde_json::Map<String, serde_json::Value> = columns
                .iter()
                .zip(cells)
                .map(|(c, cell)| {
                    (
                        c.mapping.id.clone(),
                        serde_json::to_value(cell).unwrap_or(serde_json::Value::Null),
                    )
                })
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();
    serde_json::Value::Array(rendered)
}

/// Attributes exposed by [`EnrichedVessel`].
pub const VESSEL_ATTRIBUTES: &[&str] = &[
    "id",
    "imo_number",
    "name",
    "status",
    "vessel_type",
    "severity",
    "flag",
    "eta",
    "etb",
    "etd",
    "build_date",
    "psc_last_inspection",
    "amsa_last_inspection",
    "checklist_status",
    "comments",
    "quality_score",
];

fn opt_text(value: Option<&str>) -> AttributeValue {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => AttributeValue::Text(text.to_string()),
        _ => AttributeValue::Missing,
    }
}

impl CellSource for EnrichedVessel {
    fn has_attribute(name: &str) -> bool {
        VESSEL_ATTRIBUTES.contains(&name)
    }

    fn attribute(&self, name: &str) -> AttributeValue {
        let v = &self.vessel;
        if let Ok(field) = name.parse::<ScheduleField>() {
            return self
                .field(field)
                .and_then(|f| {
                    f.value.clone().map(|value| AttributeValue::Date {
                        value,
                        overridden: f.is_overridden,
                        message: f.message.clone(),
                    })
                })
                .unwrap_or(AttributeValue::Missing);
        }

        match name {
            "id" => AttributeValue::Text(v.id.to_string()),
            "imo_number" => opt_text(Some(&v.imo_number)),
            "name" => opt_text(Some(&v.name)),
            "status" => opt_text(Some(&v.status)),
            "vessel_type" => opt_text(v.vessel_type.as_deref()),
            "severity" => AttributeValue::Severity(self.status.severity),
            "flag" => AttributeValue::Text(self.flag.to_string()),
            "build_date" => opt_text(v.build_date.as_deref()),
            "psc_last_inspection" => opt_text(v.psc_last_inspection.as_deref()),
            "amsa_last_inspection" => opt_text(v.amsa_last_inspection.as_deref()),
            "checklist_status" => opt_text(v.checklist_status.as_deref()),
            "comments" => opt_text(v.comments.as_deref()),
            "quality_score" => v
                .quality_score
                .map_or(AttributeValue::Missing, |q| AttributeValue::Text(format!("{q:.1}"))),
            _ => AttributeValue::Missing,
        }
    }
}

/// The built-in vessel table layout.
#[must_use]
pub fn default_vessel_columns() -> BTreeMap<String, FieldMappingEntry> {
    let flag_options: Vec<&str> = FlagColor::ALL.iter().map(|c| c.as_str()).collect();
    [
        ("name", FieldMappingEntry::new("name", "text", 10, 20, "Vessel")),
        ("imo", FieldMappingEntry::new("imo_number", "text", 20, 9, "IMO")),
        ("status", FieldMappingEntry::new("severity", "status", 30, 7, "Status")),
        ("eta", FieldMappingEntry::new("eta", "date", 40, 12, "ETA")),
        ("etb", FieldMappingEntry::new("etb", "date", 50, 12, "ETB")),
        ("etd", FieldMappingEntry::new("etd", "date", 60, 12, "ETD")),
        (
            "checklist",
            FieldMappingEntry::new("checklist_status", "dropdown", 70, 12, "Checklist")
                .with_options(&["Pending", "Acknowledged", "Submitted"]),
        ),
        (
            "flag",
            FieldMappingEntry::new("flag", "dropdown", 80, 6, "Flag").with_options(&flag_options),
        ),
    ]
    .into_iter()
    .map(|(id, entry)| (id.to_string(), entry))
    .collect()
}

/// Attributes exposed by [`DefectReport`].
pub const DEFECT_ATTRIBUTES: &[&str] = &[
    "id",
    "vessel_id",
    "equipment_name",
    "description",
    "planned_action",
    "criticality",
    "severity",
    "reported_date",
    "target_date",
];

impl CellSource for DefectReport {
    fn has_attribute(name: &str) -> bool {
        DEFECT_ATTRIBUTES.contains(&name)
    }

    fn attribute(&self, name: &str) -> AttributeValue {
        match name {
            "id" => AttributeValue::Text(self.id.to_string()),
            "vessel_id" => AttributeValue::Text(self.vessel_id.to_string()),
            "equipment_name" => opt_text(Some(&self.equipment_name)),
            "description" => opt_text(Some(&self.description)),
            "planned_action" => opt_text(self.planned_action.as_deref()),
            "criticality" => opt_text(self.criticality.as_deref()),
            "severity" => AttributeValue::Severity(self.criticality_severity()),
            "reported_date" => opt_text(self.reported_date.as_deref()),
            "target_date" => opt_text(self.target_date.as_deref()),
            _ => AttributeValue::Missing,
        }
    }
}

/// The built-in defect table layout.
#[must_use]
pub fn default_defect_columns() -> BTreeMap<String, FieldMappingEntry> {
    [
        ("vessel", FieldMappingEntry::new("vessel_id", "text", 10, 6, "Vessel")),
        ("equipment", FieldMappingEntry::new("equipment_name", "text", 20, 18, "Equipment")),
        ("description", FieldMappingEntry::new("description", "text", 30, 30, "Description")),
        ("action", FieldMappingEntry::new("planned_action", "text", 40, 24, "Planned action")),
        ("criticality", FieldMappingEntry::new("severity", "status", 50, 11, "Criticality")),
        ("target", FieldMappingEntry::new("target_date", "date", 60, 12, "Target")),
    ]
    .into_iter()
    .map(|(id, entry)| (id.to_string(), entry))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FlagSet;
    use crate::status::StatusEngine;
    use crate::vessel::{Overridable, Vessel};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn row() -> EnrichedVessel {
        let mut vessel = Vessel {
            id: 7,
            imo_number: "9321483".to_string(),
            name: "Ocean Star".to_string(),
            status: "active".to_string(),
            checklist_status: Some("Pending".to_string()),
            ..Vessel::default()
        };
        vessel.schedule.eta = Overridable::with_override(
            Some("2024-06-10".to_string()),
            Some("2024-05-30".to_string()),
        );
        let flags: FlagSet = [(7, FlagColor::Red)].into_iter().collect();
        EnrichedVessel::new(vessel, &StatusEngine::default(), &flags, today())
    }

    fn entry(source: &str, kind: &str, priority: Option<i32>) -> FieldMappingEntry {
        FieldMappingEntry {
            source: Some(source.to_string()),
            kind: Some(kind.to_string()),
            priority,
            ..FieldMappingEntry::default()
        }
    }

    #[test]
    fn test_columns_ordered_by_priority_then_id() {
        let mapping: BTreeMap<String, FieldMappingEntry> = [
            ("b".to_string(), entry("name", "text", Some(2))),
            ("a".to_string(), entry("imo_number", "text", Some(2))),
            ("c".to_string(), entry("eta", "date", Some(1))),
            ("d".to_string(), entry("etb", "date", None)),
        ]
        .into();
        let columns = build_columns::<EnrichedVessel>(&mapping, &RendererRegistry::default());
        let ids: Vec<_> = columns.iter().map(|c| c.mapping.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let mapping: BTreeMap<String, FieldMappingEntry> = [
            ("ok".to_string(), entry("name", "text", Some(1))),
            ("bad_kind".to_string(), entry("name", "sparkline", Some(2))),
            ("no_source".to_string(), FieldMappingEntry {
                kind: Some("text".to_string()),
                ..FieldMappingEntry::default()
            }),
            ("unknown_source".to_string(), entry("draught", "text", Some(3))),
        ]
        .into();
        let columns = build_columns::<EnrichedVessel>(&mapping, &RendererRegistry::default());
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].mapping.id, "ok");
    }

    #[test]
    fn test_date_cell_carries_override_state() {
        let mapping: BTreeMap<String, FieldMappingEntry> =
            [("eta".to_string(), entry("eta", "date", Some(1)))].into();
        let columns = build_columns::<EnrichedVessel>(&mapping, &RendererRegistry::default());
        let cell = columns[0].render(&row());
        assert_eq!(
            cell,
            Cell::Date {
                value: "2024-05-30".to_string(),
                overridden: true,
                invalid: true,
                message: Some("2 days overdue".to_string()),
            }
        );
        assert_eq!(cell.display(), "2024-05-30*!");
    }

    #[test]
    fn test_status_and_dropdown_cells() {
        let registry = RendererRegistry::default();
        let columns = build_columns::<EnrichedVessel>(&default_vessel_columns(), &registry);
        let cells = render_rows(&columns, &[row()]);
        let by_id: HashMap<_, _> = columns
            .iter()
            .map(|c| c.mapping.id.clone())
            .zip(cells[0].clone())
            .collect();

        assert_eq!(by_id["status"], Cell::Status { severity: Severity::Red });
        match &by_id["flag"] {
            Cell::Dropdown { selected, options } => {
                assert_eq!(selected, "red");
                assert_eq!(options.len(), 4);
            }
            other => panic!("unexpected cell {other:?}"),
        }
        assert_eq!(by_id["etd"], Cell::Empty);
    }

    #[test]
    fn test_custom_renderer() {
        fn shout(value: &AttributeValue, _mapping: &FieldMapping) -> Cell {
            match value {
                AttributeValue::Text(t) => Cell::Text {
                    value: t.to_uppercase(),
                },
                _ => Cell::Empty,
            }
        }
        let mut registry = RendererRegistry::default();
        registry.register(FieldKind::Text, shout);
        let mapping: BTreeMap<String, FieldMappingEntry> =
            [("name".to_string(), entry("name", "text", Some(1)))].into();
        let columns = build_columns::<EnrichedVessel>(&mapping, &registry);
        assert_eq!(columns[0].render(&row()).display(), "OCEAN STAR");
    }

    #[test]
    fn test_text_table_layout() {
        let registry = RendererRegistry::default();
        let columns = build_columns::<EnrichedVessel>(&default_vessel_columns(), &registry);
        let table = render_text_table(&columns, &[row()]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Vessel"));
        assert!(lines[2].contains("Ocean Star"));
        assert!(lines[2].contains("RED"));
        assert!(lines[2].contains("2024-05-30*!"));
    }

    #[test]
    fn test_fit_truncates() {
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("ab", 4), "ab  ");
    }

    #[test]
    fn test_json_rows() {
        let mapping: BTreeMap<String, FieldMappingEntry> =
            [("status".to_string(), entry("severity", "status", Some(1)))].into();
        let columns = build_columns::<EnrichedVessel>(&mapping, &RendererRegistry::default());
        let json = render_json_rows(&columns, &[row()]);
        assert_eq!(json[0]["status"]["kind"], "status");
        assert_eq!(json[0]["status"]["severity"], "red");
    }

    #[test]
    fn test_defect_columns() {
        let defect = DefectReport {
            id: 3,
            vessel_id: 7,
            equipment_name: "Radar".to_string(),
            criticality: Some("High".to_string()),
            target_date: Some("2024-07-01".to_string()),
            ..DefectReport::default()
        };
        let columns =
            build_columns::<DefectReport>(&default_defect_columns(), &RendererRegistry::default());
        assert_eq!(columns.len(), 6);
        let cells = render_rows(&columns, &[defect]);
        assert_eq!(cells[0][1].display(), "Radar");
        assert_eq!(cells[0][3], Cell::Empty);
        assert_eq!(cells[0][4], Cell::Status { severity: Severity::Red });
    }

    #[test]
    fn test_vessel_source_rejected_for_defects() {
        let mapping: BTreeMap<String, FieldMappingEntry> =
            [("eta".to_string(), entry("eta", "date", Some(1)))].into();
        assert!(build_columns::<DefectReport>(&mapping, &RendererRegistry::default()).is_empty());
    }

    #[test]
    fn test_field_kind_parse() {
        assert_eq!("Date".parse::<FieldKind>().unwrap(), FieldKind::Date);
        assert_eq!("select".parse::<FieldKind>().unwrap(), FieldKind::Dropdown);
        assert!("chart".parse::<FieldKind>().is_err());
    }
}
