//! Rendering command results for the terminal.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::defect::DefectReport;
use crate::error::Result;
use crate::flags::FlagSet;
use crate::overrides::EditPreview;
use crate::status::Severity;
use crate::storage::StorageStats;
use crate::table::{render_json_rows, render_text_table, Column};
use crate::vessel::ScheduleField;
use crate::view::{EnrichedVessel, Page};

use super::OutputFormat;

fn schedule_cell(vessel: &EnrichedVessel, field: ScheduleField) -> String {
    let Some(resolved) = vessel.field(field) else {
        return "-".to_string();
    };
    let mut out = resolved.value.clone().unwrap_or_else(|| "-".to_string());
    if resolved.is_overridden {
        out.push('*');
    }
    if let Some(message) = &resolved.message {
        let _ = write!(out, " ({message})");
    }
    out
}

/// Render a page of the vessel list.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_page(
    page: &Page<EnrichedVessel>,
    columns: &[Column],
    format: OutputFormat,
) -> Result<String> {
    let footer = format!(
        "Page {}/{} ({} vessels)",
        page.page,
        page.total_pages.max(1),
        page.total_items
    );

    Ok(match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "page": page.page,
                "per_page": page.per_page,
                "total_items": page.total_items,
                "total_pages": page.total_pages,
                "items": render_json_rows(columns, &page.items),
            });
            serde_json::to_string_pretty(&body)?
        }
        OutputFormat::Table => {
            let mut out = render_text_table(columns, &page.items);
            out.push_str(&footer);
            out
        }
        OutputFormat::Plain => {
            let mut out = String::new();
            for item in &page.items {
                let v = &item.vessel;
                let _ = writeln!(
                    out,
                    "#{} {} [{}] {} ETA {} ETB {} ETD {}{}",
                    v.id,
                    v.name,
                    v.imo_number,
                    item.status.severity.as_str().to_uppercase(),
                    schedule_cell(item, ScheduleField::Eta),
                    schedule_cell(item, ScheduleField::Etb),
                    schedule_cell(item, ScheduleField::Etd),
                    if item.flag.is_none() {
                        String::new()
                    } else {
                        format!(" flag:{}", item.flag)
                    },
                );
            }
            out.push_str(&footer);
            out
        }
    })
}

/// Render one vessel's status breakdown.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_status(vessel: &EnrichedVessel, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(vessel)?);
    }

    let v = &vessel.vessel;
    let mut out = String::new();
    let _ = writeln!(out, "{} (IMO {})", v.name, v.imo_number);
    let _ = writeln!(out, "Status:     {}", vessel.status.severity.as_str().to_uppercase());
    if vessel.status.factors.is_empty() {
        let _ = writeln!(out, "  no status data");
    }
    for factor in &vessel.status.factors {
        let _ = writeln!(
            out,
            "  {:<18} {:<16} {}",
            factor.kind.label(),
            factor.value,
            factor.severity
        );
    }
    for field in ScheduleField::ALL {
        let label = format!("{}:", field.label());
        let _ = writeln!(out, "{label:<11} {}", schedule_cell(vessel, field));
    }
    let _ = write!(out, "Flag:       {}", vessel.flag);
    Ok(out)
}

/// Counts across the baseline vessel list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    /// Vessels in the baseline list.
    pub vessels: usize,
    /// Vessels per composite severity.
    pub by_severity: BTreeMap<Severity, usize>,
    /// Vessels whose resolved ETA is in the past.
    pub overdue: usize,
    /// Vessels with any schedule override.
    pub overridden: usize,
    /// Vessels the user has flagged.
    pub flagged: usize,
    /// Database statistics.
    pub storage: StorageStats,
}

impl FleetSummary {
    /// Summarize enriched vessels.
    #[must_use]
    pub fn new(vessels: &[EnrichedVessel], storage: StorageStats) -> Self {
        let mut by_severity: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        for v in vessels {
            *by_severity.entry(v.status.severity).or_default() += 1;
        }
        Self {
            vessels: vessels.len(),
            by_severity,
            overdue: vessels
                .iter()
                .filter(|v| {
                    v.field(ScheduleField::Eta)
                        .is_some_and(|f| f.days_overdue.is_some())
                })
                .count(),
            overridden: vessels
                .iter()
                .filter(|v| v.schedule.iter().any(|f| f.is_overridden))
                .count(),
            flagged: vessels.iter().filter(|v| !v.flag.is_none()).count(),
            storage,
        }
    }
}

/// Render a fleet summary.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_summary(summary: &FleetSummary, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(summary)?);
    }

    let mut out = String::new();
    let _ = writeln!(out, "fleetwatch status");
    let _ = writeln!(out, "-----------------");
    let _ = writeln!(out, "Vessels:     {}", summary.vessels);
    for (severity, count) in summary.by_severity.iter().rev() {
        let _ = writeln!(out, "  {:<10} {count}", severity.as_str());
    }
    let _ = writeln!(out, "Overdue:     {}", summary.overdue);
    let _ = writeln!(out, "Overridden:  {}", summary.overridden);
    let _ = writeln!(out, "Flagged:     {}", summary.flagged);
    let _ = writeln!(out, "Records:     {}", summary.storage.total_vessels);
    let _ = write!(out, "Defects:     {}", summary.storage.total_defects);
    Ok(out)
}

/// Render the outcome of an override edit.
#[must_use]
pub fn format_preview(vessel_id: i64, preview: &EditPreview, saved: bool) -> String {
    let mut out = String::new();
    let verb = if saved { "Saved" } else { "Would save" };
    let _ = writeln!(out, "{verb} schedule for vessel {vessel_id}:");
    for field in &preview.fields {
        let _ = writeln!(
            out,
            "  {} {}{}",
            field.field.label(),
            field.value.as_deref().unwrap_or("-"),
            if field.is_overridden { " (override)" } else { "" }
        );
    }
    for warning in &preview.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    out.trim_end().to_string()
}

/// Render a user's flags.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_flags(flags: &FlagSet, user_id: &str, json: bool) -> Result<String> {
    let sorted = flags.sorted();
    if json {
        let body: BTreeMap<String, &str> = sorted
            .iter()
            .map(|(id, color)| (id.to_string(), color.as_str()))
            .collect();
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "user_id": user_id,
            "flags": body,
        }))?);
    }

    if sorted.is_empty() {
        return Ok(format!("No flags set for {user_id}"));
    }
    let lines: Vec<String> = sorted
        .iter()
        .map(|(id, color)| format!("{id}\t{color}"))
        .collect();
    Ok(lines.join("\n"))
}

/// Render defect reports.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_defects(
    defects: &[DefectReport],
    columns: &[Column],
    format: OutputFormat,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&render_json_rows(columns, defects))?,
        OutputFormat::Table => {
            let mut out = render_text_table(columns, defects);
            let _ = write!(out, "{} defects", defects.len());
            out
        }
        OutputFormat::Plain => defects
            .iter()
            .map(|d| {
                format!(
                    "#{} vessel {} {}: {} [{}] due {}",
                    d.id,
                    d.vessel_id,
                    d.equipment_name,
                    d.description,
                    d.criticality.as_deref().unwrap_or("-"),
                    d.target_date.as_deref().unwrap_or("-"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    })
}
