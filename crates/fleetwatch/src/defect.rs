//! Vessel defect reports.
//!
//! The reporting table lists open defects per vessel. Defects go through the
//! same filter and sort pipeline as vessels, with severity taken from the
//! reported criticality.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::filter::{Filterable, SortKey};
use crate::flags::FlagColor;
use crate::status::Severity;

/// One reported defect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefectReport {
    /// Record id.
    pub id: i64,
    /// Vessel the defect belongs to.
    pub vessel_id: i64,
    /// Affected equipment.
    pub equipment_name: String,
    /// What is wrong.
    pub description: String,
    /// What will be done about it.
    pub planned_action: Option<String>,
    /// Reported criticality (`High`, `Medium`, `Low`).
    pub criticality: Option<String>,
    /// When the defect was reported.
    pub reported_date: Option<String>,
    /// When rectification is due.
    pub target_date: Option<String>,
}

impl DefectReport {
    /// Severity implied by the criticality text.
    #[must_use]
    pub fn criticality_severity(&self) -> Severity {
        match self
            .criticality
            .as_deref()
            .map(|c| c.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("high" | "critical") => Severity::Red,
            Some("medium") => Severity::Yellow,
            Some("low") => Severity::Green,
            _ => Severity::Grey,
        }
    }
}

impl Filterable for DefectReport {
    fn id(&self) -> i64 {
        self.id
    }

    fn severity(&self) -> Severity {
        self.criticality_severity()
    }

    fn flag(&self) -> FlagColor {
        FlagColor::None
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.equipment_name.as_str(), self.description.as_str()];
        if let Some(action) = &self.planned_action {
            fields.push(action);
        }
        fields
    }

    fn category(&self) -> Option<&str> {
        self.criticality.as_deref()
    }

    fn quality(&self) -> Option<f64> {
        None
    }

    fn primary_date(&self) -> Option<NaiveDate> {
        dates::parse_opt(self.target_date.as_deref())
    }

    fn sort_date(&self, key: SortKey) -> Option<NaiveDateTime> {
        match key {
            SortKey::TargetDate => dates::parse_timestamp_opt(self.target_date.as_deref()),
            SortKey::ReportedDate => dates::parse_timestamp_opt(self.reported_date.as_deref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{apply_filters, sort_entities, FilterState, SortSpec};

    fn defect(id: i64, equipment: &str, action: Option<&str>, criticality: &str) -> DefectReport {
        DefectReport {
            id,
            vessel_id: 10,
            equipment_name: equipment.to_string(),
            description: format!("{equipment} fault"),
            planned_action: action.map(str::to_string),
            criticality: Some(criticality.to_string()),
            ..DefectReport::default()
        }
    }

    #[test]
    fn test_criticality_severity() {
        assert_eq!(defect(1, "x", None, "High").severity(), Severity::Red);
        assert_eq!(defect(1, "x", None, "medium").severity(), Severity::Yellow);
        assert_eq!(defect(1, "x", None, " LOW ").severity(), Severity::Green);
        assert_eq!(defect(1, "x", None, "?").severity(), Severity::Grey);
        assert_eq!(DefectReport::default().severity(), Severity::Grey);
    }

    #[test]
    fn test_search_covers_planned_action() {
        let defects = vec![
            defect(1, "Main engine", Some("Order spare piston"), "High"),
            defect(2, "Windlass", Some("Grease and test"), "Low"),
            defect(3, "Radar", None, "Medium"),
        ];
        let state = FilterState {
            search: Some("PISTON".to_string()),
            ..FilterState::default()
        };
        let found = apply_filters(&defects, &state);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);

        let state = FilterState {
            search: Some("radar fault".to_string()),
            ..FilterState::default()
        };
        assert_eq!(apply_filters(&defects, &state)[0].id, 3);
    }

    #[test]
    fn test_sort_by_target_date() {
        let mut defects = vec![
            DefectReport {
                id: 1,
                target_date: Some("2024-08-01".to_string()),
                ..DefectReport::default()
            },
            DefectReport {
                id: 2,
                target_date: None,
                ..DefectReport::default()
            },
            DefectReport {
                id: 3,
                target_date: Some("2024-05-01".to_string()),
                ..DefectReport::default()
            },
        ];
        let spec = SortSpec {
            key: SortKey::TargetDate,
            ..SortSpec::default()
        };
        sort_entities(&mut defects, &spec, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let ids: Vec<_> = defects.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
