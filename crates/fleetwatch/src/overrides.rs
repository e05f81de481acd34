//! Override-aware scheduling fields.
//!
//! The displayed ETA/ETB/ETD is the user override when one is set, the system
//! value otherwise. Validity is advisory: an ETB earlier than the ETA, or an
//! ETA already in the past, is flagged for display but does not stop a save
//! unless the caller opts into blocking.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::error::{Error, Result};
use crate::vessel::{Schedule, ScheduleField, Vessel};

/// Message attached to an ETB that precedes the ETA.
pub const ETB_BEFORE_ETA: &str = "ETB is before ETA";

/// A scheduling field after override resolution and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedField {
    /// Which field this is.
    pub field: ScheduleField,
    /// Displayed value.
    pub value: Option<String>,
    /// Whether the value comes from a user override.
    pub is_overridden: bool,
    /// Whether the value fails a validity check.
    pub is_invalid: bool,
    /// Explanation when invalid.
    pub message: Option<String>,
    /// Days past due, for an ETA before today.
    pub days_overdue: Option<i64>,
}

impl ResolvedField {
    /// Parsed calendar date of the displayed value.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        dates::parse_opt(self.value.as_deref())
    }

    /// Parsed timestamp of the displayed value, midnight for plain dates.
    #[must_use]
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        dates::parse_timestamp_opt(self.value.as_deref())
    }
}

/// Resolve one scheduling field of a vessel for display.
#[must_use]
pub fn resolve_display_value(
    vessel: &Vessel,
    field: ScheduleField,
    today: NaiveDate,
) -> ResolvedField {
    resolve_schedule_field(&vessel.schedule, field, today)
}

/// Resolve one field of a schedule for display.
#[must_use]
pub fn resolve_schedule_field(
    schedule: &Schedule,
    field: ScheduleField,
    today: NaiveDate,
) -> ResolvedField {
    let slot = schedule.field(field);
    let value = slot.resolved().cloned();
    let mut resolved = ResolvedField {
        field,
        value,
        is_overridden: slot.is_overridden(),
        is_invalid: false,
        message: None,
        days_overdue: None,
    };

    match field {
        ScheduleField::Eta => {
            if let Some(eta) = resolved.date() {
                if eta < today {
                    let days = (today - eta).num_days();
                    resolved.is_invalid = true;
                    resolved.days_overdue = Some(days);
                    resolved.message = Some(format!(
                        "{days} day{} overdue",
                        if days == 1 { "" } else { "s" }
                    ));
                }
            }
        }
        ScheduleField::Etb => {
            let eta = dates::parse_timestamp_opt(schedule.eta.resolved().map(String::as_str));
            if let (Some(etb), Some(eta)) = (resolved.timestamp(), eta) {
                if etb < eta {
                    resolved.is_invalid = true;
                    resolved.message = Some(ETB_BEFORE_ETA.to_string());
                }
            }
        }
        ScheduleField::Etd => {}
    }

    resolved
}

/// Resolve all three scheduling fields.
#[must_use]
pub fn resolve_schedule(schedule: &Schedule, today: NaiveDate) -> [ResolvedField; 3] {
    ScheduleField::ALL.map(|field| resolve_schedule_field(schedule, field, today))
}

/// A requested change to one override column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEdit {
    /// Target vessel.
    pub vessel_id: i64,
    /// Target field.
    pub field: ScheduleField,
    /// New override value; `None` clears the override.
    pub value: Option<String>,
}

impl OverrideEdit {
    /// Build an edit from user input, normalizing and checking the value.
    ///
    /// Empty or whitespace-only input clears the override.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOverrideValue`] if the input is not a date.
    pub fn from_input(vessel_id: i64, field: ScheduleField, raw: Option<&str>) -> Result<Self> {
        let value = match raw.map(str::trim) {
            None | Some("") => None,
            Some(text) => {
                if dates::parse_date(text).is_none() {
                    return Err(Error::InvalidOverrideValue {
                        field,
                        value: text.to_string(),
                    });
                }
                Some(text.to_string())
            }
        };
        Ok(Self {
            vessel_id,
            field,
            value,
        })
    }

    /// Whether this edit clears the override.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.value.is_none()
    }
}

/// The effect an edit would have on a vessel's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPreview {
    /// All three fields as they would display after the edit.
    pub fields: Vec<ResolvedField>,
    /// Messages from fields that would be invalid.
    pub warnings: Vec<String>,
    /// Whether ETB would precede ETA.
    pub breaks_ordering: bool,
}

/// Preview an edit against a vessel without persisting anything.
#[must_use]
pub fn validate_edit(vessel: &Vessel, edit: &OverrideEdit, today: NaiveDate) -> EditPreview {
    let mut schedule = vessel.schedule.clone();
    schedule.field_mut(edit.field).user.clone_from(&edit.value);

    let fields = resolve_schedule(&schedule, today);
    let warnings = fields
        .iter()
        .filter_map(|f| {
            f.message
                .as_ref()
                .map(|m| format!("{}: {m}", f.field.label()))
        })
        .collect();
    let breaks_ordering = fields[1].is_invalid;

    EditPreview {
        fields: fields.into(),
        warnings,
        breaks_ordering,
    }
}

/// Apply the blocking policy to a preview.
///
/// # Errors
///
/// Returns [`Error::OverrideRejected`] when `block_invalid` is set and the
/// edit would leave ETB before ETA.
pub fn enforce_policy(vessel_id: i64, preview: &EditPreview, block_invalid: bool) -> Result<()> {
    if block_invalid && preview.breaks_ordering {
        return Err(Error::OverrideRejected {
            id: vessel_id,
            message: ETB_BEFORE_ETA.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::Overridable;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn vessel_with(schedule: Schedule) -> Vessel {
        Vessel {
            id: 1,
            schedule,
            ..Vessel::default()
        }
    }

    #[test]
    fn test_override_wins() {
        let v = vessel_with(Schedule {
            eta: Overridable::with_override(s("2024-01-01"), s("2024-02-01")),
            ..Schedule::default()
        });
        let r = resolve_display_value(&v, ScheduleField::Eta, today());
        assert_eq!(r.value.as_deref(), Some("2024-02-01"));
        assert!(r.is_overridden);
    }

    #[test]
    fn test_null_override_falls_back() {
        let v = vessel_with(Schedule {
            eta: Overridable::with_override(s("2024-01-01"), None),
            ..Schedule::default()
        });
        let r = resolve_display_value(&v, ScheduleField::Eta, today());
        assert_eq!(r.value.as_deref(), Some("2024-01-01"));
        assert!(!r.is_overridden);
    }

    #[test]
    fn test_yesterday_eta_is_one_day_overdue() {
        let yesterday = today().pred_opt().unwrap().format("%Y-%m-%d").to_string();
        let v = vessel_with(Schedule {
            eta: Overridable::new(Some(yesterday)),
            ..Schedule::default()
        });
        let r = resolve_display_value(&v, ScheduleField::Eta, today());
        assert!(r.is_invalid);
        assert_eq!(r.days_overdue, Some(1));
        assert_eq!(r.message.as_deref(), Some("1 day overdue"));
    }

    #[test]
    fn test_eta_today_is_valid() {
        let v = vessel_with(Schedule {
            eta: Overridable::new(s("2024-06-01T23:00:00Z")),
            ..Schedule::default()
        });
        let r = resolve_display_value(&v, ScheduleField::Eta, today());
        assert!(!r.is_invalid);
        assert!(r.days_overdue.is_none());
    }

    #[test]
    fn test_eta_overdue_plural() {
        let v = vessel_with(Schedule {
            eta: Overridable::new(s("2024-05-20")),
            ..Schedule::default()
        });
        let r = resolve_display_value(&v, ScheduleField::Eta, today());
        assert_eq!(r.message.as_deref(), Some("12 days overdue"));
    }

    #[test]
    fn test_etb_before_eta() {
        let v = vessel_with(Schedule {
            eta: Overridable::new(s("2024-06-10")),
            etb: Overridable::new(s("2024-06-09")),
            ..Schedule::default()
        });
        let r = resolve_display_value(&v, ScheduleField::Etb, today());
        assert!(r.is_invalid);
        assert_eq!(r.message.as_deref(), Some(ETB_BEFORE_ETA));
    }

    #[test]
    fn test_etb_hours_before_same_day_eta() {
        let v = vessel_with(Schedule {
            eta: Overridable::new(s("2024-06-10T08:00:00Z")),
            etb: Overridable::new(s("2024-06-10T06:00:00Z")),
            ..Schedule::default()
        });
        let r = resolve_display_value(&v, ScheduleField::Etb, today());
        assert!(r.is_invalid);
        assert_eq!(r.message.as_deref(), Some(ETB_BEFORE_ETA));

        let later = vessel_with(Schedule {
            eta: Overridable::new(s("2024-06-10T08:00:00Z")),
            etb: Overridable::new(s("2024-06-10T09:30:00Z")),
            ..Schedule::default()
        });
        assert!(!resolve_display_value(&later, ScheduleField::Etb, today()).is_invalid);
    }

    #[test]
    fn test_etb_compares_against_resolved_eta() {
        let v = vessel_with(Schedule {
            eta: Overridable::with_override(s("2024-06-10"), s("2024-06-05")),
            etb: Overridable::new(s("2024-06-09")),
            ..Schedule::default()
        });
        let r = resolve_display_value(&v, ScheduleField::Etb, today());
        assert!(!r.is_invalid);
    }

    #[test]
    fn test_unparseable_dates_are_not_invalid() {
        let v = vessel_with(Schedule {
            eta: Overridable::new(s("TBA")),
            etb: Overridable::new(s("2024-01-01")),
            ..Schedule::default()
        });
        for field in ScheduleField::ALL {
            assert!(!resolve_display_value(&v, field, today()).is_invalid);
        }
    }

    #[test]
    fn test_edit_from_input() {
        let edit = OverrideEdit::from_input(1, ScheduleField::Eta, Some(" 2024-07-01 ")).unwrap();
        assert_eq!(edit.value.as_deref(), Some("2024-07-01"));

        let edit = OverrideEdit::from_input(1, ScheduleField::Eta, Some("  ")).unwrap();
        assert!(edit.is_clear());

        let err = OverrideEdit::from_input(1, ScheduleField::Etb, Some("next week")).unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_validate_edit_does_not_mutate() {
        let v = vessel_with(Schedule {
            eta: Overridable::new(s("2024-06-10")),
            ..Schedule::default()
        });
        let edit = OverrideEdit::from_input(1, ScheduleField::Etb, Some("2024-06-08")).unwrap();
        let preview = validate_edit(&v, &edit, today());

        assert!(preview.breaks_ordering);
        assert_eq!(preview.warnings, vec!["ETB: ETB is before ETA".to_string()]);
        assert_eq!(preview.fields[1].value.as_deref(), Some("2024-06-08"));
        assert!(v.schedule.etb.user.is_none());
    }

    #[test]
    fn test_validate_clear_reverts() {
        let v = vessel_with(Schedule {
            eta: Overridable::with_override(s("2024-06-10"), s("2024-06-20")),
            ..Schedule::default()
        });
        let edit = OverrideEdit::from_input(1, ScheduleField::Eta, None).unwrap();
        let preview = validate_edit(&v, &edit, today());
        assert_eq!(preview.fields[0].value.as_deref(), Some("2024-06-10"));
        assert!(!preview.fields[0].is_overridden);
    }

    #[test]
    fn test_enforce_policy() {
        let v = vessel_with(Schedule {
            eta: Overridable::new(s("2024-06-10")),
            ..Schedule::default()
        });
        let edit = OverrideEdit::from_input(1, ScheduleField::Etb, Some("2024-06-01")).unwrap();
        let preview = validate_edit(&v, &edit, today());

        assert!(enforce_policy(1, &preview, false).is_ok());
        let err = enforce_policy(1, &preview, true).unwrap_err();
        assert!(matches!(err, Error::OverrideRejected { id: 1, .. }));
    }

    #[test]
    fn test_enforce_policy_same_day_times() {
        let v = vessel_with(Schedule {
            eta: Overridable::new(s("2024-06-10T08:00:00Z")),
            ..Schedule::default()
        });
        let edit =
            OverrideEdit::from_input(1, ScheduleField::Etb, Some("2024-06-10T06:00:00Z")).unwrap();
        let preview = validate_edit(&v, &edit, today());

        assert!(preview.breaks_ordering);
        assert!(enforce_policy(1, &preview, true).is_err());
    }
}
