//! Core vessel types for fleetwatch.
//!
//! [`VesselRecord`] is the flat wire shape returned by the vessel API, where
//! every scheduling field has a sibling `user_*` override column.
//! [`Vessel`] is the domain shape: each scheduling field is an
//! [`Overridable`] pair resolved in one place.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Status value that marks a vessel as active.
pub const ACTIVE_STATUS: &str = "active";

/// A system value paired with an optional user override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overridable<T> {
    /// The system-computed value.
    pub base: Option<T>,
    /// The user-supplied value, if any.
    #[serde(rename = "override")]
    pub user: Option<T>,
}

impl<T> Overridable<T> {
    /// Create a field with only a system value.
    #[must_use]
    pub fn new(base: Option<T>) -> Self {
        Self { base, user: None }
    }

    /// Create a field from both columns.
    #[must_use]
    pub fn with_override(base: Option<T>, user: Option<T>) -> Self {
        Self { base, user }
    }

    /// The value to display: the override if set, else the system value.
    #[must_use]
    pub fn resolved(&self) -> Option<&T> {
        self.user.as_ref().or(self.base.as_ref())
    }

    /// Whether a user override is in effect.
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.user.is_some()
    }
}

/// One of the overridable scheduling fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleField {
    /// Estimated time of arrival.
    Eta,
    /// Estimated time of berthing.
    Etb,
    /// Estimated time of departure.
    Etd,
}

impl ScheduleField {
    /// All scheduling fields in display order.
    pub const ALL: [Self; 3] = [Self::Eta, Self::Etb, Self::Etd];

    /// Column holding the system value.
    #[must_use]
    pub fn base_column(self) -> &'static str {
        match self {
            Self::Eta => "eta",
            Self::Etb => "etb",
            Self::Etd => "etd",
        }
    }

    /// Column holding the user override.
    #[must_use]
    pub fn override_column(self) -> &'static str {
        match self {
            Self::Eta => "user_eta",
            Self::Etb => "user_etb",
            Self::Etd => "user_etd",
        }
    }

    /// Short upper-case label used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Eta => "ETA",
            Self::Etb => "ETB",
            Self::Etd => "ETD",
        }
    }
}

impl std::fmt::Display for ScheduleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.base_column())
    }
}

impl std::str::FromStr for ScheduleField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eta" => Ok(Self::Eta),
            "etb" => Ok(Self::Etb),
            "etd" => Ok(Self::Etd),
            _ => Err(Error::unknown_value("schedule field", s)),
        }
    }
}

/// Pre-arrival checklist state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistState {
    /// Checklist sent, no response yet.
    Pending,
    /// Checklist acknowledged by the vessel.
    Acknowledged,
    /// Checklist submitted, awaiting review.
    Submitted,
    /// Any other reported value, kept verbatim.
    Other(String),
}

impl ChecklistState {
    /// Interpret a raw checklist value. Empty input means no checklist.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "acknowledged" => Self::Acknowledged,
            "submitted" => Self::Submitted,
            _ => Self::Other(trimmed.to_string()),
        })
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Acknowledged => "Acknowledged",
            Self::Submitted => "Submitted",
            Self::Other(raw) => raw,
        }
    }
}

/// Scheduling fields of a vessel call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Estimated arrival.
    pub eta: Overridable<String>,
    /// Estimated berthing.
    pub etb: Overridable<String>,
    /// Estimated departure.
    pub etd: Overridable<String>,
}

impl Schedule {
    /// Borrow one field.
    #[must_use]
    pub fn field(&self, field: ScheduleField) -> &Overridable<String> {
        match field {
            ScheduleField::Eta => &self.eta,
            ScheduleField::Etb => &self.etb,
            ScheduleField::Etd => &self.etd,
        }
    }

    /// Mutably borrow one field.
    pub fn field_mut(&mut self, field: ScheduleField) -> &mut Overridable<String> {
        match field {
            ScheduleField::Eta => &mut self.eta,
            ScheduleField::Etb => &mut self.etb,
            ScheduleField::Etd => &mut self.etd,
        }
    }
}

/// A vessel as seen by the status, override and filter layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    /// Numeric record id.
    pub id: i64,
    /// IMO number.
    pub imo_number: String,
    /// Vessel name.
    pub name: String,
    /// Record status (`active` or anything else).
    pub status: String,
    /// Vessel type, used as the filter category.
    pub vessel_type: Option<String>,
    /// Port call schedule.
    pub schedule: Schedule,
    /// Last port state control inspection.
    pub psc_last_inspection: Option<String>,
    /// Last AMSA inspection.
    pub amsa_last_inspection: Option<String>,
    /// Build date.
    pub build_date: Option<String>,
    /// Raw checklist state.
    pub checklist_status: Option<String>,
    /// Free-text comments.
    pub comments: Option<String>,
    /// Vetting quality score.
    pub quality_score: Option<f64>,
}

impl Vessel {
    /// Whether this record has the active status.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(ACTIVE_STATUS)
    }

    /// Parsed checklist state, if reported.
    #[must_use]
    pub fn checklist(&self) -> Option<ChecklistState> {
        self.checklist_status.as_deref().and_then(ChecklistState::parse)
    }
}

/// Flat wire representation of a vessel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselRecord {
    /// Numeric record id.
    pub id: i64,
    /// IMO number; numeric JSON values are accepted.
    #[serde(deserialize_with = "string_or_number", alias = "imo")]
    pub imo_number: String,
    /// Vessel name.
    #[serde(alias = "vessel_name")]
    pub name: String,
    /// Record status.
    pub status: String,
    /// Vessel type.
    pub vessel_type: Option<String>,
    /// System ETA.
    pub eta: Option<String>,
    /// System ETB.
    pub etb: Option<String>,
    /// System ETD.
    pub etd: Option<String>,
    /// User ETA override.
    pub user_eta: Option<String>,
    /// User ETB override.
    pub user_etb: Option<String>,
    /// User ETD override.
    pub user_etd: Option<String>,
    /// Last PSC inspection.
    pub psc_last_inspection_date: Option<String>,
    /// Last AMSA inspection.
    pub amsa_last_inspection_date: Option<String>,
    /// Build date.
    pub build_date: Option<String>,
    /// Checklist state.
    pub checklist_status: Option<String>,
    /// Comments.
    pub comments: Option<String>,
    /// Quality score.
    pub quality_score: Option<f64>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.trim().to_string(),
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Null(()) => String::new(),
    })
}

impl From<VesselRecord> for Vessel {
    fn from(r: VesselRecord) -> Self {
        Self {
            id: r.id,
            imo_number: r.imo_number,
            name: r.name,
            status: r.status,
            vessel_type: r.vessel_type,
            schedule: Schedule {
                eta: Overridable::with_override(r.eta, r.user_eta),
                etb: Overridable::with_override(r.etb, r.user_etb),
                etd: Overridable::with_override(r.etd, r.user_etd),
            },
            psc_last_inspection: r.psc_last_inspection_date,
            amsa_last_inspection: r.amsa_last_inspection_date,
            build_date: r.build_date,
            checklist_status: r.checklist_status,
            comments: r.comments,
            quality_score: r.quality_score,
        }
    }
}

impl From<Vessel> for VesselRecord {
    fn from(v: Vessel) -> Self {
        let Schedule { eta, etb, etd } = v.schedule;
        Self {
            id: v.id,
            imo_number: v.imo_number,
            name: v.name,
            status: v.status,
            vessel_type: v.vessel_type,
            eta: eta.base,
            etb: etb.base,
            etd: etd.base,
            user_eta: eta.user,
            user_etb: etb.user,
            user_etd: etd.user,
            psc_last_inspection_date: v.psc_last_inspection,
            amsa_last_inspection_date: v.amsa_last_inspection,
            build_date: v.build_date,
            checklist_status: v.checklist_status,
            comments: v.comments,
            quality_score: v.quality_score,
        }
    }
}
