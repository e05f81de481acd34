//! Traffic-light status derivation.
//!
//! Each vessel gets a [`CompositeStatus`]: one [`StatusFactor`] per attribute
//! that is present and parseable, reduced to the worst [`Severity`]. A vessel
//! with no usable attributes is [`Severity::Grey`], which is distinct from
//! green.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::StatusConfig;
use crate::dates;
use crate::error::{Error, Result};
use crate::vessel::{ChecklistState, Vessel};

/// Severity of a factor or of a whole vessel.
///
/// Ordering is by badness: `Grey < Green < Yellow < Red`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No data.
    #[default]
    Grey,
    /// Healthy.
    Green,
    /// Caution.
    Yellow,
    /// Critical.
    Red,
}

impl Severity {
    /// All severities, least severe first.
    pub const ALL: [Self; 4] = [Self::Grey, Self::Green, Self::Yellow, Self::Red];

    /// Lower-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grey => "grey",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grey" | "gray" => Ok(Self::Grey),
            "green" => Ok(Self::Green),
            "yellow" | "amber" => Ok(Self::Yellow),
            "red" => Ok(Self::Red),
            _ => Err(Error::unknown_value("severity", s)),
        }
    }
}

/// The attribute a factor was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    /// Age from build date.
    Age,
    /// Months since last PSC inspection.
    PscInspection,
    /// Months since last AMSA inspection.
    AmsaInspection,
    /// Pre-arrival checklist state.
    Checklist,
}

impl FactorKind {
    /// Human-readable name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::PscInspection => "PSC inspection",
            Self::AmsaInspection => "AMSA inspection",
            Self::Checklist => "Checklist",
        }
    }
}

/// One derived status input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFactor {
    /// Which attribute produced this factor.
    pub kind: FactorKind,
    /// Display value (e.g. `"12 years"`).
    pub value: String,
    /// Severity of this factor alone. Never grey.
    pub severity: Severity,
}

/// Aggregated status of a vessel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeStatus {
    /// Worst severity among `factors`, or grey when there are none.
    pub severity: Severity,
    /// Factors in fixed order: age, PSC, AMSA, checklist.
    pub factors: Vec<StatusFactor>,
}

impl CompositeStatus {
    /// Reduce a factor list to a composite status.
    #[must_use]
    pub fn from_factors(factors: Vec<StatusFactor>) -> Self {
        let severity = factors
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Grey);
        Self { severity, factors }
    }

    /// Look up a factor by kind.
    #[must_use]
    pub fn factor(&self, kind: FactorKind) -> Option<&StatusFactor> {
        self.factors.iter().find(|f| f.kind == kind)
    }
}

/// Computes vessel status against a set of thresholds.
#[derive(Debug, Clone, Default)]
pub struct StatusEngine {
    thresholds: StatusConfig,
}

impl StatusEngine {
    /// Create an engine with the given thresholds.
    #[must_use]
    pub fn new(thresholds: StatusConfig) -> Self {
        Self { thresholds }
    }

    /// Compute the composite status of `vessel` as of `today`.
    #[must_use]
    pub fn compute(&self, vessel: &Vessel, today: NaiveDate) -> CompositeStatus {
        let factors = [
            self.age_factor(vessel, today),
            self.inspection_factor(
                FactorKind::PscInspection,
                vessel.psc_last_inspection.as_deref(),
                today,
            ),
            self.inspection_factor(
                FactorKind::AmsaInspection,
                vessel.amsa_last_inspection.as_deref(),
                today,
            ),
            Self::checklist_factor(vessel),
        ]
        .into_iter()
        .flatten()
        .collect();

        CompositeStatus::from_factors(factors)
    }

    fn age_factor(&self, vessel: &Vessel, today: NaiveDate) -> Option<StatusFactor> {
        let built = dates::parse_opt(vessel.build_date.as_deref())?;
        let years = dates::whole_years_between(built, today)?;

        let severity = if years < self.thresholds.age_yellow_years {
            Severity::Green
        } else if years < self.thresholds.age_red_years {
            Severity::Yellow
        } else {
            Severity::Red
        };

        Some(StatusFactor {
            kind: FactorKind::Age,
            value: format!("{years} year{}", if years == 1 { "" } else { "s" }),
            severity,
        })
    }

    fn inspection_factor(
        &self,
        kind: FactorKind,
        raw: Option<&str>,
        today: NaiveDate,
    ) -> Option<StatusFactor> {
        let inspected = dates::parse_opt(raw)?;

        let green = self.thresholds.inspection_green_months;
        let yellow = self.thresholds.inspection_yellow_months;
        let severity = if dates::within_months(inspected, today, green) {
            Severity::Green
        } else if dates::within_months(inspected, today, yellow) {
            Severity::Yellow
        } else {
            Severity::Red
        };

        let months = dates::months_between(inspected, today).max(0.0);
        Some(StatusFactor {
            kind,
            value: format!("{months:.1} months ago"),
            severity,
        })
    }

    fn checklist_factor(vessel: &Vessel) -> Option<StatusFactor> {
        let state = vessel.checklist()?;
        let severity = match state {
            ChecklistState::Acknowledged => Severity::Green,
            ChecklistState::Submitted => Severity::Yellow,
            ChecklistState::Pending | ChecklistState::Other(_) => Severity::Red,
        };
        Some(StatusFactor {
            kind: FactorKind::Checklist,
            value: state.label().to_string(),
            severity,
        })
    }
}

/// Compute a vessel's status with the default thresholds.
#[must_use]
pub fn compute_status(vessel: &Vessel, today: NaiveDate) -> CompositeStatus {
    StatusEngine::default().compute(vessel, today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn vessel() -> Vessel {
        Vessel {
            id: 1,
            imo_number: "9000001".to_string(),
            status: "active".to_string(),
            ..Vessel::default()
        }
    }

    #[test]
    fn test_no_data_is_grey() {
        let status = compute_status(&vessel(), today());
        assert_eq!(status.severity, Severity::Grey);
        assert!(status.factors.is_empty());
    }

    #[test]
    fn test_unparseable_inputs_are_skipped() {
        let v = Vessel {
            build_date: Some("unknown".to_string()),
            psc_last_inspection: Some(String::new()),
            amsa_last_inspection: Some("n/a".to_string()),
            checklist_status: Some("   ".to_string()),
            ..vessel()
        };
        let status = compute_status(&v, today());
        assert_eq!(status.severity, Severity::Grey);
        assert!(status.factors.is_empty());
    }

    #[test]
    fn test_age_thresholds() {
        let cases = [
            ("2020-01-01", Severity::Green),
            ("2019-06-02", Severity::Green),
            ("2019-06-01", Severity::Yellow),
            ("2014-06-02", Severity::Yellow),
            ("2014-06-01", Severity::Red),
            ("1990-01-01", Severity::Red),
        ];
        for (built, expected) in cases {
            let v = Vessel {
                build_date: Some(built.to_string()),
                ..vessel()
            };
            let status = compute_status(&v, today());
            assert_eq!(status.severity, expected, "build date {built}");
            assert_eq!(status.factors.len(), 1);
        }
    }

    #[test]
    fn test_future_build_date_is_skipped() {
        let v = Vessel {
            build_date: Some("2030-01-01".to_string()),
            ..vessel()
        };
        assert!(compute_status(&v, today()).factors.is_empty());
    }

    #[test]
    fn test_inspection_thresholds() {
        let cases = [
            ("2024-05-15", Severity::Green),
            ("2024-03-01", Severity::Green),
            ("2024-02-29", Severity::Yellow),
            ("2023-12-01", Severity::Yellow),
            ("2023-11-30", Severity::Red),
        ];
        for (inspected, expected) in cases {
            let v = Vessel {
                psc_last_inspection: Some(inspected.to_string()),
                ..vessel()
            };
            let status = compute_status(&v, today());
            assert_eq!(status.severity, expected, "inspection {inspected}");
            assert_eq!(status.factors[0].kind, FactorKind::PscInspection);
        }
    }

    #[test]
    fn test_checklist_severity() {
        let cases = [
            ("Acknowledged", Severity::Green),
            ("Submitted", Severity::Yellow),
            ("Pending", Severity::Red),
            ("Something else", Severity::Red),
        ];
        for (state, expected) in cases {
            let v = Vessel {
                checklist_status: Some(state.to_string()),
                ..vessel()
            };
            let status = compute_status(&v, today());
            assert_eq!(status.severity, expected, "checklist {state}");
            assert_eq!(status.factors[0].value, state);
        }
    }

    #[test]
    fn test_all_green_is_green() {
        let v = Vessel {
            build_date: Some("2022-01-01".to_string()),
            psc_last_inspection: Some("2024-05-01".to_string()),
            amsa_last_inspection: Some("2024-04-01".to_string()),
            checklist_status: Some("Acknowledged".to_string()),
            ..vessel()
        };
        let status = compute_status(&v, today());
        assert_eq!(status.factors.len(), 4);
        assert_eq!(status.severity, Severity::Green);
    }

    #[test]
    fn test_any_red_wins() {
        let v = Vessel {
            build_date: Some("2022-01-01".to_string()),
            psc_last_inspection: Some("2024-01-01".to_string()),
            checklist_status: Some("Pending".to_string()),
            ..vessel()
        };
        let status = compute_status(&v, today());
        assert_eq!(status.severity, Severity::Red);
    }

    #[test]
    fn test_yellow_without_red() {
        let v = Vessel {
            build_date: Some("2022-01-01".to_string()),
            checklist_status: Some("Submitted".to_string()),
            ..vessel()
        };
        let status = compute_status(&v, today());
        assert_eq!(status.severity, Severity::Yellow);
    }

    #[test]
    fn test_factor_order_is_fixed() {
        let v = Vessel {
            checklist_status: Some("Pending".to_string()),
            amsa_last_inspection: Some("2024-05-01".to_string()),
            build_date: Some("2010-01-01".to_string()),
            psc_last_inspection: Some("2024-05-01".to_string()),
            ..vessel()
        };
        let kinds: Vec<_> = compute_status(&v, today())
            .factors
            .iter()
            .map(|f| f.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                FactorKind::Age,
                FactorKind::PscInspection,
                FactorKind::AmsaInspection,
                FactorKind::Checklist
            ]
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let engine = StatusEngine::new(StatusConfig {
            age_yellow_years: 2,
            age_red_years: 3,
            ..StatusConfig::default()
        });
        let v = Vessel {
            build_date: Some("2021-01-01".to_string()),
            ..vessel()
        };
        assert_eq!(engine.compute(&v, today()).severity, Severity::Red);
    }

    #[test]
    fn test_severity_ordering_and_parse() {
        assert!(Severity::Red > Severity::Yellow);
        assert!(Severity::Yellow > Severity::Green);
        assert!(Severity::Green > Severity::Grey);
        assert_eq!("RED".parse::<Severity>().unwrap(), Severity::Red);
        assert_eq!("gray".parse::<Severity>().unwrap(), Severity::Grey);
        assert!("blue".parse::<Severity>().is_err());
    }

    #[test]
    fn test_factor_lookup() {
        let v = Vessel {
            build_date: Some("2012-01-01".to_string()),
            ..vessel()
        };
        let status = compute_status(&v, today());
        let age = status.factor(FactorKind::Age).unwrap();
        assert_eq!(age.value, "12 years");
        assert!(status.factor(FactorKind::Checklist).is_none());
    }
}
