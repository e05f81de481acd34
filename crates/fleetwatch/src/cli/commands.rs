//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands and how list
//! arguments combine with configured defaults.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use tracing::debug;

use crate::config::Config;
use crate::dates;
use crate::error::{Error, Result};
use crate::filter::{FilterState, SortDirection, SortKey, SortSpec};
use crate::flags::FlagColor;
use crate::status::Severity;
use crate::vessel::ScheduleField;
use crate::view::{PageRequest, ViewQuery};

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// JSON file holding an array of records
    pub file: PathBuf,

    /// The file holds defect reports instead of vessels
    #[arg(long)]
    pub defects: bool,
}

/// List command arguments.
#[derive(Debug, Default, Args)]
pub struct ListCommand {
    /// Only vessels with these statuses (comma-separated)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub severity: Vec<SeverityArg>,

    /// Only vessels with these flags (comma-separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub flag: Vec<FlagArg>,

    /// Free-text search over name, IMO, type and comments
    #[arg(long)]
    pub search: Option<String>,

    /// Only these vessel types (repeatable)
    #[arg(long = "type")]
    pub vessel_type: Vec<String>,

    /// Minimum quality score
    #[arg(long)]
    pub min_quality: Option<f64>,

    /// Only vessels with an ETA on or after this date
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Only vessels with an ETA on or before this date
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Sort key (defaults to view.sort_key)
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Sort descending (ETA, ETB and ETD keep overdue-first order unless
    /// --no-overdue-first is also given)
    #[arg(long)]
    pub desc: bool,

    /// Do not put overdue vessels first
    #[arg(long)]
    pub no_overdue_first: bool,

    /// Include vessels that departed long ago
    #[arg(long)]
    pub all: bool,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (defaults to view.page_size)
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

fn parse_date_arg(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| dates::parse_date(s).ok_or_else(|| Error::unknown_value("date", s)))
        .transpose()
}

impl ListCommand {
    /// Combine these arguments with configured defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a date bound is not a date.
    pub fn to_query(&self, config: &Config) -> Result<ViewQuery> {
        let filters = FilterState {
            severities: self.severity.iter().copied().map(Severity::from).collect(),
            flags: self.flag.iter().copied().map(FlagColor::from).collect(),
            search: self.search.clone(),
            categories: self.vessel_type.iter().cloned().collect(),
            min_quality: self.min_quality,
            date_from: parse_date_arg(self.from.as_deref())?,
            date_to: parse_date_arg(self.to.as_deref())?,
        };

        let sort = SortSpec {
            key: self.sort.map_or_else(|| config.sort_key(), SortKey::from),
            direction: if self.desc || config.view.descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
            overdue_first: config.view.overdue_first && !self.no_overdue_first,
        };
        if sort.direction == SortDirection::Descending && sort.ignores_direction() {
            debug!(key = %sort.key, "Descending order ignored while overdue-first is on");
        }

        let page = PageRequest {
            page: self.page,
            per_page: self.per_page.unwrap_or(config.view.page_size),
        };

        Ok(ViewQuery {
            filters,
            sort,
            page,
            horizon_days: if self.all {
                None
            } else {
                config.departed_horizon_days()
            },
        })
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Vessel id; omit for a fleet summary
    pub id: Option<i64>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Override commands.
#[derive(Debug, Subcommand)]
pub enum OverrideCommand {
    /// Set a user override on a scheduling field
    Set {
        /// Vessel id
        id: i64,
        /// Field to override
        #[arg(value_enum)]
        field: FieldArg,
        /// New date
        value: String,
        /// Show the effect without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Clear a user override, reverting to the system value
    Clear {
        /// Vessel id
        id: i64,
        /// Field to clear
        #[arg(value_enum)]
        field: FieldArg,
    },
}

/// Flag commands.
#[derive(Debug, Subcommand)]
pub enum FlagCommand {
    /// Set (or with `none`, remove) your flag on a vessel
    Set {
        /// Vessel id
        id: i64,
        /// Flag color
        #[arg(value_enum)]
        color: FlagArg,
    },

    /// List your flags
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Defects command arguments.
#[derive(Debug, Args)]
pub struct DefectsCommand {
    /// Only defects of this vessel
    #[arg(long)]
    pub vessel: Option<i64>,

    /// Free-text search over equipment, description and planned action
    #[arg(long)]
    pub search: Option<String>,

    /// Only these criticalities (repeatable)
    #[arg(long)]
    pub criticality: Vec<String>,

    /// Sort by reported date instead of target date
    #[arg(long)]
    pub by_reported: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl DefectsCommand {
    /// Filter state for these arguments.
    #[must_use]
    pub fn filters(&self) -> FilterState {
        FilterState {
            search: self.search.clone(),
            categories: self.criticality.iter().cloned().collect(),
            ..FilterState::default()
        }
    }

    /// Sort for these arguments.
    #[must_use]
    pub fn sort(&self) -> SortSpec {
        SortSpec {
            key: if self.by_reported {
                SortKey::ReportedDate
            } else {
                SortKey::TargetDate
            },
            ..SortSpec::default()
        }
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Status argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    /// No data
    Grey,
    /// Green
    Green,
    /// Yellow
    Yellow,
    /// Red
    Red,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Grey => Self::Grey,
            SeverityArg::Green => Self::Green,
            SeverityArg::Yellow => Self::Yellow,
            SeverityArg::Red => Self::Red,
        }
    }
}

/// Flag color argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlagArg {
    /// No flag
    None,
    /// Green flag
    Green,
    /// Yellow flag
    Yellow,
    /// Red flag
    Red,
}

impl From<FlagArg> for FlagColor {
    fn from(arg: FlagArg) -> Self {
        match arg {
            FlagArg::None => Self::None,
            FlagArg::Green => Self::Green,
            FlagArg::Yellow => Self::Yellow,
            FlagArg::Red => Self::Red,
        }
    }
}

/// Scheduling field argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldArg {
    /// Estimated arrival
    Eta,
    /// Estimated berthing
    Etb,
    /// Estimated departure
    Etd,
}

impl From<FieldArg> for ScheduleField {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::Eta => Self::Eta,
            FieldArg::Etb => Self::Etb,
            FieldArg::Etd => Self::Etd,
        }
    }
}

/// Sort key argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Resolved ETA
    Eta,
    /// Resolved ETB
    Etb,
    /// Resolved ETD
    Etd,
    /// Build date
    BuildDate,
    /// Last PSC inspection
    PscInspection,
    /// Last AMSA inspection
    AmsaInspection,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Eta => Self::Eta,
            SortArg::Etb => Self::Etb,
            SortArg::Etd => Self::Etd,
            SortArg::BuildDate => Self::BuildDate,
            SortArg::PscInspection => Self::PscInspection,
            SortArg::AmsaInspection => Self::AmsaInspection,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
