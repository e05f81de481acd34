//! Command-line interface for fleetwatch.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DefectsCommand, FieldArg, FlagArg, FlagCommand, ImportCommand, ListCommand,
    OutputFormat, OverrideCommand, SeverityArg, SortArg, StatusCommand,
};
pub use output::{
    format_defects, format_flags, format_page, format_preview, format_status, format_summary,
    FleetSummary,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::Verbosity;

/// fleetwatch - Track vessel readiness at a glance
///
/// Computes a traffic-light status for every vessel from its age, inspection
/// history and checklist state, and lets you override arrival, berthing and
/// departure estimates and flag vessels for follow-up.
#[derive(Debug, Parser)]
#[command(name = "fleetwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the database (overrides storage.database_path)
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// User id that owns flags (overrides session.user_id)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load vessel records or defect reports from a JSON file
    Import(ImportCommand),

    /// List vessels with status, schedule and flags
    List(ListCommand),

    /// Show one vessel's status breakdown, or a fleet summary
    Status(StatusCommand),

    /// Set or clear schedule overrides
    #[command(subcommand)]
    Override(OverrideCommand),

    /// Manage your vessel flags
    #[command(subcommand)]
    Flag(FlagCommand),

    /// List defect reports
    Defects(DefectsCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }

    /// Apply command-line overrides to a loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(db) = &self.db {
            config.storage.database_path = Some(db.clone());
        }
        if let Some(user) = &self.user {
            config.session.user_id = Some(user.clone());
        }
    }
}

/// The configured user id.
///
/// # Errors
///
/// Returns [`Error::MissingUser`] if none is set or it is blank.
pub fn require_user(config: &Config) -> Result<String> {
    config
        .session
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .ok_or(Error::MissingUser)
}
