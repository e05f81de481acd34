//! `fleetwatch` - CLI for vessel readiness tracking
//!
//! Loads configuration, opens the fleet database and runs one command
//! against a freshly loaded session.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use fleetwatch::backend::{vessel_source, SqliteBackend};
use fleetwatch::cli::{
    self, Cli, Command, ConfigCommand, DefectsCommand, FlagCommand, FleetSummary, ImportCommand,
    ListCommand, OverrideCommand, StatusCommand,
};
use fleetwatch::filter::{apply_filters, sort_entities};
use fleetwatch::overrides::OverrideEdit;
use fleetwatch::session::FleetSession;
use fleetwatch::storage::read_import_file;
use fleetwatch::status::StatusEngine;
use fleetwatch::table::{build_columns, default_defect_columns, RendererRegistry};
use fleetwatch::view::{filtered_vessels, EnrichedVessel, FleetView};
use fleetwatch::{init_logging, Clock, Config, DefectReport, Storage, SystemClock, VesselRecord};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone())?;
    cli.apply_overrides(&mut config);

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Import(import_cmd) => handle_import(&config, &import_cmd),
        Command::List(list_cmd) => handle_list(&config, &list_cmd).await,
        Command::Status(status_cmd) => handle_status(&config, &status_cmd).await,
        Command::Override(override_cmd) => handle_override(&config, override_cmd).await,
        Command::Flag(flag_cmd) => handle_flag(&config, flag_cmd).await,
        Command::Defects(defects_cmd) => handle_defects(&config, &defects_cmd).await,
    }
}

fn open_backend(config: &Config) -> anyhow::Result<SqliteBackend> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("opening fleet database {}", path.display()))?;
    Ok(SqliteBackend::new(storage))
}

async fn open_session(
    config: &Config,
    backend: &SqliteBackend,
    user_id: String,
) -> anyhow::Result<FleetSession> {
    let session = FleetSession::new(
        vessel_source(backend.clone(), config.cache_ttl()),
        Arc::new(backend.clone()),
        Arc::new(backend.clone()),
        user_id,
    )
    .with_engine(StatusEngine::new(config.status.clone()))
    .with_block_invalid(config.overrides.block_invalid);
    session.refresh().await?;
    Ok(session)
}

fn handle_import(config: &Config, cmd: &ImportCommand) -> anyhow::Result<()> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("opening fleet database {}", path.display()))?;
    debug!("Importing from {}", cmd.file.display());

    if cmd.defects {
        let defects: Vec<DefectReport> = read_import_file(&cmd.file)
            .with_context(|| format!("importing {}", cmd.file.display()))?;
        for defect in &defects {
            storage.upsert_defect(defect)?;
        }
        info!("Imported {} defect reports", defects.len());
        println!("Imported {} defect reports", defects.len());
    } else {
        let records: Vec<VesselRecord> = read_import_file(&cmd.file)
            .with_context(|| format!("importing {}", cmd.file.display()))?;
        let count = storage.import_vessels(&records)?;
        println!("Imported {count} vessels");
    }
    Ok(())
}

async fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let query = cmd.to_query(config)?;
    let user_id = config.session.user_id.clone().unwrap_or_default();
    let backend = open_backend(config)?;
    let session = open_session(config, &backend, user_id).await?;

    let page = session.page(&query).await;
    let columns =
        build_columns::<EnrichedVessel>(&config.column_mapping(), &RendererRegistry::default());
    println!("{}", cli::format_page(&page, &columns, cmd.format)?);
    Ok(())
}

async fn handle_status(config: &Config, cmd: &StatusCommand) -> anyhow::Result<()> {
    let user_id = config.session.user_id.clone().unwrap_or_default();
    let backend = open_backend(config)?;
    let session = open_session(config, &backend, user_id).await?;
    let vessels = session.vessels().await;
    let flags = session.flags().await;
    let today = SystemClock.today();
    let view = FleetView::new(StatusEngine::new(config.status.clone()));

    if let Some(id) = cmd.id {
        let vessel = vessels
            .iter()
            .find(|v| v.id == id)
            .ok_or(fleetwatch::Error::VesselNotFound { id })?;
        let enriched = view.enrich(&[vessel], &flags, today);
        if let Some(first) = enriched.first() {
            println!("{}", cli::format_status(first, cmd.json)?);
        }
        return Ok(());
    }

    let baseline = filtered_vessels(&vessels, config.departed_horizon_days(), today);
    let enriched = view.enrich(&baseline, &flags, today);
    let stats = backend.storage().lock().await.stats()?;
    let summary = FleetSummary::new(&enriched, stats);
    println!("{}", cli::format_summary(&summary, cmd.json)?);
    Ok(())
}

async fn handle_override(config: &Config, cmd: OverrideCommand) -> anyhow::Result<()> {
    let (edit, dry_run) = match cmd {
        OverrideCommand::Set {
            id,
            field,
            value,
            dry_run,
        } => (OverrideEdit::from_input(id, field.into(), Some(&value))?, dry_run),
        OverrideCommand::Clear { id, field } => {
            (OverrideEdit::from_input(id, field.into(), None)?, false)
        }
    };

    let user_id = config.session.user_id.clone().unwrap_or_default();
    let backend = open_backend(config)?;
    let session = open_session(config, &backend, user_id).await?;

    if dry_run {
        let preview = session.preview_override(&edit).await?;
        println!("{}", cli::format_preview(edit.vessel_id, &preview, false));
        return Ok(());
    }

    let vessel_id = edit.vessel_id;
    let preview = session.save_override(edit).await?;
    println!("{}", cli::format_preview(vessel_id, &preview, true));
    Ok(())
}

async fn handle_flag(config: &Config, cmd: FlagCommand) -> anyhow::Result<()> {
    let user_id = cli::require_user(config)?;
    let backend = open_backend(config)?;
    let session = open_session(config, &backend, user_id.clone()).await?;

    match cmd {
        FlagCommand::Set { id, color } => {
            if !session.vessels().await.iter().any(|v| v.id == id) {
                return Err(fleetwatch::Error::VesselNotFound { id }.into());
            }
            session.set_flag(id, color.into()).await?;
            debug!(vessel_id = id, user = %user_id, "Flag updated");
            println!("{}", cli::format_flags(&*session.flags().await, &user_id, false)?);
        }
        FlagCommand::List { json } => {
            println!("{}", cli::format_flags(&*session.flags().await, &user_id, json)?);
        }
    }
    Ok(())
}

async fn handle_defects(config: &Config, cmd: &DefectsCommand) -> anyhow::Result<()> {
    let backend = open_backend(config)?;
    let defects = backend.storage().lock().await.list_defects(cmd.vessel)?;

    let filters = cmd.filters();
    let mut visible: Vec<DefectReport> = apply_filters(&defects, &filters)
        .into_iter()
        .cloned()
        .collect();
    sort_entities(&mut visible, &cmd.sort(), SystemClock.today());

    let columns =
        build_columns::<DefectReport>(&default_defect_columns(), &RendererRegistry::default());
    println!("{}", cli::format_defects(&visible, &columns, cmd.format)?);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Status]");
                println!(
                    "  Age yellow/red:     {} / {} years",
                    config.status.age_yellow_years, config.status.age_red_years
                );
                println!(
                    "  Inspection g/y:     {} / {} months",
                    config.status.inspection_green_months, config.status.inspection_yellow_months
                );
                println!();
                println!("[View]");
                println!("  Sort key:           {}", config.sort_key());
                println!("  Descending:         {}", config.view.descending);
                println!("  Overdue first:      {}", config.view.overdue_first);
                println!("  Page size:          {}", config.view.page_size);
                println!(
                    "  Hide departed after: {} days",
                    config.view.hide_departed_after_days
                );
                println!();
                println!("[Overrides]");
                println!("  Block invalid:      {}", config.overrides.block_invalid);
                println!();
                println!("[Cache]");
                println!("  TTL seconds:        {}", config.cache.ttl_seconds);
                println!();
                println!("[Session]");
                println!(
                    "  User id:            {}",
                    config.session.user_id.as_deref().unwrap_or("(unset)")
                );
                println!("  Columns:            {}", config.column_mapping().len());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("invalid configuration {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
