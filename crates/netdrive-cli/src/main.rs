mod commands;
mod logging;
mod progress;

use std::env;
use std::fs;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use colored::*;
use commands::{
    normalize_legacy_args, Cli, Commands, RunFlags, ServerAction, SettingsAction, ShareAction,
};
use dotenv::dotenv;
use netdrive_core::blacklist::{self, Blacklist};
use netdrive_core::catalog::Catalog;
use netdrive_core::dns::SystemResolver;
use netdrive_core::platform::SystemDrives;
use netdrive_core::storage::Database;
use netdrive_core::{settings, AppConfig, Identity, ReconcileEngine, RunOptions, RunReport};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse_from(normalize_legacy_args(env::args_os()));
    let verbosity = args.flags.verbosity();

    let config = match netdrive_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            let _guard = logging::init_logger(verbosity, None);
            error!("Error loading configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let db = open_store(&config);

    let log_file = match &db {
        Ok(db) if args.flags.logging || settings::flag(db, settings::LOGGING).unwrap_or(false) => {
            Some(settings::log_path(db, &config).unwrap_or_else(|_| config.log_path()))
        }
        Err(_) if args.flags.logging => Some(config.log_path()),
        _ => None,
    };
    let _guard = logging::init_logger(verbosity, log_file.as_deref());

    let db = match db {
        Ok(db) => db,
        Err(err) => {
            error!("Error opening catalog: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    info!("Now running netdrive v{}", env!("CARGO_PKG_VERSION"));

    let result = match args.command.unwrap_or(Commands::Run) {
        Commands::Run => run_reconcile(&config, &db, args.flags),
        Commands::Export {
            path,
            user,
            computer,
        } => {
            let current = Identity::current();
            let identity = Identity::new(
                user.as_deref().unwrap_or(&current.username),
                computer.as_deref().unwrap_or(&current.hostname),
            );
            run_export(&db, &identity, &path)
        }
        Commands::Import { path } => run_import(&db, &path),
        Commands::Stale { days } => run_stale(&db, days),
        Commands::Server { action } => run_server(&db, action),
        Commands::Share { action } => run_share(&db, action),
        Commands::Settings { action } => run_settings(&db, action),
        Commands::PrintConfig => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn open_store(config: &AppConfig) -> anyhow::Result<Database> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let path = config.database_path();
    let db = Database::open(&path).with_context(|| format!("opening {}", path.display()))?;
    settings::seed_defaults(&db, config, Utc::now()).context("seeding settings")?;
    Ok(db)
}

fn run_reconcile(config: &AppConfig, db: &Database, flags: RunFlags) -> anyhow::Result<()> {
    let dedupe = flags.dedupe || settings::flag(db, settings::DEDUPE)?;
    let blacklist = Blacklist::from_entries(&config.blacklist).context("invalid blacklist entry")?;
    let identity = Identity::current();
    info!(
        "Reconciling drives for {} on {}",
        identity.username, identity.hostname
    );

    let source = SystemDrives;
    let resolver = SystemResolver::new(Duration::from_millis(config.dns_timeout_ms));
    let engine = ReconcileEngine::new(db, &source, &resolver, RunOptions { identity, dedupe })
        .with_blacklist(blacklist);

    let reporter = CliReporter::new(flags.verbosity() != logging::Verbosity::Silent);
    let report = engine.run(&reporter);

    info!("{}", run_summary(&report));
    if report.unmap_failures > 0 {
        warn!("{} blacklisted drive(s) could not be unmapped", report.unmap_failures);
    }
    Ok(())
}

/// Plain-text run summary for the log. Colour stays in `CliReporter`.
fn run_summary(report: &RunReport) -> String {
    format!(
        "{} observed, {} recorded ({} new, {} duplicate), {} unmapped, {} DNS skipped, {} malformed, {} failed",
        report.observed,
        report.recorded,
        report.new_mappings,
        report.duplicates,
        report.unmapped,
        report.dns_skipped,
        report.malformed,
        report.failed,
    )
}

fn run_export(db: &Database, identity: &Identity, path: &std::path::Path) -> anyhow::Result<()> {
    let catalog = Catalog::export(db, identity, Utc::now())?;
    catalog
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(
        "Exported {} mapping(s) for {} on {} to {}",
        catalog.entries.len(),
        identity.username,
        identity.hostname,
        path.display()
    );
    Ok(())
}

fn run_import(db: &Database, path: &std::path::Path) -> anyhow::Result<()> {
    let catalog = Catalog::load(path).with_context(|| format!("reading {}", path.display()))?;
    let written = catalog.import(db)?;
    info!(
        "Imported {} of {} mapping(s) for {} on {}",
        written,
        catalog.entries.len(),
        catalog.username,
        catalog.hostname
    );
    Ok(())
}

fn run_stale(db: &Database, days: i64) -> anyhow::Result<()> {
    let cutoff = Utc::now() - chrono::Duration::days(days);
    let stale = db.stale_mappings(cutoff)?;
    if stale.is_empty() {
        println!("No mappings older than {} day(s)", days);
        return Ok(());
    }
    for view in &stale {
        println!(
            "{:<16} {:<16} {:<4} {:<40} last seen {}",
            view.username,
            view.computer,
            view.letter,
            view.unc(),
            view.last_seen.dimmed()
        );
    }
    println!("{} stale mapping(s)", format!("{}", stale.len()).yellow());
    Ok(())
}

fn state(active: bool) -> ColoredString {
    if active {
        "active".green()
    } else {
        "inactive".red()
    }
}

fn run_server(db: &Database, action: ServerAction) -> anyhow::Result<()> {
    match action {
        ServerAction::List => {
            for server in db.list_servers()? {
                println!(
                    "{:<24} {:<24} {:<8} first seen {}",
                    server.hostname,
                    server.domain,
                    state(server.active),
                    server.first_seen
                );
            }
        }
        ServerAction::Activate { hostname, domain } => {
            let changed = blacklist::set_servers_active(db, &hostname, &domain, true)?;
            println!("{} server(s) activated", changed);
        }
        ServerAction::Deactivate { hostname, domain } => {
            let changed = blacklist::set_servers_active(db, &hostname, &domain, false)?;
            println!("{} server(s) deactivated", changed);
        }
    }
    Ok(())
}

fn run_share(db: &Database, action: ShareAction) -> anyhow::Result<()> {
    match action {
        ShareAction::List => {
            for view in db.list_shares()? {
                println!(
                    r"\\{}\{:<30} {}",
                    view.server.hostname,
                    view.share.share_name,
                    state(view.server.active && view.share.active)
                );
            }
        }
        ShareAction::Activate { hostname, share } => {
            let changed = blacklist::set_shares_active(db, &hostname, &share, true)?;
            println!("{} share(s) activated", changed);
        }
        ShareAction::Deactivate { hostname, share } => {
            let changed = blacklist::set_shares_active(db, &hostname, &share, false)?;
            println!("{} share(s) deactivated", changed);
        }
    }
    Ok(())
}

fn run_settings(db: &Database, action: SettingsAction) -> anyhow::Result<()> {
    match action {
        SettingsAction::List => {
            for setting in db.list_settings()? {
                println!("{:<12} {}", setting.setting, setting.value);
            }
        }
        SettingsAction::Set { key, value } => {
            db.set_setting(&key, &value)?;
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_summary_has_no_ansi_codes() {
        colored::control::set_override(true);
        let report = RunReport {
            observed: 3,
            recorded: 1,
            new_mappings: 1,
            duplicates: 1,
            unmapped: 1,
            ..RunReport::default()
        };
        let summary = run_summary(&report);
        colored::control::unset_override();

        assert!(!summary.contains('\x1b'));
        assert!(summary.starts_with("3 observed, 1 recorded (1 new, 1 duplicate), 1 unmapped"));
    }
}
