use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::logging::Verbosity;

#[derive(Debug, Parser)]
#[command(name = "netdrive")]
#[command(about = "Catalog mapped network drives and enforce the share blacklist", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub flags: RunFlags,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct RunFlags {
    /// Write a log file for this run, whatever the `logging` setting says
    #[arg(long, global = true)]
    pub logging: bool,
    /// Collapse duplicate drive observations before reconciling
    #[arg(long, global = true)]
    pub dedupe: bool,
    /// No console output
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub silent: bool,
    /// Debug-level console output
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl RunFlags {
    pub fn verbosity(&self) -> Verbosity {
        if self.silent {
            Verbosity::Silent
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile currently mapped drives against the catalog (default)
    Run,
    /// Write this user's catalog to a JSON file
    Export {
        path: PathBuf,
        /// User to export (defaults to the logged-on user)
        #[arg(long)]
        user: Option<String>,
        /// Computer to export (defaults to this machine)
        #[arg(long)]
        computer: Option<String>,
    },
    /// Load a catalog JSON file into the database
    Import { path: PathBuf },
    /// List mappings not seen for a number of days
    Stale {
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
    /// List or (de)activate servers; patterns accept * and ?
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },
    /// List or (de)activate shares; patterns accept * and ?
    Share {
        #[command(subcommand)]
        action: ShareAction,
    },
    /// Show or change persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Subcommand)]
pub enum ServerAction {
    List,
    Activate {
        hostname: String,
        #[arg(long, default_value = "")]
        domain: String,
    },
    Deactivate {
        hostname: String,
        #[arg(long, default_value = "")]
        domain: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ShareAction {
    List,
    Activate { hostname: String, share: String },
    Deactivate { hostname: String, share: String },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    List,
    Set { key: String, value: String },
}

const LEGACY_FLAGS: [&str; 4] = ["logging", "dedupe", "silent", "verbose"];

/// Accept the bare `logging` / `dedupe` / `silent` / `verbose` tokens older
/// logon scripts pass, with or without a `-` or `/` prefix. Only tokens ahead
/// of the first other argument are rewritten, so values like
/// `settings set logging true` pass through.
pub fn normalize_legacy_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut leading = true;

    for arg in args {
        let legacy = arg
            .to_str()
            .filter(|text| !text.starts_with("--"))
            .map(|text| text.trim_start_matches(['-', '/']).to_ascii_lowercase())
            .filter(|bare| LEGACY_FLAGS.contains(&bare.as_str()));

        match legacy {
            Some(bare) if leading => normalized.push(OsString::from(format!("--{}", bare))),
            _ => {
                leading = false;
                normalized.push(arg);
            }
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(normalize_legacy_args(args.iter().map(OsString::from)))
    }

    #[test]
    fn test_legacy_tokens() {
        let cli = parse(&["netdrive", "logging", "/DEDUPE", "-silent"]);
        assert!(cli.flags.logging);
        assert!(cli.flags.dedupe);
        assert!(cli.flags.silent);
        assert!(cli.command.is_none());
        assert_eq!(cli.flags.verbosity(), Verbosity::Silent);
    }

    #[test]
    fn test_subcommand_with_global_flags() {
        let cli = parse(&["netdrive", "verbose", "stale", "--days", "7"]);
        assert!(matches!(cli.command, Some(Commands::Stale { days: 7 })));
        assert_eq!(cli.flags.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_positional_values_untouched() {
        let cli = parse(&["netdrive", "settings", "set", "logging", "true"]);
        match cli.command {
            Some(Commands::Settings {
                action: SettingsAction::Set { key, value },
            }) => {
                assert_eq!(key, "logging");
                assert_eq!(value, "true");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
