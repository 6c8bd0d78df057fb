use crate::blacklist::Blacklist;
use crate::dns::{domain_of, NameResolver};
use crate::drives::{DriveRecord, DriveSource};
use crate::error::Error;
use crate::identity::Identity;
use crate::progress::ProgressReporter;
use crate::storage::{
    ensure_persisted, load, load_or_new, Computer, Database, Mapping, Server, Share, User,
};
use crate::unc::parse_unc;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Per-run switches, resolved from CLI flags and persisted settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub identity: Identity,
    /// Record one mapping per share when several letters point at it.
    /// Every letter still goes through the blacklist check.
    pub dedupe: bool,
}

/// Where a single observed drive ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    /// Mapping row inserted or refreshed.
    Recorded { new_mapping: bool },
    /// The server is blacklisted; the drive was (or failed to be) unmapped.
    ServerBlacklisted { unmapped: bool },
    /// The share is blacklisted; the drive was (or failed to be) unmapped.
    ShareBlacklisted { unmapped: bool },
    /// A never-seen server did not resolve. Nothing written, drive left alone.
    DnsFailed(String),
    /// Another letter in this run already recorded the same share.
    Duplicate,
    /// The remote name is not a `\\server\share` path.
    Malformed(String),
    /// A store error rolled back this drive's changes.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub observed: usize,
    pub recorded: usize,
    pub new_mappings: usize,
    pub unmapped: usize,
    pub unmap_failures: usize,
    pub dns_skipped: usize,
    pub duplicates: usize,
    pub malformed: usize,
    pub failed: usize,
    pub duration: Duration,
    pub outcomes: Vec<(DriveRecord, DriveOutcome)>,
}

impl RunReport {
    fn push(&mut self, drive: DriveRecord, outcome: DriveOutcome) {
        match &outcome {
            DriveOutcome::Recorded { new_mapping } => {
                self.recorded += 1;
                if *new_mapping {
                    self.new_mappings += 1;
                }
            }
            DriveOutcome::ServerBlacklisted { unmapped }
            | DriveOutcome::ShareBlacklisted { unmapped } => {
                if *unmapped {
                    self.unmapped += 1;
                } else {
                    self.unmap_failures += 1;
                }
            }
            DriveOutcome::DnsFailed(_) => self.dns_skipped += 1,
            DriveOutcome::Duplicate => self.duplicates += 1,
            DriveOutcome::Malformed(_) => self.malformed += 1,
            DriveOutcome::Failed(_) => self.failed += 1,
        }
        self.outcomes.push((drive, outcome));
    }
}

/// Reconciles live drive mappings against the catalog.
pub struct ReconcileEngine<'a> {
    db: &'a Database,
    source: &'a dyn DriveSource,
    resolver: &'a dyn NameResolver,
    blacklist: Blacklist,
    options: RunOptions,
}

impl<'a> ReconcileEngine<'a> {
    pub fn new(
        db: &'a Database,
        source: &'a dyn DriveSource,
        resolver: &'a dyn NameResolver,
        options: RunOptions,
    ) -> Self {
        Self {
            db,
            source,
            resolver,
            blacklist: Blacklist::default(),
            options,
        }
    }

    pub fn with_blacklist(mut self, blacklist: Blacklist) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Full run: snapshot live drives, apply the configured blacklist to the
    /// stored catalog, then reconcile every drive.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> RunReport {
        let drives = match self.source.list_mapped_drives() {
            Ok(drives) => drives,
            Err(e) => {
                error!("Could not list mapped drives: {}", e);
                Vec::new()
            }
        };

        match self.blacklist.apply(self.db) {
            Ok(summary) if summary.servers_deactivated + summary.shares_deactivated > 0 => {
                info!(
                    "Blacklist deactivated {} server(s) and {} share(s)",
                    summary.servers_deactivated, summary.shares_deactivated
                );
            }
            Ok(_) => {}
            Err(e) => error!("Failed to apply blacklist to catalog: {}", e),
        }

        self.reconcile(drives, Utc::now(), reporter)
    }

    /// Reconcile the given drives, stamping mappings with `now`.
    ///
    /// Every drive is independent: its catalog writes commit or roll back
    /// together, and no failure stops the remaining drives.
    pub fn reconcile(
        &self,
        drives: Vec<DriveRecord>,
        now: DateTime<Utc>,
        reporter: &dyn ProgressReporter,
    ) -> RunReport {
        let start = Instant::now();
        let observed = drives.len();
        reporter.on_run_start(observed);
        let mut report = RunReport {
            observed,
            ..RunReport::default()
        };

        let mut recorded: Vec<DriveRecord> = Vec::new();
        for drive in drives {
            let repeated =
                self.options.dedupe && recorded.iter().any(|earlier| earlier.same_target(&drive));
            let outcome = match self.reconcile_one(&drive, now, !repeated) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Failed to reconcile {}: {}", drive, e);
                    DriveOutcome::Failed(e.to_string())
                }
            };
            if matches!(outcome, DriveOutcome::Recorded { .. }) {
                recorded.push(drive.clone());
            }
            reporter.on_drive_complete(&drive, &outcome);
            report.push(drive, outcome);
        }

        report.duration = start.elapsed();
        info!(
            "Reconciled {} drive(s): {} recorded, {} duplicate, {} unmapped, {} skipped by DNS",
            report.observed, report.recorded, report.duplicates, report.unmapped, report.dns_skipped
        );
        reporter.on_run_complete(&report);
        report
    }

    pub fn reconcile_drive(
        &self,
        drive: &DriveRecord,
        now: DateTime<Utc>,
    ) -> Result<DriveOutcome, Error> {
        self.reconcile_one(drive, now, true)
    }

    /// Steps for one drive inside a single transaction. With `record_mapping`
    /// off the blacklist gates still run but no mapping is written.
    fn reconcile_one(
        &self,
        drive: &DriveRecord,
        now: DateTime<Utc>,
        record_mapping: bool,
    ) -> Result<DriveOutcome, Error> {
        let unc = match parse_unc(&drive.remote_name) {
            Ok(unc) => unc,
            Err(e) => {
                warn!("Skipping {}: {}", drive.local_name, e);
                return Ok(DriveOutcome::Malformed(e.to_string()));
            }
        };
        let stamp = now.to_rfc3339();
        let tx = self.db.transaction()?;

        let server = match self.resolve_server(&unc.server, &drive.domain, &stamp)? {
            Ok(server) => server,
            Err(reason) => return Ok(DriveOutcome::DnsFailed(reason)),
        };
        if !server.active {
            tx.commit()?;
            warn!(
                "Server {} is blacklisted, unmapping {}",
                server.hostname, drive.local_name
            );
            return Ok(DriveOutcome::ServerBlacklisted {
                unmapped: self.unmap(drive),
            });
        }

        let share = self.resolve_share(&server, &unc.share)?;
        if !share.active {
            tx.commit()?;
            warn!(
                "Share {} is blacklisted, unmapping {}",
                unc.to_unc(),
                drive.local_name
            );
            return Ok(DriveOutcome::ShareBlacklisted {
                unmapped: self.unmap(drive),
            });
        }

        if !record_mapping {
            tx.commit()?;
            debug!(
                "{} repeats {} already recorded this run",
                drive.local_name,
                unc.to_unc()
            );
            return Ok(DriveOutcome::Duplicate);
        }

        let mut user = User::new(&self.options.identity.username);
        ensure_persisted(self.db, &mut user)?;
        let mut computer = Computer::new(&self.options.identity.hostname);
        ensure_persisted(self.db, &mut computer)?;

        let mapping = Mapping::new(
            persisted_id(share.id, "share")?,
            persisted_id(computer.id, "computer")?,
            persisted_id(user.id, "user")?,
            &drive.local_name,
            &drive.owning_user,
            &stamp,
        );
        let new_mapping = mapping.upsert(self.db)?;
        tx.commit()?;

        debug!(
            "Recorded {} -> {} for {} on {}",
            drive.local_name,
            unc.to_unc(),
            user.username,
            computer.hostname
        );
        Ok(DriveOutcome::Recorded { new_mapping })
    }

    /// Stored server for (`hostname`, `domain`), creating it when it passes DNS.
    /// An empty `domain` matches a stored server with that hostname under any
    /// domain, so only hostnames never seen before are resolved.
    /// The inner `Err` carries the DNS failure reason.
    fn resolve_server(
        &self,
        hostname: &str,
        domain: &str,
        stamp: &str,
    ) -> Result<Result<Server, String>, Error> {
        let (mut server, existed) = load_or_new(self.db, Server::new(hostname, domain, stamp))?;
        if existed {
            return Ok(Ok(server));
        }
        if domain.is_empty() {
            if let Some(known) = self.db.find_server_by_hostname(hostname)? {
                return Ok(Ok(known));
            }
        }

        let fqdn = match self.resolver.resolve_fqdn(hostname) {
            Ok(fqdn) => fqdn,
            Err(e) => {
                warn!("Not cataloging {}: {}", hostname, e);
                return Ok(Err(e.to_string()));
            }
        };

        if server.domain.is_empty() {
            server.domain = domain_of(&fqdn);
            if load(self.db, &mut server)? {
                return Ok(Ok(server));
            }
        }

        server.active = !self.blacklist.blocks_server(&server.hostname, &server.domain);
        ensure_persisted(self.db, &mut server)?;
        info!(
            "Discovered server {} ({}){}",
            server.hostname,
            server.domain,
            if server.active { "" } else { " [blacklisted]" }
        );
        Ok(Ok(server))
    }

    fn resolve_share(&self, server: &Server, share_name: &str) -> Result<Share, Error> {
        let server_id = persisted_id(server.id, "server")?;
        let (mut share, existed) = load_or_new(self.db, Share::new(server_id, share_name))?;
        if !existed {
            share.active = !self
                .blacklist
                .blocks_share(&server.hostname, &server.domain, share_name);
            ensure_persisted(self.db, &mut share)?;
            info!(
                r"Discovered share \\{}\{}{}",
                server.hostname,
                share.share_name,
                if share.active { "" } else { " [blacklisted]" }
            );
        }
        Ok(share)
    }

    fn unmap(&self, drive: &DriveRecord) -> bool {
        match self.source.unmap(drive) {
            Ok(()) => {
                info!("Unmapped {}", drive);
                true
            }
            Err(e) => {
                error!("Could not unmap {}: {}", drive.local_name, e);
                false
            }
        }
    }
}

fn persisted_id(id: Option<i64>, what: &str) -> Result<i64, Error> {
    id.ok_or_else(|| Error::Other(format!("{} row has no id after insert", what)))
}
