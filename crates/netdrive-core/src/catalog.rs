use crate::drives::DriveRecord;
use crate::error::Error;
use crate::identity::Identity;
use crate::storage::{
    ensure_persisted, load_or_new, Computer, Database, Mapping, MappingView, Server, Share, User,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

/// Portable snapshot of one user's mappings on one computer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub username: String,
    pub hostname: String,
    pub exported_at: String,
    pub entries: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub server: String,
    pub domain: String,
    pub server_active: bool,
    pub share: String,
    pub share_active: bool,
    pub letter: String,
    pub remote_username: String,
    pub last_seen: String,
}

impl From<MappingView> for CatalogEntry {
    fn from(view: MappingView) -> Self {
        Self {
            server: view.server_hostname,
            domain: view.server_domain,
            server_active: view.server_active,
            share: view.share_name,
            share_active: view.share_active,
            letter: view.letter,
            remote_username: view.remote_username,
            last_seen: view.last_seen,
        }
    }
}

impl CatalogEntry {
    pub fn unc(&self) -> String {
        format!(r"\\{}\{}", self.server, self.share)
    }
}

impl Catalog {
    pub fn export(db: &Database, identity: &Identity, now: DateTime<Utc>) -> Result<Self, Error> {
        let entries: Vec<CatalogEntry> = db
            .mappings_for(&identity.username, &identity.hostname)?
            .into_iter()
            .map(CatalogEntry::from)
            .collect();
        debug!(
            "Exported {} mapping(s) for {} on {}",
            entries.len(),
            identity.username,
            identity.hostname
        );
        Ok(Self {
            username: identity.username.clone(),
            hostname: identity.hostname.clone(),
            exported_at: now.to_rfc3339(),
            entries,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("Wrote catalog with {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Drives a reconciliation should expect to see: mappings whose server and share are active.
    pub fn active_drives(&self) -> Vec<DriveRecord> {
        self.entries
            .iter()
            .filter(|entry| entry.server_active && entry.share_active)
            .map(|entry| DriveRecord {
                local_name: entry.letter.clone(),
                remote_name: entry.unc(),
                owning_user: entry.remote_username.clone(),
                domain: entry.domain.clone(),
                persistent: true,
            })
            .collect()
    }

    /// Write the catalog's rows into `db` under its own user and computer.
    ///
    /// Rows that already exist keep their stored `active` flags, and a mapping
    /// is only overwritten when the catalog saw it more recently.
    /// Returns the number of mappings inserted or refreshed.
    pub fn import(&self, db: &Database) -> Result<usize, Error> {
        let tx = db.transaction()?;

        let mut user = User::new(&self.username);
        ensure_persisted(db, &mut user)?;
        let mut computer = Computer::new(&self.hostname);
        ensure_persisted(db, &mut computer)?;
        let (user_id, computer_id) = match (user.id, computer.id) {
            (Some(user_id), Some(computer_id)) => (user_id, computer_id),
            _ => return Err(Error::Other("user or computer row missing after insert".into())),
        };

        let mut written = 0;
        for entry in &self.entries {
            let last_seen = to_utc(&entry.last_seen)?;
            let stamp = last_seen.to_rfc3339();
            let mut server = Server::new(&entry.server, &entry.domain, &stamp);
            server.active = entry.server_active;
            ensure_persisted(db, &mut server)?;
            let server_id = server
                .id
                .ok_or_else(|| Error::Other(format!("server {} has no id", entry.server)))?;

            let mut share = Share::new(server_id, &entry.share);
            share.active = entry.share_active;
            ensure_persisted(db, &mut share)?;
            let share_id = share
                .id
                .ok_or_else(|| Error::Other(format!("share {} has no id", entry.unc())))?;

            let mapping = Mapping::new(
                share_id,
                computer_id,
                user_id,
                &entry.letter,
                &entry.remote_username,
                &stamp,
            );
            let (stored, existed) = load_or_new(db, mapping.clone())?;
            if existed && to_utc(&stored.last_seen).is_ok_and(|stored| stored >= last_seen) {
                continue;
            }
            mapping.upsert(db)?;
            written += 1;
        }

        tx.commit()?;
        info!(
            "Imported {} of {} catalog entries for {} on {}",
            written,
            self.entries.len(),
            self.username,
            self.hostname
        );
        Ok(written)
    }
}

/// Timestamps are stored in UTC so they order correctly as text.
fn to_utc(stamp: &str) -> Result<DateTime<Utc>, Error> {
    Ok(DateTime::parse_from_rfc3339(stamp)?.with_timezone(&Utc))
}
