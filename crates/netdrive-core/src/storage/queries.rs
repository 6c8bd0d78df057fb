use super::models::{Server, Setting, Share};
use super::sqlite::Database;
use super::table::identifier;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Result};
use tracing::debug;

/// A stored mapping joined with its share, server, user and computer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingView {
    pub username: String,
    pub computer: String,
    pub server_hostname: String,
    pub server_domain: String,
    pub server_active: bool,
    pub share_name: String,
    pub share_active: bool,
    pub letter: String,
    pub remote_username: String,
    pub last_seen: String,
}

impl MappingView {
    pub fn unc(&self) -> String {
        format!(r"\\{}\{}", self.server_hostname, self.share_name)
    }

    pub fn is_active(&self) -> bool {
        self.server_active && self.share_active
    }
}

/// A stored share together with the server it lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareView {
    pub server: Server,
    pub share: Share,
}

const MAPPING_VIEW_SELECT: &str = "SELECT u.username, c.hostname, s.hostname, s.domain, s.active, \
            sh.shareName, sh.active, m.letter, m.username, m.date \
     FROM mappings m \
     JOIN shares sh ON sh.shareID = m.shareID \
     JOIN servers s ON s.serverID = sh.serverID \
     JOIN users u ON u.userID = m.userID \
     JOIN computers c ON c.computerID = m.computerID";

fn mapping_view(row: &rusqlite::Row<'_>) -> Result<MappingView> {
    Ok(MappingView {
        username: row.get(0)?,
        computer: row.get(1)?,
        server_hostname: row.get(2)?,
        server_domain: row.get(3)?,
        server_active: row.get(4)?,
        share_name: row.get(5)?,
        share_active: row.get(6)?,
        letter: row.get(7)?,
        remote_username: row.get(8)?,
        last_seen: row.get(9)?,
    })
}

impl Database {
    // ── Settings ─────────────────────────────────────────────────

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.connection()
            .query_row(
                "SELECT value FROM settings WHERE setting = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.connection().execute(
            "INSERT INTO settings (setting, value) VALUES (?1, ?2) \
             ON CONFLICT(setting) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        debug!("Setting {} = {}", key, value);
        Ok(())
    }

    /// Insert any settings not yet present. Existing values are left alone.
    pub fn seed_settings(&self, defaults: &[Setting]) -> Result<usize> {
        let mut stmt = self
            .connection()
            .prepare_cached("INSERT OR IGNORE INTO settings (setting, value) VALUES (?1, ?2)")?;
        let mut added = 0;
        for setting in defaults {
            added += stmt.execute(params![setting.setting, setting.value])?;
        }
        if added > 0 {
            debug!("Seeded {} default settings", added);
        }
        Ok(added)
    }

    pub fn list_settings(&self) -> Result<Vec<Setting>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT setting, value FROM settings ORDER BY setting")?;
        let settings = stmt
            .query_map([], |row| {
                Ok(Setting {
                    setting: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(settings)
    }

    // ── Servers & Shares ─────────────────────────────────────────

    pub fn list_servers(&self) -> Result<Vec<Server>> {
        let mut stmt = self.connection().prepare(
            "SELECT serverID, hostname, domain, active, date FROM servers ORDER BY hostname, domain",
        )?;
        let servers = stmt
            .query_map([], |row| {
                Ok(Server {
                    id: Some(row.get(0)?),
                    hostname: row.get(1)?,
                    domain: row.get(2)?,
                    active: row.get(3)?,
                    first_seen: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(servers)
    }

    /// First stored server with `hostname`, whatever its domain.
    pub fn find_server_by_hostname(&self, hostname: &str) -> Result<Option<Server>> {
        self.connection()
            .query_row(
                "SELECT serverID, hostname, domain, active, date FROM servers \
                 WHERE hostname = ?1 ORDER BY serverID LIMIT 1",
                params![hostname],
                |row| {
                    Ok(Server {
                        id: Some(row.get(0)?),
                        hostname: row.get(1)?,
                        domain: row.get(2)?,
                        active: row.get(3)?,
                        first_seen: row.get(4)?,
                    })
                },
            )
            .optional()
    }

    pub fn list_shares(&self) -> Result<Vec<ShareView>> {
        let mut stmt = self.connection().prepare(
            "SELECT s.serverID, s.hostname, s.domain, s.active, s.date, \
                    sh.shareID, sh.shareName, sh.active \
             FROM shares sh JOIN servers s ON s.serverID = sh.serverID \
             ORDER BY s.hostname, sh.shareName",
        )?;
        let shares = stmt
            .query_map([], |row| {
                let server_id: i64 = row.get(0)?;
                Ok(ShareView {
                    server: Server {
                        id: Some(server_id),
                        hostname: row.get(1)?,
                        domain: row.get(2)?,
                        active: row.get(3)?,
                        first_seen: row.get(4)?,
                    },
                    share: Share {
                        id: Some(row.get(5)?),
                        server_id,
                        share_name: row.get(6)?,
                        active: row.get(7)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(shares)
    }

    // ── Mappings ─────────────────────────────────────────────────

    /// Every mapping recorded for `username` on computer `hostname`.
    pub fn mappings_for(&self, username: &str, hostname: &str) -> Result<Vec<MappingView>> {
        let sql = format!(
            "{} WHERE u.username = ?1 AND c.hostname = ?2 ORDER BY m.letter",
            MAPPING_VIEW_SELECT
        );
        let mut stmt = self.connection().prepare(&sql)?;
        let rows = stmt
            .query_map(params![username, hostname], mapping_view)?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Mappings not observed live since `cutoff`. Dates are compared as
    /// instants, so stored offsets other than UTC still order correctly.
    pub fn stale_mappings(&self, cutoff: DateTime<Utc>) -> Result<Vec<MappingView>> {
        let sql = format!(
            "{} WHERE julianday(m.date) < julianday(?1) ORDER BY julianday(m.date), u.username",
            MAPPING_VIEW_SELECT
        );
        let mut stmt = self.connection().prepare(&sql)?;
        let rows = stmt
            .query_map(params![cutoff.to_rfc3339()], mapping_view)?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", identifier(table)?);
        self.connection().query_row(&sql, [], |row| row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_setting_upserts() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_setting("logging").unwrap(), None);
        db.set_setting("logging", "false").unwrap();
        db.set_setting("logging", "true").unwrap();
        assert_eq!(db.get_setting("logging").unwrap().as_deref(), Some("true"));
        assert_eq!(db.count_rows("settings").unwrap(), 1);
    }

    #[test]
    fn test_seed_settings_keeps_existing_values() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("dedupe", "true").unwrap();
        let added = db
            .seed_settings(&[Setting::new("dedupe", "false"), Setting::new("logging", "false")])
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(db.get_setting("dedupe").unwrap().as_deref(), Some("true"));
        assert_eq!(db.list_settings().unwrap().len(), 2);
    }

    #[test]
    fn test_find_server_by_hostname_ignores_domain() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.find_server_by_hostname("FS01").unwrap(), None);

        let mut server = Server::new("FS01", "corp.example.com", "2024-03-04T08:00:00+00:00");
        crate::storage::ensure_persisted(&db, &mut server).unwrap();

        let found = db.find_server_by_hostname("fs01").unwrap().unwrap();
        assert_eq!(found.id, server.id);
        assert_eq!(found.domain, "corp.example.com");
    }
}
