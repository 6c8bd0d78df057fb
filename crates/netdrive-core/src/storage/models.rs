use super::entity::Entity;
use super::sqlite::Database;
use super::table::{text, ColumnValue, Row};
use rusqlite::types::Value;
use rusqlite::Result;

/// Process-wide key/value setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub setting: String,
    pub value: String,
}

impl Setting {
    pub fn new(setting: &str, value: &str) -> Self {
        Self {
            setting: setting.to_string(),
            value: value.to_string(),
        }
    }
}

impl Entity for Setting {
    const TABLE: &'static str = "settings";
    const ID_COLUMN: Option<&'static str> = None;

    fn unique_key(&self) -> Vec<ColumnValue> {
        vec![("setting", text(&self.setting))]
    }

    fn columns(&self) -> Vec<ColumnValue> {
        vec![("setting", text(&self.setting)), ("value", text(&self.value))]
    }

    fn id(&self) -> Option<i64> {
        None
    }

    fn set_id(&mut self, _id: i64) {}

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.value = row.get("value")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
}

impl User {
    pub fn new(username: &str) -> Self {
        Self {
            id: None,
            username: username.to_string(),
        }
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const ID_COLUMN: Option<&'static str> = Some("userID");

    fn unique_key(&self) -> Vec<ColumnValue> {
        vec![("username", text(&self.username))]
    }

    fn columns(&self) -> Vec<ColumnValue> {
        self.unique_key()
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Computer {
    pub id: Option<i64>,
    pub hostname: String,
}

impl Computer {
    pub fn new(hostname: &str) -> Self {
        Self {
            id: None,
            hostname: hostname.to_string(),
        }
    }
}

impl Entity for Computer {
    const TABLE: &'static str = "computers";
    const ID_COLUMN: Option<&'static str> = Some("computerID");

    fn unique_key(&self) -> Vec<ColumnValue> {
        vec![("hostname", text(&self.hostname))]
    }

    fn columns(&self) -> Vec<ColumnValue> {
        self.unique_key()
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

/// A file server. `active = false` blacklists every share on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub id: Option<i64>,
    pub hostname: String,
    pub domain: String,
    pub active: bool,
    /// RFC 3339 timestamp of first discovery.
    pub first_seen: String,
}

impl Server {
    pub fn new(hostname: &str, domain: &str, first_seen: &str) -> Self {
        Self {
            id: None,
            hostname: hostname.to_string(),
            domain: domain.to_string(),
            active: true,
            first_seen: first_seen.to_string(),
        }
    }

    /// Persist a new `active` value for this server.
    pub fn set_active(&mut self, db: &Database, active: bool) -> Result<()> {
        db.update(Self::TABLE, &[("active", Value::from(active))], &self.unique_key())?;
        self.active = active;
        Ok(())
    }
}

impl Entity for Server {
    const TABLE: &'static str = "servers";
    const ID_COLUMN: Option<&'static str> = Some("serverID");

    fn unique_key(&self) -> Vec<ColumnValue> {
        vec![
            ("hostname", text(&self.hostname)),
            ("domain", text(&self.domain)),
        ]
    }

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ("hostname", text(&self.hostname)),
            ("domain", text(&self.domain)),
            ("active", Value::from(self.active)),
            ("date", text(&self.first_seen)),
        ]
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.active = row.get("active")?;
        self.first_seen = row.get("date")?;
        Ok(())
    }
}

/// A share on a stored server. `active = false` blacklists just this share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub id: Option<i64>,
    pub server_id: i64,
    pub share_name: String,
    pub active: bool,
}

impl Share {
    pub fn new(server_id: i64, share_name: &str) -> Self {
        Self {
            id: None,
            server_id,
            share_name: share_name.to_string(),
            active: true,
        }
    }

    pub fn set_active(&mut self, db: &Database, active: bool) -> Result<()> {
        db.update(Self::TABLE, &[("active", Value::from(active))], &self.unique_key())?;
        self.active = active;
        Ok(())
    }
}

impl Entity for Share {
    const TABLE: &'static str = "shares";
    const ID_COLUMN: Option<&'static str> = Some("shareID");

    fn unique_key(&self) -> Vec<ColumnValue> {
        vec![
            ("serverID", Value::Integer(self.server_id)),
            ("shareName", text(&self.share_name)),
        ]
    }

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ("serverID", Value::Integer(self.server_id)),
            ("shareName", text(&self.share_name)),
            ("active", Value::from(self.active)),
        ]
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.active = row.get("active")?;
        Ok(())
    }
}

/// "This user on this computer has this share mapped to this letter."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub share_id: i64,
    pub computer_id: i64,
    pub user_id: i64,
    pub letter: String,
    /// Account the drive was mapped with, as reported by the OS.
    pub remote_username: String,
    /// RFC 3339 timestamp of the latest run that saw the mapping live.
    pub last_seen: String,
}

impl Mapping {
    pub fn new(
        share_id: i64,
        computer_id: i64,
        user_id: i64,
        letter: &str,
        remote_username: &str,
        last_seen: &str,
    ) -> Self {
        Self {
            share_id,
            computer_id,
            user_id,
            letter: letter.to_string(),
            remote_username: remote_username.to_string(),
            last_seen: last_seen.to_string(),
        }
    }

    /// Insert the mapping, or refresh letter, remote username and last-seen
    /// date on the existing row. Returns `true` when a row was inserted.
    pub fn upsert(&self, db: &Database) -> Result<bool> {
        if db.get_row(Self::TABLE, &self.unique_key())?.is_none() {
            db.insert(Self::TABLE, &self.columns())?;
            return Ok(true);
        }
        db.update(
            Self::TABLE,
            &[
                ("letter", text(&self.letter)),
                ("username", text(&self.remote_username)),
                ("date", text(&self.last_seen)),
            ],
            &self.unique_key(),
        )?;
        Ok(false)
    }
}

impl Entity for Mapping {
    const TABLE: &'static str = "mappings";
    const ID_COLUMN: Option<&'static str> = None;

    fn unique_key(&self) -> Vec<ColumnValue> {
        vec![
            ("shareID", Value::Integer(self.share_id)),
            ("computerID", Value::Integer(self.computer_id)),
            ("userID", Value::Integer(self.user_id)),
        ]
    }

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ("shareID", Value::Integer(self.share_id)),
            ("computerID", Value::Integer(self.computer_id)),
            ("userID", Value::Integer(self.user_id)),
            ("letter", text(&self.letter)),
            ("username", text(&self.remote_username)),
            ("date", text(&self.last_seen)),
        ]
    }

    fn id(&self) -> Option<i64> {
        None
    }

    fn set_id(&mut self, _id: i64) {}

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.letter = row.get("letter")?;
        self.remote_username = row.get("username")?;
        self.last_seen = row.get("date")?;
        Ok(())
    }
}
