use super::sqlite::Database;
use super::table::{ColumnValue, Row};
use rusqlite::{Error, Result};
use tracing::debug;

/// A catalog row type bound to one table.
///
/// `unique_key` is the natural key used for existence checks; `columns` is the
/// full set written on insert. Entities without a surrogate key leave
/// `ID_COLUMN` as `None`.
pub trait Entity {
    const TABLE: &'static str;
    const ID_COLUMN: Option<&'static str>;

    fn unique_key(&self) -> Vec<ColumnValue>;
    fn columns(&self) -> Vec<ColumnValue>;

    /// Surrogate id, `None` until the row is known to exist.
    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);

    /// Copy store-resident fields (flags, dates) from a loaded row.
    fn load_row(&mut self, _row: &Row) -> Result<()> {
        Ok(())
    }
}

pub fn exists<E: Entity>(db: &Database, entity: &E) -> Result<bool> {
    Ok(db.get_row(E::TABLE, &entity.unique_key())?.is_some())
}

/// Refresh `entity` from its stored row. Returns whether the row exists.
pub fn load<E: Entity>(db: &Database, entity: &mut E) -> Result<bool> {
    let Some(row) = db.get_row(E::TABLE, &entity.unique_key())? else {
        return Ok(false);
    };
    if let Some(id_column) = E::ID_COLUMN {
        entity.set_id(row.get(id_column)?);
    }
    entity.load_row(&row)?;
    Ok(true)
}

/// Insert `entity` unless a row with its unique key exists, then load it.
/// Returns `true` when a row was inserted.
pub fn ensure_persisted<E: Entity>(db: &Database, entity: &mut E) -> Result<bool> {
    if load(db, entity)? {
        return Ok(false);
    }
    db.insert(E::TABLE, &entity.columns())?;
    if !load(db, entity)? {
        return Err(Error::QueryReturnedNoRows);
    }
    debug!("Added new {} row {:?}", E::TABLE, entity.id());
    Ok(true)
}

/// Load `entity` if it is already stored. Returns it with a flag saying whether it existed.
pub fn load_or_new<E: Entity>(db: &Database, mut entity: E) -> Result<(E, bool)> {
    let existed = load(db, &mut entity)?;
    Ok((entity, existed))
}
