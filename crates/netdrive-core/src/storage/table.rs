use super::sqlite::Database;
use rusqlite::types::{FromSql, Value, ValueRef};
use rusqlite::{params_from_iter, Error, OptionalExtension, Result};
use tracing::debug;

/// Column name paired with the value to bind for it.
pub type ColumnValue = (&'static str, Value);

/// One result row, keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<(String, Value)>,
}

impl Row {
    pub fn get<T: FromSql>(&self, column: &str) -> Result<T> {
        let (idx, value) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, (name, _))| name.eq_ignore_ascii_case(column))
            .map(|(idx, (_, value))| (idx, value))
            .ok_or_else(|| Error::InvalidColumnName(column.to_string()))?;

        T::column_result(ValueRef::from(value))
            .map_err(|e| Error::FromSqlConversionFailure(idx, value.data_type(), Box::new(e)))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }
}

pub fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

/// Table and column names are interpolated into SQL, so they must be plain identifiers.
pub(crate) fn identifier(name: &str) -> Result<&str> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(name)
    } else {
        Err(Error::InvalidColumnName(name.to_string()))
    }
}

/// Build `a = ?N AND b = ?N+1 ...`, numbering placeholders from `first`.
fn where_clause(predicates: &[ColumnValue], first: usize) -> Result<String> {
    if predicates.is_empty() {
        return Ok(String::new());
    }
    let terms = predicates
        .iter()
        .enumerate()
        .map(|(i, (column, _))| -> Result<String> {
            Ok(format!("{} = ?{}", identifier(column)?, first + i))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(" WHERE {}", terms.join(" AND ")))
}

impl Database {
    /// First row of `table` matching every predicate by equality, or `None`.
    pub fn get_row(&self, table: &str, predicates: &[ColumnValue]) -> Result<Option<Row>> {
        let sql = format!(
            "SELECT * FROM {}{} LIMIT 1",
            identifier(table)?,
            where_clause(predicates, 1)?
        );
        let mut stmt = self.connection().prepare_cached(&sql)?;
        let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();

        stmt.query_row(
            params_from_iter(predicates.iter().map(|(_, value)| value)),
            |row| {
                let values = names
                    .iter()
                    .enumerate()
                    .map(|(idx, name)| -> Result<(String, Value)> {
                        Ok((name.clone(), row.get::<_, Value>(idx)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Row { values })
            },
        )
        .optional()
    }

    /// Append one row. Returns the new rowid.
    pub fn insert(&self, table: &str, columns: &[ColumnValue]) -> Result<i64> {
        let names = columns
            .iter()
            .map(|(column, _)| identifier(column))
            .collect::<Result<Vec<_>>>()?;
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            identifier(table)?,
            names.join(", "),
            placeholders.join(", ")
        );

        self.connection()
            .prepare_cached(&sql)?
            .execute(params_from_iter(columns.iter().map(|(_, value)| value)))?;
        let rowid = self.connection().last_insert_rowid();
        debug!("Inserted row {} into {}", rowid, table);
        Ok(rowid)
    }

    /// Apply `assignments` to every row matching `predicates`. Returns rows changed.
    pub fn update(
        &self,
        table: &str,
        assignments: &[ColumnValue],
        predicates: &[ColumnValue],
    ) -> Result<usize> {
        if assignments.is_empty() {
            return Ok(0);
        }
        let sets = assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| -> Result<String> {
                Ok(format!("{} = ?{}", identifier(column)?, i + 1))
            })
            .collect::<Result<Vec<_>>>()?;
        let sql = format!(
            "UPDATE {} SET {}{}",
            identifier(table)?,
            sets.join(", "),
            where_clause(predicates, assignments.len() + 1)?
        );

        let changed = self.connection().prepare_cached(&sql)?.execute(params_from_iter(
            assignments
                .iter()
                .chain(predicates.iter())
                .map(|(_, value)| value),
        ))?;
        debug!("Updated {} row(s) in {}", changed, table);
        Ok(changed)
    }
}
