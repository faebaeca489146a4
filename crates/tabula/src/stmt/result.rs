use super::Statement;
use crate::{Cursor, Result};

use tabula_core::{
    stmt::{Record, Value},
    Error,
};

use indexmap::IndexMap;

/// The output of [`Statement::select`], one variant per
/// [`ResultShape`](super::ResultShape).
#[derive(Debug)]
pub enum SelectResult {
    Rows(Vec<Record>),
    FirstRow(Option<Record>),
    Sql { sql: String, binds: Vec<Value> },
    Cursor(Cursor),
    KeyedMap(Keyed),
    FlatValues(Vec<Value>),

    /// Returned for the `reusable_row` and `statement` shapes
    Statement(Statement),
}

impl SelectResult {
    fn shape_name(&self) -> &'static str {
        match self {
            SelectResult::Rows(_) => "rows",
            SelectResult::FirstRow(_) => "first_row",
            SelectResult::Sql { .. } => "sql",
            SelectResult::Cursor(_) => "cursor",
            SelectResult::KeyedMap(_) => "keyed_map",
            SelectResult::FlatValues(_) => "flat_values",
            SelectResult::Statement(_) => "statement",
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::invalid_statement(format!(
            "expected a `{expected}` result, got `{}`",
            self.shape_name()
        ))
    }

    /// The fetched rows. A `first_row` result yields zero or one row.
    pub fn into_rows(self) -> Result<Vec<Record>> {
        match self {
            SelectResult::Rows(rows) => Ok(rows),
            SelectResult::FirstRow(row) => Ok(row.into_iter().collect()),
            other => Err(other.mismatch("rows")),
        }
    }

    pub fn into_first_row(self) -> Result<Option<Record>> {
        match self {
            SelectResult::FirstRow(row) => Ok(row),
            other => Err(other.mismatch("first_row")),
        }
    }

    pub fn into_sql(self) -> Result<(String, Vec<Value>)> {
        match self {
            SelectResult::Sql { sql, binds } => Ok((sql, binds)),
            other => Err(other.mismatch("sql")),
        }
    }

    pub fn into_cursor(self) -> Result<Cursor> {
        match self {
            SelectResult::Cursor(cursor) => Ok(cursor),
            other => Err(other.mismatch("cursor")),
        }
    }

    pub fn into_keyed_map(self) -> Result<Keyed> {
        match self {
            SelectResult::KeyedMap(keyed) => Ok(keyed),
            other => Err(other.mismatch("keyed_map")),
        }
    }

    pub fn into_flat_values(self) -> Result<Vec<Value>> {
        match self {
            SelectResult::FlatValues(values) => Ok(values),
            other => Err(other.mismatch("flat_values")),
        }
    }

    pub fn into_statement(self) -> Result<Statement> {
        match self {
            SelectResult::Statement(stmt) => Ok(stmt),
            other => Err(other.mismatch("statement")),
        }
    }
}

/// Rows nested by key column values. The innermost level holds the row;
/// a later row with the same keys replaces an earlier one.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyed {
    Row(Record),
    Map(IndexMap<String, Keyed>),
}

impl Keyed {
    pub(crate) fn build(columns: &[String], rows: Vec<Record>) -> Result<Keyed> {
        if columns.is_empty() {
            return Err(Error::invalid_statement("a keyed map needs key columns"));
        }

        let mut root = Keyed::Map(IndexMap::new());
        for row in rows {
            let keys = columns
                .iter()
                .map(|column| match row.get(column) {
                    Some(value) => Ok(value.to_key_string()),
                    None => Err(Error::invalid_statement(format!(
                        "key column `{column}` is not part of the result"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            root.insert(&keys, row);
        }
        Ok(root)
    }

    fn insert(&mut self, keys: &[String], row: Record) {
        let Keyed::Map(map) = self else {
            return;
        };
        match keys {
            [] => {}
            [last] => {
                map.insert(last.clone(), Keyed::Row(row));
            }
            [first, rest @ ..] => map
                .entry(first.clone())
                .or_insert_with(|| Keyed::Map(IndexMap::new()))
                .insert(rest, row),
        }
    }

    /// Follows `path` down the nesting levels.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&Keyed> {
        let mut node = self;
        for key in path {
            node = node.as_map()?.get(key.as_ref())?;
        }
        Some(node)
    }

    /// The row stored under `path`, if `path` leads to the innermost level.
    pub fn row<S: AsRef<str>>(&self, path: &[S]) -> Option<&Record> {
        self.get(path)?.as_row()
    }

    pub fn as_row(&self) -> Option<&Record> {
        match self {
            Keyed::Row(row) => Some(row),
            Keyed::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Keyed>> {
        match self {
            Keyed::Map(map) => Some(map),
            Keyed::Row(_) => None,
        }
    }

    /// Number of entries at this level.
    pub fn len(&self) -> usize {
        match self {
            Keyed::Row(_) => 1,
            Keyed::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
