use super::RowHook;

use tabula_core::{
    schema::{ColumnHandler, Schema, Source},
    stmt::{Record, Value},
    Result,
};

use indexmap::IndexMap;
use std::fmt;

/// Turns driver rows into records of one source.
#[derive(Clone)]
pub(crate) struct Materializer {
    source: String,

    /// `from_store` handlers by column, inherited ones included
    from_store: IndexMap<String, ColumnHandler>,

    post: Option<RowHook>,
}

impl Materializer {
    pub(crate) fn new(schema: &Schema, source: &Source, post: Option<RowHook>) -> Materializer {
        Materializer {
            source: source.name.clone(),
            from_store: schema.handlers_named(source, ColumnHandler::FROM_STORE),
            post,
        }
    }

    pub(crate) fn materialize(&self, columns: &[String], row: Vec<Value>) -> Result<Record> {
        let mut record = Record::for_source(&self.source);
        self.fill(columns, row, &mut record)?;
        Ok(record)
    }

    /// Like `materialize`, but refills `record` in place.
    pub(crate) fn materialize_into(
        &self,
        columns: &[String],
        row: Vec<Value>,
        record: &mut Record,
    ) -> Result<()> {
        record.clear();
        record.set_source(&self.source);
        self.fill(columns, row, record)
    }

    /// Applies `from_store` handlers to a row in place, keeping its values
    /// in select order. Columns selected twice are converted twice.
    pub(crate) fn convert(&self, columns: &[String], row: &mut [Value]) -> Result<()> {
        for (column, value) in columns.iter().zip(row.iter_mut()) {
            self.from_store(column, value)?;
        }
        Ok(())
    }

    fn fill(&self, columns: &[String], row: Vec<Value>, record: &mut Record) -> Result<()> {
        for (column, value) in columns.iter().zip(row) {
            record.insert(column.as_str(), value);
        }

        for column in self.from_store.keys() {
            if let Some(value) = record.get_mut(column) {
                self.from_store(column, value)?;
            }
        }

        if let Some(post) = &self.post {
            post(record);
        }
        Ok(())
    }
}

impl Materializer {
    fn from_store(&self, column: &str, value: &mut Value) -> Result<()> {
        let Some(handler) = self.from_store.get(column) else {
            return Ok(());
        };
        if value.is_null() {
            return Ok(());
        }
        handler.call(value).map_err(|err| {
            err.context(format!(
                "`{}` handler of `{}.{column}`",
                ColumnHandler::FROM_STORE,
                self.source
            ))
        })
    }
}

impl fmt::Debug for Materializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Materializer")
            .field("source", &self.source)
            .field("from_store", &self.from_store.keys().collect::<Vec<_>>())
            .field("post", &self.post.is_some())
            .finish()
    }
}
