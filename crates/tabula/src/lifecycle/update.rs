use crate::{Db, Result};

use tabula_core::{
    schema::{ColumnHandler, Source},
    stmt::{Key, Record, Update},
    Error,
};

impl Db {
    /// Updates the row of `source` with primary key `key`, writing exactly
    /// the columns present in `values`. Returns the number of changed rows.
    pub async fn update(&self, source: &str, key: impl Into<Key>, values: Record) -> Result<u64> {
        let source = self.schema().source(source)?.clone();
        self.update_row(&source, &key.into(), values).await
    }

    /// Like [`update`](Self::update), with the primary key taken from
    /// `values`.
    pub async fn update_by_record(&self, source: &str, values: Record) -> Result<u64> {
        let source = self.schema().source(source)?.clone();
        let key = self.required_key(&source, &values)?;
        self.update_row(&source, &key, values).await
    }

    /// Writes every column of `record` back to its row.
    ///
    /// On success only the primary-key columns are kept in `record`, so
    /// stale values cannot be written again by accident.
    pub async fn update_record(&self, record: &mut Record) -> Result<u64> {
        let source = self.record_source(record)?;
        let key = self.required_key(&source, record)?;
        let changed = self.update_row(&source, &key, record.clone()).await?;
        record.retain(|column, _| source.primary_key.iter().any(|pk| pk == column));
        Ok(changed)
    }

    pub(crate) fn required_key(&self, source: &Source, record: &Record) -> Result<Key> {
        self.schema().primary_key_of(source, record).ok_or_else(|| {
            Error::invalid_record(format!(
                "record {record} has no value for the primary key ({}) of `{}`",
                source.primary_key.join(", "),
                source.name
            ))
        })
    }

    async fn update_row(&self, source: &Source, key: &Key, mut values: Record) -> Result<u64> {
        let schema = self.schema().clone();
        let table = self.writable_table(source)?.to_string();
        let filter = schema.primary_key_filter(source, key)?;

        schema.apply_column_handler(source, ColumnHandler::TO_STORE, &mut values)?;

        values.retain(|column, value| {
            if value.is_nested() {
                tracing::warn!(
                    source = %source.name,
                    column,
                    "nested value ignored by update; update components separately"
                );
                return false;
            }
            !source.transient_columns.contains(column)
                && !source.no_update_columns.contains(column)
                && !source.primary_key.iter().any(|pk| pk == column)
        });
        if values.is_empty() {
            tracing::debug!(source = %source.name, "nothing to update");
            return Ok(0);
        }

        for (column, auto) in &source.auto_update {
            let value = auto.compute(&values);
            values.insert(column.as_str(), value);
        }

        self.exec_write(tabula_sql::Statement::Update(Update {
            table,
            assignments: values.into_iter().collect(),
            filter: Some(filter),
        }))
        .await
    }
}
