use crate::{Db, Result};

use tabula_core::{
    schema::Source,
    stmt::{Delete, Expr, Key, Record},
};

use async_recursion::async_recursion;

impl Db {
    /// Deletes the row of `source` with primary key `key`.
    pub async fn delete(&self, source: &str, key: impl Into<Key>) -> Result<u64> {
        let source = self.schema().source(source)?.clone();
        let filter = self.schema().primary_key_filter(&source, &key.into())?;
        self.delete_rows(&source, filter).await
    }

    /// Deletes every row of `source` matching `filter`. No cascade is
    /// attempted.
    pub async fn delete_where(&self, source: &str, filter: Expr) -> Result<u64> {
        let source = self.schema().source(source)?.clone();
        self.delete_rows(&source, filter).await
    }

    /// Deletes `record` after recursively deleting the component records
    /// nested in it. Components not loaded in memory are left alone.
    ///
    /// Returns the total number of deleted rows.
    #[async_recursion]
    pub async fn delete_record(&self, record: &Record) -> Result<u64> {
        let source = self.record_source(record)?;
        let key = self.required_key(&source, record)?;

        let mut deleted = 0;
        for role in source.component_roles() {
            let Some(nested) = record.get(&role.name) else {
                continue;
            };
            for mut child in nested.clone().into_records() {
                if child.source().is_none() {
                    child.set_source(&role.target);
                }
                deleted += self.delete_record(&child).await?;
            }
        }

        let filter = self.schema().primary_key_filter(&source, &key)?;
        Ok(deleted + self.delete_rows(&source, filter).await?)
    }

    async fn delete_rows(&self, source: &Source, filter: Expr) -> Result<u64> {
        let table = self.writable_table(source)?.to_string();
        self.exec_write(tabula_sql::Statement::Delete(Delete {
            table,
            filter: Some(filter),
        }))
        .await
    }
}
