use super::inject_foreign_key;
use crate::{db::store_context, Db, Result};

use tabula_core::{
    schema::{ColumnHandler, Role, Source},
    stmt::{Insert, Key, Record, Value},
    Error,
};

use async_recursion::async_recursion;
use std::sync::Arc;

impl Db {
    /// Inserts `records` into `source`, along with the component records
    /// nested under composition roles. Returns the primary key of every
    /// top-level record, in input order.
    pub async fn insert(&self, source: &str, records: Vec<Record>) -> Result<Vec<Key>> {
        let source = self.schema().source(source)?.clone();
        let mut keys = Vec::with_capacity(records.len());
        for record in records {
            keys.push(self.insert_record(source.clone(), record).await?);
        }
        Ok(keys)
    }

    pub async fn insert_one(&self, source: &str, record: Record) -> Result<Key> {
        let source = self.schema().source(source)?.clone();
        self.insert_record(source, record).await
    }

    /// Inserts `children` as components reached from `record` through
    /// `role`, filling their foreign keys from `record`.
    pub async fn insert_into(
        &self,
        record: &Record,
        role: &str,
        children: Vec<Record>,
    ) -> Result<Vec<Key>> {
        let (_, role) = self.role_of(record, role)?;
        self.insert_children(&role, record, children).await
    }

    #[async_recursion]
    async fn insert_children(
        &self,
        role: &Role,
        owner: &Record,
        children: Vec<Record>,
    ) -> Result<Vec<Key>> {
        let Some(join) = role.join() else {
            return Err(Error::invalid_statement(format!(
                "cannot insert through role `{}`; it is not a direct association",
                role.name
            )));
        };
        let target = self.schema().source(&role.target)?.clone();

        let mut keys = Vec::with_capacity(children.len());
        for mut child in children {
            inject_foreign_key(role, join, owner, &mut child)?;
            keys.push(self.insert_record(target.clone(), child).await?);
        }
        Ok(keys)
    }

    #[async_recursion]
    async fn insert_record(&self, source: Arc<Source>, mut record: Record) -> Result<Key> {
        let schema = self.schema().clone();
        let table = self.writable_table(&source)?.to_string();

        schema.apply_column_handler(&source, ColumnHandler::TO_STORE, &mut record)?;
        record.retain(|column, _| !source.transient_columns.contains(column));
        for (column, auto) in source.auto_insert.iter().chain(&source.auto_update) {
            let value = auto.compute(&record);
            record.insert(column.as_str(), value);
        }

        let mut components = vec![];
        for column in record.columns().map(str::to_string).collect::<Vec<_>>() {
            let is_component = source.components.contains(&column);
            let nested = record.get(&column).is_some_and(Value::is_nested);
            if !is_component && !nested {
                continue;
            }
            if !is_component {
                return Err(Error::invalid_record(format!(
                    "`{column}` is not a component role of `{}`",
                    source.name
                )));
            }
            if let Some(value) = record.remove(&column) {
                components.push((column, value.into_records()));
            }
        }

        let generated_key = match schema.primary_key_of(&source, &record) {
            Some(_) => None,
            None if source.primary_key.len() == 1 => Some(source.primary_key[0].clone()),
            None => return Err(Error::ambiguous_key(&source.name, &source.primary_key)),
        };

        let stmt = tabula_sql::Statement::Insert(Insert::from_record(&table, record.clone()));
        let mut binds = Vec::<Value>::new();
        let sql = self.serializer().serialize(&stmt, &mut binds);
        tracing::debug!(source = %source.name, sql = %sql, binds = binds.len(), "inserting record");

        {
            let mut connection = self.connection().await;
            let cursor = connection
                .prepare(&sql)
                .await
                .map_err(|err| err.context(store_context("preparing", &sql)))?;
            let result = connection.execute(cursor, &binds).await;
            connection.finish(cursor).await?;
            result.map_err(|err| err.context(store_context("executing", &sql)))?;

            if let Some(column) = &generated_key {
                let value = connection.last_insert_id(&table, column).await?;
                record.insert(column.as_str(), value);
            }
        }

        let key = schema
            .primary_key_of(&source, &record)
            .ok_or_else(|| Error::ambiguous_key(&source.name, &source.primary_key))?;

        for (role_name, children) in components {
            let role = source
                .role(&role_name)
                .cloned()
                .ok_or_else(|| Error::unknown_role(&source.name, &role_name))?;
            self.insert_children(&role, &record, children).await?;
        }
        Ok(key)
    }
}
