mod builder;
pub use builder::Builder;

mod fetch;

mod transaction;

use crate::{stmt::Statement, Result};

use tabula_core::{
    driver::{Capability, Connection, CursorId},
    schema::{JoinToken, Schema, Source},
    stmt::{Key, Record, Value},
    Error,
};
use tabula_sql::Serializer;

use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

/// Identity of one connection opened through a [`Builder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(usize);

/// State shared by every connection opened against the same schema.
pub(crate) struct Catalog {
    pub(crate) schema: Arc<Schema>,

    /// Results of `fetch_cached`, by connection and source, then by key
    fetch_cache: Mutex<HashMap<(ConnectionId, String), Vec<(Key, Option<Record>)>>>,

    /// Join sources built by `join`, by name, so their rows resolve roles
    /// and handlers through the member sources
    joins: Mutex<HashMap<String, Arc<Source>>>,

    next_connection_id: AtomicUsize,
}

/// Shared state between all clones of one `Db`.
pub(crate) struct Shared {
    catalog: Arc<Catalog>,

    id: ConnectionId,

    capability: &'static Capability,

    /// Locked for the duration of a single driver call
    connection: tokio::sync::Mutex<Box<dyn Connection>>,

    last_cursor: Mutex<Option<CursorId>>,
}

/// A handle to one database connection and the schema describing it.
///
/// Cloning is cheap; clones share the connection.
#[derive(Clone)]
pub struct Db {
    pub(crate) shared: Arc<Shared>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn from_connection(catalog: Arc<Catalog>, connection: Box<dyn Connection>) -> Db {
        let id = ConnectionId(catalog.next_connection_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(connection = id.0, schema = %catalog.schema.name, "connected");
        Db {
            shared: Arc::new(Shared {
                catalog,
                id,
                capability: connection.capability(),
                connection: tokio::sync::Mutex::new(connection),
                last_cursor: Mutex::new(None),
            }),
        }
    }

    /// Opens another connection through `driver`, sharing this handle's
    /// schema and fetch cache.
    pub async fn connect_sibling(&self, driver: &dyn tabula_core::Driver) -> Result<Db> {
        let connection = driver.connect().await?;
        Ok(Db::from_connection(self.shared.catalog.clone(), connection))
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.shared.catalog.schema
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.shared.id
    }

    /// A new statement selecting from `source`.
    pub fn statement(&self, source: &str) -> Result<Statement> {
        let source = self.schema().source(source)?.clone();
        Ok(Statement::new(self.clone(), source))
    }

    /// A new statement over the join reached by following `roles` from
    /// `start`. See [`JoinToken::parse_all`] for the token syntax.
    pub fn join<S: AsRef<str>>(&self, start: &str, roles: &[S]) -> Result<Statement> {
        let source = Arc::new(
            self.schema()
                .join_source(start, &JoinToken::parse_all(roles))?,
        );
        if let Ok(mut joins) = self.shared.catalog.joins.lock() {
            joins.insert(source.name.clone(), source.clone());
        }
        Ok(Statement::new(self.clone(), source))
    }

    /// Selects from `source`. Shortcut for `statement(source)?.select(options)`.
    pub async fn select(
        &self,
        source: &str,
        options: crate::SelectOptions,
    ) -> Result<crate::SelectResult> {
        self.statement(source)?.select(options).await
    }

    /// Runs every `validate` handler of the record's source.
    pub fn validate(&self, record: &Record) -> Result<()> {
        let source = self.record_source(record)?;
        self.schema().validate_record(&source, record)
    }

    /// Executes raw SQL, e.g. DDL. Returns the number of changed rows.
    pub async fn execute_sql(&self, sql: &str, binds: &[Value]) -> Result<u64> {
        tracing::debug!(sql, binds = binds.len(), "executing raw sql");
        let mut connection = self.connection().await;
        let cursor = connection
            .prepare(sql)
            .await
            .map_err(|err| err.context(store_context("preparing", sql)))?;
        let result = connection.execute(cursor, binds).await;
        connection.finish(cursor).await?;
        result.map_err(|err| err.context(store_context("executing", sql)))
    }

    /// The most recently executed cursor, when the schema keeps it.
    pub fn last_cursor(&self) -> Option<CursorId> {
        self.shared
            .last_cursor
            .lock()
            .map(|last| *last)
            .unwrap_or_default()
    }

    pub(crate) fn remember_cursor(&self, cursor: CursorId) {
        if self.schema().config.keep_last_cursor {
            if let Ok(mut last) = self.shared.last_cursor.lock() {
                *last = Some(cursor);
            }
        }
    }

    /// Finishes `cursor` in the background. Used when a statement or cursor
    /// is dropped while still holding a driver cursor.
    pub(crate) fn release_cursor(&self, cursor: CursorId) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(%cursor, "no runtime to release cursor");
            return;
        };
        let db = self.clone();
        handle.spawn(async move {
            if let Err(err) = db.connection().await.finish(cursor).await {
                tracing::debug!(%cursor, %err, "failed to release cursor");
            }
        });
    }

    pub(crate) async fn connection(&self) -> tokio::sync::MutexGuard<'_, Box<dyn Connection>> {
        self.shared.connection.lock().await
    }

    pub(crate) fn serializer(&self) -> Serializer<'_> {
        Serializer::for_capability(self.shared.capability, &self.schema().config.join_syntax)
    }

    /// Serializes and runs a data-changing statement.
    pub(crate) async fn exec_write(&self, stmt: tabula_sql::Statement) -> Result<u64> {
        let mut binds = Vec::<Value>::new();
        let sql = self.serializer().serialize(&stmt, &mut binds);
        self.execute_sql(&sql, &binds).await
    }

    /// The registered source a record is tagged with.
    pub(crate) fn record_source(&self, record: &Record) -> Result<Arc<Source>> {
        let Some(name) = record.source() else {
            return Err(Error::invalid_record(format!(
                "record {record} is not tagged with a source"
            )));
        };
        if let Some(source) = self.schema().get_source(name) {
            return Ok(source.clone());
        }
        self.shared
            .catalog
            .joins
            .lock()
            .ok()
            .and_then(|joins| joins.get(name).cloned())
            .ok_or_else(|| Error::unknown_source(name))
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("schema", &self.schema().name)
            .field("connection", &self.shared.id)
            .finish()
    }
}

pub(crate) fn store_context(action: &str, sql: &str) -> String {
    format!("{action} `{sql}`")
}
