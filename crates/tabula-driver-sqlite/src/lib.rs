mod value;
use value::Value;

use rusqlite::Connection as RusqliteConnection;
use std::{
    borrow::Cow,
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
};
use tabula_core::{
    async_trait,
    driver::{Capability, CursorId, Driver},
    stmt, Error, Result,
};
use url::Url;

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver_operation_failed)?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_schema(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database. Every connection opens its own
    /// database.
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

#[async_trait]
impl Driver for Sqlite {
    fn url(&self) -> Cow<'_, str> {
        match self {
            Sqlite::InMemory => Cow::Borrowed("sqlite::memory:"),
            Sqlite::File(path) => Cow::Owned(format!("sqlite:{}", path.display())),
        }
    }

    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn connect(&self) -> Result<Box<dyn tabula_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,

    cursors: HashMap<CursorId, CursorState>,

    next_cursor: usize,
}

/// A prepared statement and the rows its last execution produced.
#[derive(Debug)]
struct CursorState {
    sql: String,
    columns: Vec<String>,
    rows: VecDeque<Vec<stmt::Value>>,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;
        Ok(Self::from_rusqlite(connection))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection =
            RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        Ok(Self::from_rusqlite(connection))
    }

    fn from_rusqlite(connection: RusqliteConnection) -> Self {
        Self {
            connection,
            cursors: HashMap::new(),
            next_cursor: 0,
        }
    }

    fn cursor_mut(&mut self, cursor: CursorId) -> Result<&mut CursorState> {
        self.cursors
            .get_mut(&cursor)
            .ok_or_else(|| tabula_core::err!("unknown cursor `{cursor}`"))
    }

    fn run(&self, state: &CursorState, binds: &[stmt::Value]) -> rusqlite::Result<RunOutput> {
        let mut stmt = self.connection.prepare_cached(&state.sql)?;
        let params = binds.iter().map(Value::from).collect::<Vec<_>>();
        let params = rusqlite::params_from_iter(params.iter());

        if stmt.column_count() == 0 {
            return Ok(RunOutput::Changed(stmt.execute(params)? as u64));
        }

        let width = stmt.column_count();
        let mut rows = stmt.query(params)?;
        let mut out = VecDeque::new();
        while let Some(row) = rows.next()? {
            let values = (0..width)
                .map(|index| value::from_sql(row, index))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            out.push_back(values);
        }
        Ok(RunOutput::Rows(out))
    }
}

enum RunOutput {
    Changed(u64),
    Rows(VecDeque<Vec<stmt::Value>>),
}

#[async_trait]
impl tabula_core::driver::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn prepare(&mut self, sql: &str) -> Result<CursorId> {
        let columns = {
            let stmt = self
                .connection
                .prepare_cached(sql)
                .map_err(Error::driver_operation_failed)?;
            stmt.column_names()
                .into_iter()
                .map(str::to_string)
                .collect()
        };

        let cursor = CursorId(self.next_cursor);
        self.next_cursor += 1;
        self.cursors.insert(
            cursor,
            CursorState {
                sql: sql.to_string(),
                columns,
                rows: VecDeque::new(),
            },
        );
        tracing::trace!(%cursor, sql, "prepared");
        Ok(cursor)
    }

    async fn execute(&mut self, cursor: CursorId, binds: &[stmt::Value]) -> Result<u64> {
        let state = self
            .cursors
            .remove(&cursor)
            .ok_or_else(|| tabula_core::err!("unknown cursor `{cursor}`"))?;
        let output = self.run(&state, binds);

        let state = self.cursors.entry(cursor).or_insert(state);
        match output.map_err(Error::driver_operation_failed)? {
            RunOutput::Changed(count) => {
                state.rows.clear();
                Ok(count)
            }
            RunOutput::Rows(rows) => {
                state.rows = rows;
                Ok(0)
            }
        }
    }

    fn columns(&self, cursor: CursorId) -> Result<Vec<String>> {
        self.cursors
            .get(&cursor)
            .map(|state| state.columns.clone())
            .ok_or_else(|| tabula_core::err!("unknown cursor `{cursor}`"))
    }

    async fn fetch_row(&mut self, cursor: CursorId) -> Result<Option<Vec<stmt::Value>>> {
        Ok(self.cursor_mut(cursor)?.rows.pop_front())
    }

    async fn fetch_all(&mut self, cursor: CursorId) -> Result<Vec<Vec<stmt::Value>>> {
        Ok(self.cursor_mut(cursor)?.rows.drain(..).collect())
    }

    async fn finish(&mut self, cursor: CursorId) -> Result<()> {
        self.cursors.remove(&cursor);
        Ok(())
    }

    async fn last_insert_id(&mut self, _table: &str, _column: &str) -> Result<stmt::Value> {
        Ok(stmt::Value::I64(self.connection.last_insert_rowid()))
    }

    async fn begin(&mut self) -> Result<()> {
        self.connection
            .execute_batch("BEGIN")
            .map_err(Error::driver_operation_failed)
    }

    async fn commit(&mut self) -> Result<()> {
        self.connection
            .execute_batch("COMMIT")
            .map_err(Error::driver_operation_failed)
    }

    async fn rollback(&mut self) -> Result<()> {
        self.connection
            .execute_batch("ROLLBACK")
            .map_err(Error::driver_operation_failed)
    }

    fn in_transaction(&self) -> bool {
        !self.connection.is_autocommit()
    }
}
