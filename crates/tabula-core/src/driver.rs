mod capability;
pub use capability::{Capability, Dialect};

mod cursor;
pub use cursor::CursorId;

use crate::{async_trait, stmt::Value, Result};

use std::{borrow::Cow, fmt::Debug};

#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Connection URL, used for diagnostics.
    fn url(&self) -> Cow<'_, str>;

    /// Describes the driver's capability, which selects the SQL flavor.
    fn capability(&self) -> &'static Capability;

    /// Opens a new connection.
    async fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// A connection to the store.
///
/// Implementations must surface every failure as an error; callers treat a
/// returned `Ok` as success without checking soft status codes.
#[async_trait]
pub trait Connection: Debug + Send + 'static {
    fn capability(&self) -> &'static Capability;

    /// Prepares `sql` and returns a handle to the new cursor.
    async fn prepare(&mut self, sql: &str) -> Result<CursorId>;

    /// Executes the prepared cursor with positional `binds`, discarding any
    /// rows left over from a previous execution. Returns the number of rows
    /// changed for non-query statements.
    async fn execute(&mut self, cursor: CursorId, binds: &[Value]) -> Result<u64>;

    /// Column names of the cursor's result set, in result order.
    fn columns(&self, cursor: CursorId) -> Result<Vec<String>>;

    /// Fetches the next row, or `None` once the cursor is exhausted.
    async fn fetch_row(&mut self, cursor: CursorId) -> Result<Option<Vec<Value>>>;

    /// Fetches every remaining row.
    async fn fetch_all(&mut self, cursor: CursorId) -> Result<Vec<Vec<Value>>> {
        let mut rows = vec![];
        while let Some(row) = self.fetch_row(cursor).await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Releases the cursor. Finishing an unknown cursor is not an error.
    async fn finish(&mut self, cursor: CursorId) -> Result<()>;

    /// The key generated by the most recent insert into `table`.
    async fn last_insert_id(&mut self, table: &str, column: &str) -> Result<Value>;

    async fn begin(&mut self) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;

    /// Returns `true` while a transaction started with `begin` is open.
    fn in_transaction(&self) -> bool;
}
