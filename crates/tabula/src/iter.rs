use crate::{Result, Statement};

use tabula_core::stmt::Record;

use tokio_stream::Stream;

/// Iterates the rows of a statement, executing it on first use.
#[derive(Debug)]
pub struct Iter {
    stmt: Statement,
}

impl Iter {
    pub(crate) fn new(stmt: Statement) -> Iter {
        Iter { stmt }
    }

    pub async fn next(&mut self) -> Result<Option<Record>> {
        self.stmt.next().await
    }

    pub async fn collect(mut self) -> Result<Vec<Record>> {
        self.stmt.all().await
    }

    pub fn statement(&self) -> &Statement {
        &self.stmt
    }

    pub fn into_statement(self) -> Statement {
        self.stmt
    }

    /// Turns the iterator into a stream of records.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<Record>> + Send + 'static {
        async_stream::try_stream! {
            while let Some(record) = self.stmt.next().await? {
                yield record;
            }
        }
    }
}
