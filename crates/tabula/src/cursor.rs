use crate::{Db, Result};

use tabula_core::{driver::CursorId, stmt::Value};

/// A driver cursor handed out by the `cursor` result shape.
///
/// Rows come back exactly as the driver returns them; no column handler
/// runs on them.
#[derive(Debug)]
pub struct Cursor {
    db: Db,
    id: CursorId,
    columns: Vec<String>,
    finished: bool,
}

impl Cursor {
    pub(crate) fn new(db: Db, id: CursorId, columns: Vec<String>) -> Cursor {
        Cursor {
            db,
            id,
            columns,
            finished: false,
        }
    }

    pub fn id(&self) -> CursorId {
        self.id
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub async fn next(&mut self) -> Result<Option<Vec<Value>>> {
        if self.finished {
            return Ok(None);
        }
        let row = self.db.connection().await.fetch_row(self.id).await?;
        if row.is_none() {
            self.finish_inner().await?;
        }
        Ok(row)
    }

    pub async fn all(&mut self) -> Result<Vec<Vec<Value>>> {
        if self.finished {
            return Ok(vec![]);
        }
        let rows = self.db.connection().await.fetch_all(self.id).await?;
        self.finish_inner().await?;
        Ok(rows)
    }

    /// Releases the cursor without reading the remaining rows.
    pub async fn finish(mut self) -> Result<()> {
        self.finish_inner().await
    }

    async fn finish_inner(&mut self) -> Result<()> {
        if !self.finished {
            self.finished = true;
            self.db.connection().await.finish(self.id).await?;
        }
        Ok(())
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        if !self.finished {
            self.db.release_cursor(self.id);
        }
    }
}
