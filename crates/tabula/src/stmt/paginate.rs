use super::{page_offset, Statement, Status};
use crate::{db::store_context, Result};

use tabula_core::{stmt::Record, stmt::Value, Error};

impl Statement {
    pub fn page_size(&self) -> Option<u64> {
        self.compiled
            .as_ref()
            .and_then(|compiled| compiled.page.as_ref())
            .map(|page| page.size)
            .or(self.args.page_size)
    }

    /// One-based index of the current page.
    pub fn page_index(&self) -> Option<u64> {
        self.compiled
            .as_ref()
            .and_then(|compiled| compiled.page.as_ref())
            .map(|page| page.index)
    }

    /// Number of rows the statement selects, ignoring pagination.
    ///
    /// Runs a `SELECT COUNT(*)` over the compiled select the first time and
    /// caches the result until a value is bound.
    pub async fn row_count(&mut self) -> Result<u64> {
        if let Some(count) = self.row_count {
            return Ok(count);
        }
        if self.status == Status::New {
            self.compile()?;
        }

        let schema = self.db.schema().clone();
        let mut binds = Vec::<Value>::new();
        let sql = self.db.serializer().serialize(
            &tabula_sql::Statement::Count(self.compiled()?.select.clone()),
            &mut binds,
        );

        let mut missing = vec![];
        for value in &mut binds {
            let name = value
                .as_str()
                .and_then(|s| schema.config.placeholder_name(s))
                .map(str::to_string);
            if let Some(name) = name {
                match self.bound.get(&name) {
                    Some(bound) => *value = bound.clone(),
                    None => missing.push(name),
                }
            }
        }
        if !missing.is_empty() {
            missing.dedup();
            return Err(Error::unbound_placeholder(missing));
        }

        tracing::debug!(source = %self.source.name, sql = %sql, "counting rows");

        let row = {
            let mut connection = self.db.connection().await;
            let cursor = connection
                .prepare(&sql)
                .await
                .map_err(|err| err.context(store_context("preparing", &sql)))?;
            let result = match connection.execute(cursor, &binds).await {
                Ok(_) => connection.fetch_row(cursor).await,
                Err(err) => Err(err),
            };
            connection.finish(cursor).await?;
            result.map_err(|err| err.context(store_context("executing", &sql)))?
        };

        let count = row
            .and_then(|row| row.into_iter().next())
            .and_then(|value| value.as_i64())
            .ok_or_else(|| Error::invalid_statement(format!("`{sql}` returned no count")))?;
        let count = u64::try_from(count).unwrap_or_default();
        self.row_count = Some(count);
        Ok(count)
    }

    /// Number of pages of `page_size` rows.
    pub async fn page_count(&mut self) -> Result<u64> {
        if self.status == Status::New {
            self.compile()?;
        }
        let size = self.require_page_size()?;
        let count = self.row_count().await?;
        Ok(count.div_ceil(size))
    }

    /// Moves to page `index` and executes. A negative index counts from the
    /// last page, so `-1` is the last page.
    ///
    /// Nothing is executed when the statement is already positioned on the
    /// first row of that page.
    pub async fn goto_page(&mut self, index: i64) -> Result<()> {
        if self.status == Status::New {
            self.compile()?;
        }
        self.require_page_size()?;

        let index = match u64::try_from(index) {
            Ok(0) => return Err(Error::invalid_statement("page indices start at 1")),
            Ok(index) => index,
            Err(_) => {
                let count = self.page_count().await?;
                count.saturating_sub(index.unsigned_abs() - 1).max(1)
            }
        };

        let executed = self.status == Status::Executed;
        let at_start = self.row_num == 0;
        let compiled = self.compiled_mut()?;
        let Some(page) = &mut compiled.page else {
            return Err(Error::invalid_statement(
                "pagination needs a `page_size` at compile time",
            ));
        };

        if executed && at_start && page.index == index {
            return Ok(());
        }

        let offset = page_offset(page.size, index)?;
        page.index = index;
        compiled.binds[page.offset_position] = Value::from(i64::try_from(offset).unwrap_or(i64::MAX));
        compiled.select.offset = Some(offset);

        tracing::debug!(source = %self.source.name, page = index, offset, "going to page");
        self.execute().await
    }

    /// Moves forward (or backward, for negative deltas) by `delta` pages.
    pub async fn shift_pages(&mut self, delta: i64) -> Result<()> {
        let current = i64::try_from(self.page_index().unwrap_or(1)).unwrap_or(i64::MAX);
        self.goto_page(current.saturating_add(delta).max(1)).await
    }

    /// One-based numbers of the first and last rows of the current page,
    /// or `(0, 0)` when the page is empty.
    pub async fn page_boundaries(&mut self) -> Result<(u64, u64)> {
        if self.status == Status::New {
            self.compile()?;
        }
        let size = self.require_page_size()?;
        let offset = self
            .compiled()?
            .page
            .as_ref()
            .map(|page| page.offset())
            .transpose()?
            .unwrap_or_default();
        let count = self.row_count().await?;

        let first = offset + 1;
        let last = offset.saturating_add(size).min(count);
        Ok(if last < first { (0, 0) } else { (first, last) })
    }

    /// Rows of the current page, from its first row.
    pub async fn page_rows(&mut self) -> Result<Vec<Record>> {
        if self.status == Status::New {
            self.compile()?;
        }
        let index = i64::try_from(self.page_index().unwrap_or(1)).unwrap_or(i64::MAX);
        self.goto_page(index).await?;
        self.all().await
    }

    fn require_page_size(&self) -> Result<u64> {
        self.page_size().ok_or_else(|| {
            Error::invalid_statement(format!(
                "statement on `{}` is not paginated; set a `page_size`",
                self.source.name
            ))
        })
    }
}
