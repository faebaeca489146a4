mod materialize;
use materialize::Materializer;

mod options;
pub use options::{ExecHook, ResultShape, RowHook, SelectOptions};

mod paginate;

mod result;
pub use result::{Keyed, SelectResult};

use crate::{cursor::Cursor, db::store_context, Db, Iter, Result};

use tabula_core::{
    driver::CursorId,
    schema::Source,
    stmt::{Expr, Record, Select, Value},
    Error,
};

use indexmap::IndexMap;
use std::{fmt, sync::Arc};

/// Lifecycle of a [`Statement`]. Statuses only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    /// Accepting `refine` calls
    New,

    /// SQL text and bind positions are known
    Compiled,

    /// The driver holds a cursor for the SQL
    Prepared,

    /// The cursor has been executed and rows can be fetched
    Executed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Compiled => "compiled",
            Status::Prepared => "prepared",
            Status::Executed => "executed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One query against a source, driven through
/// compile, prepare, execute and fetch.
pub struct Statement {
    db: Db,

    source: Arc<Source>,

    status: Status,

    /// Options accumulated by `refine`
    args: SelectOptions,

    /// Values of named placeholders, bound in any status
    bound: IndexMap<String, Value>,

    compiled: Option<Compiled>,

    cursor: Option<CursorId>,

    /// Result columns reported by the driver after execution
    columns: Vec<String>,

    /// Rows fetched since the last execution
    row_num: u64,

    /// Cached result of `row_count`
    row_count: Option<u64>,
}

struct Compiled {
    select: Select,

    sql: String,

    /// Positional bind values; named placeholders hold their marker until
    /// bound
    binds: Vec<Value>,

    /// Placeholder name to positions in `binds`
    placeholders: IndexMap<String, Vec<usize>>,

    materializer: Materializer,

    page: Option<Page>,
}

struct Page {
    size: u64,

    /// One-based
    index: u64,

    /// Position of the `OFFSET` value in the bind list
    offset_position: usize,
}

impl Page {
    fn offset(&self) -> Result<u64> {
        page_offset(self.size, self.index)
    }
}

/// Rows skipped before page `index`. The offset is bound as an `i64`.
fn page_offset(size: u64, index: u64) -> Result<u64> {
    index
        .checked_sub(1)
        .and_then(|skipped| skipped.checked_mul(size))
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| {
            Error::invalid_statement(format!("page {index} of {size} rows is out of range"))
        })
}

impl Statement {
    pub(crate) fn new(db: Db, source: Arc<Source>) -> Statement {
        Statement {
            db,
            source,
            status: Status::New,
            args: SelectOptions::default(),
            bound: IndexMap::new(),
            compiled: None,
            cursor: None,
            columns: vec![],
            row_num: 0,
            row_count: None,
        }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Number of rows fetched since the statement was last executed.
    pub fn row_num(&self) -> u64 {
        self.row_num
    }

    /// Column names of the executed result set.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Merges more options into the statement. Filters combine with AND.
    ///
    /// Only allowed before the statement is compiled.
    pub fn refine(&mut self, options: SelectOptions) -> Result<&mut Statement> {
        self.expect_status("refine", Status::New)?;
        self.args.merge(options);
        Ok(self)
    }

    /// Sets the value of a named placeholder. Binding the same name again
    /// replaces the previous value.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Statement {
        let name = name.into();
        let value = value.into();

        if let Some(compiled) = &mut self.compiled {
            if let Some(positions) = compiled.placeholders.get(&name) {
                for position in positions {
                    compiled.binds[*position] = value.clone();
                }
            }
        }

        self.bound.insert(name, value);
        self.row_count = None;
        self
    }

    /// Binds every field of `record` by column name.
    pub fn bind_record(&mut self, record: &Record) -> &mut Statement {
        for (column, value) in record.iter() {
            self.bind(column, value.clone());
        }
        self
    }

    /// Builds the SQL text and bind list.
    pub fn compile(&mut self) -> Result<()> {
        self.expect_status("compile", Status::New)?;

        let schema = self.db.schema().clone();
        let config = &schema.config;
        let view = self.source.as_view();

        let mut select = Select::new(self.source.from());
        select.columns = match &self.args.columns {
            Some(columns) => columns.clone(),
            None => view.map(|view| view.columns.clone()).unwrap_or_default(),
        };
        select.filter = Expr::and_optional(
            view.and_then(|view| view.filter.clone()),
            self.args.filter.clone(),
        );
        select.group_by = self.args.group_by.clone().unwrap_or_default();
        select.having = self.args.having.clone();
        select.order_by = self.args.order_by.clone().unwrap_or_default();
        select.for_clause = match &self.args.for_clause {
            Some(clause) => clause.clone(),
            None => config.select_implicitly_for.clone(),
        };

        let page_size = self
            .args
            .page_size
            .or_else(|| self.args.page_index.map(|_| config.default_page_size));
        let page = match page_size {
            Some(0) => return Err(Error::invalid_statement("page size must not be zero")),
            Some(size) => {
                let index = self.args.page_index.unwrap_or(1).max(1);
                select.limit = Some(size);
                select.offset = Some(page_offset(size, index)?);
                Some((size, index))
            }
            None => {
                select.limit = self.args.limit;
                select.offset = self.args.offset;
                None
            }
        };

        let mut binds = Vec::<Value>::new();
        let sql = self
            .db
            .serializer()
            .serialize(&tabula_sql::Statement::Select(select.clone()), &mut binds);

        let mut placeholders = IndexMap::<String, Vec<usize>>::new();
        for (position, value) in binds.iter().enumerate() {
            if let Some(name) = value.as_str().and_then(|s| config.placeholder_name(s)) {
                placeholders
                    .entry(name.to_string())
                    .or_default()
                    .push(position);
            }
        }
        for (name, positions) in &placeholders {
            if let Some(value) = self.bound.get(name) {
                for position in positions {
                    binds[*position] = value.clone();
                }
            }
        }

        tracing::debug!(
            source = %self.source.name,
            sql = %sql,
            binds = binds.len(),
            placeholders = placeholders.len(),
            "compiled statement"
        );

        let page = page.map(|(size, index)| Page {
            size,
            index,
            offset_position: binds.len() - 1,
        });

        self.compiled = Some(Compiled {
            materializer: Materializer::new(
                &schema,
                &self.source,
                self.args.post_materialize.clone(),
            ),
            select,
            sql,
            binds,
            placeholders,
            page,
        });
        self.status = Status::Compiled;
        Ok(())
    }

    /// Hands the SQL to the driver. Compiles first when needed.
    pub async fn prepare(&mut self) -> Result<()> {
        if self.status == Status::New {
            self.compile()?;
        }
        self.expect_status("prepare", Status::Compiled)?;

        let sql = self.compiled()?.sql.clone();
        let cursor = self
            .db
            .connection()
            .await
            .prepare(&sql)
            .await
            .map_err(|err| err.context(store_context("preparing", &sql)))?;

        self.cursor = Some(cursor);
        self.status = Status::Prepared;
        Ok(())
    }

    /// Executes the statement, compiling and preparing it first when
    /// needed.
    ///
    /// Executing again restarts the result set from its first row with the
    /// current bind values.
    pub async fn execute(&mut self) -> Result<()> {
        if self.status == Status::New {
            self.compile()?;
        }
        let binds = self.resolved_binds()?;
        if self.status == Status::Compiled {
            self.prepare().await?;
        }

        let cursor = self.cursor_id("execute")?;
        let sql = self.compiled()?.sql.clone();

        if let Some(hook) = self.args.pre_exec.clone() {
            hook(&*self);
        }

        let columns = {
            let mut connection = self.db.connection().await;
            connection
                .execute(cursor, &binds)
                .await
                .map_err(|err| err.context(store_context("executing", &sql)))?;
            connection.columns(cursor)?
        };

        tracing::debug!(source = %self.source.name, %cursor, binds = binds.len(), "executed statement");

        self.columns = columns;
        self.row_num = 0;
        self.status = Status::Executed;
        self.db.remember_cursor(cursor);

        if let Some(hook) = self.args.post_exec.clone() {
            hook(&*self);
        }
        Ok(())
    }

    /// Binds every pair, then executes.
    pub async fn execute_with<I, K, V>(&mut self, bindings: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in bindings {
            self.bind(name, value);
        }
        self.execute().await
    }

    /// Fetches the next row, executing the statement first when needed.
    pub async fn next(&mut self) -> Result<Option<Record>> {
        let Some(row) = self.fetch_raw().await? else {
            return Ok(None);
        };
        self.compiled()?
            .materializer
            .materialize(&self.columns, row)
            .map(Some)
    }

    /// Fetches the next row into `record`, replacing its content. Returns
    /// `false` once the result set is exhausted.
    pub async fn next_reused(&mut self, record: &mut Record) -> Result<bool> {
        let Some(row) = self.fetch_raw().await? else {
            return Ok(false);
        };
        self.compiled()?
            .materializer
            .materialize_into(&self.columns, row, record)?;
        Ok(true)
    }

    /// Fetches up to `n` rows.
    pub async fn next_n(&mut self, n: usize) -> Result<Vec<Record>> {
        let mut rows = Vec::with_capacity(n);
        while rows.len() < n {
            match self.next().await? {
                Some(record) => rows.push(record),
                None => break,
            }
        }
        Ok(rows)
    }

    /// Fetches every remaining row.
    pub async fn all(&mut self) -> Result<Vec<Record>> {
        let mut rows = vec![];
        while let Some(record) = self.next().await? {
            rows.push(record);
        }
        Ok(rows)
    }

    pub async fn first(&mut self) -> Result<Option<Record>> {
        self.next().await
    }

    /// SQL text of the statement, compiling it first when needed.
    pub fn sql(&mut self) -> Result<&str> {
        if self.status == Status::New {
            self.compile()?;
        }
        Ok(&self.compiled()?.sql)
    }

    /// Current positional bind values. Unbound placeholders still hold
    /// their marker.
    pub fn bind_values(&self) -> &[Value] {
        self.compiled
            .as_ref()
            .map(|compiled| &compiled.binds[..])
            .unwrap_or_default()
    }

    /// Gives up the statement for its raw driver cursor.
    pub async fn cursor(mut self) -> Result<Cursor> {
        if self.status < Status::Executed {
            self.execute().await?;
        }
        let cursor = self.cursor_id("cursor")?;
        self.cursor = None;
        Ok(Cursor::new(
            self.db.clone(),
            cursor,
            std::mem::take(&mut self.columns),
        ))
    }

    /// Fetches every remaining row, nested by the values of `columns`. An
    /// empty list nests by primary key.
    pub async fn keyed_map(&mut self, columns: &[String]) -> Result<Keyed> {
        let columns = if columns.is_empty() {
            self.source.primary_key.clone()
        } else {
            columns.to_vec()
        };
        let rows = self.all().await?;
        Keyed::build(&columns, rows)
    }

    /// Fetches every remaining row and flattens their values in select
    /// order, one value per selected column.
    pub async fn flat_values(&mut self) -> Result<Vec<Value>> {
        let mut values = vec![];
        while let Some(mut row) = self.fetch_raw().await? {
            self.compiled()?
                .materializer
                .convert(&self.columns, &mut row)?;
            values.append(&mut row);
        }
        Ok(values)
    }

    pub fn iter(self) -> Iter {
        Iter::new(self)
    }

    /// Refines with `options`, then produces the requested result shape.
    pub async fn select(mut self, mut options: SelectOptions) -> Result<SelectResult> {
        let shape = options.result_as.take().unwrap_or_default();
        let pre_exec = options.pre_exec.take();
        let post_exec = options.post_exec.take();

        match shape {
            ResultShape::Sql if pre_exec.is_some() || post_exec.is_some() => {
                return Err(Error::invalid_statement(
                    "the `sql` result shape cannot be combined with execution callbacks",
                ));
            }
            ResultShape::Cursor if options.post_materialize.is_some() => {
                return Err(Error::invalid_statement(
                    "the `cursor` result shape cannot be combined with `post_materialize`",
                ));
            }
            _ => {}
        }

        if options.refines_query() {
            self.refine(options)?;
        }
        if pre_exec.is_some() {
            self.args.pre_exec = pre_exec;
        }
        if post_exec.is_some() {
            self.args.post_exec = post_exec;
        }

        Ok(match shape {
            ResultShape::Rows => SelectResult::Rows(self.all().await?),
            ResultShape::FirstRow => SelectResult::FirstRow(self.first().await?),
            ResultShape::Sql => {
                let sql = self.sql()?.to_string();
                SelectResult::Sql {
                    sql,
                    binds: self.bind_values().to_vec(),
                }
            }
            ResultShape::Cursor => SelectResult::Cursor(self.cursor().await?),
            ResultShape::KeyedMap(columns) => {
                SelectResult::KeyedMap(self.keyed_map(&columns).await?)
            }
            ResultShape::FlatValues => SelectResult::FlatValues(self.flat_values().await?),
            ResultShape::ReusableRow | ResultShape::Statement => {
                if self.status < Status::Executed {
                    self.execute().await?;
                }
                SelectResult::Statement(self)
            }
        })
    }

    async fn fetch_raw(&mut self) -> Result<Option<Vec<Value>>> {
        if self.status < Status::Executed {
            self.execute().await?;
        }
        let cursor = self.cursor_id("fetch")?;
        let row = self.db.connection().await.fetch_row(cursor).await?;
        if row.is_some() {
            self.row_num += 1;
            tracing::trace!(%cursor, row_num = self.row_num, "fetched row");
        }
        Ok(row)
    }

    /// Bind list with every placeholder resolved.
    fn resolved_binds(&self) -> Result<Vec<Value>> {
        let compiled = self.compiled()?;
        let missing: Vec<_> = compiled
            .placeholders
            .keys()
            .filter(|name| !self.bound.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(Error::unbound_placeholder(missing));
        }
        Ok(compiled.binds.clone())
    }

    fn compiled(&self) -> Result<&Compiled> {
        self.compiled
            .as_ref()
            .ok_or_else(|| Error::invalid_state("fetch", "compiled", self.status.as_str()))
    }

    fn compiled_mut(&mut self) -> Result<&mut Compiled> {
        let status = self.status.as_str();
        self.compiled
            .as_mut()
            .ok_or_else(|| Error::invalid_state("paginate", "compiled", status))
    }

    fn cursor_id(&self, operation: &'static str) -> Result<CursorId> {
        self.cursor
            .ok_or_else(|| Error::invalid_state(operation, "prepared", self.status.as_str()))
    }

    fn expect_status(&self, operation: &'static str, expected: Status) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(Error::invalid_state(
                operation,
                expected.as_str(),
                self.status.as_str(),
            ))
        }
    }
}

impl Drop for Statement {
    fn drop(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            self.db.release_cursor(cursor);
        }
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("source", &self.source.name)
            .field("status", &self.status)
            .field("sql", &self.compiled.as_ref().map(|c| &c.sql))
            .field("cursor", &self.cursor)
            .field("row_num", &self.row_num)
            .finish()
    }
}
