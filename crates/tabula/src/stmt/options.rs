use super::Statement;

use tabula_core::stmt::{Expr, OrderBy, Record};

use std::{fmt, sync::Arc};

/// Callback invoked with the statement just before or just after the driver
/// executes it.
pub type ExecHook = Arc<dyn Fn(&Statement) + Send + Sync>;

/// Callback invoked on every row after column handlers ran.
pub type RowHook = Arc<dyn Fn(&mut Record) + Send + Sync>;

/// What [`Statement::select`] returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultShape {
    /// Every remaining row, materialized
    #[default]
    Rows,

    /// At most one row
    FirstRow,

    /// The SQL text and its bind values, without executing
    Sql,

    /// The raw driver cursor
    Cursor,

    /// Rows nested by the values of these columns; empty uses the primary key
    KeyedMap(Vec<String>),

    /// The values of every row, flattened in column order
    FlatValues,

    /// The executed statement, to be read with a reused row buffer
    ReusableRow,

    /// The executed statement itself
    Statement,
}

/// Options accepted by [`Statement::refine`] and [`Statement::select`].
#[derive(Clone, Default)]
pub struct SelectOptions {
    pub(crate) columns: Option<Vec<String>>,
    pub(crate) filter: Option<Expr>,
    pub(crate) order_by: Option<Vec<OrderBy>>,
    pub(crate) group_by: Option<Vec<String>>,
    pub(crate) having: Option<Expr>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) page_size: Option<u64>,
    pub(crate) page_index: Option<u64>,

    /// `Some(None)` drops the schema's implicit `FOR` clause
    pub(crate) for_clause: Option<Option<String>>,

    pub(crate) post_materialize: Option<RowHook>,

    pub(crate) result_as: Option<ResultShape>,
    pub(crate) pre_exec: Option<ExecHook>,
    pub(crate) post_exec: Option<ExecHook>,
}

impl SelectOptions {
    pub fn new() -> SelectOptions {
        SelectOptions::default()
    }

    pub fn columns<I, S>(mut self, columns: I) -> SelectOptions
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a condition. Conditions given more than once are AND-ed.
    pub fn filter(mut self, filter: Expr) -> SelectOptions {
        self.filter = Expr::and_optional(self.filter.take(), Some(filter));
        self
    }

    pub fn order_by<I, O>(mut self, order_by: I) -> SelectOptions
    where
        I: IntoIterator<Item = O>,
        O: Into<OrderBy>,
    {
        self.order_by = Some(order_by.into_iter().map(Into::into).collect());
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> SelectOptions
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn having(mut self, having: Expr) -> SelectOptions {
        self.having = Expr::and_optional(self.having.take(), Some(having));
        self
    }

    pub fn limit(mut self, limit: u64) -> SelectOptions {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> SelectOptions {
        self.offset = Some(offset);
        self
    }

    pub fn page_size(mut self, page_size: u64) -> SelectOptions {
        self.page_size = Some(page_size);
        self
    }

    /// One-based page to start at.
    pub fn page_index(mut self, page_index: u64) -> SelectOptions {
        self.page_index = Some(page_index);
        self
    }

    /// Overrides the schema's implicit `FOR` clause; `None` removes it.
    pub fn for_clause(mut self, clause: Option<&str>) -> SelectOptions {
        self.for_clause = Some(clause.map(str::to_string));
        self
    }

    pub fn result_as(mut self, shape: ResultShape) -> SelectOptions {
        self.result_as = Some(shape);
        self
    }

    pub fn pre_exec(mut self, hook: impl Fn(&Statement) + Send + Sync + 'static) -> SelectOptions {
        self.pre_exec = Some(Arc::new(hook));
        self
    }

    pub fn post_exec(
        mut self,
        hook: impl Fn(&Statement) + Send + Sync + 'static,
    ) -> SelectOptions {
        self.post_exec = Some(Arc::new(hook));
        self
    }

    pub fn post_materialize(
        mut self,
        hook: impl Fn(&mut Record) + Send + Sync + 'static,
    ) -> SelectOptions {
        self.post_materialize = Some(Arc::new(hook));
        self
    }

    /// Returns `true` when the options change the compiled query.
    pub(crate) fn refines_query(&self) -> bool {
        self.columns.is_some()
            || self.filter.is_some()
            || self.order_by.is_some()
            || self.group_by.is_some()
            || self.having.is_some()
            || self.limit.is_some()
            || self.offset.is_some()
            || self.page_size.is_some()
            || self.page_index.is_some()
            || self.for_clause.is_some()
            || self.post_materialize.is_some()
    }

    /// Folds `other` into these options. Filters and `having` conditions
    /// are AND-ed; every other option given in `other` replaces ours.
    pub(crate) fn merge(&mut self, other: SelectOptions) {
        self.filter = Expr::and_optional(self.filter.take(), other.filter);
        self.having = Expr::and_optional(self.having.take(), other.having);

        macro_rules! replace {
            ($($field:ident),*) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )*
            };
        }

        replace!(
            columns,
            order_by,
            group_by,
            limit,
            offset,
            page_size,
            page_index,
            for_clause,
            post_materialize,
            result_as,
            pre_exec,
            post_exec
        );
    }
}

impl fmt::Debug for SelectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectOptions")
            .field("columns", &self.columns)
            .field("filter", &self.filter)
            .field("order_by", &self.order_by)
            .field("group_by", &self.group_by)
            .field("having", &self.having)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("page_size", &self.page_size)
            .field("page_index", &self.page_index)
            .field("for_clause", &self.for_clause)
            .field("result_as", &self.result_as)
            .finish_non_exhaustive()
    }
}
