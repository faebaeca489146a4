use super::{AutoColumn, ColumnHandler, Role};
use crate::stmt::{Expr, TableRef};

use indexmap::{IndexMap, IndexSet};

/// A named origin of rows: a table, or a view derived from other sources.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,

    pub kind: SourceKind,

    /// Primary-key columns. Fixed once the source is declared.
    pub primary_key: Vec<String>,

    /// Column name to handler name to handler
    pub handlers: IndexMap<String, IndexMap<String, ColumnHandler>>,

    /// Roles leading away from this source, by role name
    pub roles: IndexMap<String, Role>,

    /// Names of the roles leading to components of this source
    pub components: Vec<String>,

    /// Composites owning this source: `(composite source, minimum
    /// multiplicity of the composite side)`
    pub composite_of: Vec<(String, u32)>,

    /// Columns never written by updates
    pub no_update_columns: IndexSet<String>,

    /// Columns never written to the store
    pub transient_columns: IndexSet<String>,

    /// Columns computed on insert
    pub auto_insert: IndexMap<String, AutoColumn>,

    /// Columns computed on insert and on update
    pub auto_update: IndexMap<String, AutoColumn>,
}

#[derive(Debug, Clone)]
pub enum SourceKind {
    Table(SourceTable),
    View(SourceView),
}

#[derive(Debug, Clone)]
pub struct SourceTable {
    /// Name of the table in the store
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct SourceView {
    /// Selected columns; empty selects `*`
    pub columns: Vec<String>,

    pub from: TableRef,

    /// Condition AND-ed into every select against the view
    pub filter: Option<Expr>,

    /// Sources whose handlers and roles the view inherits, in lookup order
    pub parents: Vec<String>,
}

impl Source {
    pub(crate) fn new(name: String, kind: SourceKind, primary_key: Vec<String>) -> Source {
        Source {
            name,
            kind,
            primary_key,
            handlers: IndexMap::new(),
            roles: IndexMap::new(),
            components: vec![],
            composite_of: vec![],
            no_update_columns: IndexSet::new(),
            transient_columns: IndexSet::new(),
            auto_insert: IndexMap::new(),
            auto_update: IndexMap::new(),
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, SourceKind::Table(_))
    }

    /// The physical table name, for table sources.
    pub fn table_name(&self) -> Option<&str> {
        match &self.kind {
            SourceKind::Table(table) => Some(&table.table),
            SourceKind::View(_) => None,
        }
    }

    pub fn as_view(&self) -> Option<&SourceView> {
        match &self.kind {
            SourceKind::View(view) => Some(view),
            SourceKind::Table(_) => None,
        }
    }

    /// Parent sources, empty for tables.
    pub fn parents(&self) -> &[String] {
        match &self.kind {
            SourceKind::View(view) => &view.parents,
            SourceKind::Table(_) => &[],
        }
    }

    /// The FROM clause used to select from this source.
    pub fn from(&self) -> TableRef {
        match &self.kind {
            SourceKind::Table(table) => TableRef::table(&table.table),
            SourceKind::View(view) => view.from.clone(),
        }
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    /// Own handler registered under `name` for `column`.
    pub fn handler(&self, column: &str, name: &str) -> Option<&ColumnHandler> {
        self.handlers.get(column)?.get(name)
    }

    /// Roles leading to components of this source.
    pub fn component_roles(&self) -> impl Iterator<Item = &Role> + '_ {
        self.components
            .iter()
            .filter_map(|name| self.roles.get(name))
    }
}
