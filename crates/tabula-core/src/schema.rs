mod builder;
pub use builder::Builder;

mod config;
pub use config::{Associativity, Config, JoinSyntax};

mod declare;

mod handler;
pub use handler::{AutoColumn, ColumnHandler, ColumnType};

pub mod join;
pub use join::{JoinPlan, JoinStep, JoinToken};

mod role;
pub use role::{AssociationEnd, Multiplicity, Role, RoleKind};

mod source;
pub use source::{Source, SourceKind, SourceTable, SourceView};

use crate::{
    stmt::{Expr, Key, Record},
    Error, Result,
};

use indexmap::IndexMap;
use std::sync::Arc;

/// The metadata registry: every declared source, its handlers and the join
/// graph between sources.
///
/// A schema is built once, before query traffic starts, and is then shared
/// read-only by every connection handle.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,

    pub config: Config,

    sources: IndexMap<String, Arc<Source>>,

    column_types: IndexMap<String, ColumnType>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> Builder {
        Builder::new(name)
    }

    pub fn new(name: impl Into<String>) -> Schema {
        Schema::with_config(name, Config::default())
    }

    pub fn with_config(name: impl Into<String>, config: Config) -> Schema {
        Schema {
            name: name.into(),
            config,
            sources: IndexMap::new(),
            column_types: IndexMap::new(),
        }
    }

    pub fn source(&self, name: &str) -> Result<&Arc<Source>> {
        self.sources
            .get(name)
            .ok_or_else(|| Error::unknown_source(name))
    }

    pub fn get_source(&self, name: &str) -> Option<&Arc<Source>> {
        self.sources.get(name)
    }

    pub fn sources(&self) -> impl Iterator<Item = &Arc<Source>> + '_ {
        self.sources.values()
    }

    pub fn column_type(&self, name: &str) -> Option<&ColumnType> {
        self.column_types.get(name)
    }

    /// Finds the role named `role` on `source`, then on its parents in order.
    pub fn lookup_join<'a>(&'a self, source: &'a Source, role: &str) -> Option<&'a Role> {
        if let Some(found) = source.role(role) {
            return Some(found);
        }
        source
            .parents()
            .iter()
            .filter_map(|parent| self.sources.get(parent))
            .find_map(|parent| self.lookup_join(parent, role))
    }

    /// Handlers registered under `name`, by column, for `source` and the
    /// sources it inherits from. Handlers declared closer to `source` win.
    pub fn handlers_named(&self, source: &Source, name: &str) -> IndexMap<String, ColumnHandler> {
        let mut out = IndexMap::new();
        self.collect_handlers(source, name, &mut out);
        out
    }

    fn collect_handlers(
        &self,
        source: &Source,
        name: &str,
        out: &mut IndexMap<String, ColumnHandler>,
    ) {
        for (column, handlers) in &source.handlers {
            if let Some(handler) = handlers.get(name) {
                out.entry(column.clone()).or_insert_with(|| handler.clone());
            }
        }
        for parent in source.parents() {
            if let Some(parent) = self.sources.get(parent) {
                self.collect_handlers(parent, name, out);
            }
        }
    }

    /// Runs the handler `name` on every column of `record` that has one.
    pub fn apply_column_handler(
        &self,
        source: &Source,
        name: &str,
        record: &mut Record,
    ) -> Result<()> {
        for (column, handler) in self.handlers_named(source, name) {
            if let Some(value) = record.get_mut(&column) {
                if value.is_null() {
                    continue;
                }
                handler.call(value).map_err(|err| {
                    err.context(format!("`{name}` handler of `{}.{column}`", source.name))
                })?;
            }
        }
        Ok(())
    }

    /// Runs every `validate` handler and reports all failing columns at once.
    pub fn validate_record(&self, source: &Source, record: &Record) -> Result<()> {
        let mut failures = vec![];
        for (column, handler) in self.handlers_named(source, ColumnHandler::VALIDATE) {
            let Some(value) = record.get(&column) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let mut value = value.clone();
            if let Err(err) = handler.call(&mut value) {
                failures.push((column, err.to_string()));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(&source.name, failures))
        }
    }

    /// Equality filter on the primary key of `source`.
    pub fn primary_key_filter(&self, source: &Source, key: &Key) -> Result<Expr> {
        if source.primary_key.len() != key.len() {
            return Err(Error::key_mismatch(
                &source.name,
                source.primary_key.len(),
                key.len(),
            ));
        }

        let mut operands: Vec<_> = source
            .primary_key
            .iter()
            .zip(key.values())
            .map(|(column, value)| Expr::eq(column.as_str(), value.clone()))
            .collect();

        Ok(if operands.len() == 1 {
            operands.remove(0)
        } else {
            Expr::and(operands)
        })
    }

    /// Extracts the primary key of `source` from `record`, or `None` when a
    /// key column is missing or null.
    pub fn primary_key_of(&self, source: &Source, record: &Record) -> Option<Key> {
        source
            .primary_key
            .iter()
            .map(|column| record.get(column).filter(|value| !value.is_null()).cloned())
            .collect::<Option<Vec<_>>>()
            .map(Key)
    }

    fn source_mut(&mut self, name: &str) -> Result<&mut Source> {
        self.sources
            .get_mut(name)
            .map(Arc::make_mut)
            .ok_or_else(|| Error::unknown_source(name))
    }
}
