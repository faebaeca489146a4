use crate::{
    stmt::{Record, Value},
    Result,
};

use indexmap::IndexMap;
use std::{fmt, sync::Arc};

/// A named conversion or validation callback bound to a column.
///
/// Handlers receive the column value in place. They are only invoked on
/// columns that are present in a record and not null.
#[derive(Clone)]
pub struct ColumnHandler(Arc<dyn Fn(&mut Value) -> Result<()> + Send + Sync>);

impl ColumnHandler {
    /// Applied to every value read from the store
    pub const FROM_STORE: &'static str = "from_store";

    /// Applied to every value written to the store
    pub const TO_STORE: &'static str = "to_store";

    /// Applied on explicit validation
    pub const VALIDATE: &'static str = "validate";

    pub fn new(f: impl Fn(&mut Value) -> Result<()> + Send + Sync + 'static) -> ColumnHandler {
        ColumnHandler(Arc::new(f))
    }

    pub fn call(&self, value: &mut Value) -> Result<()> {
        (self.0)(value)
    }

    /// Returns `true` if both handles point to the same callback.
    pub fn same_as(&self, other: &ColumnHandler) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl fmt::Debug for ColumnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ColumnHandler(..)")
    }
}

/// Computes a column value from the rest of the record, e.g. a timestamp or
/// the name of the user making the change.
#[derive(Clone)]
pub struct AutoColumn(Arc<dyn Fn(&Record) -> Value + Send + Sync>);

impl AutoColumn {
    pub fn new(f: impl Fn(&Record) -> Value + Send + Sync + 'static) -> AutoColumn {
        AutoColumn(Arc::new(f))
    }

    pub fn compute(&self, record: &Record) -> Value {
        (self.0)(record)
    }
}

impl fmt::Debug for AutoColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AutoColumn(..)")
    }
}

/// A reusable, named bundle of handlers.
#[derive(Debug, Clone)]
pub struct ColumnType {
    pub name: String,
    pub handlers: IndexMap<String, ColumnHandler>,
}

impl ColumnType {
    pub fn new(name: impl Into<String>) -> ColumnType {
        ColumnType {
            name: name.into(),
            handlers: IndexMap::new(),
        }
    }

    pub fn handler(mut self, name: impl Into<String>, handler: ColumnHandler) -> ColumnType {
        self.handlers.insert(name.into(), handler);
        self
    }
}
