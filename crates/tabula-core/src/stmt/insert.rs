use super::{Record, Value};

/// A single-row `INSERT INTO table (columns) VALUES (values)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl Insert {
    pub fn from_record(table: impl Into<String>, record: Record) -> Insert {
        let (columns, values) = record.into_iter().unzip();
        Insert {
            table: table.into(),
            columns,
            values,
        }
    }
}
