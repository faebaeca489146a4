use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};
use tabula_core::stmt::Value as CoreValue;

#[derive(Debug)]
pub struct Value<'a>(&'a CoreValue);

impl<'a> From<&'a CoreValue> for Value<'a> {
    fn from(value: &'a CoreValue) -> Self {
        Self(value)
    }
}

/// Converts the value at `index` of a SQLite row.
pub fn from_sql(row: &Row<'_>, index: usize) -> rusqlite::Result<CoreValue> {
    Ok(match row.get::<_, SqlValue>(index)? {
        SqlValue::Null => CoreValue::Null,
        SqlValue::Integer(value) => CoreValue::I64(value),
        SqlValue::Real(value) => CoreValue::F64(value),
        SqlValue::Text(value) => CoreValue::String(value),
        SqlValue::Blob(value) => CoreValue::Bytes(value),
    })
}

impl ToSql for Value<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            CoreValue::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            CoreValue::Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            CoreValue::Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            CoreValue::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            CoreValue::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            CoreValue::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            CoreValue::Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            CoreValue::Record(_) | CoreValue::List(_) => {
                Err(rusqlite::Error::ToSqlConversionFailure(
                    format!("cannot bind nested value {}", self.0).into(),
                ))
            }
        }
    }
}
