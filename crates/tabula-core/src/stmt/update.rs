use super::{Expr, Value};

/// `UPDATE table SET assignments WHERE filter`
///
/// Only the listed assignments are written; columns absent from the list are
/// never part of the SET clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<(String, Value)>,
    pub filter: Option<Expr>,
}
