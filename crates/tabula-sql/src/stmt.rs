pub use tabula_core::stmt::*;

/// A statement the serializer knows how to render.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),

    /// `SELECT COUNT(*)` over the rows of the inner select, ignoring its
    /// ordering and pagination
    Count(Select),

    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    pub fn is_select(&self) -> bool {
        matches!(self, Statement::Select(_) | Statement::Count(_))
    }

    /// Name of the written table, for data-changing statements.
    pub fn target_table(&self) -> Option<&str> {
        match self {
            Statement::Insert(stmt) => Some(&stmt.table),
            Statement::Update(stmt) => Some(&stmt.table),
            Statement::Delete(stmt) => Some(&stmt.table),
            Statement::Select(_) | Statement::Count(_) => None,
        }
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Select(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}
