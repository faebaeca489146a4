/// A table followed by a chain of joins, rendered through the schema's join
/// syntax templates.
#[derive(Debug, Clone, PartialEq)]
pub struct TableWithJoins {
    pub table: String,
    pub alias: Option<String>,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,

    pub alias: Option<String>,

    pub kind: JoinKind,

    /// Pairs of qualified columns compared for equality, e.g.
    /// `("Department.dpt_id", "Activity.dpt_id")`
    pub on: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    pub fn is_left(self) -> bool {
        matches!(self, JoinKind::Left)
    }
}
