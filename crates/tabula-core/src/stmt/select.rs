use super::{Expr, OrderBy, TableRef};

/// Description of a SELECT handed to the SQL builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Selected column expressions; empty selects `*`
    pub columns: Vec<String>,

    pub from: TableRef,

    pub filter: Option<Expr>,

    pub group_by: Vec<String>,

    pub having: Option<Expr>,

    pub order_by: Vec<OrderBy>,

    /// Bound as a parameter so pagination can reposition without rebuilding
    /// the SQL text
    pub limit: Option<u64>,

    /// Bound as a parameter, see `limit`
    pub offset: Option<u64>,

    /// Text following `FOR`, e.g. `UPDATE`
    pub for_clause: Option<String>,
}

impl Select {
    pub fn new(from: TableRef) -> Select {
        Select {
            columns: vec![],
            from,
            filter: None,
            group_by: vec![],
            having: None,
            order_by: vec![],
            limit: None,
            offset: None,
            for_clause: None,
        }
    }
}
