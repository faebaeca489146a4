/// One ORDER BY item.
///
/// Converting from a string treats a leading `-` as descending and a leading
/// `+` as ascending: `"-d_begin"` sorts by `d_begin DESC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> OrderBy {
        OrderBy {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> OrderBy {
        OrderBy {
            column: column.into(),
            direction: Direction::Desc,
        }
    }
}

impl From<&str> for OrderBy {
    fn from(src: &str) -> OrderBy {
        if let Some(column) = src.strip_prefix('-') {
            OrderBy::desc(column)
        } else {
            OrderBy::asc(src.strip_prefix('+').unwrap_or(src))
        }
    }
}

impl From<String> for OrderBy {
    fn from(src: String) -> OrderBy {
        OrderBy::from(src.as_str())
    }
}
