use super::TableWithJoins;

/// The FROM part of a select.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    Table { name: String, alias: Option<String> },

    /// Verbatim FROM text, as given to a declared view
    Raw(String),

    Join(TableWithJoins),
}

impl TableRef {
    pub fn table(name: impl Into<String>) -> TableRef {
        TableRef::Table {
            name: name.into(),
            alias: None,
        }
    }
}

impl From<&str> for TableRef {
    fn from(src: &str) -> TableRef {
        TableRef::Raw(src.to_string())
    }
}

impl From<String> for TableRef {
    fn from(src: String) -> TableRef {
        TableRef::Raw(src)
    }
}

impl From<TableWithJoins> for TableRef {
    fn from(src: TableWithJoins) -> TableRef {
        TableRef::Join(src)
    }
}
