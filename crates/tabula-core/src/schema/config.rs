/// Schema-wide settings, passed by handle to every statement built against
/// the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub join_syntax: JoinSyntax,

    /// String bind values starting with this prefix are named placeholders,
    /// bound later by name instead of being sent to the store as literals.
    pub placeholder_prefix: String,

    /// Text appended as `FOR ...` to selects that do not override it.
    pub select_implicitly_for: Option<String>,

    /// Page size used when a page index is requested without a page size.
    pub default_page_size: u64,

    /// When set, the connection handle remembers the most recently executed
    /// cursor for inspection.
    pub keep_last_cursor: bool,
}

/// Templates used to render joins.
///
/// Each template contains the markers `{left}`, `{right}` and `{on}`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSyntax {
    pub inner: String,
    pub left: String,
    pub associativity: Associativity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `((a J b) J c)`, written without parentheses
    Left,

    /// `a J (b J c)`, for stores that require nested joins
    Right,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            join_syntax: JoinSyntax::default(),
            placeholder_prefix: "?:".to_string(),
            select_implicitly_for: None,
            default_page_size: 50,
            keep_last_cursor: false,
        }
    }
}

impl Config {
    /// Returns the placeholder name when `value` is a named placeholder.
    pub fn placeholder_name<'a>(&self, value: &'a str) -> Option<&'a str> {
        value.strip_prefix(self.placeholder_prefix.as_str())
    }
}

impl Default for JoinSyntax {
    fn default() -> JoinSyntax {
        JoinSyntax {
            inner: "{left} INNER JOIN {right} ON {on}".to_string(),
            left: "{left} LEFT OUTER JOIN {right} ON {on}".to_string(),
            associativity: Associativity::Left,
        }
    }
}
