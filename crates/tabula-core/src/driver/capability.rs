#[derive(Debug)]
pub struct Capability {
    pub dialect: Dialect,

    /// Supports `SELECT ... FOR UPDATE`. When false, `for` clauses are
    /// dropped from generated selects.
    pub select_for_update: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgresql,
    Mysql,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        dialect: Dialect::Sqlite,
        select_for_update: false,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        dialect: Dialect::Postgresql,
        select_for_update: true,
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        dialect: Dialect::Mysql,
        select_for_update: true,
    };
}
