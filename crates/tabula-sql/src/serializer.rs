#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited};

mod flavor;
use flavor::Flavor;

mod params;
pub use params::{Params, Placeholder};

// Fragment serializers
mod expr;
mod statement;
mod table_ref;

use crate::stmt::Statement;

use tabula_core::{
    driver::{Capability, Dialect},
    schema::JoinSyntax,
};

/// Serialize a statement to a SQL string
#[derive(Debug)]
pub struct Serializer<'a> {
    /// Templates used to render joins
    join_syntax: &'a JoinSyntax,

    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,

    /// Render `FOR` clauses. SQLite has no row locking.
    for_clause: bool,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer<'a>,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl<'a> Serializer<'a> {
    /// Serializer for the dialect described by `capability`.
    pub fn for_capability(capability: &Capability, join_syntax: &'a JoinSyntax) -> Serializer<'a> {
        let serializer = match capability.dialect {
            Dialect::Sqlite => Serializer::sqlite(join_syntax),
            Dialect::Postgresql => Serializer::postgresql(join_syntax),
            Dialect::Mysql => Serializer::mysql(join_syntax),
        };

        Serializer {
            for_clause: capability.select_for_update,
            ..serializer
        }
    }

    /// Renders `stmt`, pushing every bind value to `params` in placeholder
    /// order. The returned SQL has no trailing semicolon.
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);
        ret
    }
}
