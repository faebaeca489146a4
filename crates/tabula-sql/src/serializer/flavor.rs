use super::Serializer;

use tabula_core::schema::JoinSyntax;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flavor {
    Postgresql,
    Sqlite,
    Mysql,
}

impl<'a> Serializer<'a> {
    pub fn sqlite(join_syntax: &'a JoinSyntax) -> Serializer<'a> {
        Serializer {
            join_syntax,
            flavor: Flavor::Sqlite,
            for_clause: false,
        }
    }

    pub fn postgresql(join_syntax: &'a JoinSyntax) -> Serializer<'a> {
        Serializer {
            join_syntax,
            flavor: Flavor::Postgresql,
            for_clause: true,
        }
    }

    pub fn mysql(join_syntax: &'a JoinSyntax) -> Serializer<'a> {
        Serializer {
            join_syntax,
            flavor: Flavor::Mysql,
            for_clause: true,
        }
    }

    pub(super) fn supports_for_clause(&self) -> bool {
        self.for_clause
    }
}
