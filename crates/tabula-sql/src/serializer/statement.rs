use super::{Comma, Flavor, Formatter, Params, ToSql};

use crate::stmt::{self, Direction, OrderBy, Statement, Value};

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Statement::Select(stmt) => stmt.to_sql(f),
            Statement::Count(stmt) => Count(stmt).to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
            Statement::Delete(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "SELECT ");
        if self.columns.is_empty() {
            fmt!(f, "*");
        } else {
            fmt!(f, Comma(&self.columns));
        }
        fmt!(f, " FROM " {&self.from});

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
        if !self.group_by.is_empty() {
            fmt!(f, " GROUP BY " Comma(&self.group_by));
        }
        if let Some(having) = &self.having {
            fmt!(f, " HAVING " having);
        }
        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&self.order_by));
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                let limit = Value::from(i64::try_from(limit).unwrap_or(i64::MAX));
                fmt!(f, " LIMIT " {&limit});
                if let Some(offset) = offset {
                    let offset = Value::from(i64::try_from(offset).unwrap_or(i64::MAX));
                    fmt!(f, " OFFSET " {&offset});
                }
            }
            (None, Some(offset)) => {
                // SQLite and MySQL only accept OFFSET after a LIMIT
                match f.serializer.flavor {
                    Flavor::Sqlite => fmt!(f, " LIMIT -1"),
                    Flavor::Mysql => fmt!(f, " LIMIT 18446744073709551615"),
                    Flavor::Postgresql => {}
                }
                let offset = Value::from(i64::try_from(offset).unwrap_or(i64::MAX));
                fmt!(f, " OFFSET " {&offset});
            }
            (None, None) => {}
        }

        if let Some(clause) = &self.for_clause {
            if f.serializer.supports_for_clause() {
                fmt!(f, " FOR " clause);
            }
        }
    }
}

impl ToSql for &OrderBy {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, &self.column);
        if self.direction == Direction::Desc {
            fmt!(f, " DESC");
        }
    }
}

/// Row count of a select.
struct Count<'a>(&'a stmt::Select);

impl ToSql for Count<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let inner = stmt::Select {
            order_by: vec![],
            limit: None,
            offset: None,
            for_clause: None,
            ..self.0.clone()
        };
        fmt!(f, "SELECT COUNT(*) FROM (" {&inner} ") count_wrapper");
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "INSERT INTO " {&self.table});

        if self.columns.is_empty() {
            if f.serializer.flavor == Flavor::Mysql {
                fmt!(f, " () VALUES ()");
            } else {
                fmt!(f, " DEFAULT VALUES");
            }
            return;
        }

        fmt!(f, " (" Comma(&self.columns) ") VALUES (" Comma(&self.values) ")");
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(
            f,
            "UPDATE " {&self.table} " SET "
            Comma(self.assignments.iter().map(|(column, value)| Assignment(column, value)))
        );
        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}

struct Assignment<'a>(&'a String, &'a Value);

impl ToSql for Assignment<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, self.0 " = " self.1);
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "DELETE FROM " {&self.table});
        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}
