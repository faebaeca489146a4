use super::{Formatter, Params, ToSql};

use crate::stmt::{Join, JoinKind, TableRef, TableWithJoins};
use tabula_core::schema::Associativity;

impl ToSql for &TableRef {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            TableRef::Table { name, alias } => {
                let table = table_with_alias(name, alias.as_deref());
                fmt!(f, table.as_str());
            }
            TableRef::Raw(sql) => fmt!(f, sql),
            TableRef::Join(joins) => {
                let sql = render_joins(f, joins);
                fmt!(f, sql.as_str());
            }
        }
    }
}

fn table_with_alias(table: &str, alias: Option<&str>) -> String {
    match alias {
        Some(alias) if alias != table => format!("{table} {alias}"),
        _ => table.to_string(),
    }
}

fn render_joins<P>(f: &Formatter<'_, P>, joins: &TableWithJoins) -> String {
    let syntax = f.serializer.join_syntax;
    let template = |join: &Join| match join.kind {
        JoinKind::Inner => syntax.inner.as_str(),
        JoinKind::Left => syntax.left.as_str(),
    };
    let on = |join: &Join| {
        join.on
            .iter()
            .map(|(left, right)| format!("{left} = {right}"))
            .collect::<Vec<_>>()
            .join(" AND ")
    };
    let first = table_with_alias(&joins.table, joins.alias.as_deref());

    match syntax.associativity {
        Associativity::Left => joins.joins.iter().fold(first, |left, join| {
            let right = table_with_alias(&join.table, join.alias.as_deref());
            apply_template(template(join), &left, &right, &on(join))
        }),
        Associativity::Right => {
            // t0 J1 (t1 J2 (t2 J3 t3 ON c3) ON c2) ON c1
            let Some((last, init)) = joins.joins.split_last() else {
                return first;
            };
            let mut right = table_with_alias(&last.table, last.alias.as_deref());
            let mut pending = last;
            for join in init.iter().rev() {
                let left = table_with_alias(&join.table, join.alias.as_deref());
                let nested = apply_template(template(pending), &left, &right, &on(pending));
                right = format!("({nested})");
                pending = join;
            }
            apply_template(template(pending), &first, &right, &on(pending))
        }
    }
}

/// Substitutes the `{left}`, `{right}` and `{on}` markers of a join template.
fn apply_template(template: &str, left: &str, right: &str, on: &str) -> String {
    let mut out = String::with_capacity(template.len() + left.len() + right.len() + on.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let marker = &rest[start..];
        let (value, len) = if marker.starts_with("{left}") {
            (left, "{left}".len())
        } else if marker.starts_with("{right}") {
            (right, "{right}".len())
        } else if marker.starts_with("{on}") {
            (on, "{on}".len())
        } else {
            ("{", 1)
        };
        out.push_str(value);
        rest = &marker[len..];
    }
    out.push_str(rest);
    out
}
