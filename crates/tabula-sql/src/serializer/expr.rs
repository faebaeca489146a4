use super::{Comma, Delimited, Params, ToSql};

use crate::stmt::{self, Expr};

impl ToSql for &stmt::Expr {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        use stmt::Expr::*;

        match self {
            And(operands) if operands.is_empty() => fmt!(f, "1=1"),
            Or(operands) if operands.is_empty() => fmt!(f, "1=0"),
            And(operands) => {
                fmt!(f, Delimited(operands.iter().map(Nested::in_and), " AND "));
            }
            Or(operands) => {
                fmt!(f, Delimited(operands.iter().map(Nested::in_or), " OR "));
            }
            Not(expr) => {
                fmt!(f, "NOT (" {&**expr} ")");
            }
            BinaryOp(expr) => {
                fmt!(f, &expr.column " " expr.op.to_string().as_str() " " {&expr.value});
            }
            InList(expr) if expr.values.is_empty() => {
                fmt!(f, if expr.negate { "1=1" } else { "1=0" });
            }
            InList(expr) => {
                let op = if expr.negate { " NOT IN (" } else { " IN (" };
                fmt!(f, &expr.column op Comma(&expr.values) ")");
            }
            IsNull(expr) => {
                let op = if expr.negate { " IS NOT NULL" } else { " IS NULL" };
                fmt!(f, &expr.column op);
            }
            Raw(expr) => {
                let mut binds = expr.binds.iter();
                let mut rest = expr.sql.as_str();
                while let Some(pos) = rest.find('?') {
                    fmt!(f, &rest[..pos]);
                    match binds.next() {
                        Some(value) => fmt!(f, value),
                        None => fmt!(f, "?"),
                    }
                    rest = &rest[pos + 1..];
                }
                fmt!(f, rest);
            }
        }
    }
}

/// An operand of AND or OR, parenthesized when it is made of the other
/// connective.
struct Nested<'a> {
    expr: &'a Expr,
    parens: bool,
}

impl<'a> Nested<'a> {
    fn in_and(expr: &'a Expr) -> Nested<'a> {
        let parens = matches!(expr, Expr::Or(operands) if operands.len() > 1);
        Nested { expr, parens }
    }

    fn in_or(expr: &'a Expr) -> Nested<'a> {
        let parens = matches!(expr, Expr::And(operands) if operands.len() > 1);
        Nested { expr, parens }
    }
}

impl ToSql for Nested<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        if self.parens {
            fmt!(f, "(" self.expr ")");
        } else {
            fmt!(f, self.expr);
        }
    }
}
