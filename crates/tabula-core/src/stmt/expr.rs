use super::{Record, Value};

use std::fmt;

/// A filter condition, the input of WHERE and HAVING clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// All operands hold; an empty list is always true
    And(Vec<Expr>),

    /// At least one operand holds; an empty list is always false
    Or(Vec<Expr>),

    Not(Box<Expr>),

    /// `column <op> value`
    BinaryOp(ExprBinaryOp),

    /// `column [NOT] IN (values...)`
    InList(ExprInList),

    /// `column IS [NOT] NULL`
    IsNull(ExprIsNull),

    /// Verbatim SQL with its own positional bind values
    Raw(ExprRaw),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBinaryOp {
    pub column: String,
    pub op: BinaryOp,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub column: String,
    pub values: Vec<Value>,
    pub negate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprIsNull {
    pub column: String,
    pub negate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprRaw {
    pub sql: String,
    pub binds: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl Expr {
    fn binary_op(column: impl Into<String>, op: BinaryOp, value: impl Into<Value>) -> Expr {
        Expr::BinaryOp(ExprBinaryOp {
            column: column.into(),
            op,
            value: value.into(),
        })
    }

    /// `column = value`; a null value becomes `column IS NULL`.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        let value = value.into();
        if value.is_null() {
            Expr::is_null(column)
        } else {
            Expr::binary_op(column, BinaryOp::Eq, value)
        }
    }

    /// `column <> value`; a null value becomes `column IS NOT NULL`.
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        let value = value.into();
        if value.is_null() {
            Expr::is_not_null(column)
        } else {
            Expr::binary_op(column, BinaryOp::Ne, value)
        }
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Lt, value)
    }

    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Le, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Gt, value)
    }

    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Ge, value)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Like, pattern)
    }

    pub fn in_list<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Expr {
        Expr::InList(ExprInList {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negate: false,
        })
    }

    pub fn not_in_list<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Expr {
        Expr::InList(ExprInList {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negate: true,
        })
    }

    pub fn is_null(column: impl Into<String>) -> Expr {
        Expr::IsNull(ExprIsNull {
            column: column.into(),
            negate: false,
        })
    }

    pub fn is_not_null(column: impl Into<String>) -> Expr {
        Expr::IsNull(ExprIsNull {
            column: column.into(),
            negate: true,
        })
    }

    pub fn raw(sql: impl Into<String>) -> Expr {
        Expr::Raw(ExprRaw {
            sql: sql.into(),
            binds: vec![],
        })
    }

    pub fn raw_with_binds<V: Into<Value>>(
        sql: impl Into<String>,
        binds: impl IntoIterator<Item = V>,
    ) -> Expr {
        Expr::Raw(ExprRaw {
            sql: sql.into(),
            binds: binds.into_iter().map(Into::into).collect(),
        })
    }

    pub fn and(operands: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(operands.into_iter().collect())
    }

    pub fn or(operands: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(operands.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Expr {
        Expr::Not(Box::new(expr))
    }

    /// Equality on every column of `record`, combined with AND.
    pub fn from_record(record: &Record) -> Expr {
        Expr::and(
            record
                .iter()
                .map(|(column, value)| Expr::eq(column, value.clone())),
        )
    }

    /// Combines two optional conditions with AND, flattening nested ANDs.
    pub fn and_optional(lhs: Option<Expr>, rhs: Option<Expr>) -> Option<Expr> {
        match (lhs, rhs) {
            (None, None) => None,
            (Some(expr), None) | (None, Some(expr)) => Some(expr),
            (Some(lhs), Some(rhs)) => Some(lhs.and_with(rhs)),
        }
    }

    pub fn and_with(self, rhs: Expr) -> Expr {
        let mut operands = match self {
            Expr::And(operands) => operands,
            expr => vec![expr],
        };
        match rhs {
            Expr::And(rhs) => operands.extend(rhs),
            rhs => operands.push(rhs),
        }
        Expr::And(operands)
    }

    /// Visits every bind value held by the condition, in serialization order.
    pub fn values(&self) -> Vec<&Value> {
        let mut out = vec![];
        self.collect_values(&mut out);
        out
    }

    fn collect_values<'a>(&'a self, out: &mut Vec<&'a Value>) {
        match self {
            Expr::And(operands) | Expr::Or(operands) => {
                for operand in operands {
                    operand.collect_values(out);
                }
            }
            Expr::Not(expr) => expr.collect_values(out),
            Expr::BinaryOp(expr) => out.push(&expr.value),
            Expr::InList(expr) => out.extend(expr.values.iter()),
            Expr::IsNull(_) => {}
            Expr::Raw(expr) => out.extend(expr.binds.iter()),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Like => "LIKE",
        })
    }
}
