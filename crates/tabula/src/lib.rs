pub mod cursor;
pub use cursor::Cursor;

pub mod db;
pub use db::Db;

mod iter;
pub use iter::Iter;

mod lifecycle;

mod relation;

pub mod stmt;
pub use stmt::{Keyed, ResultShape, SelectOptions, SelectResult, Statement, Status};

pub use tabula_core::{
    bail, driver, err, record,
    schema::{
        self, AssociationEnd, AutoColumn, ColumnHandler, ColumnType, JoinToken, Multiplicity,
        Schema,
    },
    stmt::{Expr, Key, OrderBy, Record, Value},
    Error, Result,
};
