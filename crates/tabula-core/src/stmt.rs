mod delete;
pub use delete::Delete;

mod expr;
pub use expr::{BinaryOp, Expr, ExprBinaryOp, ExprInList, ExprIsNull, ExprRaw};

mod insert;
pub use insert::Insert;

mod join;
pub use join::{Join, JoinKind, TableWithJoins};

mod key;
pub use key::Key;

mod order_by;
pub use order_by::{Direction, OrderBy};

mod record;
pub use record::Record;

mod select;
pub use select::Select;

mod table_ref;
pub use table_ref::TableRef;

mod update;
pub use update::Update;

mod value;
pub use value::Value;
