/// Builds a [`Record`](crate::stmt::Record) from `column => value` pairs.
///
/// Nested component records are written as `"role" => vec![record! { .. }]`.
#[macro_export]
macro_rules! record {
    () => {
        $crate::stmt::Record::new()
    };
    ( $( $column:expr => $value:expr ),+ $(,)? ) => {{
        let mut record = $crate::stmt::Record::new();
        $(
            record.insert($column, $value);
        )+
        record
    }};
}
