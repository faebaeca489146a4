use tabula::{record, ColumnHandler, Expr, Record, ResultShape, SelectOptions, Value};
use tabula_driver_sqlite::Sqlite;
use tests::{company, company_schema, connect, seed, setup::COMPANY_DDL};

use pretty_assertions::assert_eq;

#[test]
fn date_handlers_round_trip() {
    let schema = company_schema();
    let activity = schema.source("Activity").unwrap();

    for date in ["01.01.1707", "29.02.1712", "31.12.1999"] {
        let original = record! { "d_begin" => date, "d_end" => Value::Null, "emp_id" => 1 };
        let mut record = original.clone();

        schema
            .apply_column_handler(activity, ColumnHandler::TO_STORE, &mut record)
            .unwrap();
        assert_ne!(record.get("d_begin"), original.get("d_begin"));
        assert_eq!(record.get("d_end"), Some(&Value::Null));

        schema
            .apply_column_handler(activity, ColumnHandler::FROM_STORE, &mut record)
            .unwrap();
        assert_eq!(record, original);
    }
}

#[tokio::test]
async fn store_holds_the_store_format() {
    let setup = company().await;
    seed(&setup.db).await;

    let mut cursor = setup
        .db
        .select(
            "Activity",
            SelectOptions::new()
                .columns(["d_begin"])
                .filter(Expr::eq("act_id", 2))
                .result_as(ResultShape::Cursor),
        )
        .await
        .unwrap()
        .into_cursor()
        .unwrap();
    assert_eq!(cursor.next().await.unwrap(), Some(vec![Value::from("1708-06-01")]));
    assert_eq!(
        setup.log.last_executed(),
        Some((
            "SELECT d_begin FROM Activity WHERE act_id = ?".to_string(),
            vec![Value::I64(2)],
        ))
    );
}

#[tokio::test]
async fn validate_reports_every_failing_column() {
    let setup = company().await;

    let good = record! { "d_begin" => "01.01.1707", "d_end" => Value::Null }.tagged("Activity");
    setup.db.validate(&good).unwrap();

    let bad = record! { "d_begin" => "31.02.1707", "d_end" => "1717-01-01" }.tagged("Activity");
    let err = setup.db.validate(&bad).unwrap_err();
    assert!(err.is_validation(), "{err}");
    let message = err.to_string();
    assert!(message.contains("d_begin"), "{message}");
    assert!(message.contains("d_end"), "{message}");

    let err = setup.db.validate(&record! { "d_begin" => "x" }).unwrap_err();
    assert!(err.is_invalid_record(), "{err}");
}

#[tokio::test]
async fn bad_stored_value_names_the_handler() {
    let setup = company().await;
    setup
        .db
        .execute_sql(
            "INSERT INTO Activity (emp_id, d_begin) VALUES (?, ?)",
            &[Value::I64(1), Value::from("garbage")],
        )
        .await
        .unwrap();

    let err = setup
        .db
        .select("Activity", SelectOptions::new())
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(
        message.contains("`from_store` handler of `Activity.d_begin`"),
        "{message}"
    );
}

#[tokio::test]
async fn insert_with_invalid_date_never_reaches_the_store() {
    let setup = company().await;

    let err = setup
        .db
        .insert_one("Employee", record! { "d_birth" => "1685/03/21" })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Employee.d_birth"), "{err}");
    assert!(setup.log.is_empty());
}

#[test]
fn custom_handlers_register_once() {
    let mut schema = company_schema();
    let upper = ColumnHandler::new(|value| {
        if let Some(text) = value.as_str() {
            *value = Value::from(text.to_uppercase());
        }
        Ok(())
    });

    schema
        .register_column_handler("Department", "dpt_code", "normalize", upper.clone())
        .unwrap();
    // the same handler again is accepted
    schema
        .register_column_handler("Department", "dpt_code", "normalize", upper)
        .unwrap();

    let other = ColumnHandler::new(|_| Ok(()));
    let err = schema
        .register_column_handler("Department", "dpt_code", "normalize", other.clone())
        .unwrap_err();
    assert!(err.is_duplicate_handler(), "{err}");

    let department = schema.source("Department").unwrap().clone();
    let mut record = record! { "dpt_code" => "sl" };
    schema
        .apply_column_handler(&department, "normalize", &mut record)
        .unwrap();
    assert_eq!(record.get("dpt_code"), Some(&Value::from("SL")));

    schema
        .replace_column_handler("Department", "dpt_code", "normalize", other)
        .unwrap();
    let department = schema.source("Department").unwrap().clone();
    let mut record = record! { "dpt_code" => "sl" };
    schema
        .apply_column_handler(&department, "normalize", &mut record)
        .unwrap();
    assert_eq!(record.get("dpt_code"), Some(&Value::from("sl")));
}

#[tokio::test]
async fn view_filters_and_inherits_handlers() {
    let mut schema = company_schema();
    schema
        .declare_view(
            "CurrentActivity",
            Vec::<String>::new(),
            "Activity",
            Some(Expr::is_null("d_end")),
            ["Activity"],
        )
        .unwrap();
    let setup = connect(schema, Sqlite::in_memory(), COMPANY_DDL).await;
    seed(&setup.db).await;

    let mut stmt = setup.db.statement("CurrentActivity").unwrap();
    stmt.refine(SelectOptions::new().filter(Expr::eq("emp_id", 1)))
        .unwrap();
    assert_eq!(
        stmt.sql().unwrap(),
        "SELECT * FROM Activity WHERE d_end IS NULL AND emp_id = ?"
    );

    let rows: Vec<Record> = stmt.all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source(), Some("CurrentActivity"));
    assert_eq!(rows[0].get("d_begin"), Some(&Value::from("01.01.1707")));

    let fetched = setup.db.fetch("CurrentActivity", 2).await.unwrap();
    assert_eq!(fetched, None);

    let err = setup
        .db
        .insert_one("CurrentActivity", record! { "emp_id" => 1 })
        .await
        .unwrap_err();
    assert!(err.is_invalid_statement(), "{err}");
}
