use tabula::{Expr, SelectOptions, Status, Value};
use tests::{company, company_schema_with, connect, seed, setup::COMPANY_DDL};
use tabula_driver_sqlite::Sqlite;

use pretty_assertions::assert_eq;

fn lastnames(rows: &[tabula::Record]) -> Vec<&str> {
    rows.iter()
        .filter_map(|row| row.get("lastname").and_then(Value::as_str))
        .collect()
}

#[tokio::test]
async fn status_moves_forward() {
    let setup = company().await;
    seed(&setup.db).await;

    let mut stmt = setup.db.statement("Employee").unwrap();
    assert_eq!(stmt.status(), Status::New);

    stmt.compile().unwrap();
    assert_eq!(stmt.status(), Status::Compiled);

    stmt.prepare().await.unwrap();
    assert_eq!(stmt.status(), Status::Prepared);

    stmt.execute().await.unwrap();
    assert_eq!(stmt.status(), Status::Executed);
    assert_eq!(stmt.all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn execute_from_new_runs_earlier_steps() {
    let setup = company().await;
    seed(&setup.db).await;

    let mut stmt = setup.db.statement("Employee").unwrap();
    stmt.execute().await.unwrap();
    assert_eq!(stmt.status(), Status::Executed);
    assert_eq!(
        stmt.columns(),
        ["emp_id", "firstname", "lastname", "d_birth"]
    );
}

#[tokio::test]
async fn refine_after_compile_is_rejected() {
    let setup = company().await;

    let mut stmt = setup.db.statement("Employee").unwrap();
    stmt.refine(SelectOptions::new().filter(Expr::eq("lastname", "Bach")))
        .unwrap();
    stmt.compile().unwrap();

    let err = stmt
        .refine(SelectOptions::new().filter(Expr::eq("firstname", "Johann")))
        .unwrap_err();
    assert!(err.is_invalid_state(), "{err}");

    let err = stmt.compile().unwrap_err();
    assert!(err.is_invalid_state(), "{err}");
}

#[tokio::test]
async fn refined_filters_are_anded() {
    let setup = company().await;

    let mut stmt = setup.db.statement("Employee").unwrap();
    stmt.refine(SelectOptions::new().filter(Expr::eq("lastname", "Bach")))
        .unwrap()
        .refine(
            SelectOptions::new()
                .filter(Expr::or([Expr::eq("firstname", "A"), Expr::eq("firstname", "B")]))
                .order_by(["firstname"]),
        )
        .unwrap();

    assert_eq!(
        stmt.sql().unwrap(),
        "SELECT * FROM Employee WHERE lastname = ? AND (firstname = ? OR firstname = ?) \
         ORDER BY firstname"
    );
    assert_eq!(
        stmt.bind_values(),
        [Value::from("Bach"), Value::from("A"), Value::from("B")]
    );
}

#[tokio::test]
async fn named_placeholders_bind_before_and_after_compile() {
    let setup = company().await;
    seed(&setup.db).await;

    let mut stmt = setup.db.statement("Employee").unwrap();
    stmt.refine(SelectOptions::new().filter(Expr::and([
        Expr::eq("lastname", "?:name"),
        Expr::ne("firstname", "?:not_first"),
    ])))
    .unwrap();
    stmt.bind("name", "Bach");
    stmt.compile().unwrap();
    assert_eq!(
        stmt.bind_values(),
        [Value::from("Bach"), Value::from("?:not_first")]
    );

    stmt.bind("not_first", "Carl Philipp");
    assert_eq!(
        stmt.bind_values(),
        [Value::from("Bach"), Value::from("Carl Philipp")]
    );

    let rows = stmt.all().await.unwrap();
    assert_eq!(lastnames(&rows), ["Bach"]);
}

#[tokio::test]
async fn unbound_placeholder_fails_before_the_store() {
    let setup = company().await;

    let mut stmt = setup.db.statement("Employee").unwrap();
    stmt.refine(SelectOptions::new().filter(Expr::eq("lastname", "?:name")))
        .unwrap();

    let err = stmt.execute().await.unwrap_err();
    assert!(err.is_unbound_placeholder(), "{err}");
    assert!(err.to_string().contains("name"), "{err}");
    assert!(setup.log.is_empty());
}

#[tokio::test]
async fn execute_again_with_new_binds() {
    let setup = company().await;
    seed(&setup.db).await;

    let mut stmt = setup.db.statement("Employee").unwrap();
    stmt.refine(SelectOptions::new().filter(Expr::eq("lastname", "?:name")))
        .unwrap();

    stmt.execute_with([("name", "Bach")]).await.unwrap();
    let bach = stmt.next().await.unwrap().unwrap();
    assert_eq!(bach.get("firstname"), Some(&Value::from("Johann Sebastian")));
    assert_eq!(stmt.row_num(), 1);

    stmt.execute_with([("name", "Ravel")]).await.unwrap();
    assert_eq!(stmt.row_num(), 0);
    let rows = stmt.all().await.unwrap();
    assert_eq!(lastnames(&rows), ["Ravel"]);
}

#[tokio::test]
async fn placeholder_prefix_is_configurable() {
    let schema = company_schema_with(|config| {
        config.placeholder_prefix(":");
    });
    let setup = connect(schema, Sqlite::in_memory(), COMPANY_DDL).await;
    seed(&setup.db).await;

    let mut stmt = setup.db.statement("Employee").unwrap();
    stmt.refine(SelectOptions::new().filter(Expr::eq("lastname", ":who")))
        .unwrap();
    stmt.bind("who", "Ravel");

    let rows = stmt.all().await.unwrap();
    assert_eq!(lastnames(&rows), ["Ravel"]);
}

#[tokio::test]
async fn limit_and_offset_are_last_binds() {
    let setup = company().await;
    seed(&setup.db).await;

    let mut stmt = setup.db.statement("Employee").unwrap();
    stmt.refine(
        SelectOptions::new()
            .columns(["lastname"])
            .filter(Expr::like("lastname", "%a%"))
            .order_by(["emp_id"])
            .limit(1)
            .offset(1),
    )
    .unwrap();

    assert_eq!(
        stmt.sql().unwrap(),
        "SELECT lastname FROM Employee WHERE lastname LIKE ? ORDER BY emp_id LIMIT ? OFFSET ?"
    );
    assert_eq!(
        stmt.bind_values(),
        [Value::from("%a%"), Value::I64(1), Value::I64(1)]
    );
    let rows = stmt.all().await.unwrap();
    assert_eq!(lastnames(&rows), ["Ravel"]);
}

#[tokio::test]
async fn execution_hooks_run_around_the_store() {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    let setup = company().await;
    seed(&setup.db).await;

    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let columns_seen = Arc::new(AtomicUsize::new(0));

    let rows = setup
        .db
        .select(
            "Employee",
            SelectOptions::new()
                .pre_exec({
                    let before = before.clone();
                    move |stmt| {
                        assert_eq!(stmt.status(), Status::Prepared);
                        before.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .post_exec({
                    let after = after.clone();
                    let columns_seen = columns_seen.clone();
                    move |stmt| {
                        after.fetch_add(1, Ordering::SeqCst);
                        columns_seen.store(stmt.columns().len(), Ordering::SeqCst);
                    }
                })
                .post_materialize(|row| {
                    row.insert("seen", true);
                }),
        )
        .await
        .unwrap()
        .into_rows()
        .unwrap();

    assert_eq!(before.load(Ordering::SeqCst), 1);
    assert_eq!(after.load(Ordering::SeqCst), 1);
    assert_eq!(columns_seen.load(Ordering::SeqCst), 4);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.get("seen") == Some(&Value::Bool(true))));
}

#[tokio::test]
async fn bind_record_binds_every_field() {
    let setup = company().await;
    seed(&setup.db).await;

    let mut stmt = setup.db.statement("Employee").unwrap();
    stmt.refine(SelectOptions::new().filter(Expr::and([
        Expr::eq("lastname", "?:lastname"),
        Expr::eq("firstname", "?:firstname"),
    ])))
    .unwrap();
    stmt.bind_record(&tabula::record! { "firstname" => "Maurice", "lastname" => "Ravel" });

    let rows = stmt.all().await.unwrap();
    assert_eq!(lastnames(&rows), ["Ravel"]);
}

#[tokio::test]
async fn last_cursor_is_kept_on_request() {
    let setup = company().await;
    setup.db.statement("Employee").unwrap().execute().await.unwrap();
    assert!(setup.db.last_cursor().is_none());

    let schema = company_schema_with(|config| {
        config.keep_last_cursor(true);
    });
    let setup = connect(schema, Sqlite::in_memory(), COMPANY_DDL).await;
    let mut stmt = setup.db.statement("Employee").unwrap();
    stmt.execute().await.unwrap();
    assert!(setup.db.last_cursor().is_some());
}
