use tabula::{record, Db, SelectOptions, Statement, Value};
use tabula_driver_sqlite::Sqlite;
use tests::{company, company_schema_with, connect, setup::COMPANY_DDL};

use pretty_assertions::assert_eq;

async fn seven_employees(db: &Db) {
    let records = (1..=7)
        .map(|i| record! { "lastname" => format!("E{i}") })
        .collect();
    db.insert("Employee", records).await.unwrap();
}

fn paged(db: &Db, options: SelectOptions) -> Statement {
    let mut stmt = db.statement("Employee").unwrap();
    stmt.refine(options.order_by(["emp_id"])).unwrap();
    stmt
}

fn lastnames(rows: &[tabula::Record]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get("lastname").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn pages_partition_the_rows() {
    let setup = company().await;
    seven_employees(&setup.db).await;

    let mut stmt = paged(&setup.db, SelectOptions::new().page_size(3));
    assert_eq!(
        stmt.sql().unwrap(),
        "SELECT * FROM Employee ORDER BY emp_id LIMIT ? OFFSET ?"
    );
    assert_eq!(stmt.bind_values(), [Value::I64(3), Value::I64(0)]);

    let mut all = vec![];
    for index in 1..=3 {
        stmt.goto_page(index).await.unwrap();
        assert_eq!(stmt.page_index(), Some(index as u64));
        all.extend(lastnames(&stmt.all().await.unwrap()));
    }
    assert_eq!(all, ["E1", "E2", "E3", "E4", "E5", "E6", "E7"]);
    assert_eq!(stmt.page_count().await.unwrap(), 3);
    assert_eq!(stmt.row_count().await.unwrap(), 7);
}

#[tokio::test]
async fn negative_index_counts_from_the_end() {
    let setup = company().await;
    seven_employees(&setup.db).await;

    let mut stmt = paged(&setup.db, SelectOptions::new().page_size(3));
    stmt.goto_page(-1).await.unwrap();
    assert_eq!(stmt.page_index(), Some(3));
    assert_eq!(lastnames(&stmt.all().await.unwrap()), ["E7"]);

    stmt.goto_page(-3).await.unwrap();
    assert_eq!(stmt.page_index(), Some(1));

    stmt.goto_page(-10).await.unwrap();
    assert_eq!(stmt.page_index(), Some(1));
}

#[tokio::test]
async fn page_zero_is_rejected() {
    let setup = company().await;

    let mut stmt = paged(&setup.db, SelectOptions::new().page_size(3));
    let err = stmt.goto_page(0).await.unwrap_err();
    assert!(err.is_invalid_statement(), "{err}");

    let mut stmt = paged(&setup.db, SelectOptions::new());
    let err = stmt.goto_page(1).await.unwrap_err();
    assert!(err.is_invalid_statement(), "{err}");

    let mut stmt = paged(&setup.db, SelectOptions::new().page_size(0));
    let err = stmt.compile().unwrap_err();
    assert!(err.is_invalid_statement(), "{err}");
}

#[tokio::test]
async fn out_of_range_pages_are_rejected() {
    let mut setup = company().await;
    seven_employees(&setup.db).await;
    setup.log.clear();

    let mut stmt = paged(&setup.db, SelectOptions::new().page_size(3));
    let err = stmt.goto_page(i64::MAX).await.unwrap_err();
    assert!(err.is_invalid_statement(), "{err}");
    let err = stmt.shift_pages(i64::MAX).await.unwrap_err();
    assert!(err.is_invalid_statement(), "{err}");
    assert!(setup.log.is_empty());

    let mut stmt = paged(&setup.db, SelectOptions::new().page_size(2).page_index(u64::MAX));
    let err = stmt.compile().unwrap_err();
    assert!(err.is_invalid_statement(), "{err}");

    let mut stmt = paged(&setup.db, SelectOptions::new().page_size(3));
    stmt.goto_page(3).await.unwrap();
    assert_eq!(lastnames(&stmt.all().await.unwrap()), ["E7"]);
}

#[tokio::test]
async fn row_count_ignores_pagination() {
    let mut setup = company().await;
    seven_employees(&setup.db).await;
    setup.log.clear();

    let mut stmt = paged(
        &setup.db,
        SelectOptions::new()
            .filter(tabula::Expr::ne("lastname", "?:skip"))
            .page_size(2),
    );
    stmt.bind("skip", "E4");

    assert_eq!(stmt.row_count().await.unwrap(), 6);
    assert_eq!(
        setup.log.executed(),
        vec![(
            "SELECT COUNT(*) FROM (SELECT * FROM Employee WHERE lastname <> ?) count_wrapper"
                .to_string(),
            vec![Value::from("E4")],
        )]
    );

    // cached until the next bind
    assert_eq!(stmt.row_count().await.unwrap(), 6);
    assert_eq!(setup.log.count_sql("SELECT COUNT(*)"), 1);

    stmt.bind("skip", "nobody");
    assert_eq!(stmt.row_count().await.unwrap(), 7);
    assert_eq!(stmt.page_count().await.unwrap(), 4);
    assert_eq!(setup.log.count_sql("SELECT COUNT(*)"), 2);
}

#[tokio::test]
async fn page_boundaries_are_one_based() {
    let setup = company().await;
    seven_employees(&setup.db).await;

    let mut stmt = paged(&setup.db, SelectOptions::new().page_size(3));
    stmt.goto_page(2).await.unwrap();
    assert_eq!(stmt.page_boundaries().await.unwrap(), (4, 6));

    stmt.goto_page(3).await.unwrap();
    assert_eq!(stmt.page_boundaries().await.unwrap(), (7, 7));

    stmt.goto_page(4).await.unwrap();
    assert_eq!(stmt.page_boundaries().await.unwrap(), (0, 0));
    assert!(stmt.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn same_page_at_its_start_is_not_reexecuted() {
    let mut setup = company().await;
    seven_employees(&setup.db).await;
    setup.log.clear();

    let mut stmt = paged(&setup.db, SelectOptions::new().page_size(3));
    stmt.goto_page(2).await.unwrap();
    assert_eq!(setup.log.count_sql("SELECT *"), 1);

    stmt.goto_page(2).await.unwrap();
    assert_eq!(setup.log.count_sql("SELECT *"), 1);

    stmt.next().await.unwrap();
    stmt.goto_page(2).await.unwrap();
    assert_eq!(setup.log.count_sql("SELECT *"), 2);
    assert_eq!(stmt.row_num(), 0);

    let (_, binds) = setup.log.last_executed().unwrap();
    assert_eq!(binds, vec![Value::I64(3), Value::I64(3)]);
}

#[tokio::test]
async fn shift_and_page_rows() {
    let setup = company().await;
    seven_employees(&setup.db).await;

    let mut stmt = paged(&setup.db, SelectOptions::new().page_size(3).page_index(2));
    assert_eq!(lastnames(&stmt.page_rows().await.unwrap()), ["E4", "E5", "E6"]);

    stmt.shift_pages(1).await.unwrap();
    assert_eq!(stmt.page_index(), Some(3));
    assert_eq!(lastnames(&stmt.page_rows().await.unwrap()), ["E7"]);

    stmt.shift_pages(-5).await.unwrap();
    assert_eq!(stmt.page_index(), Some(1));
}

#[tokio::test]
async fn page_index_alone_uses_default_page_size() {
    let schema = company_schema_with(|config| {
        config.default_page_size(2);
    });
    let setup = connect(schema, Sqlite::in_memory(), COMPANY_DDL).await;
    seven_employees(&setup.db).await;

    let rows = setup
        .db
        .select(
            "Employee",
            SelectOptions::new().order_by(["emp_id"]).page_index(3),
        )
        .await
        .unwrap()
        .into_rows()
        .unwrap();
    assert_eq!(lastnames(&rows), ["E5", "E6"]);
}
