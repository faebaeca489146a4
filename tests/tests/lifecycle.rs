use tabula::{record, AutoColumn, Key, Record, SelectOptions, Value};
use tabula_driver_sqlite::Sqlite;
use tests::{company, company_schema, connect, seed, setup::COMPANY_DDL};

use pretty_assertions::assert_eq;

fn note_ddl() -> Vec<&'static str> {
    let mut ddl = COMPANY_DDL.to_vec();
    ddl.push(
        "CREATE TABLE Note (
            note_id INTEGER PRIMARY KEY AUTOINCREMENT,
            body TEXT,
            locked TEXT,
            created_by TEXT,
            updated_by TEXT
        )",
    );
    ddl.push(
        "CREATE TABLE Membership (
            emp_id INTEGER NOT NULL,
            dpt_id INTEGER NOT NULL,
            title TEXT,
            PRIMARY KEY (emp_id, dpt_id)
        )",
    );
    ddl
}

async fn notes() -> tests::Setup {
    let mut schema = company_schema();
    schema.declare_table("Note", "Note", ["note_id"]).unwrap();
    schema
        .declare_table("Membership", "Membership", ["emp_id", "dpt_id"])
        .unwrap();
    schema.declare_no_update_columns("Note", ["locked"]).unwrap();
    schema.declare_transient_columns("Note", ["scratch"]).unwrap();
    schema
        .declare_auto_insert_column("Note", "created_by", AutoColumn::new(|_| "tester".into()))
        .unwrap();
    schema
        .declare_auto_update_column(
            "Note",
            "updated_by",
            AutoColumn::new(|record| {
                let len = record
                    .get("body")
                    .and_then(Value::as_str)
                    .map(str::len)
                    .unwrap_or_default();
                Value::from(format!("{len} chars"))
            }),
        )
        .unwrap();

    connect(schema, Sqlite::in_memory(), &note_ddl()).await
}

#[tokio::test]
async fn insert_many_components() {
    let setup = company().await;

    let activities: Vec<Record> = (1..=4)
        .map(|month| record! { "d_begin" => format!("01.{month:02}.1707") })
        .collect();
    let key = setup
        .db
        .insert_one(
            "Employee",
            record! { "lastname" => "Bach", "activities" => activities },
        )
        .await
        .unwrap();

    assert_eq!(key, Key::from(1));
    assert_eq!(setup.log.count_sql("INSERT INTO Employee"), 1);
    assert_eq!(setup.log.count_sql("INSERT INTO Activity"), 4);

    for (sql, binds) in setup.log.executed().into_iter().skip(1) {
        assert_eq!(sql, "INSERT INTO Activity (d_begin, emp_id) VALUES (?, ?)");
        assert_eq!(binds[1], Value::I64(1));
    }

    let employee = setup.db.fetch("Employee", 1).await.unwrap().unwrap();
    let rows = setup.db.follow(&employee, "activities").unwrap().all().await.unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3].get("d_begin"), Some(&Value::from("01.04.1707")));
}

#[tokio::test]
async fn insert_returns_keys_in_order() {
    let setup = company().await;

    let keys = setup
        .db
        .insert(
            "Employee",
            vec![
                record! { "lastname" => "Bach" },
                record! { "emp_id" => 10, "lastname" => "Handel" },
                record! { "lastname" => "Telemann" },
            ],
        )
        .await
        .unwrap();

    assert_eq!(keys, vec![Key::from(1), Key::from(10), Key::from(11)]);
    assert_eq!(
        setup.log.executed()[1],
        (
            "INSERT INTO Employee (emp_id, lastname) VALUES (?, ?)".to_string(),
            vec![Value::I64(10), Value::from("Handel")],
        )
    );
}

#[tokio::test]
async fn insert_without_composite_key_is_ambiguous() {
    let setup = notes().await;

    let err = setup
        .db
        .insert_one("Membership", record! { "emp_id" => 1, "title" => "lead" })
        .await
        .unwrap_err();

    assert!(err.is_ambiguous_key(), "{err}");
    assert!(setup.log.is_empty());

    let key = setup
        .db
        .insert_one(
            "Membership",
            record! { "emp_id" => 1, "dpt_id" => 2, "title" => "lead" },
        )
        .await
        .unwrap();
    assert_eq!(key, Key::from((1, 2)));
}

#[tokio::test]
async fn insert_rejects_nested_value_outside_components() {
    let setup = company().await;

    let err = setup
        .db
        .insert_one(
            "Department",
            record! {
                "dpt_name" => "Sales",
                "activities" => vec![record! { "d_begin" => "01.01.1707" }],
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_invalid_record(), "{err}");
    assert!(setup.log.is_empty());
}

#[tokio::test]
async fn update_sets_only_supplied_columns() {
    let mut setup = company().await;
    let seeded = seed(&setup.db).await;
    setup.log.clear();

    setup
        .db
        .update("Employee", seeded.bach.clone(), record! { "firstname" => "J. S." })
        .await
        .unwrap();

    assert_eq!(
        setup.log.executed(),
        vec![(
            "UPDATE Employee SET firstname = ? WHERE emp_id = ?".to_string(),
            vec![Value::from("J. S."), Value::I64(1)],
        )]
    );

    let bach = setup.db.fetch("Employee", seeded.bach).await.unwrap().unwrap();
    assert_eq!(bach.get("firstname"), Some(&Value::from("J. S.")));
    assert_eq!(bach.get("lastname"), Some(&Value::from("Bach")));
    assert_eq!(bach.get("d_birth"), Some(&Value::from("21.03.1685")));
}

#[tokio::test]
async fn disjoint_updates_do_not_clobber_each_other() {
    let setup = company().await;
    let seeded = seed(&setup.db).await;
    let other = setup.db.clone();

    let (a, b) = tokio::join!(
        setup
            .db
            .update("Employee", seeded.ravel.clone(), record! { "firstname" => "Joseph-Maurice" }),
        other.update("Employee", seeded.ravel.clone(), record! { "d_birth" => "08.03.1875" }),
    );
    assert_eq!(a.unwrap(), 1);
    assert_eq!(b.unwrap(), 1);

    let ravel = setup.db.fetch("Employee", seeded.ravel).await.unwrap().unwrap();
    assert_eq!(ravel.get("firstname"), Some(&Value::from("Joseph-Maurice")));
    assert_eq!(ravel.get("d_birth"), Some(&Value::from("08.03.1875")));
}

#[tokio::test]
async fn update_record_keeps_only_the_key() {
    let mut setup = company().await;
    seed(&setup.db).await;
    let mut bach = setup.db.fetch("Employee", 1).await.unwrap().unwrap();
    setup.log.clear();

    bach.insert("firstname", "Johann");
    let changed = setup.db.update_record(&mut bach).await.unwrap();

    assert_eq!(changed, 1);
    assert_eq!(
        setup.log.executed(),
        vec![(
            "UPDATE Employee SET firstname = ?, lastname = ?, d_birth = ? WHERE emp_id = ?"
                .to_string(),
            vec![
                Value::from("Johann"),
                Value::from("Bach"),
                Value::from("1685-03-21"),
                Value::I64(1),
            ],
        )]
    );
    assert_eq!(bach.columns().collect::<Vec<_>>(), ["emp_id"]);
    assert_eq!(bach.source(), Some("Employee"));
}

#[tokio::test]
async fn update_drops_nested_values() {
    let mut setup = company().await;
    seed(&setup.db).await;
    setup.log.clear();

    let changed = setup
        .db
        .update(
            "Employee",
            1,
            record! {
                "lastname" => "Bach",
                "activities" => vec![record! { "d_begin" => "01.01.1750" }],
            },
        )
        .await
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(
        setup.log.statements(),
        ["UPDATE Employee SET lastname = ? WHERE emp_id = ?"]
    );
    setup.log.clear();

    let changed = setup
        .db
        .update(
            "Employee",
            1,
            record! { "activities" => vec![record! { "d_begin" => "01.01.1750" }] },
        )
        .await
        .unwrap();
    assert_eq!(changed, 0);
    assert!(setup.log.is_empty());
}

#[tokio::test]
async fn update_by_record_requires_key() {
    let setup = company().await;

    let err = setup
        .db
        .update_by_record("Employee", record! { "lastname" => "Bach" })
        .await
        .unwrap_err();
    assert!(err.is_invalid_record(), "{err}");

    let err = setup
        .db
        .update("Employee", (1, 2), record! { "lastname" => "Bach" })
        .await
        .unwrap_err();
    assert!(err.is_key_mismatch(), "{err}");
    assert!(setup.log.is_empty());
}

#[tokio::test]
async fn column_sets_shape_writes() {
    let mut setup = notes().await;

    let key = setup
        .db
        .insert_one(
            "Note",
            record! { "body" => "hello", "scratch" => "tmp", "locked" => "no" },
        )
        .await
        .unwrap();
    assert_eq!(
        setup.log.executed(),
        vec![(
            "INSERT INTO Note (body, locked, created_by, updated_by) VALUES (?, ?, ?, ?)"
                .to_string(),
            vec![
                Value::from("hello"),
                Value::from("no"),
                Value::from("tester"),
                Value::from("5 chars"),
            ],
        )]
    );
    setup.log.clear();

    setup
        .db
        .update(
            "Note",
            key.clone(),
            record! { "body" => "hi there", "locked" => "yes", "scratch" => "x" },
        )
        .await
        .unwrap();
    assert_eq!(
        setup.log.executed(),
        vec![(
            "UPDATE Note SET body = ?, updated_by = ? WHERE note_id = ?".to_string(),
            vec![Value::from("hi there"), Value::from("8 chars"), Value::I64(1)],
        )]
    );

    let note = setup.db.fetch("Note", key).await.unwrap().unwrap();
    assert_eq!(note.get("locked"), Some(&Value::from("no")));
    assert_eq!(note.get("created_by"), Some(&Value::from("tester")));
}

#[tokio::test]
async fn delete_record_cascades_loaded_components() {
    let mut setup = company().await;
    let seeded = seed(&setup.db).await;

    let mut bach = setup.db.fetch("Employee", seeded.bach).await.unwrap().unwrap();
    setup.db.expand(&mut bach, "activities").await.unwrap();
    setup.log.clear();

    let deleted = setup.db.delete_record(&bach).await.unwrap();

    assert_eq!(deleted, 3);
    assert_eq!(
        setup.log.executed(),
        vec![
            ("DELETE FROM Activity WHERE act_id = ?".to_string(), vec![Value::I64(1)]),
            ("DELETE FROM Activity WHERE act_id = ?".to_string(), vec![Value::I64(2)]),
            ("DELETE FROM Employee WHERE emp_id = ?".to_string(), vec![Value::I64(1)]),
        ]
    );

    let left = setup
        .db
        .select("Activity", SelectOptions::new())
        .await
        .unwrap()
        .into_rows()
        .unwrap();
    assert_eq!(left.len(), 1);
}

#[tokio::test]
async fn delete_record_leaves_unloaded_components() {
    let setup = company().await;
    let seeded = seed(&setup.db).await;

    let ravel = setup.db.fetch("Employee", seeded.ravel).await.unwrap().unwrap();
    assert_eq!(setup.db.delete_record(&ravel).await.unwrap(), 1);

    let left = setup
        .db
        .select("Activity", SelectOptions::new())
        .await
        .unwrap()
        .into_rows()
        .unwrap();
    assert_eq!(left.len(), 3);
}

#[tokio::test]
async fn delete_by_key_and_filter() {
    let setup = company().await;
    seed(&setup.db).await;

    assert_eq!(setup.db.delete("Activity", 3).await.unwrap(), 1);
    assert_eq!(setup.db.delete("Activity", 3).await.unwrap(), 0);
    assert_eq!(
        setup
            .db
            .delete_where("Activity", tabula::Expr::is_not_null("d_end"))
            .await
            .unwrap(),
        1
    );
}
