use tabula::{record, Value};
use tabula_driver_sqlite::Sqlite;
use tests::{company, company_on_disk, company_schema, connect, seed, setup::COMPANY_DDL};

use pretty_assertions::assert_eq;

#[tokio::test]
async fn fetch_applies_from_store_handlers() {
    let setup = company().await;
    let seeded = seed(&setup.db).await;

    let bach = setup.db.fetch("Employee", seeded.bach).await.unwrap().unwrap();
    assert_eq!(
        bach,
        record! {
            "emp_id" => 1,
            "firstname" => "Johann Sebastian",
            "lastname" => "Bach",
            "d_birth" => "21.03.1685",
        }
        .tagged("Employee")
    );
}

#[tokio::test]
async fn fetch_with_more_than_one_match_returns_the_first() {
    let mut schema = company_schema();
    schema
        .declare_table("ActivityByEmployee", "Activity", ["emp_id"])
        .unwrap();
    let setup = connect(schema, Sqlite::in_memory(), COMPANY_DDL).await;
    seed(&setup.db).await;

    let act = setup
        .db
        .fetch("ActivityByEmployee", 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(act.get("act_id"), Some(&Value::I64(1)));
    assert_eq!(act.source(), Some("ActivityByEmployee"));
}

#[tokio::test]
async fn fetch_checks_the_key() {
    let setup = company().await;

    let err = setup.db.fetch("Employee", (1, 2)).await.unwrap_err();
    assert!(err.is_key_mismatch(), "{err}");

    let err = setup.db.fetch("Composer", 1).await.unwrap_err();
    assert!(err.is_unknown_source(), "{err}");
    assert!(setup.log.is_empty());
}

#[tokio::test]
async fn fetch_cached_hits_the_store_once() {
    let setup = company().await;
    seed(&setup.db).await;
    let selects = || setup.log.count_sql("SELECT");

    let first = setup.db.fetch_cached("Employee", 2).await.unwrap();
    let second = setup.db.fetch_cached("Employee", 2).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(selects(), 1);

    assert_eq!(setup.db.fetch_cached("Employee", 99).await.unwrap(), None);
    assert_eq!(setup.db.fetch_cached("Employee", 99).await.unwrap(), None);
    assert_eq!(selects(), 2);

    setup.db.clear_fetch_cache();
    setup.db.fetch_cached("Employee", 2).await.unwrap();
    assert_eq!(selects(), 3);
}

#[tokio::test]
async fn fetch_cache_is_per_connection() {
    let setup = company_on_disk("fetch_cache_is_per_connection").await;
    seed(&setup.db).await;
    let sibling = setup.sibling().await;
    assert_ne!(setup.db.connection_id(), sibling.connection_id());
    let selects = || setup.log.count_sql("SELECT");

    setup.db.fetch_cached("Employee", 1).await.unwrap();
    let bach = sibling.fetch_cached("Employee", 1).await.unwrap().unwrap();
    assert_eq!(bach.get("lastname"), Some(&Value::from("Bach")));
    assert_eq!(selects(), 2);

    // clearing through one connection clears every connection of the schema
    sibling.clear_fetch_cache();
    setup.db.fetch_cached("Employee", 1).await.unwrap();
    assert_eq!(selects(), 3);
}

#[tokio::test]
async fn fetch_cache_keys_keep_their_type() {
    let setup = company().await;
    seed(&setup.db).await;
    let selects = || setup.log.count_sql("SELECT");

    setup.db.fetch_cached("Employee", 1).await.unwrap();
    setup.db.fetch_cached("Employee", "1").await.unwrap();
    assert_eq!(selects(), 2);

    setup.db.fetch_cached("Employee", Value::from("1")).await.unwrap();
    setup.db.fetch_cached("Employee", Value::I64(1)).await.unwrap();
    assert_eq!(selects(), 2);
}
