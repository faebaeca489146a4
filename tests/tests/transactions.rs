use tabula::{err, record, Db, SelectOptions};
use tests::{company, company_on_disk, DriverOp};

use pretty_assertions::assert_eq;

async fn employee_count(db: &Db) -> usize {
    db.select("Employee", SelectOptions::new())
        .await
        .unwrap()
        .into_rows()
        .unwrap()
        .len()
}

#[tokio::test]
async fn body_success_commits() {
    let mut setup = company().await;

    let key = setup
        .db
        .transaction(|db| async move {
            assert!(db.in_transaction().await);
            db.insert_one("Employee", record! { "lastname" => "Bach" }).await
        })
        .await
        .unwrap();
    assert_eq!(key, tabula::Key::from(1));
    assert!(!setup.db.in_transaction().await);

    assert!(matches!(setup.log.pop(), Some(DriverOp::Begin)));
    assert!(matches!(setup.log.pop(), Some(DriverOp::Execute { .. })));
    assert!(matches!(setup.log.pop(), Some(DriverOp::Commit)));
    assert!(setup.log.is_empty());
    assert_eq!(employee_count(&setup.db).await, 1);
}

#[tokio::test]
async fn body_failure_rolls_back() {
    let setup = company().await;

    let err = setup
        .db
        .transaction(|db| async move {
            db.insert_one("Employee", record! { "lastname" => "Bach" }).await?;
            Err::<(), _>(err!("boom"))
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert_eq!(setup.log.count(|op| matches!(op, DriverOp::Rollback)), 1);
    assert_eq!(setup.log.count(|op| matches!(op, DriverOp::Commit)), 0);
    assert_eq!(employee_count(&setup.db).await, 0);
}

#[tokio::test]
async fn nested_transaction_joins_the_outer_one() {
    let setup = company().await;

    setup
        .db
        .transaction(|db| async move {
            db.insert_one("Employee", record! { "lastname" => "Bach" }).await?;
            db.transaction(|inner| async move {
                inner
                    .insert_one("Employee", record! { "lastname" => "Ravel" })
                    .await
            })
            .await
        })
        .await
        .unwrap();

    assert_eq!(setup.log.count(|op| matches!(op, DriverOp::Begin)), 1);
    assert_eq!(setup.log.count(|op| matches!(op, DriverOp::Commit)), 1);
    assert_eq!(employee_count(&setup.db).await, 2);
}

#[tokio::test]
async fn inner_failure_rolls_back_everything() {
    let setup = company().await;

    let result: tabula::Result<()> = setup
        .db
        .transaction(|db| async move {
            db.insert_one("Employee", record! { "lastname" => "Bach" }).await?;
            db.transaction(|_| async move { Err::<(), _>(err!("inner")) })
                .await
        })
        .await;

    assert!(result.is_err());
    assert_eq!(employee_count(&setup.db).await, 0);
}

#[tokio::test]
async fn failed_rollback_reports_both_errors() {
    let setup = company().await;

    let err = setup
        .db
        .transaction(|db| async move {
            db.execute_sql("ROLLBACK", &[]).await?;
            Err::<(), _>(err!("boom"))
        })
        .await
        .unwrap_err();

    assert!(err.is_transaction_rollback_failed(), "{err}");
    assert_eq!(
        err.transaction_body_error().map(ToString::to_string),
        Some("boom".to_string())
    );
}

#[tokio::test]
async fn commit_failure_rolls_back() {
    let setup = company().await;
    for sql in [
        "PRAGMA foreign_keys = ON",
        "CREATE TABLE Score (score_id INTEGER PRIMARY KEY, emp_id INTEGER \
         REFERENCES Employee (emp_id) DEFERRABLE INITIALLY DEFERRED)",
    ] {
        setup.db.execute_sql(sql, &[]).await.unwrap();
    }

    let err = setup
        .db
        .transaction(|db| async move {
            db.insert_one("Employee", record! { "lastname" => "Bach" }).await?;
            db.execute_sql("INSERT INTO Score (score_id, emp_id) VALUES (1, 99)", &[])
                .await
        })
        .await
        .unwrap_err();

    assert!(err.is_driver_operation_failed(), "{err}");
    assert!(!setup.db.in_transaction().await);
    assert_eq!(setup.log.count(|op| matches!(op, DriverOp::Commit)), 0);
    assert_eq!(setup.log.count(|op| matches!(op, DriverOp::Rollback)), 1);
    assert_eq!(employee_count(&setup.db).await, 0);

    setup
        .db
        .transaction(|db| async move {
            db.insert_one("Employee", record! { "lastname" => "Ravel" }).await
        })
        .await
        .unwrap();
    assert!(!setup.db.in_transaction().await);
    assert_eq!(setup.log.count(|op| matches!(op, DriverOp::Commit)), 1);
    assert_eq!(employee_count(&setup.db).await, 1);
}

#[tokio::test]
async fn sibling_connection_commits_independently() {
    let setup = company_on_disk("sibling_connection_commits_independently").await;
    let sibling = setup.sibling().await;

    setup
        .db
        .transaction(|db| {
            let sibling = sibling.clone();
            async move {
                sibling
                    .transaction(|db2| async move {
                        db2.insert_one("Employee", record! { "lastname" => "Ravel" })
                            .await
                    })
                    .await?;
                db.insert_one("Employee", record! { "lastname" => "Bach" }).await
            }
        })
        .await
        .unwrap();

    assert_eq!(setup.log.count(|op| matches!(op, DriverOp::Begin)), 2);
    assert_eq!(setup.log.count(|op| matches!(op, DriverOp::Commit)), 2);
    assert_eq!(employee_count(&setup.db).await, 2);
    assert_eq!(employee_count(&sibling).await, 2);
}
