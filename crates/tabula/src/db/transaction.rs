use super::Db;
use crate::Result;

use tabula_core::Error;

use std::future::Future;

impl Db {
    /// Returns `true` while this connection is inside a transaction.
    pub async fn in_transaction(&self) -> bool {
        self.connection().await.in_transaction()
    }

    /// Runs `body` as one unit of work.
    ///
    /// When the connection is already inside a transaction, `body` runs as
    /// part of it. Otherwise a transaction is started, committed when `body`
    /// succeeds and rolled back when `body` or the commit fails. A failing
    /// rollback is reported together with the original error.
    ///
    /// `body` may open transactions on other connections; each is begun and
    /// committed independently.
    pub async fn transaction<F, Fut, T>(&self, body: F) -> Result<T>
    where
        F: FnOnce(Db) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.in_transaction().await {
            tracing::trace!(connection = ?self.shared.id, "joining open transaction");
            return body(self.clone()).await;
        }

        self.connection().await.begin().await?;
        tracing::debug!(connection = ?self.shared.id, "transaction started");

        let err = match body(self.clone()).await {
            Ok(value) => match self.connection().await.commit().await {
                Ok(()) => {
                    tracing::debug!(connection = ?self.shared.id, "transaction committed");
                    return Ok(value);
                }
                Err(err) => err,
            },
            Err(err) => err,
        };

        let rollback = self.connection().await.rollback().await;
        tracing::debug!(connection = ?self.shared.id, %err, "transaction rolled back");
        match rollback {
            Ok(()) => Err(err),
            Err(rollback) => Err(Error::transaction_rollback_failed(err, rollback)),
        }
    }
}
