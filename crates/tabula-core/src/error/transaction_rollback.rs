use super::Error;

/// A transaction body failed and the rollback that followed failed as well.
#[derive(Debug)]
pub(super) struct TransactionRollbackFailed {
    body: Error,
    rollback: Error,
}

impl std::error::Error for TransactionRollbackFailed {}

impl core::fmt::Display for TransactionRollbackFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "transaction body failed ({}) and rollback failed ({})",
            self.body, self.rollback
        )
    }
}

impl Error {
    /// Combines the body error and the rollback error of a failed transaction.
    pub fn transaction_rollback_failed(body: Error, rollback: Error) -> Error {
        Error::from(super::ErrorKind::TransactionRollbackFailed(
            TransactionRollbackFailed { body, rollback },
        ))
    }

    /// Returns `true` if both a transaction body and its rollback failed.
    pub fn is_transaction_rollback_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::TransactionRollbackFailed(_))
    }

    /// For a failed rollback, returns the error raised by the transaction body.
    pub fn transaction_body_error(&self) -> Option<&Error> {
        match self.kind() {
            super::ErrorKind::TransactionRollbackFailed(err) => Some(&err.body),
            _ => None,
        }
    }
}
