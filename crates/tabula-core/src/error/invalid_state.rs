use super::Error;

/// Error when a statement operation is invoked in the wrong lifecycle state.
#[derive(Debug)]
pub(super) struct InvalidStateError {
    operation: &'static str,
    expected: &'static str,
    actual: &'static str,
}

impl std::error::Error for InvalidStateError {}

impl core::fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "invalid statement state: `{}` requires status `{}`, but status is `{}`",
            self.operation, self.expected, self.actual
        )
    }
}

impl Error {
    /// Creates an invalid state error.
    pub fn invalid_state(
        operation: &'static str,
        expected: &'static str,
        actual: &'static str,
    ) -> Error {
        Error::from(super::ErrorKind::InvalidState(InvalidStateError {
            operation,
            expected,
            actual,
        }))
    }

    /// Returns `true` if this error is an invalid state error.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidState(_))
    }
}
