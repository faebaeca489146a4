use super::Error;

/// Error when a record handed to insert or update holds data that cannot be
/// stored, such as a nested record under a name that is not a composition role.
#[derive(Debug)]
pub(super) struct InvalidRecordError {
    message: Box<str>,
}

impl std::error::Error for InvalidRecordError {}

impl core::fmt::Display for InvalidRecordError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid record: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidRecord(InvalidRecordError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid record error.
    pub fn is_invalid_record(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidRecord(_))
    }
}
