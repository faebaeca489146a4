use super::Error;

#[derive(Debug)]
pub(super) struct DuplicateHandlerError {
    source: Box<str>,
    column: Box<str>,
    handler: Box<str>,
}

impl std::error::Error for DuplicateHandlerError {}

impl core::fmt::Display for DuplicateHandlerError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "handler `{}` is already registered for `{}.{}`",
            self.handler, self.source, self.column
        )
    }
}

impl Error {
    /// Creates an error for a second registration of the same column handler.
    pub fn duplicate_handler(
        source: impl Into<String>,
        column: impl Into<String>,
        handler: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::DuplicateHandler(DuplicateHandlerError {
            source: source.into().into(),
            column: column.into().into(),
            handler: handler.into().into(),
        }))
    }

    /// Returns `true` if this error is a duplicate handler error.
    pub fn is_duplicate_handler(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::DuplicateHandler(_))
    }
}
