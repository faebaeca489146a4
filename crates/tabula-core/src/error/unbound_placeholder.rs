use super::Error;

#[derive(Debug)]
pub(super) struct UnboundPlaceholderError {
    names: Vec<String>,
}

impl std::error::Error for UnboundPlaceholderError {}

impl core::fmt::Display for UnboundPlaceholderError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unbound placeholders: {}", self.names.join(", "))
    }
}

impl Error {
    /// Creates an error listing every named placeholder left without a value.
    pub fn unbound_placeholder(names: Vec<String>) -> Error {
        Error::from(super::ErrorKind::UnboundPlaceholder(
            UnboundPlaceholderError { names },
        ))
    }

    /// Returns `true` if this error is an unbound placeholder error.
    pub fn is_unbound_placeholder(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnboundPlaceholder(_))
    }
}
