use super::Error;

#[derive(Debug)]
pub(super) struct UnknownSourceError {
    name: Box<str>,
}

impl std::error::Error for UnknownSourceError {}

impl core::fmt::Display for UnknownSourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "source `{}` is not declared in the schema", self.name)
    }
}

impl Error {
    /// Creates an error for a reference to an undeclared table or view.
    pub fn unknown_source(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownSource(UnknownSourceError {
            name: name.into().into(),
        }))
    }

    /// Returns `true` if this error is an unknown source error.
    pub fn is_unknown_source(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownSource(_))
    }
}
