use super::Error;

#[derive(Debug)]
pub(super) struct DuplicateSourceError {
    name: Box<str>,
}

impl std::error::Error for DuplicateSourceError {}

impl core::fmt::Display for DuplicateSourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "source `{}` is already declared", self.name)
    }
}

impl Error {
    /// Creates an error for a table or view declared twice under one name.
    pub fn duplicate_source(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::DuplicateSource(DuplicateSourceError {
            name: name.into().into(),
        }))
    }

    /// Returns `true` if this error is a duplicate source error.
    pub fn is_duplicate_source(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::DuplicateSource(_))
    }
}
