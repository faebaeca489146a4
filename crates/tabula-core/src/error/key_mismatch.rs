use super::Error;

#[derive(Debug)]
pub(super) struct KeyMismatchError {
    source: Box<str>,
    expected: usize,
    actual: usize,
}

impl std::error::Error for KeyMismatchError {}

impl core::fmt::Display for KeyMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "primary key of `{}` has {} column(s), got {} value(s)",
            self.source, self.expected, self.actual
        )
    }
}

impl Error {
    /// Creates an error for a key whose arity does not match the primary key.
    pub fn key_mismatch(source: impl Into<String>, expected: usize, actual: usize) -> Error {
        Error::from(super::ErrorKind::KeyMismatch(KeyMismatchError {
            source: source.into().into(),
            expected,
            actual,
        }))
    }

    /// Returns `true` if this error is a key mismatch error.
    pub fn is_key_mismatch(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::KeyMismatch(_))
    }
}
