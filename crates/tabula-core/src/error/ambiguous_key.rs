use super::Error;

/// Error when an inserted record has no key and the key cannot be generated.
///
/// Generated keys are only retrieved for single-column primary keys.
#[derive(Debug)]
pub(super) struct AmbiguousKeyError {
    source: Box<str>,
    columns: Vec<String>,
}

impl std::error::Error for AmbiguousKeyError {}

impl core::fmt::Display for AmbiguousKeyError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "cannot retrieve a generated key for `{}`: primary key spans columns ({})",
            self.source,
            self.columns.join(", ")
        )
    }
}

impl Error {
    /// Creates an ambiguous key error for an insert into `source`.
    pub fn ambiguous_key(source: impl Into<String>, columns: &[String]) -> Error {
        Error::from(super::ErrorKind::AmbiguousKey(AmbiguousKeyError {
            source: source.into().into(),
            columns: columns.to_vec(),
        }))
    }

    /// Returns `true` if this error is an ambiguous key error.
    pub fn is_ambiguous_key(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::AmbiguousKey(_))
    }
}
