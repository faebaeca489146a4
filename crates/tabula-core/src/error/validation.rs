use super::Error;

/// Error when `validate` handlers reject one or more column values.
#[derive(Debug)]
pub(super) struct ValidationError {
    source: Box<str>,
    failures: Vec<(String, String)>,
}

impl std::error::Error for ValidationError {}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "validation failed for `{}`", self.source)?;
        let mut sep = ": ";
        for (column, reason) in &self.failures {
            write!(f, "{sep}{column} ({reason})")?;
            sep = ", ";
        }
        Ok(())
    }
}

impl Error {
    /// Creates a validation error from `(column, reason)` pairs.
    pub fn validation(source: impl Into<String>, failures: Vec<(String, String)>) -> Error {
        Error::from(super::ErrorKind::Validation(ValidationError {
            source: source.into().into(),
            failures,
        }))
    }

    /// Returns `true` if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Validation(_))
    }
}
