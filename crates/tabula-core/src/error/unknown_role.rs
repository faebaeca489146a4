use super::Error;

#[derive(Debug)]
pub(super) struct UnknownRoleError {
    source: Box<str>,
    role: Box<str>,
}

impl std::error::Error for UnknownRoleError {}

impl core::fmt::Display for UnknownRoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unknown role `{}` on source `{}`", self.role, self.source)
    }
}

impl Error {
    /// Creates an error for a role name no reachable source declares.
    pub fn unknown_role(source: impl Into<String>, role: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownRole(UnknownRoleError {
            source: source.into().into(),
            role: role.into().into(),
        }))
    }

    /// Returns `true` if this error is an unknown role error.
    pub fn is_unknown_role(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownRole(_))
    }
}
