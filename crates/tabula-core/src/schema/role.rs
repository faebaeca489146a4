use crate::{Error, Result};

use std::{fmt, str::FromStr};

/// The named direction of traversal across an association.
#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,

    /// Source the role is installed on
    pub owner: String,

    /// Source reached by following the role
    pub target: String,

    /// Occurrences of the target per owner row
    pub multiplicity: Multiplicity,

    pub kind: RoleKind,

    /// `true` when the target is a component of the owner
    pub composition: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoleKind {
    /// Joined through `(owner column, target column)` pairs
    Direct { join: Vec<(String, String)> },

    /// Reached by following other roles in order, starting from the owner
    Path { roles: Vec<String> },
}

impl Role {
    pub fn is_to_one(&self) -> bool {
        self.multiplicity.is_to_one()
    }

    /// Join pairs of a direct role.
    pub fn join(&self) -> Option<&[(String, String)]> {
        match &self.kind {
            RoleKind::Direct { join } => Some(join),
            RoleKind::Path { .. } => None,
        }
    }
}

/// Minimum and maximum occurrence count; `max: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplicity {
    pub min: u32,
    pub max: Option<u32>,
}

impl Multiplicity {
    pub const ONE: Multiplicity = Multiplicity {
        min: 1,
        max: Some(1),
    };

    pub const OPTIONAL: Multiplicity = Multiplicity {
        min: 0,
        max: Some(1),
    };

    pub const MANY: Multiplicity = Multiplicity { min: 0, max: None };

    pub fn is_to_one(&self) -> bool {
        self.max == Some(1)
    }

    pub fn is_to_many(&self) -> bool {
        !self.is_to_one()
    }

    pub fn is_optional(&self) -> bool {
        self.min == 0
    }
}

impl FromStr for Multiplicity {
    type Err = Error;

    /// Parses `"n"`, `"*"`, `"n..m"` and `"n..*"`.
    fn from_str(src: &str) -> Result<Multiplicity> {
        fn bound(src: &str, whole: &str) -> Result<Option<u32>> {
            match src.trim() {
                "*" | "n" => Ok(None),
                digits => digits.parse().map(Some).map_err(|_| {
                    Error::invalid_schema(format!("malformed multiplicity `{whole}`"))
                }),
            }
        }

        let (min, max) = match src.split_once("..") {
            Some((min, max)) => (bound(min, src)?, bound(max, src)?),
            None => match bound(src, src)? {
                None => (Some(0), None),
                exact => (exact, exact),
            },
        };

        let Some(min) = min else {
            return Err(Error::invalid_schema(format!(
                "malformed multiplicity `{src}`: minimum must be a number"
            )));
        };

        match max {
            Some(0) => Err(Error::invalid_schema(format!(
                "malformed multiplicity `{src}`: maximum must be positive"
            ))),
            Some(max) if max < min => Err(Error::invalid_schema(format!(
                "malformed multiplicity `{src}`: minimum exceeds maximum"
            ))),
            max => Ok(Multiplicity { min, max }),
        }
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{}..{max}", self.min),
            None if self.min == 0 => f.write_str("*"),
            None => write!(f, "{}..*", self.min),
        }
    }
}

/// One side of an association declaration.
///
/// `role` names the direction leading *to* this side's source from the
/// other side; the sentinel role `"none"` declares a unidirectional
/// association.
#[derive(Debug, Clone)]
pub struct AssociationEnd {
    pub source: String,
    pub role: String,
    pub multiplicity: String,

    /// Join columns on this side's source; inferred when empty
    pub join: Vec<String>,

    /// For many-to-many: the roles walked from the other side to reach this
    /// side's source
    pub through: Vec<String>,
}

impl AssociationEnd {
    pub const NO_ROLE: &'static str = "none";

    pub fn new(
        source: impl Into<String>,
        role: impl Into<String>,
        multiplicity: impl Into<String>,
    ) -> AssociationEnd {
        AssociationEnd {
            source: source.into(),
            role: role.into(),
            multiplicity: multiplicity.into(),
            join: vec![],
            through: vec![],
        }
    }

    pub fn join<I, S>(mut self, columns: I) -> AssociationEnd
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.join = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn through<I, S>(mut self, roles: I) -> AssociationEnd
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.through = roles.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn has_role(&self) -> bool {
        self.role != Self::NO_ROLE
    }
}
