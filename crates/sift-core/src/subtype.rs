//! # Subtype — Closed Set of Node Kinds
//!
//! Every schema node carries exactly one [`Subtype`], fixed when the node is
//! declared. Rules receive it at compile time and reject subtypes they cannot
//! validate. Dispatch is an exhaustive `match`, never a string comparison.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The primitive subtype tag of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subtype {
    /// UTF-8 string.
    String,
    /// JSON number (integers and floats).
    Number,
    /// Boolean.
    Boolean,
    /// Calendar date or date-time, normalized to RFC 3339.
    Date,
    /// One of a fixed set of string or number choices.
    Enum,
    /// Object with named children.
    Object,
    /// Array with an element schema.
    Array,
    /// Ordered set of alternative schemas ("anyOf").
    Union,
}

impl Subtype {
    /// Returns every subtype in declaration order.
    pub fn all() -> &'static [Subtype] {
        &[
            Self::String,
            Self::Number,
            Self::Boolean,
            Self::Date,
            Self::Enum,
            Self::Object,
            Self::Array,
            Self::Union,
        ]
    }

    /// Returns the identifier used in schema documents and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Enum => "enum",
            Self::Object => "object",
            Self::Array => "array",
            Self::Union => "anyOf",
        }
    }

    /// Name of the rule that type-checks values of this subtype.
    ///
    /// Unions have no type rule of their own: each variant checks itself.
    pub fn type_rule(&self) -> Option<&'static str> {
        match self {
            Self::Union => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subtype {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|subtype| subtype.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownSubtype(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_round_trips_every_subtype() {
        for subtype in Subtype::all() {
            assert_eq!(subtype.as_str().parse::<Subtype>().unwrap(), *subtype);
        }
    }

    #[test]
    fn test_unknown_subtype_rejected() {
        let err = "decimal".parse::<Subtype>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownSubtype("decimal".into()));
    }

    #[test]
    fn test_union_has_no_type_rule() {
        assert_eq!(Subtype::Union.type_rule(), None);
        assert_eq!(Subtype::Date.type_rule(), Some("date"));
    }
}
