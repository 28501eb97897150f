//! # Existence Helpers
//!
//! The compiled routine never decides on its own whether a value "exists".
//! It asks the [`Helpers`] bundle handed to it per call, so the same
//! compiled schema can run with loose or strict existence semantics.
//!
//! | value     | loose `exists` | strict `exists` |
//! |-----------|----------------|-----------------|
//! | absent    | false          | false           |
//! | `null`    | false          | false           |
//! | `""`      | false          | true            |
//! | otherwise | true           | true            |

use serde_json::Value;

/// Pair of runtime predicates used by the compiled routine and by rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Helpers {
    strict: bool,
}

impl Helpers {
    /// Empty strings count as absent.
    pub const LOOSE: Helpers = Helpers { strict: false };

    /// Only absent and `null` values count as absent.
    pub const STRICT: Helpers = Helpers { strict: true };

    /// Select the bundle for a strict-existence flag.
    pub fn select(exists_strict: bool) -> Self {
        if exists_strict {
            Self::STRICT
        } else {
            Self::LOOSE
        }
    }

    /// Whether this bundle uses strict existence.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Whether `value` counts as present.
    pub fn exists(&self, value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) if s.is_empty() => self.strict,
            Some(_) => true,
        }
    }

    /// Whether `value` is an object (arrays are not objects).
    pub fn is_object(&self, value: Option<&Value>) -> bool {
        matches!(value, Some(Value::Object(_)))
    }
}

impl Default for Helpers {
    fn default() -> Self {
        Self::LOOSE
    }
}
