//! # Error Types — Configuration vs Validation
//!
//! Sift separates two failure classes and never mixes their channels:
//!
//! - [`ConfigError`] — the schema is malformed: an unknown rule or type, a
//!   rule attached to an incompatible subtype, invalid rule arguments. These
//!   surface synchronously from compilation and are always fatal to that
//!   compile call.
//! - [`ValidationFailure`](crate::ValidationFailure) — the data does not
//!   satisfy the schema. Rules never raise these directly; they report
//!   through an [`ErrorReporter`](crate::ErrorReporter), and the reporter's
//!   aggregate is the rejection value of a validation run.
//!
//! [`SiftError`] is the umbrella used at I/O boundaries (schema documents,
//! data files) where both classes and parse failures can occur.

use thiserror::Error;

use crate::reporter::ValidationFailure;
use crate::subtype::Subtype;

/// Failure raised while compiling a schema tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A node references a rule that is not registered in the rule library.
    #[error("unknown rule \"{rule}\" referenced at \"{pointer}\"")]
    UnknownRule {
        /// Name of the missing rule.
        rule: String,
        /// Pointer of the schema node that referenced it.
        pointer: String,
    },

    /// A rule was attached to a node whose subtype it cannot validate.
    #[error("cannot use {rule} rule on \"{subtype}\" data type")]
    IncompatibleSubtype {
        /// Name of the rule.
        rule: String,
        /// Subtype of the node the rule was attached to.
        subtype: Subtype,
    },

    /// A rule received arguments of the wrong shape or count.
    #[error("{rule}: {reason}")]
    InvalidArguments {
        /// Name of the rule.
        rule: String,
        /// What was wrong with the arguments.
        reason: String,
    },

    /// A schema document names a type that is neither built in nor registered.
    #[error("unknown type \"{0}\"")]
    UnknownType(String),

    /// A subtype string does not name a supported subtype.
    #[error("unknown subtype \"{0}\"")]
    UnknownSubtype(String),

    /// The schema tree itself is structurally invalid.
    #[error("invalid schema at \"{pointer}\": {reason}")]
    InvalidSchema {
        /// Pointer of the offending node (empty for the root).
        pointer: String,
        /// Reason the node is invalid.
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidArguments`].
    pub fn invalid_args(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ConfigError::IncompatibleSubtype`].
    pub fn incompatible(rule: impl Into<String>, subtype: Subtype) -> Self {
        Self::IncompatibleSubtype {
            rule: rule.into(),
            subtype,
        }
    }
}

/// Top-level error type for Sift's I/O boundaries.
#[derive(Error, Debug)]
pub enum SiftError {
    /// The schema could not be compiled.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The data did not satisfy the schema.
    #[error("validation failed:\n{0}")]
    Validation(ValidationFailure),

    /// A schema document or data file could not be parsed.
    #[error("document error for '{path}': {reason}")]
    Document {
        /// Path or label of the document.
        path: String,
        /// Reason the document could not be parsed.
        reason: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationFailure> for SiftError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}
