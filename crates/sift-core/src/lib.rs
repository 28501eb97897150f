//! # sift-core — Foundational Types for the Sift Validator
//!
//! This crate is the leaf of the Sift workspace. It defines the vocabulary
//! shared by the schema tree, the rule library, and the compiler:
//!
//! - [`Subtype`] — the closed set of node subtypes. Every `match` on it is
//!   exhaustive, so adding a subtype forces every rule to decide whether it
//!   accepts it.
//! - [`pointer`] — location pointers (`user.emails.0`) and array expression
//!   pointers (`user.emails.*`) into the validated data.
//! - [`Helpers`] — the `{exists, is_object}` bundle selected per validation
//!   call by the strict-existence flag.
//! - [`Messages`] — caller-supplied custom messages with pointer/rule lookup.
//! - [`ErrorReporter`] — the reporter contract, plus the built-in
//!   [`VanillaReporter`], [`ApiReporter`] and [`JsonApiReporter`].
//! - [`ConfigError`] — schema-time failures. Data-time failures never use
//!   it; they flow through a reporter and surface as [`ValidationFailure`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sift-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod helpers;
pub mod messages;
pub mod pointer;
pub mod reporter;
pub mod subtype;

pub use error::{ConfigError, SiftError};
pub use helpers::Helpers;
pub use messages::Messages;
pub use reporter::{
    reporter_factory, ApiReporter, ErrorReporter, JsonApiReporter, ReportedError,
    ReporterConstructor, ReporterFactory, ValidationFailure, VanillaReporter,
};
pub use subtype::Subtype;
