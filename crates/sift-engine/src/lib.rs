//! # sift-engine — Compilation and Execution Pipeline
//!
//! Turns a schema tree into a reusable [`CompiledRoutine`] and runs it over
//! data.
//!
//! ## Pipeline
//!
//! ```text
//! Schema ──compile()──▶ CompiledRoutine ──(cached by key)──▶ run(data, library, reporter, helpers)
//!                                                              │
//!                                            Ok(normalized) ◀──┴──▶ Err(ValidationFailure)
//! ```
//!
//! - [`compile`] resolves every rule reference and reports configuration
//!   errors. Nothing downstream raises one.
//! - [`CompiledRoutine`] is immutable and `Send + Sync`; the reporter and
//!   data belong to each invocation.
//! - [`CompiledCache`] stores routines by caller-supplied key, first writer
//!   wins, no eviction.
//! - [`Validator`] is the entry point: rule library, type registry and
//!   cache behind `validate`, `add_rule` and `add_type`.
//!
//! ## Crate Policy
//!
//! - Rule execution order is deterministic: declared rules in order, object
//!   fields in declaration order, array elements in index order.
//! - No `.unwrap()` outside tests.

mod cache;
mod compiler;
mod routine;
mod validator;

pub use cache::CompiledCache;
pub use compiler::compile;
pub use routine::CompiledRoutine;
pub use validator::{ValidateOptions, ValidationFuture, Validator};
