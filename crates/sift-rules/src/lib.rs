//! # sift-rules — Rule Contract and Built-in Rules
//!
//! A rule is the atomic unit of validation. This crate defines the
//! two-phase [`RuleDefinition`] contract (compile at schema time, validate
//! at data time), the [`RuleLibrary`] registry the compiler resolves rule
//! names through, and the built-in rules.
//!
//! ## Built-in Rules
//!
//! | Group | Rules |
//! |-------|-------|
//! | Presence | `required`, `nullable` |
//! | Subtype | `string`, `number`, `boolean`, `date`, `enum`, `object`, `array` |
//! | String | `mobile`, `email`, `regex`, `alpha`, `alphaNum`, `uuid`, `url` |
//! | Length | `minLength`, `maxLength` (strings and arrays) |
//! | Number | `range`, `unsigned` |
//! | Array | `distinct` |
//!
//! Every rule reports under its own name with the default message
//! `"<rule> validation failed"` unless the caller overrides it.
//!
//! ## Crate Policy
//!
//! - Malformed arguments fail in `compile`, never in `validate`.
//! - `validate` ignores values outside the rule's concern; type errors are
//!   the subtype rule's job.

pub mod builtin;
pub mod contract;
pub mod library;

pub use contract::{
    default_message, ensure_arg_count, ensure_subtype, ensure_valid_args, options_object,
    CompiledRule, NodeAttributes, RuleContext, RuleDefinition, RuleOptions,
};
pub use library::RuleLibrary;
