//! # Rule Contract
//!
//! Every rule has two phases:
//!
//! 1. **compile** (schema time) — receives the node attributes, the node's
//!    [`Subtype`] and the raw arguments written by the schema author. It
//!    rejects incompatible subtypes and malformed arguments with a
//!    [`ConfigError`], and returns a [`CompiledRule`] carrying normalized,
//!    immutable options with defaults applied.
//! 2. **validate** (data time) — receives the value (`None` when absent),
//!    the compiled options and a [`RuleContext`]. It reports at most one
//!    failure through the context and never panics on values of a kind it
//!    does not handle; those are left to the subtype rule.
//!
//! ## Sync and Async Rules
//!
//! [`CompiledRule::is_async`] selects which method the compiled routine
//! calls. Synchronous rules implement [`RuleDefinition::validate`] and are
//! called directly; asynchronous rules implement
//! [`RuleDefinition::validate_async`] and are awaited. A schema without
//! async rules never enters async machinery.
//!
//! ## Absent Values
//!
//! The routine skips a rule for absent values (per the call's
//! [`Helpers::exists`]) unless the rule is compiled with
//! [`CompiledRule::allow_undefineds`]. Only presence rules set it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sift_core::{ConfigError, ErrorReporter, Helpers, Subtype};
use sift_schema::Modifiers;

/// Attributes of the schema node a rule is being compiled for.
#[derive(Debug, Clone, Copy)]
pub struct NodeAttributes<'a> {
    /// Pointer of the node in the schema (`user.emails.*` inside arrays).
    pub pointer: &'a str,
    /// Presence modifiers of the node.
    pub modifiers: Modifiers,
}

/// A validation rule.
#[async_trait]
pub trait RuleDefinition: Send + Sync {
    /// Validate arguments and subtype; produce the compiled form.
    ///
    /// Must be deterministic for the same subtype and arguments.
    fn compile(
        &self,
        attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError>;

    /// Validate one value synchronously.
    fn validate(&self, _value: Option<&Value>, _options: &RuleOptions, _ctx: &mut RuleContext<'_>) {}

    /// Validate one value asynchronously. Defaults to [`validate`](Self::validate).
    async fn validate_async(
        &self,
        value: Option<&Value>,
        options: &RuleOptions,
        ctx: &mut RuleContext<'_>,
    ) {
        self.validate(value, options, ctx)
    }
}

/// Output of [`RuleDefinition::compile`].
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Stable rule name, used to look the rule up at run time and in errors.
    pub name: String,
    /// Run through [`RuleDefinition::validate_async`].
    pub is_async: bool,
    /// Run even when the value is absent.
    pub allow_undefineds: bool,
    /// Normalized options.
    pub options: RuleOptions,
}

impl CompiledRule {
    /// A synchronous rule that skips absent values.
    pub fn sync(name: &str, options: RuleOptions) -> Self {
        Self {
            name: name.to_string(),
            is_async: false,
            allow_undefineds: false,
            options,
        }
    }

    /// An asynchronous rule that skips absent values.
    pub fn asynchronous(name: &str, options: RuleOptions) -> Self {
        Self {
            is_async: true,
            ..Self::sync(name, options)
        }
    }

    /// Also run when the value is absent.
    pub fn allow_undefineds(mut self) -> Self {
        self.allow_undefineds = true;
        self
    }
}

/// Immutable, type-erased compiled options.
#[derive(Clone, Default)]
pub struct RuleOptions(Option<Arc<dyn Any + Send + Sync>>);

impl RuleOptions {
    /// No options.
    pub fn none() -> Self {
        Self(None)
    }

    /// Wrap typed options.
    pub fn new<T: Any + Send + Sync>(options: T) -> Self {
        Self(Some(Arc::new(options)))
    }

    /// Borrow the options as `T`, if they are of that type.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|o| o.downcast_ref::<T>())
    }
}

impl fmt::Debug for RuleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("RuleOptions(..)"),
            None => f.write_str("RuleOptions(none)"),
        }
    }
}

/// Data-time context handed to [`RuleDefinition::validate`].
pub struct RuleContext<'a> {
    pointer: &'a str,
    array_expression_pointer: Option<&'a str>,
    helpers: Helpers,
    reporter: &'a mut dyn ErrorReporter,
    mutation: Option<Value>,
}

impl<'a> RuleContext<'a> {
    /// Build a context for one rule invocation.
    pub fn new(
        pointer: &'a str,
        array_expression_pointer: Option<&'a str>,
        helpers: Helpers,
        reporter: &'a mut dyn ErrorReporter,
    ) -> Self {
        Self {
            pointer,
            array_expression_pointer,
            helpers,
            reporter,
            mutation: None,
        }
    }

    /// Pointer of the value being validated.
    pub fn pointer(&self) -> &str {
        self.pointer
    }

    /// Array expression pointer when the value sits inside an array.
    pub fn array_expression_pointer(&self) -> Option<&str> {
        self.array_expression_pointer
    }

    /// Existence helpers of this validation call.
    pub fn helpers(&self) -> Helpers {
        self.helpers
    }

    /// Report a failure of `rule` at the current pointer.
    pub fn report(&mut self, rule: &str, message: &str, args: Option<&Value>) {
        self.reporter.report(
            self.pointer,
            rule,
            message,
            self.array_expression_pointer,
            args,
        );
    }

    /// Replace the value seen by later rules and written to the output.
    pub fn mutate(&mut self, value: Value) {
        self.mutation = Some(value);
    }

    /// Take the replacement value set by [`mutate`](Self::mutate), if any.
    pub fn take_mutation(&mut self) -> Option<Value> {
        self.mutation.take()
    }
}

impl fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("pointer", &self.pointer)
            .field("array_expression_pointer", &self.array_expression_pointer)
            .field("helpers", &self.helpers)
            .finish_non_exhaustive()
    }
}

// -- Argument helpers ---------------------------------------------------------

/// Default message for a rule: `"<rule> validation failed"`.
pub fn default_message(rule: &str) -> String {
    format!("{rule} validation failed")
}

/// Reject `subtype` unless it is one of `allowed`.
pub fn ensure_subtype(rule: &str, subtype: Subtype, allowed: &[Subtype]) -> Result<(), ConfigError> {
    if allowed.contains(&subtype) {
        Ok(())
    } else {
        Err(ConfigError::incompatible(rule, subtype))
    }
}

/// Accept no arguments, or exactly one options object.
pub fn ensure_valid_args<'v>(rule: &str, args: &'v [Value]) -> Result<Option<&'v Value>, ConfigError> {
    match args {
        [] => Ok(None),
        [options @ Value::Object(_)] => Ok(Some(options)),
        [_] => Err(ConfigError::invalid_args(
            rule,
            "the options argument must be an object",
        )),
        _ => Err(ConfigError::invalid_args(
            rule,
            format!("expects at most one options argument, got {}", args.len()),
        )),
    }
}

/// Parse the optional options object into `T`; unsupplied keys take `T`'s defaults.
pub fn options_object<T>(rule: &str, args: &[Value]) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    match ensure_valid_args(rule, args)? {
        None => Ok(T::default()),
        Some(options) => serde_json::from_value(options.clone())
            .map_err(|e| ConfigError::invalid_args(rule, format!("invalid options: {e}"))),
    }
}

/// Require exactly `count` arguments.
pub fn ensure_arg_count(rule: &str, args: &[Value], count: usize) -> Result<(), ConfigError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(ConfigError::invalid_args(
            rule,
            format!("expects {count} argument(s), got {}", args.len()),
        ))
    }
}
