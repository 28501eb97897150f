//! # Error Reporters
//!
//! A reporter is created fresh for every validation call from the caller's
//! custom [`Messages`] and the bail flag. Rules report failures into it; the
//! compiled routine asks it whether to halt (bail mode) and, at the end of
//! the walk, converts it into the [`ValidationFailure`] that rejects the run.
//!
//! ## Bail Semantics
//!
//! In bail mode a reporter keeps only the first failure and ignores every
//! later `report`. The routine checks [`ErrorReporter::bail`] together with
//! [`ErrorReporter::has_errors`] after each rule and stops walking at once.
//!
//! ## Built-in Reporters
//!
//! | Reporter | Body shape |
//! |----------|------------|
//! | [`VanillaReporter`] | `{"errors": {"<pointer>": ["<message>", ...]}}` |
//! | [`ApiReporter`] | `{"errors": [{"rule", "field", "message", "args"?}]}` |
//! | [`JsonApiReporter`] | `{"errors": [{"code", "source": {"pointer"}, "title", "meta"?}]}` |

mod api;
mod jsonapi;
mod vanilla;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::messages::Messages;

pub use api::ApiReporter;
pub use jsonapi::JsonApiReporter;
pub use vanilla::VanillaReporter;

/// Contract between the compiled routine and an error reporter.
///
/// A reporter instance is owned by exactly one validation run.
pub trait ErrorReporter: Send {
    /// Record a failure of `rule` at `pointer`.
    ///
    /// `message` is the rule's default message; the reporter applies custom
    /// message overrides. `array_expression_pointer` is set when the value
    /// sits inside an array. `args` carries the rule's options for message
    /// interpolation and machine-readable output.
    fn report(
        &mut self,
        pointer: &str,
        rule: &str,
        message: &str,
        array_expression_pointer: Option<&str>,
        args: Option<&Value>,
    );

    /// Whether at least one failure has been recorded.
    fn has_errors(&self) -> bool;

    /// Whether the first failure should halt the run.
    fn bail(&self) -> bool;

    /// Drain recorded failures into the rejection value of the run.
    fn to_error(&mut self) -> ValidationFailure;
}

/// Constructor half of the reporter contract: `(messages, bail)`.
pub trait ReporterConstructor {
    /// Build a reporter for one validation run.
    fn construct(messages: Messages, bail: bool) -> Self
    where
        Self: Sized;
}

/// Type-erased reporter constructor selected per validation call.
pub type ReporterFactory = fn(Messages, bool) -> Box<dyn ErrorReporter>;

/// Erase a concrete reporter type into a [`ReporterFactory`].
pub fn reporter_factory<R>() -> ReporterFactory
where
    R: ErrorReporter + ReporterConstructor + 'static,
{
    construct_boxed::<R>
}

fn construct_boxed<R>(messages: Messages, bail: bool) -> Box<dyn ErrorReporter>
where
    R: ErrorReporter + ReporterConstructor + 'static,
{
    Box::new(R::construct(messages, bail))
}

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedError {
    /// Pointer to the failing value, e.g. `user.emails.0`.
    pub pointer: String,
    /// Name of the rule that failed.
    pub rule: String,
    /// Final message after custom overrides and interpolation.
    pub message: String,
    /// Array expression pointer, e.g. `user.emails.*`, when inside an array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_expression_pointer: Option<String>,
    /// Rule options reported alongside the failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

impl fmt::Display for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer.is_empty() {
            write!(f, "  (root): {} [{}]", self.message, self.rule)
        } else {
            write!(f, "  {}: {} [{}]", self.pointer, self.message, self.rule)
        }
    }
}

/// Rejection value of a failed validation run.
///
/// Always enumerable through [`errors`](Self::errors); `body` holds the
/// reporter-specific JSON rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    errors: Vec<ReportedError>,
    body: Value,
}

impl ValidationFailure {
    /// Build a failure from recorded errors and their rendered body.
    pub fn new(errors: Vec<ReportedError>, body: Value) -> Self {
        Self { errors, body }
    }

    /// Number of failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether there are no failures.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// All recorded failures, in accumulation order.
    pub fn errors(&self) -> &[ReportedError] {
        &self.errors
    }

    /// Failures recorded for `pointer`.
    pub fn for_pointer<'a>(&'a self, pointer: &'a str) -> impl Iterator<Item = &'a ReportedError> {
        self.errors.iter().filter(move |e| e.pointer == pointer)
    }

    /// Reporter-specific JSON body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consumes self and returns the recorded failures.
    pub fn into_errors(self) -> Vec<ReportedError> {
        self.errors
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Bookkeeping shared by the built-in reporters.
#[derive(Debug, Default)]
struct Accumulator {
    messages: Messages,
    bail: bool,
    errors: Vec<ReportedError>,
}

impl Accumulator {
    fn new(messages: Messages, bail: bool) -> Self {
        Self {
            messages,
            bail,
            errors: Vec::new(),
        }
    }

    fn push(
        &mut self,
        pointer: &str,
        rule: &str,
        message: &str,
        array_expression_pointer: Option<&str>,
        args: Option<&Value>,
    ) {
        if self.bail && !self.errors.is_empty() {
            return;
        }
        let message =
            self.messages
                .resolve(pointer, rule, message, array_expression_pointer, args);
        self.errors.push(ReportedError {
            pointer: pointer.to_string(),
            rule: rule.to_string(),
            message,
            array_expression_pointer: array_expression_pointer.map(str::to_string),
            args: args.cloned(),
        });
    }

    fn drain(&mut self) -> Vec<ReportedError> {
        std::mem::take(&mut self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_configured_reporter() {
        let factory = reporter_factory::<VanillaReporter>();
        let mut reporter = factory(Messages::empty(), true);
        assert!(reporter.bail());
        reporter.report("a", "required", "required validation failed", None, None);
        assert!(reporter.has_errors());
    }

    #[test]
    fn test_bail_keeps_only_first_error() {
        let mut acc = Accumulator::new(Messages::empty(), true);
        acc.push("a", "required", "first", None, None);
        acc.push("b", "required", "second", None, None);
        let errors = acc.drain();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "first");
    }

    #[test]
    fn test_failure_display_lists_each_error() {
        let failure = ValidationFailure::new(
            vec![
                ReportedError {
                    pointer: "phone".into(),
                    rule: "mobile".into(),
                    message: "mobile validation failed".into(),
                    array_expression_pointer: None,
                    args: None,
                },
                ReportedError {
                    pointer: String::new(),
                    rule: "object".into(),
                    message: "object validation failed".into(),
                    array_expression_pointer: None,
                    args: None,
                },
            ],
            Value::Null,
        );
        let display = failure.to_string();
        assert!(display.contains("phone: mobile validation failed [mobile]"));
        assert!(display.contains("(root)"));
    }
}
