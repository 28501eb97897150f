//! Machine-readable reporter for HTTP APIs.

use serde_json::{json, Value};

use super::{Accumulator, ErrorReporter, ReporterConstructor, ValidationFailure};
use crate::messages::Messages;

/// Renders failures as a flat list of `{rule, field, message, args?}`.
#[derive(Debug, Default)]
pub struct ApiReporter {
    inner: Accumulator,
}

impl ReporterConstructor for ApiReporter {
    fn construct(messages: Messages, bail: bool) -> Self {
        Self {
            inner: Accumulator::new(messages, bail),
        }
    }
}

impl ErrorReporter for ApiReporter {
    fn report(
        &mut self,
        pointer: &str,
        rule: &str,
        message: &str,
        array_expression_pointer: Option<&str>,
        args: Option<&Value>,
    ) {
        self.inner
            .push(pointer, rule, message, array_expression_pointer, args);
    }

    fn has_errors(&self) -> bool {
        !self.inner.errors.is_empty()
    }

    fn bail(&self) -> bool {
        self.inner.bail
    }

    fn to_error(&mut self) -> ValidationFailure {
        let errors = self.inner.drain();
        let entries: Vec<Value> = errors
            .iter()
            .map(|e| {
                let mut entry = json!({
                    "rule": e.rule,
                    "field": e.pointer,
                    "message": e.message,
                });
                if let Some(args) = &e.args {
                    entry["args"] = args.clone();
                }
                entry
            })
            .collect();
        ValidationFailure::new(errors, json!({ "errors": entries }))
    }
}
