//! JSON:API error-object reporter.

use serde_json::{json, Value};

use super::{Accumulator, ErrorReporter, ReporterConstructor, ValidationFailure};
use crate::messages::Messages;

/// Renders failures as JSON:API error objects.
///
/// `code` is `E_` followed by the rule name in upper snake case.
#[derive(Debug, Default)]
pub struct JsonApiReporter {
    inner: Accumulator,
}

impl ReporterConstructor for JsonApiReporter {
    fn construct(messages: Messages, bail: bool) -> Self {
        Self {
            inner: Accumulator::new(messages, bail),
        }
    }
}

impl ErrorReporter for JsonApiReporter {
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
                    "code": error_code(&e.rule),
                    "source": { "pointer": e.pointer },
                    "title": e.message,
                });
                if let Some(args) = &e.args {
                    entry["meta"] = args.clone();
                }
                entry
            })
            .collect();
        ValidationFailure::new(errors, json!({ "errors": entries }))
    }
}

/// `minLength` -> `E_MIN_LENGTH`.
fn error_code(rule: &str) -> String {
    let mut code = String::from("E_");
    for (i, c) in rule.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            code.push('_');
        }
        code.push(c.to_ascii_uppercase());
    }
    code
}
