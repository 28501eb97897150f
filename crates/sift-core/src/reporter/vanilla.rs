//! Default reporter: messages grouped by pointer.

use serde_json::{Map, Value};

use super::{Accumulator, ErrorReporter, ReporterConstructor, ValidationFailure};
use crate::messages::Messages;

/// Groups failure messages by pointer.
///
/// Body: `{"errors": {"username": ["required validation failed"]}}`.
#[derive(Debug, Default)]
pub struct VanillaReporter {
    inner: Accumulator,
}

impl VanillaReporter {
    /// Create a reporter.
    pub fn new(messages: Messages, bail: bool) -> Self {
        Self {
            inner: Accumulator::new(messages, bail),
        }
    }
}

impl ReporterConstructor for VanillaReporter {
    fn construct(messages: Messages, bail: bool) -> Self {
        Self::new(messages, bail)
    }
}

impl ErrorReporter for VanillaReporter {
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
        let mut grouped = Map::new();
        for e in &errors {
            let slot = grouped
                .entry(e.pointer.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = slot {
                list.push(Value::String(e.message.clone()));
            }
        }
        let body = serde_json::json!({ "errors": grouped });
        ValidationFailure::new(errors, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_groups_messages_by_pointer() {
        let mut reporter = VanillaReporter::new(Messages::empty(), false);
        reporter.report("username", "required", "required validation failed", None, None);
        reporter.report("tags.0", "minLength", "minLength validation failed", Some("tags.*"), None);
        reporter.report("tags.0", "alpha", "alpha validation failed", Some("tags.*"), None);

        let failure = reporter.to_error();
        assert_eq!(failure.len(), 3);
        assert_eq!(
            failure.body(),
            &json!({
                "errors": {
                    "username": ["required validation failed"],
                    "tags.0": ["minLength validation failed", "alpha validation failed"]
                }
            })
        );
    }

    #[test]
    fn test_to_error_drains() {
        let mut reporter = VanillaReporter::new(Messages::empty(), false);
        reporter.report("a", "required", "required validation failed", None, None);
        let _ = reporter.to_error();
        assert!(!reporter.has_errors());
    }
}
