//! # Custom Messages
//!
//! Callers may override the default message of any rule. Keys are looked up
//! in this order, first match wins:
//!
//! 1. `"<pointer>.<rule>"` — one field, e.g. `"user.phone.mobile"`
//! 2. `"<array expression pointer>.<rule>"` — every element, e.g. `"tags.*.minLength"`
//! 3. `"<rule>"` — every field
//!
//! Messages may interpolate `{{ field }}`, `{{ rule }}` and
//! `{{ options.<key> }}` (looked up in the arguments the rule reported).

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable, cheaply cloneable map of custom messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Messages {
    entries: Arc<HashMap<String, String>>,
}

impl Messages {
    /// An empty message bag; every rule uses its default message.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of custom messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no custom messages are defined.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the raw (uninterpolated) override for a failure, if any.
    pub fn lookup(
        &self,
        pointer: &str,
        rule: &str,
        array_expression_pointer: Option<&str>,
    ) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let by_pointer = format!("{pointer}.{rule}");
        if let Some(message) = self.entries.get(&by_pointer) {
            return Some(message);
        }
        if let Some(expr) = array_expression_pointer {
            if let Some(message) = self.entries.get(&format!("{expr}.{rule}")) {
                return Some(message);
            }
        }
        self.entries.get(rule).map(String::as_str)
    }

    /// Resolve the final message for a failure.
    pub fn resolve(
        &self,
        pointer: &str,
        rule: &str,
        default_message: &str,
        array_expression_pointer: Option<&str>,
        args: Option<&Value>,
    ) -> String {
        let template = self
            .lookup(pointer, rule, array_expression_pointer)
            .unwrap_or(default_message);
        interpolate(template, pointer, rule, args)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Messages {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: Arc::new(
                iter.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl From<HashMap<String, String>> for Messages {
    fn from(entries: HashMap<String, String>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }
}

/// Replace `{{ placeholder }}` segments. Unknown placeholders are kept verbatim.
fn interpolate(template: &str, pointer: &str, rule: &str, args: Option<&Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        let raw = &rest[start..start + len + 2];
        let key = raw[2..raw.len() - 2].trim();

        match placeholder(key, pointer, rule, args) {
            Some(value) => out.push_str(&value),
            None => out.push_str(raw),
        }
        rest = &rest[start + len + 2..];
    }

    out.push_str(rest);
    out
}

fn placeholder(key: &str, pointer: &str, rule: &str, args: Option<&Value>) -> Option<String> {
    match key {
        "field" => Some(pointer.to_string()),
        "rule" => Some(rule.to_string()),
        _ => {
            let option = key.strip_prefix("options.")?;
            match args?.get(option)? {
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag() -> Messages {
        [
            ("username.required", "username is missing"),
            ("tags.*.minLength", "each tag needs {{ options.minLength }} chars"),
            ("required", "{{ field }} is required"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_pointer_key_wins() {
        let msg = bag().resolve("username", "required", "required validation failed", None, None);
        assert_eq!(msg, "username is missing");
    }

    #[test]
    fn test_rule_key_with_field_interpolation() {
        let msg = bag().resolve("email", "required", "required validation failed", None, None);
        assert_eq!(msg, "email is required");
    }

    #[test]
    fn test_array_expression_key_with_options() {
        let msg = bag().resolve(
            "tags.1",
            "minLength",
            "minLength validation failed",
            Some("tags.*"),
            Some(&json!({ "minLength": 3 })),
        );
        assert_eq!(msg, "each tag needs 3 chars");
    }

    #[test]
    fn test_default_message_when_no_override() {
        let msg = Messages::empty().resolve("phone", "mobile", "mobile validation failed", None, None);
        assert_eq!(msg, "mobile validation failed");
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        let msg = interpolate("{{ nope }} and {{ rule", "a", "b", None);
        assert_eq!(msg, "{{ nope }} and {{ rule");
    }

    #[test]
    fn test_deserializes_from_flat_map() {
        let messages: Messages =
            serde_json::from_value(json!({ "required": "missing" })).unwrap();
        assert_eq!(messages.lookup("x", "required", None), Some("missing"));
    }
}
