//! `distinct`: array elements (or one field of object elements) must not
//! repeat. Reports the index of the first repeated element.

use std::collections::HashSet;

use serde_json::{json, Value};
use sift_core::{ConfigError, Subtype};

use crate::contract::{
    default_message, ensure_subtype, CompiledRule, NodeAttributes, RuleContext, RuleDefinition,
    RuleOptions,
};

#[derive(Debug, Clone, Default)]
struct DistinctOptions {
    field: Option<String>,
}

/// Unique array elements, optionally compared by one field.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distinct;

impl RuleDefinition for Distinct {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("distinct", subtype, &[Subtype::Array])?;
        let field = match args {
            [] => None,
            [Value::String(field)] if !field.is_empty() => Some(field.clone()),
            [_] => {
                return Err(ConfigError::invalid_args(
                    "distinct",
                    "the field argument must be a non-empty string",
                ))
            }
            _ => {
                return Err(ConfigError::invalid_args(
                    "distinct",
                    format!("expects at most one argument, got {}", args.len()),
                ))
            }
        };
        Ok(CompiledRule::sync("distinct", RuleOptions::new(DistinctOptions { field })))
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let (Some(Value::Array(items)), Some(options)) = (value, options.get::<DistinctOptions>())
        else {
            return;
        };
        let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let compared = match &options.field {
                Some(field) => match item.get(field) {
                    Some(value) if !value.is_null() => value,
                    // Elements without the field never collide.
                    _ => continue,
                },
                None => item,
            };
            if !seen.insert(canonical_key(compared)) {
                let args = json!({ "field": options.field, "index": index });
                ctx.report("distinct", &default_message("distinct"), Some(&args));
                return;
            }
        }
    }
}

/// JSON text of `value` with object members sorted by key, so equal values
/// always produce the same key.
fn canonical_key(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, member)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(member, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
