//! `minLength` and `maxLength`. Strings are measured in characters, arrays
//! in elements; any other kind is ignored.

use serde_json::{json, Value};
use sift_core::{ConfigError, Subtype};

use crate::contract::{
    default_message, ensure_arg_count, ensure_subtype, CompiledRule, NodeAttributes, RuleContext,
    RuleDefinition, RuleOptions,
};

#[derive(Debug, Clone, Copy)]
struct Bound(u64);

fn compile_bound(rule: &str, subtype: Subtype, args: &[Value]) -> Result<CompiledRule, ConfigError> {
    ensure_subtype(rule, subtype, &[Subtype::String, Subtype::Array])?;
    ensure_arg_count(rule, args, 1)?;
    let limit = args[0]
        .as_u64()
        .ok_or_else(|| ConfigError::invalid_args(rule, "the limit must be a non-negative integer"))?;
    Ok(CompiledRule::sync(rule, RuleOptions::new(Bound(limit))))
}

fn measure(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::String(text) => Some(text.chars().count() as u64),
        Value::Array(items) => Some(items.len() as u64),
        _ => None,
    }
}

fn check(
    rule: &str,
    value: Option<&Value>,
    options: &RuleOptions,
    ctx: &mut RuleContext<'_>,
    within: fn(u64, u64) -> bool,
) {
    let (Some(length), Some(Bound(limit))) = (measure(value), options.get::<Bound>()) else {
        return;
    };
    if !within(length, *limit) {
        let args = json!({ rule: limit });
        ctx.report(rule, &default_message(rule), Some(&args));
    }
}

/// At least `n` characters or elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinLength;

impl RuleDefinition for MinLength {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        compile_bound("minLength", subtype, args)
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        check("minLength", value, options, ctx, |length, limit| length >= limit)
    }
}

/// At most `n` characters or elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxLength;

impl RuleDefinition for MaxLength {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        compile_bound("maxLength", subtype, args)
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        check("maxLength", value, options, ctx, |length, limit| length <= limit)
    }
}
