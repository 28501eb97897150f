//! Presence rules. The compiler attaches them implicitly from the node's
//! modifiers; both run for absent values.

use serde_json::Value;
use sift_core::{ConfigError, Subtype};

use crate::contract::{
    default_message, ensure_arg_count, CompiledRule, NodeAttributes, RuleContext, RuleDefinition,
    RuleOptions,
};

/// Fails when the value does not exist per the call's helpers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl RuleDefinition for Required {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        _subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_arg_count("required", args, 0)?;
        Ok(CompiledRule::sync("required", RuleOptions::none()).allow_undefineds())
    }

    fn validate(&self, value: Option<&Value>, _options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        if !ctx.helpers().exists(value) {
            ctx.report("required", &default_message("required"), None);
        }
    }
}

/// Fails only when the key is missing; `null` is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nullable;

impl RuleDefinition for Nullable {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        _subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_arg_count("nullable", args, 0)?;
        Ok(CompiledRule::sync("nullable", RuleOptions::none()).allow_undefineds())
    }

    fn validate(&self, value: Option<&Value>, _options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        if value.is_none() {
            ctx.report("nullable", &default_message("nullable"), None);
        }
    }
}
