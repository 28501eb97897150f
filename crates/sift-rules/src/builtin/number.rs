//! Numeric bounds. Non-number values are ignored; the `number` subtype rule
//! has already coerced numeric strings by the time these run.

use serde_json::{json, Value};
use sift_core::{ConfigError, Subtype};

use crate::contract::{
    default_message, ensure_arg_count, ensure_subtype, ensure_valid_args, CompiledRule,
    NodeAttributes, RuleContext, RuleDefinition, RuleOptions,
};

#[derive(Debug, Clone, Copy)]
struct Bounds {
    start: f64,
    stop: f64,
}

/// Inclusive range `range(start, stop)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Range;

impl RuleDefinition for Range {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("range", subtype, &[Subtype::Number])?;
        ensure_arg_count("range", args, 2)?;
        let (Some(start), Some(stop)) = (args[0].as_f64(), args[1].as_f64()) else {
            return Err(ConfigError::invalid_args("range", "start and stop must be numbers"));
        };
        if start > stop {
            return Err(ConfigError::invalid_args(
                "range",
                format!("start {start} is greater than stop {stop}"),
            ));
        }
        Ok(CompiledRule::sync("range", RuleOptions::new(Bounds { start, stop })))
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let (Some(number), Some(bounds)) = (value.and_then(Value::as_f64), options.get::<Bounds>())
        else {
            return;
        };
        if number < bounds.start || number > bounds.stop {
            let args = json!({ "start": bounds.start, "stop": bounds.stop });
            ctx.report("range", &default_message("range"), Some(&args));
        }
    }
}

/// Zero or greater.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsigned;

impl RuleDefinition for Unsigned {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("unsigned", subtype, &[Subtype::Number])?;
        ensure_valid_args("unsigned", args)?;
        Ok(CompiledRule::sync("unsigned", RuleOptions::none()))
    }

    fn validate(&self, value: Option<&Value>, _options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        if matches!(value.and_then(Value::as_f64), Some(n) if n < 0.0) {
            ctx.report("unsigned", &default_message("unsigned"), None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::testing::{compile, passes, run};

    #[test]
    fn test_range_is_inclusive() {
        let args = [json!(1), json!(10)];
        assert!(passes(&Range, Subtype::Number, &args, json!(1)));
        assert!(passes(&Range, Subtype::Number, &args, json!(10)));
        let (errors, _) = run(&Range, Subtype::Number, &args, Some(&json!(11)));
        assert_eq!(errors[0].args, Some(json!({ "start": 1.0, "stop": 10.0 })));
    }

    #[test]
    fn test_range_compile_errors() {
        assert!(compile(&Range, Subtype::Number, &[json!(5), json!(1)]).is_err());
        assert!(compile(&Range, Subtype::Number, &[json!(1)]).is_err());
        assert!(compile(&Range, Subtype::String, &[json!(1), json!(2)]).is_err());
    }

    #[test]
    fn test_unsigned() {
        assert!(passes(&Unsigned, Subtype::Number, &[], json!(0)));
        assert!(!passes(&Unsigned, Subtype::Number, &[], json!(-0.5)));
        assert!(passes(&Unsigned, Subtype::Number, &[], json!("-1")));
    }
}
