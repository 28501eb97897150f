//! Subtype rules. The compiler attaches the rule for a node's subtype ahead
//! of its declared rules, passing the node's type options as the single
//! argument. Several of them normalize the value they accept.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Number, Value};
use sift_core::{ConfigError, Subtype};

use crate::contract::{
    default_message, ensure_subtype, options_object, CompiledRule, NodeAttributes, RuleContext,
    RuleDefinition, RuleOptions,
};

fn fail(ctx: &mut RuleContext<'_>, rule: &str) {
    ctx.report(rule, &default_message(rule), None);
}

// -- string -------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StringOptions {
    trim: bool,
    escape: bool,
}

/// Accepts strings; optionally trims and HTML-escapes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl RuleDefinition for StringType {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("string", subtype, &[Subtype::String])?;
        let options: StringOptions = options_object("string", args)?;
        Ok(CompiledRule::sync("string", RuleOptions::new(options)))
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let Some(value) = value else { return };
        let Value::String(text) = value else {
            return fail(ctx, "string");
        };
        let options = options.get::<StringOptions>().copied().unwrap_or_default();
        let mut normalized = if options.trim {
            text.trim().to_string()
        } else {
            text.clone()
        };
        if options.escape {
            normalized = escape_html(&normalized);
        }
        if normalized != *text {
            ctx.mutate(Value::String(normalized));
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

// -- number -------------------------------------------------------------------

/// Accepts numbers and coerces numeric strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberType;

impl RuleDefinition for NumberType {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("number", subtype, &[Subtype::Number])?;
        options_object::<serde_json::Map<String, Value>>("number", args)?;
        Ok(CompiledRule::sync("number", RuleOptions::none()))
    }

    fn validate(&self, value: Option<&Value>, _options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        match value {
            None | Some(Value::Number(_)) => {}
            Some(Value::String(text)) => match parse_number(text) {
                Some(number) => ctx.mutate(Value::Number(number)),
                None => fail(ctx, "number"),
            },
            Some(_) => fail(ctx, "number"),
        }
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Number::from(integer));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

// -- boolean ------------------------------------------------------------------

/// Accepts booleans and coerces `"true"`/`"false"`, `"1"`/`"0"`,
/// `"on"`/`"off"` and the numbers `1`/`0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl RuleDefinition for BooleanType {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("boolean", subtype, &[Subtype::Boolean])?;
        options_object::<serde_json::Map<String, Value>>("boolean", args)?;
        Ok(CompiledRule::sync("boolean", RuleOptions::none()))
    }

    fn validate(&self, value: Option<&Value>, _options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let coerced = match value {
            None | Some(Value::Bool(_)) => return,
            Some(Value::String(text)) => match text.as_str() {
                "true" | "1" | "on" => Some(true),
                "false" | "0" | "off" => Some(false),
                _ => None,
            },
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) if f == 1.0 => Some(true),
                Some(f) if f == 0.0 => Some(false),
                _ => None,
            },
            Some(_) => None,
        };
        match coerced {
            Some(flag) => ctx.mutate(Value::Bool(flag)),
            None => fail(ctx, "boolean"),
        }
    }
}

// -- date ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DateOptions {
    format: Option<String>,
}

/// Accepts date strings and normalizes them to UTC RFC 3339.
///
/// With a `format` option (strftime syntax) the value is parsed as a date
/// time, falling back to a bare date at midnight. Without one, RFC 3339 and
/// `YYYY-MM-DD` are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateType;

impl RuleDefinition for DateType {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("date", subtype, &[Subtype::Date])?;
        let options: DateOptions = options_object("date", args)?;
        if let Some(format) = &options.format {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(ConfigError::invalid_args(
                    "date",
                    format!("invalid date format \"{format}\""),
                ));
            }
        }
        Ok(CompiledRule::sync("date", RuleOptions::new(options)))
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let Some(value) = value else { return };
        let format = options.get::<DateOptions>().and_then(|o| o.format.as_deref());
        let parsed = match value {
            Value::String(text) => parse_date(text, format),
            _ => None,
        };
        match parsed {
            Some(date) => {
                let normalized = date.to_rfc3339_opts(SecondsFormat::AutoSi, true);
                if value.as_str() != Some(normalized.as_str()) {
                    ctx.mutate(Value::String(normalized));
                }
            }
            None => fail(ctx, "date"),
        }
    }
}

fn parse_date(text: &str, format: Option<&str>) -> Option<DateTime<Utc>> {
    let naive = match format {
        Some(format) => NaiveDateTime::parse_from_str(text, format).ok().or_else(|| {
            NaiveDate::parse_from_str(text, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }),
        None => {
            if let Ok(date) = DateTime::parse_from_rfc3339(text) {
                return Some(date.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }
    }?;
    Some(Utc.from_utc_datetime(&naive))
}

// -- enum ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EnumOptions {
    choices: Vec<Value>,
}

/// Accepts one of a fixed list of scalar choices.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumType;

impl RuleDefinition for EnumType {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("enum", subtype, &[Subtype::Enum])?;
        let options: EnumOptions = options_object("enum", args)?;
        if options.choices.is_empty() {
            return Err(ConfigError::invalid_args("enum", "choices must not be empty"));
        }
        if options
            .choices
            .iter()
            .any(|c| matches!(c, Value::Array(_) | Value::Object(_)))
        {
            return Err(ConfigError::invalid_args("enum", "choices must be scalar values"));
        }
        Ok(CompiledRule::sync("enum", RuleOptions::new(options)))
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let Some(value) = value else { return };
        let Some(options) = options.get::<EnumOptions>() else { return };
        if !options.choices.contains(value) {
            let args = json!({ "choices": options.choices });
            ctx.report("enum", &default_message("enum"), Some(&args));
        }
    }
}

// -- object / array -----------------------------------------------------------

/// Accepts JSON objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectType;

impl RuleDefinition for ObjectType {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("object", subtype, &[Subtype::Object])?;
        options_object::<serde_json::Map<String, Value>>("object", args)?;
        Ok(CompiledRule::sync("object", RuleOptions::none()))
    }

    fn validate(&self, value: Option<&Value>, _options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        if value.is_some() && !ctx.helpers().is_object(value) {
            fail(ctx, "object");
        }
    }
}

/// Accepts JSON arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayType;

impl RuleDefinition for ArrayType {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("array", subtype, &[Subtype::Array])?;
        options_object::<serde_json::Map<String, Value>>("array", args)?;
        Ok(CompiledRule::sync("array", RuleOptions::none()))
    }

    fn validate(&self, value: Option<&Value>, _options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        if matches!(value, Some(v) if !v.is_array()) {
            fail(ctx, "array");
        }
    }
}
