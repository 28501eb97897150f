//! String format rules. Each one ignores non-string values.

use lazy_static::lazy_static;
use serde::Deserialize;
use serde_json::{json, Value};
use sift_core::{ConfigError, Subtype};

use crate::contract::{
    default_message, ensure_arg_count, ensure_subtype, options_object, CompiledRule,
    NodeAttributes, RuleContext, RuleDefinition, RuleOptions,
};

fn compile_pattern(rule: &str, pattern: &str) -> Result<regex::Regex, ConfigError> {
    regex::Regex::new(pattern)
        .map_err(|e| ConfigError::invalid_args(rule, format!("invalid pattern: {e}")))
}

// -- email --------------------------------------------------------------------

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

lazy_static! {
    static ref EMAIL_REGEX: Result<regex::Regex, regex::Error> = regex::Regex::new(EMAIL_PATTERN);
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EmailFlags {
    sanitize: bool,
}

struct EmailOptions {
    pattern: &'static regex::Regex,
    sanitize: bool,
}

/// Email address; with `sanitize` the value is trimmed and lowercased.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl RuleDefinition for Email {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("email", subtype, &[Subtype::String])?;
        let flags: EmailFlags = options_object("email", args)?;
        let options = EmailOptions {
            pattern: EMAIL_REGEX
                .as_ref()
                .map_err(|e| ConfigError::invalid_args("email", format!("invalid pattern: {e}")))?,
            sanitize: flags.sanitize,
        };
        Ok(CompiledRule::sync("email", RuleOptions::new(options)))
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let (Some(Value::String(text)), Some(options)) = (value, options.get::<EmailOptions>()) else {
            return;
        };
        let candidate = if options.sanitize {
            text.trim().to_lowercase()
        } else {
            text.clone()
        };
        if !options.pattern.is_match(&candidate) {
            ctx.report("email", &default_message("email"), None);
        } else if candidate != *text {
            ctx.mutate(Value::String(candidate));
        }
    }
}

// -- regex --------------------------------------------------------------------

/// Matches the value against a pattern given as the single argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct Regex;

impl RuleDefinition for Regex {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("regex", subtype, &[Subtype::String])?;
        ensure_arg_count("regex", args, 1)?;
        let Value::String(pattern) = &args[0] else {
            return Err(ConfigError::invalid_args("regex", "the pattern must be a string"));
        };
        let compiled = compile_pattern("regex", pattern)?;
        Ok(CompiledRule::sync("regex", RuleOptions::new(compiled)))
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let (Some(Value::String(text)), Some(pattern)) = (value, options.get::<regex::Regex>()) else {
            return;
        };
        if !pattern.is_match(text) {
            let args = json!({ "pattern": pattern.as_str() });
            ctx.report("regex", &default_message("regex"), Some(&args));
        }
    }
}

// -- alpha / alphaNum ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Extra {
    Space,
    Underscore,
    Dash,
}

impl Extra {
    fn class(self) -> &'static str {
        match self {
            Extra::Space => " ",
            Extra::Underscore => "_",
            Extra::Dash => r"\-",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CharsetOptions {
    allow: Vec<Extra>,
}

fn compile_charset(
    rule: &str,
    base: &str,
    subtype: Subtype,
    args: &[Value],
) -> Result<CompiledRule, ConfigError> {
    ensure_subtype(rule, subtype, &[Subtype::String])?;
    let options: CharsetOptions = options_object(rule, args)?;
    let extras: String = options.allow.iter().map(|e| e.class()).collect();
    let pattern = compile_pattern(rule, &format!("^[{base}{extras}]+$"))?;
    Ok(CompiledRule::sync(rule, RuleOptions::new(pattern)))
}

fn validate_charset(rule: &str, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
    let (Some(Value::String(text)), Some(pattern)) = (value, options.get::<regex::Regex>()) else {
        return;
    };
    if !pattern.is_match(text) {
        ctx.report(rule, &default_message(rule), None);
    }
}

/// Letters only; `allow` may add `space`, `underscore` and `dash`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alpha;

impl RuleDefinition for Alpha {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        compile_charset("alpha", "a-zA-Z", subtype, args)
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        validate_charset("alpha", value, options, ctx)
    }
}

/// Letters and digits; accepts the same `allow` list as [`Alpha`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaNum;

impl RuleDefinition for AlphaNum {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        compile_charset("alphaNum", "a-zA-Z0-9", subtype, args)
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        validate_charset("alphaNum", value, options, ctx)
    }
}

// -- uuid ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct UuidOptions {
    version: Option<usize>,
}

/// Hyphenated UUID, optionally of a given version (1 to 5).
#[derive(Debug, Clone, Copy, Default)]
pub struct Uuid;

impl RuleDefinition for Uuid {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("uuid", subtype, &[Subtype::String])?;
        let options: UuidOptions = options_object("uuid", args)?;
        if let Some(version) = options.version {
            if !(1..=5).contains(&version) {
                return Err(ConfigError::invalid_args(
                    "uuid",
                    format!("unsupported version {version}"),
                ));
            }
        }
        Ok(CompiledRule::sync("uuid", RuleOptions::new(options)))
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let Some(Value::String(text)) = value else { return };
        let wanted = options.get::<UuidOptions>().and_then(|o| o.version);
        let valid = text.len() == 36
            && match uuid::Uuid::parse_str(text) {
                Ok(id) => wanted.map_or(true, |v| id.get_version_num() == v),
                Err(_) => false,
            };
        if !valid {
            let args = wanted.map(|v| json!({ "version": v }));
            ctx.report("uuid", &default_message("uuid"), args.as_ref());
        }
    }
}

// -- url ----------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct UrlOptions {
    protocols: Vec<String>,
}

impl Default for UrlOptions {
    fn default() -> Self {
        Self {
            protocols: vec!["http".to_string(), "https".to_string()],
        }
    }
}

/// Absolute URL with a host and an allowed scheme (`http`/`https` by default).
#[derive(Debug, Clone, Copy, Default)]
pub struct Url;

impl RuleDefinition for Url {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype("url", subtype, &[Subtype::String])?;
        let mut options: UrlOptions = options_object("url", args)?;
        if options.protocols.is_empty() {
            return Err(ConfigError::invalid_args("url", "protocols must not be empty"));
        }
        for protocol in &mut options.protocols {
            *protocol = protocol.to_ascii_lowercase();
        }
        Ok(CompiledRule::sync("url", RuleOptions::new(options)))
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let (Some(Value::String(text)), Some(options)) = (value, options.get::<UrlOptions>()) else {
            return;
        };
        let valid = match url::Url::parse(text) {
            Ok(parsed) => {
                parsed.host().is_some()
                    && options.protocols.iter().any(|p| p == parsed.scheme())
            }
            Err(_) => false,
        };
        if !valid {
            ctx.report("url", &default_message("url"), None);
        }
    }
}
