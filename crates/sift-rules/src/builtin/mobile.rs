//! # Mobile Number Rule
//!
//! Validates that a string is a mobile phone number for one of a set of
//! locales, or for any known locale when none is given.
//!
//! ## Options
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `strict` | `false` | The number must start with `+` (country code present). |
//! | `locale` | all | Locale tag or list of tags from [`MOBILE_LOCALES`]. |
//!
//! Locale patterns are compiled once per process; `compile` only selects
//! them, and an unknown locale is a configuration error. Non-string values
//! are ignored.

use lazy_static::lazy_static;
use serde::Deserialize;
use serde_json::Value;
use sift_core::{ConfigError, Subtype};

use crate::contract::{
    default_message, ensure_subtype, options_object, CompiledRule, NodeAttributes, RuleContext,
    RuleDefinition, RuleOptions,
};

const RULE_NAME: &str = "mobile";

/// Supported locales and their mobile number patterns.
pub const MOBILE_LOCALES: &[(&str, &str)] = &[
    ("ar-AE", r"^((\+?971)|0)?5[024568]\d{7}$"),
    ("ar-EG", r"^((\+?20)|0)?1[0125]\d{8}$"),
    ("ar-SA", r"^((\+?966)|0)?5\d{8}$"),
    ("de-DE", r"^((\+49|0)1)(5[0-25-9]\d|6([23]|0\d?)|7([0-57-9]|6\d))\d{7,9}$"),
    ("en-AU", r"^(\+?61|0)4\d{8}$"),
    ("en-CA", r"^((\+1|1)?( |-)?)?(\([2-9][0-9]{2}\)|[2-9][0-9]{2})( |-)?([2-9][0-9]{2}( |-)?[0-9]{4})$"),
    ("en-GB", r"^(\+?44|0)7\d{9}$"),
    ("en-IN", r"^(\+?91|0)?[6789]\d{9}$"),
    ("en-KE", r"^(\+?254|0)(7|1)\d{8}$"),
    ("en-NG", r"^(\+?234|0)?[789]\d{9}$"),
    ("en-PK", r"^((00|\+)?92|0)3[0-6]\d{8}$"),
    ("en-SG", r"^(\+65)?[3689]\d{7}$"),
    ("en-US", r"^((\+1|1)?( |-)?)?(\([2-9][0-9]{2}\)|[2-9][0-9]{2})( |-)?([2-9][0-9]{2}( |-)?[0-9]{4})$"),
    ("en-ZA", r"^(\+?27|0)\d{9}$"),
    ("es-ES", r"^(\+?34)?[67]\d{8}$"),
    ("fr-FR", r"^(\+?33|0)[67]\d{8}$"),
    ("it-IT", r"^(\+?39)?\s?3\d{2} ?\d{6,7}$"),
    ("ja-JP", r"^(\+81[ \-]?(\(0\))?|0)[6789]0[ \-]?\d{4}[ \-]?\d{4}$"),
    ("ko-KR", r"^((\+?82)[ \-]?)?0?1([0|1|6|7|8|9]{1})[ \-]?\d{3,4}[ \-]?\d{4}$"),
    ("pt-BR", r"^((\+?55 ?[1-9]{2} ?)|(\+?55 ?\([1-9]{2}\) ?)|(0[1-9]{2} ?)|(\([1-9]{2}\) ?)|([1-9]{2} ?))((\d{4}-?\d{4})|(9[1-9]{1}\d{3}-?\d{4}))$"),
    ("ru-RU", r"^(\+?7|8)?9\d{9}$"),
    ("zh-CN", r"^((\+|00)86)?1[3-9]\d{9}$"),
];

lazy_static! {
    static ref LOCALE_PATTERNS: Vec<(&'static str, Result<regex::Regex, regex::Error>)> =
        MOBILE_LOCALES
            .iter()
            .map(|(tag, pattern)| (*tag, regex::Regex::new(pattern)))
            .collect();
}

/// Locale selection as written in the schema: one tag or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LocaleArg {
    One(String),
    Many(Vec<String>),
}

/// Options accepted by the `mobile` rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MobileOptions {
    /// Require a leading `+`.
    pub strict: bool,
    locale: Option<LocaleArg>,
}

impl MobileOptions {
    /// Requested locales; `None` means every known locale.
    pub fn locales(&self) -> Option<Vec<&str>> {
        match &self.locale {
            None => None,
            Some(LocaleArg::One(tag)) => Some(vec![tag.as_str()]),
            Some(LocaleArg::Many(tags)) => Some(tags.iter().map(String::as_str).collect()),
        }
    }
}

struct CompiledMobile {
    strict: bool,
    patterns: Vec<&'static regex::Regex>,
}

fn pattern_for(
    locale: &str,
) -> Option<&'static (&'static str, Result<regex::Regex, regex::Error>)> {
    LOCALE_PATTERNS.iter().find(|(tag, _)| *tag == locale)
}

fn select_patterns(options: &MobileOptions) -> Result<Vec<&'static regex::Regex>, ConfigError> {
    let entries: Vec<&'static (&'static str, Result<regex::Regex, regex::Error>)> =
        match options.locales() {
            None => LOCALE_PATTERNS.iter().collect(),
            Some(tags) if tags.is_empty() => {
                return Err(ConfigError::invalid_args(RULE_NAME, "locale list must not be empty"));
            }
            Some(tags) => tags
                .into_iter()
                .map(|tag| {
                    pattern_for(tag).ok_or_else(|| {
                        ConfigError::invalid_args(RULE_NAME, format!("unsupported locale \"{tag}\""))
                    })
                })
                .collect::<Result<_, _>>()?,
        };
    entries
        .into_iter()
        .map(|(tag, pattern)| {
            pattern.as_ref().map_err(|e| {
                ConfigError::invalid_args(RULE_NAME, format!("invalid pattern for {tag}: {e}"))
            })
        })
        .collect()
}

/// The `mobile` rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mobile;

impl RuleDefinition for Mobile {
    fn compile(
        &self,
        _attributes: &NodeAttributes<'_>,
        subtype: Subtype,
        args: &[Value],
    ) -> Result<CompiledRule, ConfigError> {
        ensure_subtype(RULE_NAME, subtype, &[Subtype::String])?;
        let options: MobileOptions = options_object(RULE_NAME, args)?;
        let compiled = CompiledMobile {
            strict: options.strict,
            patterns: select_patterns(&options)?,
        };
        Ok(CompiledRule::sync(RULE_NAME, RuleOptions::new(compiled)))
    }

    fn validate(&self, value: Option<&Value>, options: &RuleOptions, ctx: &mut RuleContext<'_>) {
        let (Some(Value::String(number)), Some(options)) = (value, options.get::<CompiledMobile>())
        else {
            return;
        };
        if options.strict && !number.starts_with('+') {
            return ctx.report(RULE_NAME, &default_message(RULE_NAME), None);
        }
        if !options.patterns.iter().any(|p| p.is_match(number)) {
            ctx.report(RULE_NAME, &default_message(RULE_NAME), None);
        }
    }
}
