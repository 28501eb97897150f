//! # Rule References
//!
//! Constructors for the rules shipped with `sift-rules`. Each returns a
//! [`RuleRef`] carrying the arguments exactly as written; argument shape is
//! checked when the schema is compiled.

use serde_json::{json, Value};

use crate::node::RuleRef;

/// Reference any rule by name, e.g. one registered with `add_rule`.
pub fn custom(name: &str, args: Vec<Value>) -> RuleRef {
    RuleRef::new(name, args)
}

/// Mobile phone number, any locale, non-strict.
pub fn mobile() -> RuleRef {
    RuleRef::new("mobile", Vec::new())
}

/// Mobile phone number with options `{"strict": bool, "locale": [..]}`.
pub fn mobile_with(options: Value) -> RuleRef {
    RuleRef::new("mobile", vec![options])
}

/// Email address.
pub fn email() -> RuleRef {
    RuleRef::new("email", Vec::new())
}

/// String matching a regular expression.
pub fn regex(pattern: &str) -> RuleRef {
    RuleRef::new("regex", vec![json!(pattern)])
}

/// Letters only.
pub fn alpha() -> RuleRef {
    RuleRef::new("alpha", Vec::new())
}

/// Letters and digits only.
pub fn alpha_num() -> RuleRef {
    RuleRef::new("alphaNum", Vec::new())
}

/// UUID of any version.
pub fn uuid() -> RuleRef {
    RuleRef::new("uuid", Vec::new())
}

/// UUID of a specific version.
pub fn uuid_version(version: u8) -> RuleRef {
    RuleRef::new("uuid", vec![json!({ "version": version })])
}

/// Absolute URL.
pub fn url() -> RuleRef {
    RuleRef::new("url", Vec::new())
}

/// Minimum length of a string (characters) or array (elements).
pub fn min_length(length: usize) -> RuleRef {
    RuleRef::new("minLength", vec![json!(length)])
}

/// Maximum length of a string (characters) or array (elements).
pub fn max_length(length: usize) -> RuleRef {
    RuleRef::new("maxLength", vec![json!(length)])
}

/// Inclusive numeric range.
pub fn range(start: f64, stop: f64) -> RuleRef {
    RuleRef::new("range", vec![json!(start), json!(stop)])
}

/// Non-negative number.
pub fn unsigned() -> RuleRef {
    RuleRef::new("unsigned", Vec::new())
}

/// Array of distinct scalars.
pub fn distinct() -> RuleRef {
    RuleRef::new("distinct", Vec::new())
}

/// Array of objects distinct by `field`.
pub fn distinct_by(field: &str) -> RuleRef {
    RuleRef::new("distinct", vec![json!(field)])
}
