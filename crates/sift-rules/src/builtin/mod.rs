//! Built-in rules.

mod array;
mod length;
mod mobile;
mod number;
mod presence;
mod string;
mod types;

pub use array::Distinct;
pub use length::{MaxLength, MinLength};
pub use mobile::{Mobile, MobileOptions, MOBILE_LOCALES};
pub use number::{Range, Unsigned};
pub use presence::{Nullable, Required};
pub use string::{Alpha, AlphaNum, Email, Regex, Url, Uuid};
pub use types::{ArrayType, BooleanType, DateType, EnumType, NumberType, ObjectType, StringType};

use crate::library::RuleLibrary;

/// Register every built-in rule into `library`.
pub fn register_all(library: &mut RuleLibrary) {
    library.add_rule("required", Required);
    library.add_rule("nullable", Nullable);

    library.add_rule("string", StringType);
    library.add_rule("number", NumberType);
    library.add_rule("boolean", BooleanType);
    library.add_rule("date", DateType);
    library.add_rule("enum", EnumType);
    library.add_rule("object", ObjectType);
    library.add_rule("array", ArrayType);

    library.add_rule("mobile", Mobile);
    library.add_rule("email", Email);
    library.add_rule("regex", Regex);
    library.add_rule("alpha", Alpha);
    library.add_rule("alphaNum", AlphaNum);
    library.add_rule("uuid", Uuid);
    library.add_rule("url", Url);

    library.add_rule("minLength", MinLength);
    library.add_rule("maxLength", MaxLength);
    library.add_rule("range", Range);
    library.add_rule("unsigned", Unsigned);
    library.add_rule("distinct", Distinct);
}
