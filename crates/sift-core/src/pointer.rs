//! # Pointers
//!
//! A pointer locates a value inside the validated data using dot notation:
//! `user.emails.0`. Array traversal also carries an *array expression
//! pointer* in which every index is replaced by `*` (`user.emails.*`), so a
//! single custom message can address every element of an array.
//!
//! The root of the data has the empty pointer.

/// Extend `parent` with an object key.
pub fn child(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Extend `parent` with an array index.
pub fn index(parent: &str, index: usize) -> String {
    if parent.is_empty() {
        index.to_string()
    } else {
        format!("{parent}.{index}")
    }
}

/// Array expression pointer for the elements of the array at `parent`.
///
/// `array_expression` is the enclosing array expression pointer, if the
/// array itself sits inside another array.
pub fn elements(parent: &str, array_expression: Option<&str>) -> String {
    child(array_expression.unwrap_or(parent), "*")
}

/// Extend an enclosing array expression pointer with an object key.
pub fn child_expression(array_expression: Option<&str>, key: &str) -> Option<String> {
    array_expression.map(|expr| child(expr, key))
}
