//! # Schema Builder DSL
//!
//! Free functions that build [`SchemaNode`]s, and [`Schema`], the root of a
//! tree.
//!
//! ```
//! use serde_json::json;
//! use sift_schema::{rules, schema, Schema};
//!
//! let signup = Schema::create([
//!     ("username", schema::string().rule(rules::min_length(3))),
//!     ("phone", schema::string().optional().rule(rules::mobile_with(json!({ "strict": true })))),
//!     ("tags", schema::array(schema::string()).optional()),
//! ]);
//! assert_eq!(signup.len(), 3);
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Value};
use sift_core::Subtype;

use crate::node::{ArrayNode, LiteralNode, Modifiers, ObjectNode, SchemaNode, UnionNode};

/// Root of a schema tree: the fields of the top-level object.
///
/// Cloning is cheap; the tree is shared behind an `Arc` and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Arc<IndexMap<String, SchemaNode>>,
}

impl Schema {
    /// Create a schema from `(name, node)` pairs in declaration order.
    pub fn create<'a>(fields: impl IntoIterator<Item = (&'a str, SchemaNode)>) -> Self {
        Self::from_fields(
            fields
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        )
    }

    /// Create a schema from an already-built field map.
    pub fn from_fields(fields: IndexMap<String, SchemaNode>) -> Self {
        Self {
            fields: Arc::new(fields),
        }
    }

    /// Top-level fields in declaration order.
    pub fn fields(&self) -> &IndexMap<String, SchemaNode> {
        &self.fields
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn literal(subtype: Subtype, type_options: Option<Value>) -> SchemaNode {
    SchemaNode::Literal(LiteralNode {
        subtype,
        type_options,
        rules: Vec::new(),
        modifiers: Modifiers::default(),
    })
}

/// A string.
pub fn string() -> SchemaNode {
    literal(Subtype::String, None)
}

/// A string with subtype options, e.g. `{"trim": true, "escape": true}`.
pub fn string_with(options: Value) -> SchemaNode {
    literal(Subtype::String, Some(options))
}

/// A number; numeric strings are coerced.
pub fn number() -> SchemaNode {
    literal(Subtype::Number, None)
}

/// A boolean; `"true"`, `"1"`, `"on"` and their opposites are coerced.
pub fn boolean() -> SchemaNode {
    literal(Subtype::Boolean, None)
}

/// An RFC 3339 date-time or `YYYY-MM-DD` date.
pub fn date() -> SchemaNode {
    literal(Subtype::Date, None)
}

/// A date in a chrono `format`, e.g. `"%d/%m/%Y"`.
pub fn date_with_format(format: &str) -> SchemaNode {
    literal(Subtype::Date, Some(json!({ "format": format })))
}

/// One of a fixed set of choices.
pub fn enumeration<T: Into<Value>>(choices: impl IntoIterator<Item = T>) -> SchemaNode {
    let choices: Vec<Value> = choices.into_iter().map(Into::into).collect();
    literal(Subtype::Enum, Some(json!({ "choices": choices })))
}

/// An object with the given children; undeclared keys are stripped.
pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, SchemaNode)>) -> SchemaNode {
    SchemaNode::Object(ObjectNode {
        children: fields
            .into_iter()
            .map(|(name, node)| (name.to_string(), node))
            .collect(),
        any_members: false,
        rules: Vec::new(),
        modifiers: Modifiers::default(),
    })
}

/// An object whose keys are all kept, with the given children validated.
pub fn object_any_members<'a>(
    fields: impl IntoIterator<Item = (&'a str, SchemaNode)>,
) -> SchemaNode {
    match object(fields) {
        SchemaNode::Object(node) => SchemaNode::Object(ObjectNode {
            any_members: true,
            ..node
        }),
        other => other,
    }
}

/// An array whose elements all match `member`.
pub fn array(member: SchemaNode) -> SchemaNode {
    SchemaNode::Array(ArrayNode {
        member: Some(Box::new(member)),
        rules: Vec::new(),
        modifiers: Modifiers::default(),
    })
}

/// An array whose elements are not validated.
pub fn array_any_members() -> SchemaNode {
    SchemaNode::Array(ArrayNode {
        member: None,
        rules: Vec::new(),
        modifiers: Modifiers::default(),
    })
}

/// Alternatives tried in order.
pub fn any_of(variants: impl IntoIterator<Item = SchemaNode>) -> SchemaNode {
    SchemaNode::Union(UnionNode {
        variants: variants.into_iter().collect(),
        rules: Vec::new(),
        modifiers: Modifiers::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_preserves_declaration_order() {
        let schema = Schema::create([
            ("zeta", string()),
            ("alpha", number()),
            ("mid", boolean()),
        ]);
        let names: Vec<&str> = schema.fields().keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_enumeration_stores_choices() {
        let node = enumeration(["draft", "published"]);
        assert_eq!(
            node.type_options(),
            Some(&json!({ "choices": ["draft", "published"] }))
        );
    }

    #[test]
    fn test_object_any_members_sets_flag() {
        match object_any_members([("id", number())]) {
            SchemaNode::Object(node) => {
                assert!(node.any_members);
                assert_eq!(node.children.len(), 1);
            }
            other => panic!("expected object node, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_clone_shares_tree() {
        let schema = Schema::create([("a", string())]);
        let copy = schema.clone();
        assert!(Arc::ptr_eq(&schema.fields, &copy.fields));
    }
}
