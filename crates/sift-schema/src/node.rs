//! # Schema Nodes
//!
//! [`SchemaNode`] is a tagged variant over the four node kinds. Every node
//! carries its [`Modifiers`] and an ordered list of [`RuleRef`]s; order is
//! significant because rules run in declared order and, in bail mode, an
//! earlier failure stops later rules from running.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_core::Subtype;

/// Presence modifiers of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Absent values are accepted and omitted from the output.
    pub optional: bool,
    /// `null` is accepted and passed through to the output.
    pub nullable: bool,
}

/// A reference to a rule in the rule library plus its raw arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRef {
    /// Name the rule is registered under.
    pub name: String,
    /// Arguments as written by the schema author; validated at compile time.
    #[serde(default)]
    pub args: Vec<Value>,
}

impl RuleRef {
    /// Reference `name` with the given arguments.
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Scalar node: string, number, boolean, date or enum.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralNode {
    /// Subtype of the value.
    pub subtype: Subtype,
    /// Options of the subtype rule (`trim` for strings, `format` for dates, `choices` for enums).
    pub type_options: Option<Value>,
    /// Declared rules.
    pub rules: Vec<RuleRef>,
    /// Presence modifiers.
    pub modifiers: Modifiers,
}

/// Object node with named children in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    /// Children keyed by field name.
    pub children: IndexMap<String, SchemaNode>,
    /// Keep undeclared keys in the output instead of stripping them.
    pub any_members: bool,
    /// Declared rules.
    pub rules: Vec<RuleRef>,
    /// Presence modifiers.
    pub modifiers: Modifiers,
}

/// Array node whose elements share one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    /// Element schema; `None` accepts any elements unchanged.
    pub member: Option<Box<SchemaNode>>,
    /// Declared rules.
    pub rules: Vec<RuleRef>,
    /// Presence modifiers.
    pub modifiers: Modifiers,
}

/// Ordered alternatives; the first variant that fully matches wins.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionNode {
    /// Variants in trial order.
    pub variants: Vec<SchemaNode>,
    /// Declared rules (checked against the `anyOf` subtype).
    pub rules: Vec<RuleRef>,
    /// Presence modifiers.
    pub modifiers: Modifiers,
}

/// One node of a schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Scalar value.
    Literal(LiteralNode),
    /// Object with named children.
    Object(ObjectNode),
    /// Homogeneous array.
    Array(ArrayNode),
    /// Alternatives.
    Union(UnionNode),
}

impl SchemaNode {
    /// The node's subtype tag.
    pub fn subtype(&self) -> Subtype {
        match self {
            Self::Literal(node) => node.subtype,
            Self::Object(_) => Subtype::Object,
            Self::Array(_) => Subtype::Array,
            Self::Union(_) => Subtype::Union,
        }
    }

    /// Presence modifiers.
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::Literal(node) => node.modifiers,
            Self::Object(node) => node.modifiers,
            Self::Array(node) => node.modifiers,
            Self::Union(node) => node.modifiers,
        }
    }

    /// Declared rules in order.
    pub fn rules(&self) -> &[RuleRef] {
        match self {
            Self::Literal(node) => &node.rules,
            Self::Object(node) => &node.rules,
            Self::Array(node) => &node.rules,
            Self::Union(node) => &node.rules,
        }
    }

    /// Options of the node's subtype rule.
    pub fn type_options(&self) -> Option<&Value> {
        match self {
            Self::Literal(node) => node.type_options.as_ref(),
            _ => None,
        }
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers {
        match self {
            Self::Literal(node) => &mut node.modifiers,
            Self::Object(node) => &mut node.modifiers,
            Self::Array(node) => &mut node.modifiers,
            Self::Union(node) => &mut node.modifiers,
        }
    }

    fn rules_mut(&mut self) -> &mut Vec<RuleRef> {
        match self {
            Self::Literal(node) => &mut node.rules,
            Self::Object(node) => &mut node.rules,
            Self::Array(node) => &mut node.rules,
            Self::Union(node) => &mut node.rules,
        }
    }

    /// Accept absent values.
    pub fn optional(mut self) -> Self {
        self.modifiers_mut().optional = true;
        self
    }

    /// Accept `null`.
    pub fn nullable(mut self) -> Self {
        self.modifiers_mut().nullable = true;
        self
    }

    /// Accept both absent values and `null`.
    pub fn nullable_and_optional(self) -> Self {
        self.nullable().optional()
    }

    /// Replace the presence modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        *self.modifiers_mut() = modifiers;
        self
    }

    /// Append one rule.
    pub fn rule(mut self, rule: RuleRef) -> Self {
        self.rules_mut().push(rule);
        self
    }

    /// Append rules in order.
    pub fn rules_from(mut self, rules: impl IntoIterator<Item = RuleRef>) -> Self {
        self.rules_mut().extend(rules);
        self
    }
}

impl From<LiteralNode> for SchemaNode {
    fn from(node: LiteralNode) -> Self {
        Self::Literal(node)
    }
}

impl From<ObjectNode> for SchemaNode {
    fn from(node: ObjectNode) -> Self {
        Self::Object(node)
    }
}

impl From<ArrayNode> for SchemaNode {
    fn from(node: ArrayNode) -> Self {
        Self::Array(node)
    }
}

impl From<UnionNode> for SchemaNode {
    fn from(node: UnionNode) -> Self {
        Self::Union(node)
    }
}
