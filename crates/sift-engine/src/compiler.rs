//! # Schema Compiler
//!
//! Walks a [`Schema`] once and resolves every rule reference through the
//! [`RuleLibrary`], producing a tree of [`CompiledNode`]s that the
//! [`CompiledRoutine`] executes.
//!
//! ## Rule Order per Node
//!
//! 1. The implicit presence rule: `required` unless the node is optional,
//!    `nullable` instead when the node is nullable.
//! 2. The subtype rule (`string`, `number`, ...) with the node's type
//!    options. Unions have none.
//! 3. The declared rules, in declared order.
//!
//! Every configuration error surfaces here. Executing the result never
//! raises one.

use serde_json::Value;
use sift_core::{pointer, ConfigError, Subtype};
use sift_rules::{CompiledRule, NodeAttributes, RuleLibrary};
use sift_schema::{Schema, SchemaNode};

use crate::routine::CompiledRoutine;

/// A compiled rule together with the library key it was resolved under.
///
/// The routine looks the definition up again by `key` at run time, so a
/// library passed at invocation may substitute the implementation.
#[derive(Debug, Clone)]
pub(crate) struct CompiledStep {
    pub(crate) key: String,
    pub(crate) rule: CompiledRule,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Literal,
    Object {
        children: Vec<(String, CompiledNode)>,
        any_members: bool,
    },
    Array {
        member: Option<Box<CompiledNode>>,
    },
    Union {
        variants: Vec<CompiledNode>,
    },
}

/// One node of a compiled schema.
#[derive(Debug, Clone)]
pub(crate) struct CompiledNode {
    pub(crate) kind: NodeKind,
    pub(crate) nullable: bool,
    pub(crate) steps: Vec<CompiledStep>,
    /// Whether this node or any descendant has an asynchronous rule.
    pub(crate) has_async: bool,
}

/// Compile `schema` against `library`.
pub fn compile(schema: &Schema, library: &RuleLibrary) -> Result<CompiledRoutine, ConfigError> {
    let mut children = Vec::with_capacity(schema.len());
    for (name, node) in schema.fields() {
        children.push((name.clone(), compile_node(node, name, library)?));
    }
    let has_async = children.iter().any(|(_, child)| child.has_async);
    let root = CompiledNode {
        kind: NodeKind::Object {
            children,
            any_members: false,
        },
        nullable: false,
        steps: Vec::new(),
        has_async,
    };
    tracing::debug!(fields = schema.len(), has_async, "schema compiled");
    Ok(CompiledRoutine::new(root))
}

fn compile_node(
    node: &SchemaNode,
    at: &str,
    library: &RuleLibrary,
) -> Result<CompiledNode, ConfigError> {
    let modifiers = node.modifiers();
    let attributes = NodeAttributes {
        pointer: at,
        modifiers,
    };
    let subtype = node.subtype();

    let mut steps = Vec::new();
    if !modifiers.optional {
        let presence = if modifiers.nullable { "nullable" } else { "required" };
        steps.push(compile_step(presence, &[], &attributes, subtype, library)?);
    }
    if let Some(type_rule) = subtype.type_rule() {
        let args: Vec<Value> = node.type_options().cloned().into_iter().collect();
        steps.push(compile_step(type_rule, &args, &attributes, subtype, library)?);
    }
    for rule in node.rules() {
        steps.push(compile_step(&rule.name, &rule.args, &attributes, subtype, library)?);
    }

    let kind = match node {
        SchemaNode::Literal(_) => NodeKind::Literal,
        SchemaNode::Object(object) => {
            let mut children = Vec::with_capacity(object.children.len());
            for (name, child) in &object.children {
                let child_at = pointer::child(at, name);
                children.push((name.clone(), compile_node(child, &child_at, library)?));
            }
            NodeKind::Object {
                children,
                any_members: object.any_members,
            }
        }
        SchemaNode::Array(array) => {
            let member = match &array.member {
                Some(member) => {
                    let member_at = pointer::child(at, "*");
                    Some(Box::new(compile_node(member, &member_at, library)?))
                }
                None => None,
            };
            NodeKind::Array { member }
        }
        SchemaNode::Union(union) => {
            if union.variants.is_empty() {
                return Err(ConfigError::InvalidSchema {
                    pointer: at.to_string(),
                    reason: format!("{} requires at least one variant", Subtype::Union),
                });
            }
            let variants = union
                .variants
                .iter()
                .map(|variant| compile_node(variant, at, library))
                .collect::<Result<Vec<_>, _>>()?;
            NodeKind::Union { variants }
        }
    };

    let has_async = steps.iter().any(|step| step.rule.is_async)
        || match &kind {
            NodeKind::Literal => false,
            NodeKind::Object { children, .. } => children.iter().any(|(_, c)| c.has_async),
            NodeKind::Array { member } => member.as_ref().is_some_and(|m| m.has_async),
            NodeKind::Union { variants } => variants.iter().any(|v| v.has_async),
        };

    Ok(CompiledNode {
        kind,
        nullable: modifiers.nullable,
        steps,
        has_async,
    })
}

fn compile_step(
    name: &str,
    args: &[Value],
    attributes: &NodeAttributes<'_>,
    subtype: Subtype,
    library: &RuleLibrary,
) -> Result<CompiledStep, ConfigError> {
    let definition = library.get(name).ok_or_else(|| ConfigError::UnknownRule {
        rule: name.to_string(),
        pointer: attributes.pointer.to_string(),
    })?;
    let rule = definition.compile(attributes, subtype, args)?;
    Ok(CompiledStep {
        key: name.to_string(),
        rule,
    })
}
