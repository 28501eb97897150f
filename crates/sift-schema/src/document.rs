//! # Schema Documents
//!
//! The schema tree authored as data. A document is a map of top-level
//! fields; every node names its `type` and may add modifiers, rules and
//! kind-specific keys:
//!
//! ```yaml
//! fields:
//!   username:
//!     type: string
//!     options: { trim: true }
//!     rules: [alpha, { rule: minLength, args: [3] }]
//!   phone:
//!     type: string
//!     optional: true
//!     rules: [{ rule: mobile, args: [{ strict: false }] }]
//!   tags:
//!     type: array
//!     members: { type: string }
//!   contact:
//!     type: anyOf
//!     variants: [{ type: number }, { type: string, rules: [email] }]
//!   status:
//!     type: enum
//!     choices: [draft, published]
//!   zip:
//!     type: zipCode          # resolved through the TypeRegistry
//! ```
//!
//! Documents may be YAML (`.yaml`/`.yml`) or JSON (anything else); the
//! format is chosen by file extension.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sift_core::{pointer, ConfigError, SiftError, Subtype};

use crate::node::{ArrayNode, LiteralNode, Modifiers, ObjectNode, RuleRef, SchemaNode, UnionNode};
use crate::schema::Schema;
use crate::types::TypeRegistry;

/// Top-level schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Top-level fields in declaration order.
    pub fields: IndexMap<String, NodeDocument>,
}

/// A rule as written in a document: a bare name or `{rule, args}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleDocument {
    /// Rule without arguments.
    Name(String),
    /// Rule with arguments.
    Full {
        /// Registered rule name.
        rule: String,
        /// Raw arguments.
        #[serde(default)]
        args: Vec<Value>,
    },
}

impl From<&RuleDocument> for RuleRef {
    fn from(doc: &RuleDocument) -> Self {
        match doc {
            RuleDocument::Name(name) => RuleRef::new(name.clone(), Vec::new()),
            RuleDocument::Full { rule, args } => RuleRef::new(rule.clone(), args.clone()),
        }
    }
}

/// One node of a schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct NodeDocument {
    /// Built-in kind (`string`, `object`, `anyOf`, ...) or a registered type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Accept absent values.
    #[serde(default)]
    pub optional: bool,
    /// Accept `null`.
    #[serde(default)]
    pub nullable: bool,
    /// Declared rules in order.
    #[serde(default)]
    pub rules: Vec<RuleDocument>,
    /// Subtype options, or options passed to a registered type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Children of an `object`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, NodeDocument>>,
    /// Keep undeclared keys of an `object`.
    #[serde(default)]
    pub any_members: bool,
    /// Element schema of an `array`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Box<NodeDocument>>,
    /// Variants of an `anyOf`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<NodeDocument>>,
    /// Choices of an `enum`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    /// chrono format of a `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl SchemaDocument {
    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, SiftError> {
        serde_yaml::from_str(content).map_err(|e| SiftError::Document {
            path: "<yaml>".to_string(),
            reason: format!("invalid YAML schema: {e}"),
        })
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, SiftError> {
        serde_json::from_str(content).map_err(|e| SiftError::Document {
            path: "<json>".to_string(),
            reason: format!("invalid JSON schema: {e}"),
        })
    }

    /// Load a document from disk, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, SiftError> {
        let content = std::fs::read_to_string(path).map_err(|e| SiftError::Document {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parsed = match ext {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        };

        parsed.map_err(|e| match e {
            SiftError::Document { reason, .. } => SiftError::Document {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Resolve the document into a [`Schema`] using `types` for custom kinds.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for unknown types or kind-specific keys that are
    /// missing or misplaced.
    pub fn to_schema(&self, types: &TypeRegistry) -> Result<Schema, ConfigError> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for (name, doc) in &self.fields {
            fields.insert(name.clone(), doc.to_node(types, name)?);
        }
        Ok(Schema::from_fields(fields))
    }
}

impl NodeDocument {
    /// Resolve this node; `at` is its pointer, used in error messages.
    pub fn to_node(&self, types: &TypeRegistry, at: &str) -> Result<SchemaNode, ConfigError> {
        let modifiers = Modifiers {
            optional: self.optional,
            nullable: self.nullable,
        };
        let rules: Vec<RuleRef> = self.rules.iter().map(RuleRef::from).collect();

        // Registered types take precedence so they can replace built-in kinds.
        if types.contains(&self.kind) {
            let node = types.build(&self.kind, self.options.as_ref())?;
            let merged = Modifiers {
                optional: node.modifiers().optional || modifiers.optional,
                nullable: node.modifiers().nullable || modifiers.nullable,
            };
            return Ok(node.with_modifiers(merged).rules_from(rules));
        }

        let node = match self.kind.as_str() {
            "object" => {
                let mut children = IndexMap::new();
                for (name, child) in self.fields.iter().flatten() {
                    children.insert(name.clone(), child.to_node(types, &pointer::child(at, name))?);
                }
                SchemaNode::Object(ObjectNode {
                    children,
                    any_members: self.any_members,
                    rules,
                    modifiers,
                })
            }
            "array" => {
                let member = match &self.members {
                    Some(doc) => Some(Box::new(doc.to_node(types, &pointer::child(at, "*"))?)),
                    None => None,
                };
                SchemaNode::Array(ArrayNode {
                    member,
                    rules,
                    modifiers,
                })
            }
            "anyOf" => {
                let variants = self
                    .variants
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|v| v.to_node(types, at))
                    .collect::<Result<Vec<_>, _>>()?;
                SchemaNode::Union(UnionNode {
                    variants,
                    rules,
                    modifiers,
                })
            }
            other => {
                let subtype: Subtype = other
                    .parse()
                    .map_err(|_| ConfigError::UnknownType(other.to_string()))?;
                SchemaNode::Literal(LiteralNode {
                    subtype,
                    type_options: self.literal_options(subtype, at)?,
                    rules,
                    modifiers,
                })
            }
        };
        Ok(node)
    }

    /// Fold `choices`/`format` into the subtype options.
    fn literal_options(&self, subtype: Subtype, at: &str) -> Result<Option<Value>, ConfigError> {
        let mut options = self.options.clone();
        if options.as_ref().is_some_and(|o| !o.is_object()) {
            return Err(ConfigError::InvalidSchema {
                pointer: at.to_string(),
                reason: "\"options\" must be a mapping".to_string(),
            });
        }
        match subtype {
            Subtype::Enum => {
                let choices = self.choices.clone().ok_or_else(|| ConfigError::InvalidSchema {
                    pointer: at.to_string(),
                    reason: "enum requires \"choices\"".to_string(),
                })?;
                let slot = options.get_or_insert_with(|| json!({}));
                slot["choices"] = Value::Array(choices);
            }
            Subtype::Date => {
                if let Some(format) = &self.format {
                    let slot = options.get_or_insert_with(|| json!({}));
                    slot["format"] = Value::String(format.clone());
                }
            }
            _ => {
                if self.choices.is_some() || self.format.is_some() {
                    return Err(ConfigError::InvalidSchema {
                        pointer: at.to_string(),
                        reason: format!("\"choices\"/\"format\" are not valid on {subtype}"),
                    });
                }
            }
        }
        Ok(options)
    }
}
