//! # sift-schema — Schema Trees
//!
//! A schema is an immutable, declarative tree describing the expected shape
//! of the data and the rules attached to each node. The compiler in
//! `sift-engine` consumes it; nothing downstream ever mutates it.
//!
//! ## Building Schemas
//!
//! - [`schema`] — builder functions (`schema::string()`, `schema::object(..)`,
//!   `schema::array(..)`, `schema::any_of(..)`) and the [`Schema`] root.
//! - [`rules`] — constructors for [`RuleRef`]s attached to nodes
//!   (`rules::mobile()`, `rules::min_length(3)`, ...).
//! - [`document`] — the same tree authored as a YAML or JSON document.
//! - [`TypeRegistry`] — named custom node types (`add_type`) resolvable
//!   from documents.
//!
//! ## Crate Policy
//!
//! - Depends only on `sift-core` internally.
//! - Rule arguments are carried verbatim; they are validated by the rule's
//!   own `compile` step, never here.

pub mod document;
pub mod node;
pub mod rules;
pub mod schema;
pub mod types;

pub use document::{NodeDocument, RuleDocument, SchemaDocument};
pub use node::{ArrayNode, LiteralNode, Modifiers, ObjectNode, RuleRef, SchemaNode, UnionNode};
pub use schema::Schema;
pub use types::{TypeDefinition, TypeRegistry};
