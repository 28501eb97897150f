//! # Type Registry
//!
//! Named constructors for custom node types, registered with
//! [`TypeRegistry::add_type`]. Schema documents resolve a `type` that is
//! not a built-in kind through the registry.
//!
//! The registry is an explicit object owned by the validator, not ambient
//! global state: each test can build its own.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use sift_core::ConfigError;

use crate::node::SchemaNode;

/// Builds a node from the `options` written next to the type in a document.
pub type TypeDefinition =
    Arc<dyn Fn(Option<&Value>) -> Result<SchemaNode, ConfigError> + Send + Sync>;

/// Registry of custom node types.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDefinition>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type under `name`, replacing any previous definition.
    pub fn add_type<F>(&mut self, name: impl Into<String>, definition: F)
    where
        F: Fn(Option<&Value>) -> Result<SchemaNode, ConfigError> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(type_name = %name, "registered schema type");
        if self.types.insert(name.clone(), Arc::new(definition)).is_some() {
            tracing::warn!(type_name = %name, "schema type redefined");
        }
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build a node of the registered type `name`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownType`] if `name` is not registered, or whatever
    /// the definition itself rejects.
    pub fn build(&self, name: &str, options: Option<&Value>) -> Result<SchemaNode, ConfigError> {
        let definition = self
            .types
            .get(name)
            .ok_or_else(|| ConfigError::UnknownType(name.to_string()))?;
        definition(options)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}
