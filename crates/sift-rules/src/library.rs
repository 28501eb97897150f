//! # Rule Library
//!
//! Mapping from rule name to [`RuleDefinition`]. The compiler resolves
//! rule references through it at compile time, and the compiled routine
//! receives a library again at every invocation, so a test can swap a rule
//! implementation without recompiling the schema.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::builtin;
use crate::contract::RuleDefinition;

/// Registry of rule definitions keyed by name.
#[derive(Clone, Default)]
pub struct RuleLibrary {
    rules: HashMap<String, Arc<dyn RuleDefinition>>,
}

impl RuleLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// A library with every built-in rule registered.
    pub fn builtin() -> Self {
        let mut library = Self::new();
        builtin::register_all(&mut library);
        library
    }

    /// Register `definition` under `name`, replacing any previous rule.
    pub fn add_rule(&mut self, name: impl Into<String>, definition: impl RuleDefinition + 'static) {
        self.add_shared(name, Arc::new(definition));
    }

    /// Register an already shared definition.
    pub fn add_shared(&mut self, name: impl Into<String>, definition: Arc<dyn RuleDefinition>) {
        let name = name.into();
        if self.rules.insert(name.clone(), definition).is_some() {
            tracing::debug!(rule = %name, "rule definition replaced");
        }
    }

    /// Look up a rule.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn RuleDefinition>> {
        self.rules.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered names, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for RuleLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleLibrary")
            .field("rules", &self.names())
            .finish()
    }
}
