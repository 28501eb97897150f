//! # Validation Entry Point
//!
//! [`Validator`] owns the rule library, the type registry and the routine
//! cache. Each [`Validator::validate`] call:
//!
//! 1. builds a fresh reporter from the selected constructor (vanilla by
//!    default) with the call's custom messages and bail flag;
//! 2. selects the existence helpers from the strict flag;
//! 3. resolves the compiled routine through the cache, or compiles it
//!    directly when no cache key is given;
//! 4. returns a future that runs the routine.
//!
//! Configuration errors are returned synchronously by `validate` itself;
//! data errors only ever arrive as the future's `Err`.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;
use sift_core::{
    reporter_factory, ConfigError, Helpers, Messages, ReporterFactory, ValidationFailure,
    VanillaReporter,
};
use sift_rules::{RuleDefinition, RuleLibrary};
use sift_schema::{Schema, SchemaDocument, SchemaNode, TypeRegistry};

use crate::cache::CompiledCache;
use crate::compiler::compile;
use crate::routine::CompiledRoutine;

/// Pending result of one validation call.
pub type ValidationFuture = BoxFuture<'static, Result<Value, ValidationFailure>>;

/// Options of one validation call.
#[derive(Clone)]
pub struct ValidateOptions {
    /// Schema to validate against.
    pub schema: Schema,
    /// Data to validate.
    pub data: Value,
    /// Custom messages; empty when `None`.
    pub messages: Option<Messages>,
    /// Reporter constructor; [`VanillaReporter`] when `None`.
    pub reporter: Option<ReporterFactory>,
    /// Stop at the first failure.
    pub bail: bool,
    /// Cache the compiled routine under this key.
    pub cache_key: Option<String>,
    /// Count empty strings as present.
    pub exists_strict: bool,
    /// Rule library used while running; the validator's own when `None`.
    pub library: Option<Arc<RuleLibrary>>,
}

impl ValidateOptions {
    /// Options with every flag at its default.
    pub fn new(schema: Schema, data: Value) -> Self {
        Self {
            schema,
            data,
            messages: None,
            reporter: None,
            bail: false,
            cache_key: None,
            exists_strict: false,
            library: None,
        }
    }

    /// Custom messages looked up by pointer and rule.
    pub fn messages(mut self, messages: Messages) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Build the reporter with `reporter` instead of the vanilla one.
    pub fn reporter(mut self, reporter: ReporterFactory) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Stop at the first failure.
    pub fn bail(mut self, bail: bool) -> Self {
        self.bail = bail;
        self
    }

    /// Reuse the routine compiled under `key`, compiling it on first use.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Count empty strings as present.
    pub fn exists_strict(mut self, strict: bool) -> Self {
        self.exists_strict = strict;
        self
    }

    /// Run against `library` instead of the validator's library. The schema
    /// is still compiled against the validator's library.
    pub fn library(mut self, library: Arc<RuleLibrary>) -> Self {
        self.library = Some(library);
        self
    }
}

impl fmt::Debug for ValidateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateOptions")
            .field("fields", &self.schema.len())
            .field("bail", &self.bail)
            .field("cache_key", &self.cache_key)
            .field("exists_strict", &self.exists_strict)
            .field("custom_reporter", &self.reporter.is_some())
            .finish_non_exhaustive()
    }
}

/// Rule library, type registry and routine cache behind one handle.
#[derive(Debug, Clone)]
pub struct Validator {
    library: Arc<RuleLibrary>,
    types: TypeRegistry,
    cache: CompiledCache,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// A validator with the built-in rules and no custom types.
    pub fn new() -> Self {
        Self::with_library(RuleLibrary::builtin())
    }

    /// A validator over an explicit rule library.
    pub fn with_library(library: RuleLibrary) -> Self {
        Self {
            library: Arc::new(library),
            types: TypeRegistry::new(),
            cache: CompiledCache::new(),
        }
    }

    /// Register a rule. Routines already cached pick it up at their next
    /// run, since they resolve rules at invocation time.
    pub fn add_rule(&mut self, name: impl Into<String>, definition: impl RuleDefinition + 'static) {
        Arc::make_mut(&mut self.library).add_rule(name, definition);
    }

    /// Register a named node type for schema documents.
    pub fn add_type<F>(&mut self, name: impl Into<String>, definition: F)
    where
        F: Fn(Option<&Value>) -> Result<SchemaNode, ConfigError> + Send + Sync + 'static,
    {
        self.types.add_type(name, definition);
    }

    /// The rule library.
    pub fn library(&self) -> &Arc<RuleLibrary> {
        &self.library
    }

    /// The type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The routine cache.
    pub fn cache(&self) -> &CompiledCache {
        &self.cache
    }

    /// Compile `schema` without caching it.
    pub fn compile(&self, schema: &Schema) -> Result<CompiledRoutine, ConfigError> {
        compile(schema, &self.library)
    }

    /// Resolve a schema document against the registered types.
    pub fn schema_from_document(&self, document: &SchemaDocument) -> Result<Schema, ConfigError> {
        document.to_schema(&self.types)
    }

    /// Start one validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] immediately when the schema does not compile.
    /// Data failures are the `Err` of the returned future.
    pub fn validate(&self, options: ValidateOptions) -> Result<ValidationFuture, ConfigError> {
        let ValidateOptions {
            schema,
            data,
            messages,
            reporter,
            bail,
            cache_key,
            exists_strict,
            library,
        } = options;

        tracing::debug!(
            cache_key = cache_key.as_deref().unwrap_or(""),
            bail,
            exists_strict,
            "validation requested"
        );

        let routine = self
            .cache
            .get_or_compile(cache_key.as_deref(), &schema, &self.library)?;
        let factory = reporter.unwrap_or_else(reporter_factory::<VanillaReporter>);
        let mut reporter = factory(messages.unwrap_or_else(Messages::empty), bail);
        let helpers = Helpers::select(exists_strict);
        let library = library.unwrap_or_else(|| Arc::clone(&self.library));

        Ok(Box::pin(async move {
            routine
                .run(&data, &library, reporter.as_mut(), helpers)
                .await
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_schema::{rules, schema};

    #[test]
    fn test_config_error_is_synchronous() {
        let validator = Validator::new();
        let s = Schema::create([("n", schema::number().rule(rules::mobile()))]);
        let err = validator
            .validate(ValidateOptions::new(s, Value::Null))
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "cannot use mobile rule on \"number\" data type"
        );
    }

    #[test]
    fn test_cache_key_populates_cache() {
        let validator = Validator::new();
        let s = Schema::create([("n", schema::number())]);
        let options = ValidateOptions::new(s, serde_json::json!({ "n": 1 })).cache_key("n");
        let _pending = validator.validate(options).unwrap();
        assert!(validator.cache().contains("n"));
    }

    #[test]
    fn test_add_rule_does_not_touch_clones() {
        let original = Validator::new();
        let mut extended = original.clone();
        extended.add_rule("shout", sift_rules::builtin::Alpha);
        assert!(extended.library().contains("shout"));
        assert!(!original.library().contains("shout"));
    }

    #[test]
    fn test_add_type_registers() {
        let mut validator = Validator::new();
        validator.add_type("phone", |_| Ok(schema::string().rule(rules::mobile())));
        assert!(validator.types().contains("phone"));
    }
}
