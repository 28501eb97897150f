//! # Compiled Routine Cache
//!
//! Maps a caller-supplied key to the routine compiled for it, so a schema
//! used repeatedly is compiled once.
//!
//! ## Policy
//!
//! - A missing or empty key always compiles fresh and stores nothing.
//! - Entries are never evicted or replaced: the first routine stored under
//!   a key wins. A key is assumed to always name the same schema; reusing
//!   it for a different schema keeps the first schema's behavior.
//! - Compilation runs outside the lock. Two callers racing on a new key may
//!   both compile; the loser's routine is discarded and both receive the
//!   stored one. Compilation is deterministic, so this is harmless.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sift_core::ConfigError;
use sift_rules::RuleLibrary;
use sift_schema::Schema;

use crate::compiler::compile;
use crate::routine::CompiledRoutine;

/// Thread-safe, cloneable cache of compiled routines.
///
/// The lock is `parking_lot` and is never held across compilation or an
/// `.await`.
#[derive(Debug, Clone, Default)]
pub struct CompiledCache {
    entries: Arc<RwLock<HashMap<String, Arc<CompiledRoutine>>>>,
}

impl CompiledCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the routine stored under `key`, compiling and storing it on a
    /// miss. Without a key the schema is compiled and nothing is stored.
    pub fn get_or_compile(
        &self,
        key: Option<&str>,
        schema: &Schema,
        library: &RuleLibrary,
    ) -> Result<Arc<CompiledRoutine>, ConfigError> {
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            return compile(schema, library).map(Arc::new);
        };

        if let Some(routine) = self.entries.read().get(key) {
            tracing::trace!(cache_key = key, "compiled routine cache hit");
            return Ok(Arc::clone(routine));
        }

        let compiled = Arc::new(compile(schema, library)?);
        let mut entries = self.entries.write();
        let stored = entries.entry(key.to_string()).or_insert_with(|| {
            tracing::debug!(cache_key = key, "compiled routine cached");
            compiled
        });
        Ok(Arc::clone(stored))
    }

    /// Whether a routine is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of stored routines.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored routine.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_schema::schema;

    #[test]
    fn test_no_key_never_caches() {
        let cache = CompiledCache::new();
        let library = RuleLibrary::builtin();
        let s = Schema::create([("a", schema::string())]);
        cache.get_or_compile(None, &s, &library).unwrap();
        cache.get_or_compile(Some(""), &s, &library).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hit_returns_same_instance() {
        let cache = CompiledCache::new();
        let library = RuleLibrary::builtin();
        let s = Schema::create([("a", schema::string())]);
        let first = cache.get_or_compile(Some("signup"), &s, &library).unwrap();
        let second = cache.get_or_compile(Some("signup"), &s, &library).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.contains("signup"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_schema_wins_for_reused_key() {
        let cache = CompiledCache::new();
        let library = RuleLibrary::builtin();
        let first = Schema::create([("a", schema::string())]);
        let second = Schema::create([("b", schema::number())]);
        let one = cache.get_or_compile(Some("k"), &first, &library).unwrap();
        let two = cache.get_or_compile(Some("k"), &second, &library).unwrap();
        assert!(Arc::ptr_eq(&one, &two));
    }

    #[test]
    fn test_config_error_is_not_cached() {
        let cache = CompiledCache::new();
        let library = RuleLibrary::builtin();
        let bad = Schema::create([("a", schema::number().rule(sift_schema::rules::mobile()))]);
        assert!(cache.get_or_compile(Some("k"), &bad, &library).is_err());
        assert!(!cache.contains("k"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_first_use() {
        let cache = CompiledCache::new();
        let library = RuleLibrary::builtin();
        let s = Schema::create([("a", schema::string())]);
        let (cache_ref, schema_ref, library_ref) = (&cache, &s, &library);
        let routines: Vec<Arc<CompiledRoutine>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(move || {
                        cache_ref
                            .get_or_compile(Some("race"), schema_ref, library_ref)
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(cache.len(), 1);
        for routine in &routines {
            assert!(Arc::ptr_eq(routine, &routines[0]));
        }
    }
}
