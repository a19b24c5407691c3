//! Process-wide schema memoization.
//!
//! Each model identity owns a slot holding a [`OnceLock`]. The map of slots is
//! locked only long enough to fetch or create a slot; the build itself runs
//! under the slot's `OnceLock`, so concurrent first requests for one identity
//! build exactly once while requests for other identities proceed.

use crate::config::Config;
use crate::error::Error;
use crate::registry::ModelDef;
use caliper_schema::{FieldDecl, Schema, SchemaBuilder};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, OnceLock, PoisonError};

type BuildResult = caliper_schema::Result<Arc<Schema>>;
type Slot = Arc<OnceLock<BuildResult>>;

/// Memoizes schema builds by model identity.
///
/// Failed builds are memoized too: the same declarations fail the same way.
#[derive(Debug, Default)]
pub struct SchemaCache {
    config: Config,
    slots: Mutex<HashMap<String, Slot>>,
}

static GLOBAL: LazyLock<SchemaCache> = LazyLock::new(|| SchemaCache::new(Config::from_env()));

impl SchemaCache {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide cache, configured from the environment on first use.
    pub fn global() -> &'static SchemaCache {
        &GLOBAL
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return the cached schema for `identity`, building it from `fields` if
    /// this is the first request.
    pub fn get_or_build(
        &self,
        identity: &str,
        table: Option<&str>,
        fields: &[FieldDecl<'_>],
    ) -> BuildResult {
        let slot = self.slot(identity);
        slot.get_or_init(|| {
            tracing::debug!(model = identity, "building schema");
            SchemaBuilder::new(identity, fields)
                .table(table)
                .table_prefix(&self.config.table_prefix)
                .build()
                .map(Arc::new)
        })
        .clone()
    }

    /// Schema of a model registered through `inventory`.
    pub fn get(&self, identity: &str) -> crate::Result<Arc<Schema>> {
        let def = ModelDef::find(identity).ok_or_else(|| Error::NotRegistered(identity.to_string()))?;
        Ok(self.get_or_build(def.identity, def.table, def.fields)?)
    }

    /// Whether a build for `identity` has completed.
    pub fn contains(&self, identity: &str) -> bool {
        self.lock()
            .get(identity)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Drop the cached entry for `identity`; the next request rebuilds it.
    ///
    /// Returns true if an entry was present. Callers already holding the old
    /// `Arc<Schema>` keep it.
    pub fn invalidate(&self, identity: &str) -> bool {
        let removed = self.lock().remove(identity).is_some();
        if removed {
            tracing::debug!(model = identity, "invalidated cached schema");
        }
        removed
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of completed builds.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, identity: &str) -> Slot {
        let mut slots = self.lock();
        if let Some(slot) = slots.get(identity) {
            return slot.clone();
        }
        slots.entry(identity.to_string()).or_default().clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // slots only ever hold finished values, so a poisoned map is still consistent
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldDecl<'static>] = &[
        FieldDecl::new("id", "@db-type int"),
        FieldDecl::new("name", "@db-type varchar"),
    ];

    #[test]
    fn test_build_once_and_share() {
        let cache = SchemaCache::new(Config::new());
        let a = cache.get_or_build("Model_User", None, FIELDS).unwrap();
        let b = cache.get_or_build("Model_User", None, FIELDS).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("Model_User"));
    }

    #[test]
    fn test_later_declarations_do_not_rebuild() {
        let cache = SchemaCache::new(Config::new());
        cache.get_or_build("Model_User", None, FIELDS).unwrap();
        let other = [FieldDecl::new("email", "@db-type varchar")];
        let schema = cache.get_or_build("Model_User", None, &other).unwrap();
        assert!(schema.columns.contains_key("id"));
        assert!(!schema.columns.contains_key("email"));
    }

    #[test]
    fn test_invalidate_rebuilds() {
        let cache = SchemaCache::new(Config::new());
        let a = cache.get_or_build("Model_User", None, FIELDS).unwrap();
        assert!(cache.invalidate("Model_User"));
        assert!(!cache.invalidate("Model_User"));
        assert!(cache.is_empty());

        let b = cache.get_or_build("Model_User", None, FIELDS).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_failures_are_memoized() {
        let cache = SchemaCache::new(Config::new());
        let err = cache.get_or_build("User", None, FIELDS).unwrap_err();
        assert!(matches!(err, caliper_schema::Error::Naming { .. }));
        assert_eq!(cache.get_or_build("User", None, FIELDS).unwrap_err(), err);
        assert!(cache.contains("User"));
    }

    #[test]
    fn test_prefix_and_table_override() {
        let cache = SchemaCache::new(Config::new().with_table_prefix("app_"));
        let user = cache.get_or_build("Model_User", None, FIELDS).unwrap();
        assert_eq!(user.table_name, "app_user");

        let post = cache.get_or_build("Model_Post", Some("blog_post"), FIELDS).unwrap();
        assert_eq!(post.table_name, "app_blog_post");
    }

    #[test]
    fn test_clear() {
        let cache = SchemaCache::new(Config::new());
        cache.get_or_build("Model_A", None, FIELDS).unwrap();
        cache.get_or_build("Model_B", None, FIELDS).unwrap();
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unregistered_model() {
        let cache = SchemaCache::new(Config::new());
        assert_eq!(
            cache.get("Model_Nobody"),
            Err(Error::NotRegistered("Model_Nobody".into()))
        );
    }
}
