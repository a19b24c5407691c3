//! Static model registration.
//!
//! Models are submitted to `inventory` at compile time, so every model linked
//! into the binary can be found by identity without a central list.

use crate::cache::SchemaCache;
use caliper_schema::{FieldDecl, Schema};
use std::sync::Arc;

/// A registered model: identity, optional explicit table name and fields.
///
/// ```ignore
/// caliper::inventory::submit! {
///     caliper::ModelDef::new("Model_Post", POST_FIELDS).with_table("blog_post")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ModelDef {
    pub identity: &'static str,
    /// Table name to use instead of the one derived from the identity.
    pub table: Option<&'static str>,
    pub fields: &'static [FieldDecl<'static>],
}

impl ModelDef {
    pub const fn new(identity: &'static str, fields: &'static [FieldDecl<'static>]) -> Self {
        Self {
            identity,
            table: None,
            fields,
        }
    }

    pub const fn with_table(self, table: &'static str) -> Self {
        Self {
            table: Some(table),
            ..self
        }
    }

    /// Look up a registered model.
    pub fn find(identity: &str) -> Option<&'static ModelDef> {
        registered_models().find(|def| def.identity == identity)
    }

    /// Schema of this model, from the global cache.
    pub fn schema(&self) -> caliper_schema::Result<Arc<Schema>> {
        SchemaCache::global().get_or_build(self.identity, self.table, self.fields)
    }
}

/// Every model submitted with `inventory::submit!`.
pub fn registered_models() -> impl Iterator<Item = &'static ModelDef> {
    inventory::iter::<ModelDef>.into_iter()
}
