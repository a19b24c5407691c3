//! Declarative model schemas for a single SQL dialect.
//!
//! This crate provides:
//! - Model registration from annotated field declarations
//! - A process-wide, memoizing schema cache
//! - `CREATE TABLE` text generation
//! - Drift detection between declared and live columns
//!
//! # Naming Convention
//!
//! Model identities are `Model_<Name>`. The table name is the configured
//! prefix followed by the lowercased `<Name>`, unless the model registers an
//! explicit table name (still prefixed).
//!
//! # Registering models
//!
//! ```ignore
//! use caliper::{FieldDecl, ModelDef};
//!
//! const USER_FIELDS: &[FieldDecl<'static>] = &[
//!     FieldDecl::new("id", "@db-type int\n@db-extra auto_increment"),
//!     FieldDecl::new("name", "@db-type varchar\n@validate empty\n@list-field"),
//!     FieldDecl::new("created", "@db-type timestamp"),
//! ];
//!
//! caliper::inventory::submit! { ModelDef::new("Model_User", USER_FIELDS) }
//!
//! let schema = caliper::schema("Model_User")?;
//! assert_eq!(schema.columns["name"].render(), "varchar(127) null");
//! ```
//!
//! # Drift detection
//!
//! Rows read from the live database become [`ColumnSpec`]s through
//! [`ColumnSpec::from_live_column`]; [`SchemaDrift::diff_live`] compares them
//! with the declared columns and reports what differs:
//!
//! ```ignore
//! let live = caliper::live_columns(rows);
//! let diff = schema.diff_live(&live);
//! for change in &diff.changes {
//!     println!("{}", change);
//! }
//! ```

mod cache;
mod config;
mod diff;
mod error;
mod registry;
pub mod schema;

pub use cache::SchemaCache;
pub use config::{Config, TABLE_PREFIX_ENV};
pub use diff::{Change, SchemaDiff, SchemaDrift, diff_columns, live_columns};
pub use error::Error;
pub use registry::{ModelDef, registered_models};
pub use schema::SchemaCodegen;

pub use caliper_schema::{
    AnnotationMap, AnnotationValue, ColumnDescriptor, ColumnSpec, FieldDecl, FieldDescriptor,
    FieldType, LiveColumn, Scalar, Schema, SchemaBuilder, SchemaWarning, TypeClass, compare,
    parse_annotations,
};
pub use caliper_sql::{Escape, MySqlEscaper, escape_string, quote_ident, quote_literal};

// Re-export inventory so models can be submitted without a direct dependency
pub use inventory;

use std::sync::Arc;

/// Result type for caliper operations.
pub type Result<T> = std::result::Result<T, Error>;

inventory::collect!(ModelDef);

/// Schema of a registered model, built on first use by the global cache.
pub fn schema(identity: &str) -> Result<Arc<Schema>> {
    SchemaCache::global().get(identity)
}

/// Schemas of every registered model, in table-name order.
pub fn collect_schemas() -> Result<Vec<Arc<Schema>>> {
    let cache = SchemaCache::global();
    let mut schemas = registered_models()
        .map(|def| cache.get_or_build(def.identity, def.table, def.fields))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    schemas.sort_by(|a, b| a.table_name.cmp(&b.table_name));
    Ok(schemas)
}
