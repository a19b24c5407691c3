//! Schema reflection and column normalization for caliper.
//!
//! Models are described declaratively: an identity string plus an ordered
//! list of fields, each carrying a block of annotation text such as
//!
//! ```text
//! @db-type varchar
//! @db-length 64
//! @validate empty
//! ```
//!
//! From that this crate derives:
//! - an [`AnnotationMap`] per field ([`parse_annotations`]),
//! - a [`FieldDescriptor`] per field ([`reflect_fields`]),
//! - one immutable [`Schema`] per model ([`SchemaBuilder`]),
//! - a canonical [`ColumnSpec`] per persisted field, which can be rendered to a
//!   DDL fragment and compared against a column read from a live database
//!   ([`ColumnSpec::from_live_column`]).
//!
//! Nothing here performs I/O or holds global state; memoization and model
//! registration live in the `caliper` crate.

mod annotation;
mod column;
mod error;
mod field;
mod schema;

pub use annotation::{AnnotationMap, AnnotationValue, parse_annotations};
pub use column::{
    ColumnDescriptor, ColumnSpec, IntWidth, LiveColumn, Scalar, TIMESTAMP_DEFAULT, TypeClass,
    compare,
};
pub use error::{Error, MetadataError, Result, SchemaWarning};
pub use field::{FieldDecl, FieldDescriptor, FieldType, reflect_fields, tags};
pub use schema::{MODEL_PREFIX, Schema, SchemaBuilder, build, model_short_name};

// Re-export the dialect escaper so callers can pass their own to `render_with`.
pub use caliper_sql::{Escape, MySqlEscaper};
