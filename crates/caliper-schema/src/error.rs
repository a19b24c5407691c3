use std::fmt;
use thiserror::Error;

/// Result type for schema building.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the caller of a schema build.
///
/// These are `Clone` so a memoized failed build can be handed to every caller
/// that asks for the same model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("model identity `{identity}` does not follow the `Model_<Name>` naming convention")]
    Naming { identity: String },

    #[error("model `{model}`: column `{field}` has malformed metadata: {source}")]
    Config {
        model: String,
        field: String,
        #[source]
        source: MetadataError,
    },

    #[error("model `{model}` declares field `{field}` more than once")]
    DuplicateField { model: String, field: String },
}

/// A `db-*` annotation whose value cannot be turned into a column descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("`@{tag}` expects a non-negative integer, got `{value}`")]
    InvalidNumber { tag: &'static str, value: String },

    #[error("`@{tag}` expects a boolean, got `{value}`")]
    InvalidFlag { tag: &'static str, value: String },
}

/// Non-fatal findings recorded while building a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaWarning {
    /// The declared type is not in the normalization matrix and was passed
    /// through unchanged.
    UnknownType { field: String, ty: String },
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaWarning::UnknownType { field, ty } => {
                write!(f, "field `{}` uses unknown type `{}`, passed through", field, ty)
            }
        }
    }
}
