//! Schema building.
//!
//! ## Naming Convention
//!
//! Model identities look like `Model_<Name>`: the `Model_` prefix followed by
//! an ASCII letter and then letters, digits or underscores. The lowercased
//! `<Name>` is the schema's type name and, unless the model registered an
//! explicit table name, its table name (after the configured table prefix).
//!
//! ```text
//! Model_User      -> type `user`,      table `{prefix}user`
//! Model_BlogPost  -> type `blogpost`,  table `{prefix}blogpost`
//! ```

use crate::column::{ColumnSpec, TypeClass};
use crate::error::{Error, Result, SchemaWarning};
use crate::field::{FieldDecl, FieldType, reflect_fields};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Prefix every model identity must start with.
pub const MODEL_PREFIX: &str = "Model_";

/// Everything derived from one model's field declarations.
///
/// Built once per model and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Physical table name, table prefix included.
    pub table_name: String,
    /// Lowercased short name of the model.
    pub type_name: String,
    /// Default human-readable field. `None` only when nothing is persisted.
    pub list_field: Option<String>,
    /// Logical type of every persisted field, in declaration order.
    pub fields: IndexMap<String, FieldType>,
    /// Validation rules per field.
    pub validate: IndexMap<String, String>,
    /// Canonical column spec per persisted field.
    pub columns: IndexMap<String, ColumnSpec>,
    /// Non-fatal findings, such as pass-through column types.
    pub warnings: Vec<SchemaWarning>,
    /// Columns whose metadata could not be read. They are missing from
    /// `columns`; the rest of the schema is complete.
    pub errors: Vec<Error>,
}

impl Schema {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.get(name)
    }

    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    pub fn is_persisted(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Names of the persisted fields, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// True if every persisted field produced a column.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Extract `<Name>` from a `Model_<Name>` identity.
pub fn model_short_name(identity: &str) -> Result<&str> {
    let naming_error = || Error::Naming {
        identity: identity.to_string(),
    };

    let name = identity.strip_prefix(MODEL_PREFIX).ok_or_else(naming_error)?;
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return Err(naming_error()),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(naming_error());
    }
    Ok(name)
}

/// Builds a [`Schema`] from a model's declarations.
///
/// # Example
///
/// ```
/// use caliper_schema::{FieldDecl, SchemaBuilder};
///
/// let fields = [
///     FieldDecl::new("id", "@db-type int\n@db-extra auto_increment"),
///     FieldDecl::new("name", "@db-type varchar\n@validate empty"),
/// ];
/// let schema = SchemaBuilder::new("Model_User", &fields)
///     .table_prefix("app_")
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.table_name, "app_user");
/// assert_eq!(schema.columns["id"].render(), "int(11) NOT null auto_increment");
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder<'a> {
    identity: &'a str,
    fields: &'a [FieldDecl<'a>],
    table: Option<&'a str>,
    table_prefix: &'a str,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(identity: &'a str, fields: &'a [FieldDecl<'a>]) -> Self {
        Self {
            identity,
            fields,
            table: None,
            table_prefix: "",
        }
    }

    /// Use an explicit table name instead of the one derived from the identity.
    pub fn table(mut self, table: impl Into<Option<&'a str>>) -> Self {
        self.table = table.into();
        self
    }

    /// Prefix prepended to the table name.
    pub fn table_prefix(mut self, prefix: &'a str) -> Self {
        self.table_prefix = prefix;
        self
    }

    pub fn build(self) -> Result<Schema> {
        let short_name = model_short_name(self.identity)?;
        let type_name = short_name.to_ascii_lowercase();
        let table_name = format!(
            "{}{}",
            self.table_prefix,
            self.table.unwrap_or(type_name.as_str())
        );

        let _span = tracing::debug_span!("schema.build", model = self.identity, table = %table_name)
            .entered();

        let mut seen = HashSet::new();
        for decl in self.fields {
            if !seen.insert(decl.name) {
                return Err(Error::DuplicateField {
                    model: self.identity.to_string(),
                    field: decl.name.to_string(),
                });
            }
        }

        let mut schema = Schema {
            table_name,
            type_name,
            list_field: None,
            fields: IndexMap::new(),
            validate: IndexMap::new(),
            columns: IndexMap::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        };
        let mut first_persisted = None;
        let mut tagged_list_field = None;

        for field in reflect_fields(self.fields) {
            let Some(field_type) = field.field_type() else {
                tracing::trace!(field = %field.name, "not persisted, skipping");
                continue;
            };

            if let Some(rules) = field.validation() {
                schema.validate.insert(field.name.clone(), rules.to_string());
            }

            match field.column_descriptor() {
                Ok(desc) => {
                    let class = desc.type_class();
                    if !class.is_recognized()
                        && let TypeClass::Other(ty) = class
                    {
                        tracing::warn!(field = %field.name, ty = %ty, "unknown column type, passing through unchanged");
                        schema.warnings.push(SchemaWarning::UnknownType {
                            field: field.name.clone(),
                            ty,
                        });
                    }
                    schema
                        .columns
                        .insert(field.name.clone(), ColumnSpec::from_declaration(&desc));
                }
                Err(source) => {
                    tracing::warn!(field = %field.name, error = %source, "skipping column with malformed metadata");
                    schema.errors.push(Error::Config {
                        model: self.identity.to_string(),
                        field: field.name.clone(),
                        source,
                    });
                }
            }

            if field.is_list_field() {
                tagged_list_field = Some(field.name.clone());
            }
            if first_persisted.is_none() {
                first_persisted = Some(field.name.clone());
            }

            schema.fields.insert(field.name, field_type);
        }

        schema.list_field = tagged_list_field.or(first_persisted);

        tracing::debug!(
            fields = schema.fields.len(),
            columns = schema.columns.len(),
            warnings = schema.warnings.len(),
            errors = schema.errors.len(),
            "built schema"
        );

        Ok(schema)
    }
}

/// Build a schema with no table prefix and the derived table name.
pub fn build(identity: &str, fields: &[FieldDecl<'_>]) -> Result<Schema> {
    SchemaBuilder::new(identity, fields).build()
}
