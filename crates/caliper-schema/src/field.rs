//! Field reflection: from declared fields to classified descriptors.

use crate::annotation::{AnnotationMap, AnnotationValue, parse_annotations};
use crate::column::ColumnDescriptor;
use crate::error::MetadataError;
use std::fmt;

/// Annotation tags understood by the reflector.
pub mod tags {
    /// Database type. Its presence is what makes a field persisted.
    pub const DB_TYPE: &str = "db-type";
    pub const DB_LENGTH: &str = "db-length";
    pub const DB_DEFAULT: &str = "db-default";
    pub const DB_UNSIGNED: &str = "db-unsigned";
    pub const DB_NULL: &str = "db-null";
    pub const DB_EXTRA: &str = "db-extra";
    /// Validation rules, handed verbatim to the validation runtime.
    pub const VALIDATE: &str = "validate";
    /// Marks a field whose values are encoded/decoded by the ORM runtime.
    pub const SERIALIZE: &str = "serialize";
    /// Marks the field used as the human-readable label of a record.
    pub const LIST_FIELD: &str = "list-field";
}

/// Type used when `@db-type` is present without a value.
const DEFAULT_DB_TYPE: &str = "int";

/// One field as declared by a model: its name and raw annotation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl<'a> {
    pub name: &'a str,
    pub annotations: &'a str,
}

impl<'a> FieldDecl<'a> {
    pub const fn new(name: &'a str, annotations: &'a str) -> Self {
        Self { name, annotations }
    }
}

/// The logical type of a persisted field, as seen by the ORM runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Stored as-is in a column of this database type.
    Column(String),
    /// Complex value, transparently encoded on write and decoded on read.
    Serialize,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Column(ty) => write!(f, "{}", ty),
            FieldType::Serialize => write!(f, "serialize"),
        }
    }
}

/// A reflected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub annotations: AnnotationMap,
    /// True iff the field carries `@db-type`.
    pub persisted: bool,
}

impl FieldDescriptor {
    /// Reflect a single declaration.
    pub fn reflect(decl: &FieldDecl<'_>) -> Self {
        let annotations = parse_annotations(decl.annotations);
        let persisted = annotations.contains(tags::DB_TYPE);
        Self {
            name: decl.name.to_string(),
            annotations,
            persisted,
        }
    }

    /// The declared database type, `None` for non-persisted fields.
    pub fn db_type(&self) -> Option<&str> {
        match self.annotations.get(tags::DB_TYPE)? {
            AnnotationValue::Flag => Some(DEFAULT_DB_TYPE),
            AnnotationValue::Text(ty) => Some(ty),
        }
    }

    /// The logical type exposed in `Schema::fields`.
    pub fn field_type(&self) -> Option<FieldType> {
        let db_type = self.db_type()?;
        if self.annotations.contains(tags::SERIALIZE) {
            Some(FieldType::Serialize)
        } else {
            Some(FieldType::Column(db_type.to_string()))
        }
    }

    /// Validation rules, if the field has any.
    pub fn validation(&self) -> Option<&str> {
        self.annotations.text(tags::VALIDATE)
    }

    pub fn is_list_field(&self) -> bool {
        self.annotations.contains(tags::LIST_FIELD)
    }

    /// Collect the `db-*` tags into a declarative column descriptor.
    ///
    /// Fails when a numeric or boolean tag carries a value that cannot be
    /// read as such.
    pub fn column_descriptor(&self) -> Result<ColumnDescriptor, MetadataError> {
        let mut desc = ColumnDescriptor::new(self.db_type().unwrap_or(DEFAULT_DB_TYPE));

        for (tag, value) in self.annotations.iter() {
            match tag {
                tags::DB_TYPE => {}
                tags::DB_LENGTH => {
                    // a bare `@db-length` leaves the class default in place
                    if let Some(raw) = value.as_text() {
                        desc.length = raw.parse().map_err(|_| MetadataError::InvalidNumber {
                            tag: tags::DB_LENGTH,
                            value: raw.to_string(),
                        })?;
                    }
                }
                tags::DB_DEFAULT => {
                    desc.default = value.as_text().unwrap_or_default().to_string();
                }
                tags::DB_UNSIGNED => desc.unsigned = parse_flag(tags::DB_UNSIGNED, value)?,
                tags::DB_NULL => desc.null = parse_flag(tags::DB_NULL, value)?,
                tags::DB_EXTRA => {
                    desc.extra = value.as_text().unwrap_or_default().to_string();
                }
                other if other.starts_with("db-") => {
                    tracing::debug!(field = %self.name, tag = other, "ignoring unrecognized column tag");
                }
                _ => {}
            }
        }

        Ok(desc)
    }
}

/// Reflect every declaration, in declaration order.
pub fn reflect_fields(decls: &[FieldDecl<'_>]) -> Vec<FieldDescriptor> {
    decls.iter().map(FieldDescriptor::reflect).collect()
}

fn parse_flag(tag: &'static str, value: &AnnotationValue) -> Result<bool, MetadataError> {
    let Some(raw) = value.as_text() else {
        return Ok(true);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MetadataError::InvalidFlag {
            tag,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reflect(annotations: &str) -> FieldDescriptor {
        FieldDescriptor::reflect(&FieldDecl::new("field", annotations))
    }

    #[test]
    fn test_persisted_iff_db_type() {
        assert!(reflect("@db-type varchar").persisted);
        assert!(reflect("@db-type").persisted);
        assert!(!reflect("@validate empty").persisted);
        assert!(!reflect("").persisted);
    }

    #[test]
    fn test_bare_db_type_defaults_to_int() {
        let field = reflect("@db-type");
        assert_eq!(field.db_type(), Some("int"));
        assert_eq!(field.field_type(), Some(FieldType::Column("int".into())));
        assert_eq!(field.column_descriptor().unwrap().ty, "int");
    }

    #[test]
    fn test_serialize_marker() {
        let field = reflect("@db-type text\n@serialize");
        assert_eq!(field.field_type(), Some(FieldType::Serialize));
        assert_eq!(field.field_type().unwrap().to_string(), "serialize");
        // the column itself is still a text column
        assert_eq!(field.column_descriptor().unwrap().ty, "text");
    }

    #[test]
    fn test_non_persisted_has_no_type() {
        let field = reflect("@serialize\n@validate empty");
        assert_eq!(field.field_type(), None);
    }

    #[test]
    fn test_column_descriptor_from_tags() {
        let field = reflect(
            "@db-type int\n@db-length 10\n@db-default 5\n@db-unsigned\n@db-null false\n@db-extra auto_increment",
        );
        let desc = field.column_descriptor().unwrap();
        assert_eq!(
            desc,
            ColumnDescriptor {
                ty: "int".into(),
                length: 10,
                default: "5".into(),
                unsigned: true,
                null: false,
                extra: "auto_increment".into(),
            }
        );
    }

    #[test]
    fn test_column_descriptor_defaults() {
        let desc = reflect("@db-type varchar").column_descriptor().unwrap();
        assert_eq!(desc, ColumnDescriptor::new("varchar"));
    }

    #[test]
    fn test_malformed_length() {
        let err = reflect("@db-type varchar\n@db-length wide")
            .column_descriptor()
            .unwrap_err();
        assert_eq!(
            err,
            MetadataError::InvalidNumber {
                tag: "db-length",
                value: "wide".into()
            }
        );
    }

    #[test]
    fn test_malformed_flag() {
        let err = reflect("@db-type int\n@db-null sometimes")
            .column_descriptor()
            .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidFlag { tag: "db-null", .. }));
    }

    #[test]
    fn test_flag_spellings() {
        for (raw, expected) in [("YES", true), ("on", true), ("1", true), ("No", false), ("0", false)] {
            let field = reflect(&format!("@db-type int\n@db-unsigned {}", raw));
            assert_eq!(field.column_descriptor().unwrap().unsigned, expected, "{}", raw);
        }
    }

    #[test]
    fn test_reflect_keeps_declaration_order() {
        let fields = reflect_fields(&[
            FieldDecl::new("b", "@db-type int"),
            FieldDecl::new("a", ""),
            FieldDecl::new("c", "@db-type text"),
        ]);
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(
            fields.iter().map(|f| f.persisted).collect::<Vec<_>>(),
            vec![true, false, true]
        );
    }
}
