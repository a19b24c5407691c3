//! Column specs: normalization, rendering and comparison.
//!
//! A [`ColumnSpec`] is reached from two directions:
//!
//! - [`ColumnSpec::from_declaration`] applies the type-normalization matrix to
//!   a [`ColumnDescriptor`] built from a model's annotations (desired state);
//! - [`ColumnSpec::from_live_column`] copies the attributes of an introspected
//!   column as they are (actual state).
//!
//! Both end up in the same canonical form, so drift is detected by comparing
//! rendered DDL fragments with [`compare`].

use caliper_sql::{Escape, MySqlEscaper, quote_literal};
use std::fmt;

/// Default clause forced onto every declared `timestamp` column.
///
/// The leading space and the casing are part of the dialect's expected text.
pub const TIMESTAMP_DEFAULT: &str = " CURRENT_TIMESTAMP on update CURRENT_TIMESTAMP";

/// Dialect types that pass through the matrix without a warning.
const PASSTHROUGH_TYPES: &[&str] = &[
    "binary",
    "blob",
    "datetime",
    "decimal",
    "double",
    "enum",
    "float",
    "json",
    "geometry",
    "geometrycollection",
    "linestring",
    "longblob",
    "mediumblob",
    "multilinestring",
    "multipoint",
    "multipolygon",
    "point",
    "polygon",
    "set",
    "time",
    "tinyblob",
    "varbinary",
    "year",
];

/// Split a declared type into its base name and a `(...)` qualifier.
///
/// `decimal(10,2)` is `("decimal", Some("(10,2)"))`.
fn split_qualifier(ty: &str) -> (&str, Option<&str>) {
    let ty = ty.trim();
    match ty.find('(') {
        Some(open) => (ty[..open].trim_end(), Some(&ty[open..])),
        None => (ty, None),
    }
}

/// A default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Int(i64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    /// Blank values are not rendered as a default clause.
    ///
    /// Empty text and `false` are blank; the integer zero is not.
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Int(_) => false,
            Scalar::Text(text) => text.is_empty(),
            Scalar::Bool(b) => !b,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Text(text) => write!(f, "{}", text),
            Scalar::Bool(true) => write!(f, "1"),
            Scalar::Bool(false) => write!(f, "0"),
        }
    }
}

/// Display width class of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    Tiny,
    Small,
    Medium,
    Big,
    Regular,
}

impl IntWidth {
    /// Length used when the declaration does not set one.
    pub fn default_length(self) -> u32 {
        match self {
            IntWidth::Tiny => 4,
            IntWidth::Small => 6,
            IntWidth::Medium => 9,
            IntWidth::Big => 20,
            IntWidth::Regular => 11,
        }
    }
}

/// The rows of the normalization matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeClass {
    /// `*int`
    Integer(IntWidth),
    /// `*text`
    Text,
    /// `bool`, stored as `tinyint(1)`
    Bool,
    Date,
    Timestamp,
    /// `varchar` and `char`
    Char,
    /// Anything else, passed through unchanged.
    Other(String),
}

impl TypeClass {
    /// Classify a declared type by its base name (case-insensitive).
    ///
    /// A `(...)` qualifier does not change the class: `varchar(64)` is
    /// [`TypeClass::Char`].
    pub fn parse(ty: &str) -> Self {
        let (base, _) = split_qualifier(ty);
        match base.to_ascii_lowercase().as_str() {
            "tinyint" => TypeClass::Integer(IntWidth::Tiny),
            "smallint" => TypeClass::Integer(IntWidth::Small),
            "mediumint" => TypeClass::Integer(IntWidth::Medium),
            "bigint" => TypeClass::Integer(IntWidth::Big),
            "int" | "integer" => TypeClass::Integer(IntWidth::Regular),
            "text" | "tinytext" | "mediumtext" | "longtext" => TypeClass::Text,
            "bool" | "boolean" => TypeClass::Bool,
            "date" => TypeClass::Date,
            "timestamp" => TypeClass::Timestamp,
            "varchar" | "char" => TypeClass::Char,
            _ => TypeClass::Other(ty.trim().to_string()),
        }
    }

    /// False for pass-through types the dialect does not know either.
    pub fn is_recognized(&self) -> bool {
        match self {
            TypeClass::Other(ty) => {
                let (base, _) = split_qualifier(ty);
                PASSTHROUGH_TYPES.contains(&base.to_ascii_lowercase().as_str())
            }
            _ => true,
        }
    }
}

/// A declarative column description, as read from `db-*` annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub ty: String,
    /// `0` means unset.
    pub length: u32,
    /// Empty means unset.
    pub default: String,
    pub unsigned: bool,
    pub null: bool,
    pub extra: String,
}

impl ColumnDescriptor {
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            ..Self::default()
        }
    }

    pub fn type_class(&self) -> TypeClass {
        TypeClass::parse(&self.ty)
    }
}

impl Default for ColumnDescriptor {
    fn default() -> Self {
        Self {
            ty: "int".to_string(),
            length: 0,
            default: String::new(),
            unsigned: false,
            null: false,
            extra: String::new(),
        }
    }
}

/// One row of live schema introspection (`SHOW COLUMNS` / `information_schema`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveColumn {
    /// Full type string, qualifiers included (`int(11) unsigned`).
    pub column_type: String,
    /// `"YES"` or `"NO"`.
    pub is_nullable: String,
    pub default: Option<String>,
    pub extra: String,
}

/// A column in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Type with length and unsigned qualifiers embedded.
    pub ty: String,
    pub nullable: bool,
    pub default: Option<Scalar>,
    pub extra: String,
}

impl ColumnSpec {
    /// Normalize a declarative descriptor.
    ///
    /// A qualifier written into the type itself (`int(10)`, `decimal(10,2)`)
    /// takes the place of the length; no second `(length)` is appended.
    pub fn from_declaration(desc: &ColumnDescriptor) -> Self {
        let class = desc.type_class();
        let (base, qualifier) = split_qualifier(&desc.ty);
        let mut ty = base.to_ascii_lowercase();
        let mut qualifier = qualifier.map(str::to_string);
        let mut length = desc.length;
        let mut nullable = desc.null;
        let mut unsigned = false;
        let mut default = if desc.default.is_empty() {
            None
        } else {
            Some(Scalar::Text(desc.default.clone()))
        };

        match &class {
            TypeClass::Integer(width) => {
                if length == 0 {
                    length = width.default_length();
                }
                unsigned = desc.unsigned;
                default = coerce_int(&desc.default).map(Scalar::Int);
                // a nullable integer must not pick up an implicit zero default
                if nullable && default == Some(Scalar::Int(0)) {
                    default = None;
                }
            }
            TypeClass::Text => {
                qualifier = None;
                length = 0;
                nullable = true;
                default = Some(Scalar::Text(String::new()));
            }
            TypeClass::Bool => {
                ty = "tinyint".to_string();
                qualifier = None;
                length = 1;
                default = coerce_bool(&desc.default).map(Scalar::Int);
            }
            TypeClass::Date => {
                qualifier = None;
                length = 0;
            }
            TypeClass::Timestamp => default = Some(Scalar::Text(TIMESTAMP_DEFAULT.to_string())),
            TypeClass::Char => {
                if length == 0 {
                    length = 127;
                }
                nullable = true;
            }
            TypeClass::Other(name) => {
                ty = name.clone();
                qualifier = None;
                if split_qualifier(name).1.is_some() {
                    length = 0;
                }
            }
        }

        match qualifier {
            Some(qualifier) => ty.push_str(&qualifier),
            None if length != 0 => ty = format!("{}({})", ty, length),
            None => {}
        }
        if unsigned {
            ty.push_str(" unsigned");
        }

        Self {
            ty,
            nullable,
            default,
            extra: desc.extra.clone(),
        }
    }

    /// Copy an introspected column; no normalization is applied.
    pub fn from_live_column(row: &LiveColumn) -> Self {
        Self {
            ty: row.column_type.clone(),
            nullable: row.is_nullable.trim().eq_ignore_ascii_case("YES"),
            default: row.default.clone().map(Scalar::Text),
            extra: row.extra.clone(),
        }
    }

    pub fn null_clause(&self) -> &'static str {
        if self.nullable { "null" } else { "NOT null" }
    }

    /// Canonical DDL fragment, escaping the default with the dialect's escaper.
    pub fn render(&self) -> String {
        self.render_with(&MySqlEscaper)
    }

    /// Canonical DDL fragment, escaping the default with `escaper`.
    pub fn render_with(&self, escaper: &dyn Escape) -> String {
        self.render_default(|default| escaper.escape(&default.to_string()))
    }

    /// Executable column definition: like [`render`](Self::render), but text
    /// defaults are quoted literals. The timestamp default clause stays bare.
    ///
    /// ```
    /// use caliper_schema::{ColumnDescriptor, ColumnSpec};
    ///
    /// let mut desc = ColumnDescriptor::new("varchar");
    /// desc.default = "draft".to_string();
    /// let spec = ColumnSpec::from_declaration(&desc);
    /// assert_eq!(spec.render(), "varchar(127) null default draft");
    /// assert_eq!(spec.render_ddl(), "varchar(127) null default 'draft'");
    /// ```
    pub fn render_ddl(&self) -> String {
        self.render_default(|default| match default {
            Scalar::Text(text) if text == TIMESTAMP_DEFAULT => text.clone(),
            Scalar::Text(text) => quote_literal(text),
            other => other.to_string(),
        })
    }

    fn render_default(&self, literal: impl Fn(&Scalar) -> String) -> String {
        let mut out = format!("{} {}", self.ty, self.null_clause());
        if let Some(default) = self.default.as_ref().filter(|d| !d.is_blank()) {
            out.push_str(" default ");
            out.push_str(&literal(default));
        }
        if !self.extra.is_empty() {
            out.push(' ');
            out.push_str(&self.extra);
        }
        out
    }

    /// True if both specs render to the same DDL fragment.
    pub fn compare(&self, other: &ColumnSpec) -> bool {
        compare(self, other)
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Equality of canonical renders.
pub fn compare(a: &ColumnSpec, b: &ColumnSpec) -> bool {
    a.render() == b.render()
}

/// Leading-integer coercion: `"12abc"` is 12, `"abc"` is 0. Unset stays unset.
fn coerce_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (negative, digits) = match raw.as_bytes()[0] {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return Some(0);
    }

    let value = match digits.parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    };
    Some(value)
}

fn coerce_bool(raw: &str) -> Option<i64> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(1),
        "false" => Some(0),
        other => coerce_int(other),
    }
}
