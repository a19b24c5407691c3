//! DDL generation for built schemas.
//!
//! ## Example
//!
//! ```
//! use caliper::{FieldDecl, SchemaBuilder, SchemaCodegen};
//!
//! let fields = [
//!     FieldDecl::new("id", "@db-type int\n@db-extra auto_increment"),
//!     FieldDecl::new("name", "@db-type varchar"),
//! ];
//! let schema = SchemaBuilder::new("Model_User", &fields).build().unwrap();
//!
//! assert_eq!(
//!     schema.to_sql(),
//!     "CREATE TABLE `user` (\n    `id` int(11) NOT null auto_increment,\n    `name` varchar(127) null\n);"
//! );
//! ```

pub use caliper_schema::{ColumnSpec, Schema};

use caliper_sql::quote_ident;

/// Extension trait for Schema to add SQL generation.
pub trait SchemaCodegen {
    /// Generate the `CREATE TABLE` statement for the declared columns.
    fn to_sql(&self) -> String;
}

impl SchemaCodegen for Schema {
    fn to_sql(&self) -> String {
        create_table_sql(self)
    }
}

/// Generate CREATE TABLE SQL statement.
///
/// Columns whose metadata failed to parse are not part of `schema.columns`
/// and are therefore left out.
pub fn create_table_sql(schema: &Schema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", quote_ident(&schema.table_name));

    let parts: Vec<String> = schema
        .columns
        .iter()
        .map(|(name, spec)| column_definition_sql(name, spec))
        .collect();

    sql.push_str(&parts.join(",\n"));
    sql.push_str("\n);");

    sql
}

/// One column line of a `CREATE TABLE` body. Text defaults are quoted.
pub fn column_definition_sql(name: &str, spec: &ColumnSpec) -> String {
    format!("    {} {}", quote_ident(name), spec.render_ddl())
}

#[cfg(test)]
mod tests {
    use super::*;
    use caliper_schema::{FieldDecl, SchemaBuilder};

    #[test]
    fn test_create_table_sql() {
        let fields = [
            FieldDecl::new("id", "@db-type int\n@db-unsigned\n@db-extra auto_increment"),
            FieldDecl::new("title", "@db-type varchar\n@db-length 200"),
            FieldDecl::new("body", "@db-type text"),
            FieldDecl::new("published", "@db-type bool\n@db-default 0"),
            FieldDecl::new("created", "@db-type timestamp"),
            FieldDecl::new("preview", "@validate empty"),
        ];
        let schema = SchemaBuilder::new("Model_Post", &fields)
            .table_prefix("blog_")
            .build()
            .unwrap();

        insta::assert_snapshot!(schema.to_sql(), @r"
        CREATE TABLE `blog_post` (
            `id` int(11) unsigned NOT null auto_increment,
            `title` varchar(200) null,
            `body` text null,
            `published` tinyint(1) NOT null default 0,
            `created` timestamp NOT null default  CURRENT_TIMESTAMP on update CURRENT_TIMESTAMP
        );
        ");
    }

    #[test]
    fn test_create_table_quotes_text_defaults() {
        let fields = [
            FieldDecl::new("status", "@db-type varchar\n@db-default draft mode"),
            FieldDecl::new("note", "@db-type char(20)\n@db-default it's"),
            FieldDecl::new("hits", "@db-type int\n@db-default 3"),
        ];
        let schema = SchemaBuilder::new("Model_Entry", &fields).build().unwrap();

        insta::assert_snapshot!(schema.to_sql(), @r"
        CREATE TABLE `entry` (
            `status` varchar(127) null default 'draft mode',
            `note` char(20) null default 'it\'s',
            `hits` int(11) NOT null default 3
        );
        ");
    }

    #[test]
    fn test_column_definition_sql() {
        let fields = [FieldDecl::new("order", "@db-type smallint")];
        let schema = SchemaBuilder::new("Model_Line", &fields).build().unwrap();
        assert_eq!(
            column_definition_sql("order", &schema.columns["order"]),
            "    `order` smallint(6) NOT null"
        );
    }
}
