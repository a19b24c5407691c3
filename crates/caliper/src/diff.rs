//! Drift detection: compare declared columns against a live table.
//!
//! Columns are matched by name and compared with [`compare`], i.e. by their
//! canonical DDL fragment. The result lists what differs and can render each
//! difference as an `ALTER TABLE` statement; deciding what to apply, and in
//! what order, is up to the caller.
//!
//! ```text
//! user:
//!   + email: varchar(127) null
//!   ~ name: varchar(64) null -> varchar(127) null
//!   - legacy_flag
//! ```

use caliper_schema::{ColumnSpec, LiveColumn, Schema, compare};
use caliper_sql::quote_ident;
use indexmap::IndexMap;
use std::fmt;

/// Differences between one declared table and its live counterpart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDiff {
    /// Table name.
    pub table: String,
    /// List of changes, in declaration order, drops last.
    pub changes: Vec<Change>,
}

impl SchemaDiff {
    /// Returns true if there are no differences.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Generate one statement per change.
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();
        for change in &self.changes {
            sql.push_str(&change.to_sql(&self.table));
            sql.push('\n');
        }
        sql
    }
}

impl fmt::Display for SchemaDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.table)?;
        for change in &self.changes {
            writeln!(f, "  {}", change)?;
        }
        Ok(())
    }
}

/// A single column difference.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Declared but missing from the live table.
    AddColumn { name: String, spec: ColumnSpec },
    /// Present on both sides with different canonical renders.
    AlterColumn {
        name: String,
        from: ColumnSpec,
        to: ColumnSpec,
    },
    /// Present in the live table but not declared.
    DropColumn(String),
}

impl Change {
    /// Generate SQL statement for this change. Text defaults are quoted.
    pub fn to_sql(&self, table_name: &str) -> String {
        let table = quote_ident(table_name);
        match self {
            Change::AddColumn { name, spec } => format!(
                "ALTER TABLE {} ADD COLUMN {} {};",
                table,
                quote_ident(name),
                spec.render_ddl()
            ),
            Change::AlterColumn { name, to, .. } => format!(
                "ALTER TABLE {} MODIFY COLUMN {} {};",
                table,
                quote_ident(name),
                to.render_ddl()
            ),
            Change::DropColumn(name) => {
                format!("ALTER TABLE {} DROP COLUMN {};", table, quote_ident(name))
            }
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::AddColumn { name, spec } => write!(f, "+ {}: {}", name, spec),
            Change::AlterColumn { name, from, to } => write!(f, "~ {}: {} -> {}", name, from, to),
            Change::DropColumn(name) => write!(f, "- {}", name),
        }
    }
}

/// Diff declared columns against live ones for `table`.
pub fn diff_columns(
    table: &str,
    declared: &IndexMap<String, ColumnSpec>,
    live: &IndexMap<String, ColumnSpec>,
) -> SchemaDiff {
    let mut changes = Vec::new();

    for (name, spec) in declared {
        match live.get(name) {
            None => changes.push(Change::AddColumn {
                name: name.clone(),
                spec: spec.clone(),
            }),
            Some(current) if !compare(spec, current) => changes.push(Change::AlterColumn {
                name: name.clone(),
                from: current.clone(),
                to: spec.clone(),
            }),
            Some(_) => {}
        }
    }

    for name in live.keys() {
        if !declared.contains_key(name) {
            changes.push(Change::DropColumn(name.clone()));
        }
    }

    if !changes.is_empty() {
        tracing::debug!(table, changes = changes.len(), "column drift detected");
    }

    SchemaDiff {
        table: table.to_string(),
        changes,
    }
}

/// Turn introspection rows into live column specs keyed by column name.
pub fn live_columns<I, K>(rows: I) -> IndexMap<String, ColumnSpec>
where
    I: IntoIterator<Item = (K, LiveColumn)>,
    K: Into<String>,
{
    rows.into_iter()
        .map(|(name, row)| (name.into(), ColumnSpec::from_live_column(&row)))
        .collect()
}

/// Extension trait for Schema to diff against a live table.
pub trait SchemaDrift {
    /// Compare the declared columns with `live`, keyed by column name.
    fn diff_live(&self, live: &IndexMap<String, ColumnSpec>) -> SchemaDiff;
}

impl SchemaDrift for Schema {
    fn diff_live(&self, live: &IndexMap<String, ColumnSpec>) -> SchemaDiff {
        diff_columns(&self.table_name, &self.columns, live)
    }
}
