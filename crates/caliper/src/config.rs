//! Engine configuration.
//!
//! Only the table-name prefix is configurable. It is read from the
//! environment; parsing configuration files is left to the application.

/// Environment variable holding the table-name prefix.
pub const TABLE_PREFIX_ENV: &str = "CALIPER_TABLE_PREFIX";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Prepended to every derived or registered table name.
    pub table_prefix: String,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let table_prefix = lookup(TABLE_PREFIX_ENV).unwrap_or_default();
        tracing::debug!(table_prefix = %table_prefix, "loaded config");
        Self { table_prefix }
    }
}
