//! Dialect helpers for rendering DDL.
//!
//! caliper targets exactly one DDL dialect (MySQL-style column definitions:
//! `int(11) unsigned`, `auto_increment`, backtick-quoted identifiers). This
//! crate holds the two pieces of that dialect the renderer needs: escaping of
//! default literals and quoting of identifiers.

use std::fmt;

/// Escapes a value before it is embedded in rendered DDL.
///
/// Implementations escape characters only; they do not add surrounding
/// quotes. Any `Fn(&str) -> String` is an escaper too, so callers can plug in
/// the escaping routine of their own database client.
pub trait Escape {
    fn escape(&self, value: &str) -> String;
}

impl<F> Escape for F
where
    F: Fn(&str) -> String,
{
    fn escape(&self, value: &str) -> String {
        self(value)
    }
}

/// The dialect's own escaper: backslash escaping of the characters a MySQL
/// client's real-escape-string routine escapes (`\0`, `\n`, `\r`, `\\`, `'`,
/// `"` and `\x1a`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlEscaper;

impl Escape for MySqlEscaper {
    fn escape(&self, value: &str) -> String {
        format!("{}", Lit(value))
    }
}

/// A literal value wrapper.
///
/// Display writes the value with the dialect's special characters
/// backslash-escaped. No quotes are added.
///
/// # Example
/// ```
/// use caliper_sql::Lit;
/// assert_eq!(format!("{}", Lit("foo")), "foo");
/// assert_eq!(format!("{}", Lit("it's")), "it\\'s");
/// ```
pub struct Lit<T: AsRef<str>>(pub T);

impl<T: AsRef<str>> fmt::Display for Lit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.as_ref().chars() {
            match c {
                '\0' => write!(f, "\\0")?,
                '\'' => write!(f, "\\'")?,
                '"' => write!(f, "\\\"")?,
                '\n' => write!(f, "\\n")?,
                '\r' => write!(f, "\\r")?,
                '\x1a' => write!(f, "\\Z")?,
                '\\' => write!(f, "\\\\")?,
                c => write!(f, "{}", c)?,
            }
        }
        Ok(())
    }
}

/// An identifier wrapper.
///
/// Display writes the value quoted with backticks, doubling embedded backticks.
///
/// # Example
/// ```
/// use caliper_sql::Ident;
/// assert_eq!(format!("{}", Ident("user")), "`user`");
/// assert_eq!(format!("{}", Ident("bla`h")), "`bla``h`");
/// ```
pub struct Ident<T: AsRef<str>>(pub T);

impl<T: AsRef<str>> fmt::Display for Ident<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`")?;
        for c in self.0.as_ref().chars() {
            if c == '`' {
                write!(f, "``")?;
            } else {
                write!(f, "{}", c)?;
            }
        }
        write!(f, "`")
    }
}

/// Escape a literal with the dialect's escaper.
pub fn escape_string(s: &str) -> String {
    MySqlEscaper.escape(s)
}

/// Escape a literal and wrap it in single quotes, ready to run as SQL.
///
/// # Example
/// ```
/// use caliper_sql::quote_literal;
/// assert_eq!(quote_literal("it's"), "'it\\'s'");
/// ```
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", Lit(s))
}

/// Quote an identifier.
///
/// Always quotes, so reserved words like `order`, `group` or `key` are safe
/// as table and column names.
pub fn quote_ident(name: &str) -> String {
    format!("{}", Ident(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_text_is_unchanged() {
        assert_eq!(escape_string("hello world"), "hello world");
        assert_eq!(escape_string("0"), "0");
        assert_eq!(escape_string(""), "");
    }

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape_string("it's"), "it\\'s");
        assert_eq!(escape_string("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_string("a\\b"), "a\\\\b");
        assert_eq!(escape_string("line\nbreak"), "line\\nbreak");
        assert_eq!(escape_string("nul\0"), "nul\\0");
        assert_eq!(escape_string("ctrl\x1az"), "ctrl\\Zz");
    }

    #[test]
    fn test_escape_leaves_tab_and_backspace() {
        assert_eq!(escape_string("a\tb"), "a\tb");
        assert_eq!(escape_string("a\x08b"), "a\x08b");
    }

    #[test]
    fn test_quote_literal() {
        insta::assert_snapshot!(quote_literal("draft mode"), @"'draft mode'");
        insta::assert_snapshot!(quote_literal("it's"), @r"'it\'s'");
    }

    #[test]
    fn test_closure_escaper() {
        let upper = |s: &str| s.to_uppercase();
        assert_eq!(upper.escape("abc"), "ABC");
    }

    #[test]
    fn test_quote_ident() {
        insta::assert_snapshot!(quote_ident("user"), @"`user`");
        insta::assert_snapshot!(quote_ident("we`ird"), @"`we``ird`");
    }
}
