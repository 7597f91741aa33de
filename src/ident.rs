//! Safe SQL identifier handling.
//!
//! Table and column names cannot be bound as statement parameters, so they are
//! validated against an allow-list before being spliced into SQL text:
//! each dot-separated part must match `[A-Za-z_][A-Za-z0-9_$]*`.

use crate::error::{QbError, QbResult};

/// A validated SQL identifier (column or table name, optionally schema-qualified).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident(String);

impl Ident {
    /// Validate an identifier string, supporting dotted notation (`schema.table`).
    pub fn parse(s: &str) -> QbResult<Self> {
        if s.is_empty() {
            return Err(QbError::usage("Identifier cannot be empty"));
        }
        for part in s.split('.') {
            validate_part(part)?;
        }
        Ok(Self(s.to_string()))
    }

    /// Render the identifier as SQL.
    pub fn as_sql(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_part(part: &str) -> QbResult<()> {
    let mut chars = part.chars();
    match chars.next() {
        None => return Err(QbError::usage("Empty identifier segment")),
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        Some(c) => {
            return Err(QbError::usage(format!(
                "Invalid identifier start character: '{c}'"
            )));
        }
    }
    for c in chars {
        if c != '_' && c != '$' && !c.is_ascii_alphanumeric() {
            return Err(QbError::usage(format!(
                "Invalid character in identifier: '{c}'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("users").unwrap();
        assert_eq!(ident.as_sql(), "users");
    }

    #[test]
    fn ident_dotted() {
        let ident = Ident::parse("public.users").unwrap();
        assert_eq!(ident.as_sql(), "public.users");
    }

    #[test]
    fn ident_with_dollar() {
        let ident = Ident::parse("my_var$1").unwrap();
        assert_eq!(ident.as_sql(), "my_var$1");
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::parse("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(Ident::parse("1table").is_err());
    }

    #[test]
    fn ident_rejects_space() {
        assert!(Ident::parse("my table").is_err());
    }

    #[test]
    fn ident_rejects_double_dot() {
        assert!(Ident::parse("schema..table").is_err());
    }

    #[test]
    fn ident_rejects_quote() {
        assert!(Ident::parse("users\"; DROP TABLE users; --").is_err());
    }

    #[test]
    fn ident_rejects_semicolon() {
        assert!(Ident::parse("users;").is_err());
    }
}
