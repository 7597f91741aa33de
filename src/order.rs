//! ORDER BY clause types.

use crate::error::{QbError, QbResult};
use crate::ident::Ident;

/// Sort direction. Input is case-insensitive; SQL output is uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Parse a direction string (`"asc"` / `"DESC"` / ...).
    pub fn parse(s: &str) -> QbResult<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Direction::Desc)
        } else {
            Err(QbError::usage(format!(
                "Invalid sort direction '{s}' (expected ASC or DESC)"
            )))
        }
    }

    /// SQL spelling of the direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// An ORDER BY clause: one column plus a direction.
#[derive(Debug, Clone)]
pub struct OrderBy {
    column: String,
    direction: Direction,
}

impl OrderBy {
    /// Order by `column` in the given direction.
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Order by `column` ascending.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Asc)
    }

    /// Order by `column` descending.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Desc)
    }

    /// Render as SQL, validating the column identifier.
    pub(crate) fn to_sql(&self) -> QbResult<String> {
        let column = Ident::parse(&self.column)?;
        Ok(format!("{} {}", column.as_sql(), self.direction.as_sql()))
    }
}
