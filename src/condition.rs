//! The condition compiler: ordered column/value mappings compiled into
//! WHERE fragments with positionally aligned parameters.
//!
//! A column specifier is a bare column name (implies equality) or a column
//! name followed by one of `=`, `!=`, `<`, `<=`, `>`, `>=`:
//!
//! ```ignore
//! let conds = Conditions::from([("status", Value::from("active")), ("age >", Value::from(18))]);
//! ```
//!
//! Compilation preserves insertion order, so clause `n` always binds
//! parameter `n`.

use crate::error::QbResult;
use crate::ident::Ident;
use crate::value::Value;

/// A comparison operator recognized inside a column specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Cmp {
    /// SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Cmp::Eq => "=",
            Cmp::Ne => "!=",
            Cmp::Lt => "<",
            Cmp::Lte => "<=",
            Cmp::Gt => ">",
            Cmp::Gte => ">=",
        }
    }
}

/// How multiple conditions are combined into one WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    And,
    Or,
}

impl Combine {
    fn joiner(self) -> &'static str {
        match self {
            Combine::And => " AND ",
            Combine::Or => " OR ",
        }
    }
}

/// Split a column specifier into its column part and operator.
///
/// Two-character tokens are tried first so `<` never matches inside `<=`.
/// A bare column name defaults to equality.
fn split_specifier(key: &str) -> (&str, Cmp) {
    const TOKENS: [(&str, Cmp); 6] = [
        ("<=", Cmp::Lte),
        (">=", Cmp::Gte),
        ("!=", Cmp::Ne),
        ("<", Cmp::Lt),
        (">", Cmp::Gt),
        ("=", Cmp::Eq),
    ];
    let trimmed = key.trim();
    for (token, cmp) in TOKENS {
        if let Some(column) = trimmed.strip_suffix(token) {
            return (column.trim_end(), cmp);
        }
    }
    (trimmed, Cmp::Eq)
}

/// An ordered mapping from column specifier to value.
///
/// Order is the order of insertion; it determines both clause order and
/// parameter position.
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    entries: Vec<(String, Value)>,
}

impl Conditions {
    /// Create an empty condition set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    /// Append a condition.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compile into a joined WHERE fragment plus its parameters, numbering
    /// placeholders from `offset + 1`.
    ///
    /// The column remaining after operator stripping must pass identifier
    /// validation, so a stray token inside a key fails fast instead of
    /// reaching the backend.
    pub(crate) fn compile(
        &self,
        combine: Combine,
        offset: usize,
    ) -> QbResult<(String, Vec<Value>)> {
        let mut clauses = Vec::with_capacity(self.entries.len());
        let mut params = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let (column, cmp) = split_specifier(key);
            let column = Ident::parse(column)?;
            params.push(value.clone());
            clauses.push(format!(
                "{} {} ${}",
                column.as_sql(),
                cmp.as_sql(),
                offset + params.len()
            ));
        }
        Ok((clauses.join(combine.joiner()), params))
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Conditions {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An ordered column-to-value mapping for INSERT and UPDATE data.
///
/// Keys are plain column names; no operator detection is applied.
#[derive(Debug, Clone, Default)]
pub struct Assignments {
    entries: Vec<(String, Value)>,
}

impl Assignments {
    /// Create an empty assignment set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an assignment, returning `self` for chaining.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Append an assignment.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((column.into(), value.into()));
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validated column names plus values, in insertion order.
    pub(crate) fn parts(&self) -> QbResult<(Vec<Ident>, Vec<Value>)> {
        let mut columns = Vec::with_capacity(self.entries.len());
        let mut values = Vec::with_capacity(self.entries.len());
        for (column, value) in &self.entries {
            columns.push(Ident::parse(column)?);
            values.push(value.clone());
        }
        Ok((columns, values))
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Assignments {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Assignments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Row filter for UPDATE and DELETE.
///
/// An empty `Conditions` inside `Where` is a usage error; a table-wide
/// mutation requires the explicit `AllRows` marker, so an accidentally
/// empty mapping can never silently touch every row.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Affect only rows matching the conditions (AND-combined).
    Where(Conditions),
    /// Explicitly affect every row in the table.
    AllRows,
}

impl From<Conditions> for Filter {
    fn from(conditions: Conditions) -> Self {
        Filter::Where(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_key_defaults_to_equality() {
        assert_eq!(split_specifier("age"), ("age", Cmp::Eq));
    }

    #[test]
    fn trailing_operator_is_detected() {
        assert_eq!(split_specifier("age >"), ("age", Cmp::Gt));
        assert_eq!(split_specifier("age<="), ("age", Cmp::Lte));
        assert_eq!(split_specifier("age >= "), ("age", Cmp::Gte));
        assert_eq!(split_specifier("name !="), ("name", Cmp::Ne));
        assert_eq!(split_specifier("x ="), ("x", Cmp::Eq));
    }

    #[test]
    fn longest_token_wins() {
        // "<" must not match inside "<="
        assert_eq!(split_specifier("a <="), ("a", Cmp::Lte));
        assert_eq!(split_specifier("a <"), ("a", Cmp::Lt));
    }

    #[test]
    fn compile_keeps_clause_and_param_order() {
        let conds = Conditions::from([("status", Value::from("active")), ("age >", Value::from(18))]);
        let (sql, params) = conds.compile(Combine::And, 0).unwrap();
        assert_eq!(sql, "status = $1 AND age > $2");
        assert_eq!(params, vec![Value::Text("active".into()), Value::Int(18)]);
    }

    #[test]
    fn compile_with_or() {
        let conds = Conditions::from([("a", 1i64), ("b", 2i64)]);
        let (sql, _) = conds.compile(Combine::Or, 0).unwrap();
        assert_eq!(sql, "a = $1 OR b = $2");
    }

    #[test]
    fn compile_respects_offset() {
        let conds = Conditions::new().with("id", 1i64);
        let (sql, _) = conds.compile(Combine::And, 2).unwrap();
        assert_eq!(sql, "id = $3");
    }

    #[test]
    fn compile_empty_is_empty() {
        let (sql, params) = Conditions::new().compile(Combine::And, 0).unwrap();
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn placeholder_count_matches_param_count() {
        let conds = Conditions::from([("a", 1i64), ("b >", 2i64), ("c <=", 3i64)]);
        let (sql, params) = conds.compile(Combine::And, 0).unwrap();
        assert_eq!(sql.matches('$').count(), params.len());
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn stray_token_in_key_is_rejected() {
        // "LIKE" is not a recognized operator, so it stays in the column
        // part and identifier validation rejects it.
        let conds = Conditions::new().with("name LIKE", "bob");
        assert!(conds.compile(Combine::And, 0).unwrap_err().is_usage());
    }

    #[test]
    fn injection_in_key_is_rejected() {
        let conds = Conditions::new().with("id; DROP TABLE users; --", 1i64);
        assert!(conds.compile(Combine::And, 0).unwrap_err().is_usage());
    }

    #[test]
    fn assignments_parts_in_order() {
        let data = Assignments::from([("name", Value::from("a")), ("age", Value::from(5))]);
        let (columns, values) = data.parts().unwrap();
        assert_eq!(columns[0].as_sql(), "name");
        assert_eq!(columns[1].as_sql(), "age");
        assert_eq!(values, vec![Value::Text("a".into()), Value::Int(5)]);
    }

    #[test]
    fn assignment_keys_get_no_operator_parsing() {
        let data = Assignments::new().with("age >", 5i64);
        assert!(data.parts().unwrap_err().is_usage());
    }
}
