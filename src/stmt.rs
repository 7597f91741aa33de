//! Statement assembly: pure functions that turn declarative call parameters
//! into SQL text plus an ordered parameter list.
//!
//! Identifiers (table, columns, order column) are validated against the
//! allow-list and spliced into the text; values are always bound through
//! placeholders. Assembly never talks to the backend, so everything here is
//! testable without a connection.

use crate::condition::{Assignments, Combine, Conditions, Filter};
use crate::error::{QbError, QbResult};
use crate::ident::Ident;
use crate::order::OrderBy;
use crate::value::Value;

/// The projected column set of a SELECT.
#[derive(Debug, Clone)]
pub enum Columns {
    /// `SELECT *`
    All,
    /// An explicit column list; each entry is validated before splicing.
    List(Vec<String>),
}

impl Columns {
    /// Select every column.
    pub fn all() -> Self {
        Columns::All
    }

    /// Select the named columns.
    pub fn list<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Columns::List(columns.into_iter().map(Into::into).collect())
    }

    fn to_sql(&self) -> QbResult<String> {
        match self {
            Columns::All => Ok("*".to_string()),
            Columns::List(columns) => {
                if columns.is_empty() {
                    return Err(QbError::usage("Column list cannot be empty"));
                }
                let rendered: QbResult<Vec<&str>> = columns
                    .iter()
                    .map(|c| Ident::parse(c).map(|_| c.as_str()))
                    .collect();
                Ok(rendered?.join(", "))
            }
        }
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Columns {
    fn from(columns: [S; N]) -> Self {
        Columns::list(columns)
    }
}

/// Assemble a SELECT statement.
///
/// `random` replaces any caller-supplied ordering with `ORDER BY RANDOM()`;
/// LIMIT applies either way, with or without an ORDER BY.
pub(crate) fn build_select(
    table: &str,
    columns: &Columns,
    conditions: &Conditions,
    combine: Combine,
    order_by: Option<&OrderBy>,
    limit: Option<u64>,
    random: bool,
) -> QbResult<(String, Vec<Value>)> {
    let table = Ident::parse(table)?;
    let mut sql = format!("SELECT {} FROM {}", columns.to_sql()?, table.as_sql());

    let (where_sql, params) = conditions.compile(combine, 0)?;
    if !where_sql.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&where_sql);
    }

    if random {
        sql.push_str(" ORDER BY RANDOM()");
    } else if let Some(order) = order_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.to_sql()?);
    }

    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {n}"));
    }

    Ok((sql, params))
}

/// Assemble an INSERT statement returning the generated key column.
pub(crate) fn build_insert(
    table: &str,
    data: &Assignments,
    key: &str,
) -> QbResult<(String, Vec<Value>)> {
    if data.is_empty() {
        return Err(QbError::usage("INSERT requires at least one column"));
    }
    let table = Ident::parse(table)?;
    let key = Ident::parse(key)?;
    let (columns, params) = data.parts()?;

    let column_list: Vec<&str> = columns.iter().map(Ident::as_sql).collect();
    let placeholders: Vec<String> = (1..=params.len()).map(|i| format!("${i}")).collect();

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table.as_sql(),
        column_list.join(", "),
        placeholders.join(", "),
        key.as_sql()
    );
    Ok((sql, params))
}

/// Assemble an UPDATE statement. SET parameters precede WHERE parameters.
pub(crate) fn build_update(
    table: &str,
    data: &Assignments,
    filter: &Filter,
) -> QbResult<(String, Vec<Value>)> {
    if data.is_empty() {
        return Err(QbError::usage("UPDATE requires at least one SET column"));
    }
    let table = Ident::parse(table)?;
    let (columns, mut params) = data.parts()?;

    let set_parts: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column.as_sql(), i + 1))
        .collect();

    let mut sql = format!("UPDATE {} SET {}", table.as_sql(), set_parts.join(", "));
    append_filter(&mut sql, &mut params, filter, "UPDATE")?;
    Ok((sql, params))
}

/// Assemble a DELETE statement.
pub(crate) fn build_delete(table: &str, filter: &Filter) -> QbResult<(String, Vec<Value>)> {
    let table = Ident::parse(table)?;
    let mut sql = format!("DELETE FROM {}", table.as_sql());
    let mut params = Vec::new();
    append_filter(&mut sql, &mut params, filter, "DELETE")?;
    Ok((sql, params))
}

fn append_filter(
    sql: &mut String,
    params: &mut Vec<Value>,
    filter: &Filter,
    verb: &str,
) -> QbResult<()> {
    match filter {
        Filter::AllRows => Ok(()),
        Filter::Where(conditions) => {
            if conditions.is_empty() {
                return Err(QbError::usage(format!(
                    "{verb} with empty conditions would affect every row; \
                     pass Filter::AllRows to do that explicitly"
                )));
            }
            let (where_sql, where_params) = conditions.compile(Combine::And, params.len())?;
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            params.extend(where_params);
            Ok(())
        }
    }
}
