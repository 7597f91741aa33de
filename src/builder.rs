//! The query builder: declarative call parameters in, shaped results out.

use crate::auth::{self, AuthResult};
use crate::client::GenericClient;
use crate::condition::{Assignments, Combine, Conditions, Filter};
use crate::error::{QbError, QbResult};
use crate::order::OrderBy;
use crate::row::{ResultSet, Row};
use crate::stmt::{self, Columns};
use crate::value::Value;
use tokio_postgres::types::ToSql;

/// A stateless query builder over an injected client.
///
/// Each call is a pure function of its arguments plus the shared client
/// handle: SQL text and a positional parameter list are assembled, the
/// statement is executed, and the result is shaped for the caller. No state
/// is held between calls beyond the immutable client reference.
pub struct QueryBuilder<'a, C: GenericClient> {
    client: &'a C,
}

impl<'a, C: GenericClient> QueryBuilder<'a, C> {
    /// Create a builder over the given client.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// `SELECT <columns> FROM <table> [WHERE ... AND ...] [ORDER BY ...] [LIMIT n]`
    ///
    /// Condition keys may carry a trailing comparison operator
    /// (`"age >"`); a bare key means equality.
    pub async fn select(
        &self,
        table: &str,
        columns: &Columns,
        conditions: &Conditions,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
    ) -> QbResult<ResultSet> {
        let (sql, params) =
            stmt::build_select(table, columns, conditions, Combine::And, order_by, limit, false)?;
        self.fetch(&sql, &params).await
    }

    /// Like [`select`](Self::select), but conditions are OR-combined.
    ///
    /// Operator detection in condition keys applies here exactly as it does
    /// for `select`; only the combinator differs.
    pub async fn select_or(
        &self,
        table: &str,
        columns: &Columns,
        conditions: &Conditions,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
    ) -> QbResult<ResultSet> {
        let (sql, params) =
            stmt::build_select(table, columns, conditions, Combine::Or, order_by, limit, false)?;
        self.fetch(&sql, &params).await
    }

    /// Insert one row and return the generated `id` column.
    ///
    /// Use [`insert_returning`](Self::insert_returning) when the key column
    /// has another name.
    pub async fn insert(&self, table: &str, data: &Assignments) -> QbResult<i64> {
        self.insert_returning(table, data, "id").await
    }

    /// Insert one row and return the named generated-key column.
    pub async fn insert_returning(
        &self,
        table: &str,
        data: &Assignments,
        key: &str,
    ) -> QbResult<i64> {
        let (sql, params) = stmt::build_insert(table, data, key)?;
        let rows = self.fetch(&sql, &params).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| QbError::decode(key, "INSERT returned no row"))?;
        row.get(key)
            .and_then(Value::as_int)
            .ok_or_else(|| QbError::decode(key, "generated key is not an integer"))
    }

    /// Update matching rows and return the affected-row count.
    ///
    /// A table-wide update requires the explicit [`Filter::AllRows`] marker.
    pub async fn update(
        &self,
        table: &str,
        data: &Assignments,
        filter: &Filter,
    ) -> QbResult<u64> {
        let (sql, params) = stmt::build_update(table, data, filter)?;
        self.run(&sql, &params).await
    }

    /// Delete matching rows and return the affected-row count.
    ///
    /// A table-wide delete requires the explicit [`Filter::AllRows`] marker.
    pub async fn delete(&self, table: &str, filter: &Filter) -> QbResult<u64> {
        let (sql, params) = stmt::build_delete(table, filter)?;
        self.run(&sql, &params).await
    }

    /// Like [`select`](Self::select), but rows come back in random order
    /// (`ORDER BY RANDOM()`, not seedable).
    pub async fn randomly(
        &self,
        table: &str,
        columns: &Columns,
        conditions: &Conditions,
        limit: Option<u64>,
    ) -> QbResult<ResultSet> {
        let (sql, params) =
            stmt::build_select(table, columns, conditions, Combine::And, None, limit, true)?;
        self.fetch(&sql, &params).await
    }

    /// Authenticate a user: select rows where `username` matches, then
    /// verify the password against the stored bcrypt hash in the
    /// `password` column.
    ///
    /// Every failure path — unknown user, wrong password, backend error —
    /// returns the identical failed result, so nothing leaks about which
    /// step failed.
    pub async fn auth(&self, table: &str, username: &str, password: &str) -> AuthResult {
        let conditions = Conditions::new().with("username", username);
        let rows = match self
            .select(table, &Columns::All, &conditions, None, None)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::debug!(error = %e, "auth lookup failed");
                auth::verify_password(password, auth::DUMMY_HASH);
                return AuthResult::failed();
            }
        };

        let verified = match rows.first().and_then(|r| r.get("password")).and_then(Value::as_text) {
            Some(hash) => auth::verify_password(password, hash),
            None => {
                // Same work as the wrong-password path.
                auth::verify_password(password, auth::DUMMY_HASH);
                false
            }
        };

        if verified {
            AuthResult::success(rows)
        } else {
            AuthResult::failed()
        }
    }

    async fn fetch(&self, sql: &str, params: &[Value]) -> QbResult<ResultSet> {
        tracing::debug!(sql, params = params.len(), "executing query");
        let refs = param_refs(params);
        let rows = self.client.query(sql, &refs).await?;
        rows.iter().map(Row::from_pg).collect()
    }

    async fn run(&self, sql: &str, params: &[Value]) -> QbResult<u64> {
        tracing::debug!(sql, params = params.len(), "executing statement");
        let refs = param_refs(params);
        self.client.execute(sql, &refs).await
    }
}

fn param_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}
