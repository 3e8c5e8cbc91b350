//! Pooled connection access with query tracing.
//!
//! Wraps `deadpool_postgres::Pool` so that every statement the query layer
//! runs goes through a `tracing::debug_span!` recording the SQL text,
//! parameter count, and row count. Connections are acquired per statement
//! and returned to the pool when the guard drops; nothing holds a
//! connection across a user-input pause.

use crate::error::Error;
use std::ops::Deref;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;
use tracing::Instrument;

/// A bounded, traced connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: deadpool_postgres::Pool,
}

impl DbPool {
    pub fn new(pool: deadpool_postgres::Pool) -> Self {
        Self { inner: pool }
    }

    /// Acquire a connection from the pool.
    ///
    /// Pool exhaustion or an unreachable server surfaces as
    /// [`Error::Connection`], which is fatal to the session.
    pub async fn get(&self) -> Result<DbConn, Error> {
        let conn = self.inner.get().await?;
        Ok(DbConn { inner: conn })
    }
}

/// A pooled connection; all queries run inside a tracing span.
pub struct DbConn {
    inner: deadpool_postgres::Object,
}

impl DbConn {
    fn client(&self) -> &tokio_postgres::Client {
        self.inner.deref()
    }

    /// Execute a query, returning all rows.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, tokio_postgres::Error> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = tracing::field::Empty,
        );
        let rows = self
            .client()
            .query(sql, params)
            .instrument(span.clone())
            .await?;
        span.record("rows", rows.len());
        Ok(rows)
    }

    /// Execute a query, returning at most one row.
    pub async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, tokio_postgres::Error> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = tracing::field::Empty,
        );
        let row = self
            .client()
            .query_opt(sql, params)
            .instrument(span.clone())
            .await?;
        span.record("rows", if row.is_some() { 1u64 } else { 0u64 });
        Ok(row)
    }

    /// Execute a query, returning exactly one row.
    pub async fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row, tokio_postgres::Error> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = 1u64,
        );
        self.client().query_one(sql, params).instrument(span).await
    }

    /// Run a sequence of statements with no parameters (DDL, seed data).
    pub async fn batch_execute(&self, sql: &str) -> Result<(), tokio_postgres::Error> {
        let span = tracing::debug_span!("db.batch", statements = sql.matches(';').count());
        self.client().batch_execute(sql).instrument(span).await
    }
}
