// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component F: the database-backed job source. Speaks to whichever of
//! Postgres/MySQL/MSSQL/Oracle/SQLite `sqlx`'s `Any` driver is pointed at,
//! with [`crate::dialect::Dialect`] only changing the bind-placeholder
//! style and [`crate::where_builder`] building the filter suffix.

use std::sync::Once;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::any::{AnyPool, AnyPoolOptions, AnyRow};
use sqlx::Row;

use crate::dialect::Dialect;
use crate::error::DbError;
use crate::where_builder::{build_where, QueryParams};

/// Default jobs table name, matching the scheduler's own schema convention.
pub const DEFAULT_TABLE: &str = "sched_jobs";

const SELECT_COLUMNS: &str =
    "id, name, expression, execute, directory, arguments, environments, kill_after_interval, created_at, updated_at";

/// A raw row from the jobs table, not yet normalised into a [`shed_core::Job`].
#[derive(Debug, Clone)]
pub struct DbJobRow {
    pub id: i64,
    pub name: String,
    pub expression: String,
    pub execute: String,
    pub directory: Option<String>,
    pub arguments: Option<String>,
    pub environments: Option<String>,
    pub timeout: Option<Duration>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The `(id, updated_at)` pair the reconciliation loop diffs snapshots on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTuple {
    pub id: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

static INSTALL_DRIVERS: Once = Once::new();

#[derive(Debug, Clone)]
pub struct DbBackend {
    pool: AnyPool,
    dialect: Dialect,
    table: String,
}

impl DbBackend {
    /// Open a fresh pool against `url`, classifying the dialect from
    /// `driver` (the daemon's `--db_driver` flag).
    pub async fn connect(url: &str, driver: &str, table: impl Into<String>) -> Result<Self, DbError> {
        INSTALL_DRIVERS.call_once(|| {
            sqlx::any::install_default_drivers();
        });
        let pool = AnyPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(DbError::Connect)?;
        let table = table.into();
        tracing::info!(driver, table = %table, "db pool opened");
        Ok(Self::from_pool(pool, driver, table))
    }

    /// Wrap an already-open pool, e.g. one shared with another subsystem
    /// or an in-memory test database.
    pub fn from_pool(pool: AnyPool, driver: &str, table: impl Into<String>) -> Self {
        Self {
            pool,
            dialect: Dialect::from_driver(driver),
            table: table.into(),
        }
    }

    /// Select every row matching `params` (or every row, if `None`).
    pub async fn where_jobs(&self, params: Option<&QueryParams>) -> Result<Vec<DbJobRow>, DbError> {
        let (suffix, binds) = match params {
            Some(p) => build_where(self.dialect, p)?,
            None => (String::new(), Vec::new()),
        };
        let sql = format!("SELECT {SELECT_COLUMNS} FROM {}{suffix}", self.table);
        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = bind_json(query, bind);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(DbError::Query)?;
        rows.iter().map(row_to_job).collect()
    }

    /// Look up a single job row by primary key.
    pub async fn find(&self, id: i64) -> Result<Option<DbJobRow>, DbError> {
        let placeholder = self.dialect.placeholder(1);
        let sql = format!("SELECT {SELECT_COLUMNS} FROM {} WHERE id = {placeholder}", self.table);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::Query)?;
        row.as_ref().map(row_to_job).transpose()
    }

    /// Select the lightweight `(id, updated_at)` version tuples the
    /// reconciliation loop diffs against its last-seen snapshot.
    pub async fn snapshot(&self, params: Option<&QueryParams>) -> Result<Vec<VersionTuple>, DbError> {
        let (suffix, binds) = match params {
            Some(p) => build_where(self.dialect, p)?,
            None => (String::new(), Vec::new()),
        };
        let sql = format!("SELECT id, updated_at FROM {}{suffix}", self.table);
        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = bind_json(query, bind);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(DbError::Query)?;
        rows.iter()
            .map(|row| {
                Ok(VersionTuple {
                    id: row.try_get::<i64, _>("id").map_err(|e| DbError::Decode(e.to_string()))?,
                    updated_at: row
                        .try_get::<Option<DateTime<Utc>>, _>("updated_at")
                        .map_err(|e| DbError::Decode(e.to_string()))?,
                })
            })
            .collect()
    }
}

fn row_to_job(row: &AnyRow) -> Result<DbJobRow, DbError> {
    let decode = |e: sqlx::Error| DbError::Decode(e.to_string());
    Ok(DbJobRow {
        id: row.try_get("id").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        expression: row.try_get("expression").map_err(decode)?,
        execute: row.try_get("execute").map_err(decode)?,
        directory: row.try_get("directory").map_err(decode)?,
        arguments: row.try_get("arguments").map_err(decode)?,
        environments: row.try_get("environments").map_err(decode)?,
        timeout: row
            .try_get::<Option<i64>, _>("kill_after_interval")
            .map_err(decode)?
            .map(|secs| Duration::from_secs(secs.max(0) as u64)),
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}

type AnyQuery<'q> = sqlx::query::Query<'q, sqlx::Any, <sqlx::Any as sqlx::Database>::Arguments<'q>>;

/// Bind a loosely-typed JSON filter value onto an `Any` query in the type
/// the column comparison actually needs.
fn bind_json<'q>(query: AnyQuery<'q>, value: &'q Value) -> AnyQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else if let Some(f) = n.as_f64() {
                query.bind(f)
            } else {
                query.bind(n.to_string())
            }
        }
        Value::String(s) => query.bind(s.as_str()),
        other => query.bind(other.to_string()),
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
