// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component F's WHERE-clause builder: turns a typed filter list into the
//! `WHERE ... GROUP BY ... HAVING ... ORDER BY ... LIMIT ... OFFSET ...`
//! suffix for a `SELECT` against the jobs table, with dialect-appropriate
//! bind placeholders.
//!
//! `limit`/`offset` are kept as the raw strings a config file or CLI flag
//! would supply, not already-parsed integers, so a malformed value reports
//! the same "not a number" error a hand-written config would trigger rather
//! than failing at a distant deserialization site.

use serde_json::Value;

/// A single column comparison. `Eq` binds a value; `IsNull`/`IsNotNull`
/// don't (`= NULL` never matches in SQL, so these get their own syntax).
#[derive(Debug, Clone)]
pub enum Filter {
    Eq(Value),
    IsNull,
    IsNotNull,
}

/// The query shape the DB loader supports: a column filter list plus the
/// optional grouping/ordering/paging clauses.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    filters: Vec<(String, Filter)>,
    pub group_by: Option<String>,
    pub having: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, column: impl Into<String>, value: Value) -> Self {
        self.filters.push((column.into(), Filter::Eq(value)));
        self
    }

    pub fn filter_null(mut self, column: impl Into<String>) -> Self {
        self.filters.push((column.into(), Filter::IsNull));
        self
    }

    pub fn filter_not_null(mut self, column: impl Into<String>) -> Self {
        self.filters.push((column.into(), Filter::IsNotNull));
        self
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WhereError {
    #[error("groupBy is empty.")]
    GroupByEmpty,
    #[error("having is empty.")]
    HavingEmpty,
    #[error("order is empty.")]
    OrderEmpty,
    #[error("limit is not a number, actual value is '{0}'")]
    LimitNotNumber(String),
    #[error("limit must is geater zero, actual value is '{0}'")]
    LimitNotPositive(String),
    #[error("offset is not a number, actual value is '{0}'")]
    OffsetNotNumber(String),
    #[error("offset must is geater(or equals) zero, actual value is '{0}'")]
    OffsetNegative(String),
}

use crate::dialect::Dialect;

/// Build the SQL suffix (everything after the table name) and its ordered
/// bind values for `params` under `dialect`.
pub fn build_where(dialect: Dialect, params: &QueryParams) -> Result<(String, Vec<Value>), WhereError> {
    let mut sql = String::new();
    let mut binds = Vec::new();
    let mut placeholder_n = 1;

    if !params.filters.is_empty() {
        sql.push_str(" WHERE ");
        for (i, (column, filter)) in params.filters.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            match filter {
                Filter::Eq(value) => {
                    sql.push_str(column);
                    sql.push_str(" = ");
                    sql.push_str(&dialect.placeholder(placeholder_n));
                    placeholder_n += 1;
                    binds.push(value.clone());
                }
                Filter::IsNull => {
                    sql.push_str(column);
                    sql.push_str(" IS NULL");
                }
                Filter::IsNotNull => {
                    sql.push_str(column);
                    sql.push_str(" IS NOT NULL");
                }
            }
        }
    }

    if let Some(group_by) = &params.group_by {
        if group_by.trim().is_empty() {
            return Err(WhereError::GroupByEmpty);
        }
        sql.push_str(" GROUP BY ");
        sql.push_str(group_by);
    }

    if let Some(having) = &params.having {
        if having.trim().is_empty() {
            return Err(WhereError::HavingEmpty);
        }
        sql.push_str(" HAVING ");
        sql.push_str(having);
    }

    if let Some(order_by) = &params.order_by {
        if order_by.trim().is_empty() {
            return Err(WhereError::OrderEmpty);
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
    }

    if let Some(limit) = &params.limit {
        let n: i64 = limit
            .trim()
            .parse()
            .map_err(|_| WhereError::LimitNotNumber(limit.clone()))?;
        if n <= 0 {
            return Err(WhereError::LimitNotPositive(limit.clone()));
        }
        sql.push_str(&format!(" LIMIT {n}"));
    }

    if let Some(offset) = &params.offset {
        let n: i64 = offset
            .trim()
            .parse()
            .map_err(|_| WhereError::OffsetNotNumber(offset.clone()))?;
        if n < 0 {
            return Err(WhereError::OffsetNegative(offset.clone()));
        }
        sql.push_str(&format!(" OFFSET {n}"));
    }

    Ok((sql, binds))
}

#[cfg(test)]
#[path = "where_builder_tests.rs"]
mod tests;
