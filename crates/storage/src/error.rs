// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use shed_loader::TemplateError;

use crate::where_builder::WhereError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("connect db failed, {0}")]
    Connect(#[source] sqlx::Error),
    #[error(transparent)]
    Where(#[from] WhereError),
    #[error("query db failed, {0}")]
    Query(#[source] sqlx::Error),
    #[error("decode row failed, {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("regenerate '{name}' failed, {source}")]
    Template {
        name: String,
        #[source]
        source: TemplateError,
    },
    #[error("'{field}' is missing for job '{name}'.")]
    Missing { name: String, field: &'static str },
}
