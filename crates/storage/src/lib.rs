// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! shed-storage: Component F, the database-backed job source.
//!
//! [`backend::DbBackend`] is the `sqlx::Any`-driven query layer; dialect
//! quirks live in [`dialect`] and the filter/paging grammar in
//! [`where_builder`]. [`normalize::normalize`] turns a raw row into a
//! [`shed_core::Job`], reusing the same template-expansion and java
//! normalisation machinery the file loader uses.

mod backend;
mod dialect;
mod error;
mod normalize;
mod where_builder;

pub use backend::{DbBackend, DbJobRow, VersionTuple, DEFAULT_TABLE};
pub use dialect::Dialect;
pub use error::{DbError, NormalizeError};
pub use normalize::normalize;
pub use where_builder::{build_where, Filter, QueryParams, WhereError};
