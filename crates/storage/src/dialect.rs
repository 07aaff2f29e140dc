// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQL dialect detection: maps a `sql.Open`-style driver name to the
//! placeholder style the WHERE builder must emit.

/// The SQL dialects the DB loader is known to speak to.
///
/// `Auto` is the fallback for any driver name the daemon doesn't
/// recognise; it gets the plain `?` placeholder style, which is what
/// `database/sql`'s own drivers mostly agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Auto,
    Postgres,
    MySql,
    Mssql,
    Oracle,
}

impl Dialect {
    /// Classify a driver name the same way the daemon's `--db_driver` flag
    /// is interpreted.
    pub fn from_driver(driver: &str) -> Dialect {
        match driver {
            "postgres" => Dialect::Postgres,
            "mysql" | "mymysql" => Dialect::MySql,
            "odbc_with_mssql" => Dialect::Mssql,
            "oci8" | "odbc_with_oracle" => Dialect::Oracle,
            _ => Dialect::Auto,
        }
    }

    /// The `n`th (1-indexed) bind placeholder for this dialect.
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Oracle => format!(":{n}"),
            Dialect::Postgres => format!("${n}"),
            Dialect::MySql | Dialect::Mssql | Dialect::Auto => "?".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "dialect_tests.rs"]
mod tests;
