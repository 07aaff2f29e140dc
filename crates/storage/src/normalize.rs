// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a raw [`crate::backend::DbJobRow`] into a fully-resolved
//! [`shed_core::Job`]: template-expands every field against the merged
//! argument map, then applies java normalisation.
//!
//! The java handling has one nuance the file loader doesn't: if the
//! column's raw, pre-expansion `execute` value is literally `java` or
//! `java.exe`, it is replaced outright with `java_home` (no point
//! expanding a literal keyword). Otherwise `execute` is expanded first,
//! and only then checked (by its expanded basename) for whether it names
//! a java binary -- in which case the *expanded* value is kept and
//! classpath arguments are rewritten, rather than being overwritten with
//! `java_home`.

use std::collections::HashMap;
use std::path::Path;

use shed_adapters::java::{expand_classpath_pairs, is_java_executable};
use shed_core::{version_key, Job, JobSource, DEFAULT_TIMEOUT};
use shed_loader::template;

use crate::backend::DbJobRow;
use crate::error::NormalizeError;

pub fn normalize(
    row: DbJobRow,
    args: &HashMap<String, String>,
    log_path: &Path,
    java_home: &str,
) -> Result<Job, NormalizeError> {
    let name = row.name;

    let expand = |field: &'static str, text: &str| -> Result<String, NormalizeError> {
        template::expand(text, args).map_err(|source| NormalizeError::Template {
            name: format!("{name}.{field}"),
            source,
        })
    };

    let expression = expand("expression", &row.expression)?;

    let (execute, is_java) = if is_java_executable(&row.execute) {
        (java_home.to_string(), true)
    } else {
        let expanded = expand("execute", &row.execute)?;
        let is_java = is_java_executable(&expanded);
        (expanded, is_java)
    };

    let directory = match row.directory.as_deref() {
        Some(d) if !d.is_empty() => Some(expand("directory", d)?),
        _ => None,
    };

    let mut arguments = match row.arguments.as_deref() {
        Some(a) if !a.is_empty() => a
            .lines()
            .map(|line| expand("arguments", line))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    let environments = match row.environments.as_deref() {
        Some(e) if !e.is_empty() => e
            .lines()
            .map(|line| expand("environments", line))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    if is_java {
        expand_classpath_pairs(&mut arguments);
    }

    let logfile = log_path.join(format!("job_{name}.log"));
    let timeout = row
        .timeout
        .filter(|d| !d.is_zero())
        .unwrap_or(DEFAULT_TIMEOUT);

    Ok(Job {
        name,
        source: JobSource::Db {
            id: row.id,
            updated_at: version_key(row.updated_at),
        },
        expression,
        execute,
        arguments,
        environments,
        directory,
        logfile,
        timeout,
    })
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
