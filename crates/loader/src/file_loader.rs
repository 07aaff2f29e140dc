// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component E: loads job records from `*.*` files in watched directories.
//!
//! Each file is a JSON object, optionally templated against the merged
//! argument map (the file's own fields plus the daemon's global arguments,
//! with `cd_dir` injected as the file's containing directory) before being
//! parsed and turned into a [`Job`].

use std::path::{Path, PathBuf};

use serde_json::Value;
use shed_adapters::java::{expand_classpath_patterns, is_java_executable, synthesize_java_argv, JavaArgs};
use shed_core::{Job, JobSource, DEFAULT_TIMEOUT};

use crate::args::{
    bool_with_arguments, duration_with_arguments, string_with_arguments, string_with_default,
    strings_with_arguments, to_string_map, ArgMap,
};
use crate::template;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("read file failed, {0}")]
    Io(#[from] std::io::Error),
    #[error("regenerate file failed, {0}")]
    Template(#[from] template::TemplateError),
    #[error("unmarshal file failed, {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Validation(String),
}

/// List every job file under each of `roots` (non-recursive, `*.*` glob),
/// without loading or validating any of them. Callers load each path
/// individually so one bad file cannot take the rest of the directory
/// down with it -- see [`load_job_from_file`].
pub fn list_job_files(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for root in roots {
        let pattern = root.join("*.*");
        let Ok(matches) = glob::glob(&pattern.display().to_string()) else {
            continue;
        };
        paths.extend(matches.filter_map(Result::ok));
    }
    paths
}

/// Load a single job file, expanding its template against `global_args`
/// (plus an injected `cd_dir`) before parsing it as JSON.
pub fn load_job_from_file(
    path: &Path,
    global_args: &ArgMap,
    log_path: &Path,
    java_home: &str,
) -> Result<Job, LoadError> {
    let raw = std::fs::read_to_string(path)?;

    let mut merged = global_args.clone();
    let cd_dir = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .display()
        .to_string();
    merged.insert("cd_dir".to_string(), Value::String(cd_dir));

    let string_args = to_string_map(&merged);
    let expanded = template::expand(&raw, &string_args)?;

    let parsed: Value = serde_json::from_str(&expanded)?;
    let file_map = parsed
        .as_object()
        .cloned()
        .ok_or_else(|| LoadError::Validation("it is not a map or array".to_string()))?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_lowercase();

    job_from_map(&name, &[&file_map, &merged], log_path, java_home)
}

/// Build a [`Job`] from a layered argument-map list, the shared core of
/// both `load_job_from_file` and the database loader's row conversion.
pub fn job_from_map(
    name: &str,
    args: &[&ArgMap],
    log_path: &Path,
    java_home: &str,
) -> Result<Job, LoadError> {
    if name.is_empty() {
        return Err(LoadError::Validation("'name' is missing.".to_string()));
    }

    let expression = string_with_arguments(args, "expression", "");
    if expression.is_empty() {
        return Err(LoadError::Validation("'expression' is missing.".to_string()));
    }

    let timeout = duration_with_arguments(args, "timeout", DEFAULT_TIMEOUT);
    if timeout.is_zero() {
        return Err(LoadError::Validation(
            "'killTimeout' must is greate 0s.".to_string(),
        ));
    }

    let mut execute = string_with_arguments(args, "execute", "");
    if execute.is_empty() {
        return Err(LoadError::Validation("'execute' is missing.".to_string()));
    }

    let mut arguments = strings_with_arguments(args, "arguments", "", None, false).unwrap_or_default();
    let environments = strings_with_arguments(args, "environments", "", None, false).unwrap_or_default();

    let mut directory = string_with_default(args[0], "directory", "");
    if directory.is_empty() && args.len() > 1 {
        directory = string_with_arguments(&args[1..], "root_dir", "");
    }

    if is_java_executable(&execute) {
        arguments = build_java_arguments(arguments, args);
        execute = java_home.to_string();
    }

    let logfile = log_path.join(format!("job_{name}.log"));

    Ok(Job {
        name: name.to_string(),
        source: JobSource::File,
        expression,
        execute,
        arguments,
        environments,
        directory: if directory.is_empty() { None } else { Some(directory) },
        logfile,
        timeout,
    })
}

fn build_java_arguments(arguments: Vec<String>, args: &[&ArgMap]) -> Vec<String> {
    let classpath_patterns =
        strings_with_arguments(args, "java_classpath", ";", None, false).unwrap_or_default();
    let classpath = expand_classpath_patterns(&classpath_patterns);

    let debug = string_with_arguments(args, "java_debug", "");
    let debug_suspend = bool_with_arguments(args, "java_debug_suspend", false);
    let options = strings_with_arguments(args, "java_options", ",", None, false).unwrap_or_default();
    let class = string_with_arguments(args, "java_class", "");
    let jar = string_with_arguments(args, "java_jar", "");

    let java_args = JavaArgs {
        classpath: &classpath,
        debug: if debug.is_empty() { None } else { Some(debug.as_str()) },
        debug_suspend,
        options: &options,
        class: if class.is_empty() { None } else { Some(class.as_str()) },
        jar: if jar.is_empty() { None } else { Some(jar.as_str()) },
    };

    synthesize_java_argv(&java_args, &arguments)
}

#[cfg(test)]
#[path = "file_loader_tests.rs"]
mod tests;
