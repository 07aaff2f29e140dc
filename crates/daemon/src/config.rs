// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered configuration: built-in defaults, overridden by the config
//! file located via the search order in the spec, in turn overridden by
//! CLI flags. The merged JSON object doubles as the "scheduler argument
//! map" every job template is expanded against (see `shed_loader::args`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use shed_loader::{
    duration_with_arguments, string_with_arguments, template, to_string_map, ArgMap,
};

use crate::cli::Cli;

const DEFAULT_LISTEN: &str = ":37075";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_JAVA_HOME: &str = "java";
const DEFAULT_DB_TABLE: &str = "sched_jobs";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config file {path} failed, {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("regenerate config file {path} failed, {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: template::TemplateError,
    },
    #[error("unmarshal config file {path} failed, {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("explicit config file '{0}' does not exist")]
    MissingExplicit(PathBuf),
}

/// The fully resolved configuration a daemon run needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub root_dir: PathBuf,
    pub config_file: Option<PathBuf>,
    pub java_home: String,
    /// Directory per-job logs are written under (`logPath`).
    pub log_dir: PathBuf,
    /// The scheduler's own operational log file, distinct from any job's.
    pub scheduler_log_path: PathBuf,
    pub lock_path: PathBuf,
    pub job_dir: PathBuf,
    pub poll_interval: Duration,
    pub listen: String,
    pub db_url: Option<String>,
    pub db_driver: String,
    pub db_table: String,
    /// The merged config object, reused verbatim as the job loaders'
    /// global argument map.
    pub global_args: ArgMap,
}

/// Program name used both for the config-file search (`<prog>.conf`) and
/// the lock/log file basenames. Derived from argv[0] so a renamed binary
/// still finds its own config.
fn prog_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "shedd".to_string())
}

/// The config-file search order from the spec: `<root>/<prog>.conf`,
/// `<root>/etc/<prog>.conf`, `<root>/conf/<prog>.conf`, and the same three
/// with the literal name `scheduler.conf`.
fn search_paths(root: &Path, prog: &str) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(6);
    for name in [format!("{prog}.conf"), "scheduler.conf".to_string()] {
        paths.push(root.join(&name));
        paths.push(root.join("etc").join(&name));
        paths.push(root.join("conf").join(&name));
    }
    paths
}

fn find_config_file(root: &Path, prog: &str) -> Option<PathBuf> {
    search_paths(root, prog).into_iter().find(|p| p.is_file())
}

/// Read, template-expand against `seed`, and JSON-parse a config file.
fn load_config_file(path: &Path, seed: &HashMap<String, String>) -> Result<ArgMap, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let expanded = template::expand(&raw, seed).map_err(|source| ConfigError::Template {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&expanded).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(value.as_object().cloned().unwrap_or_default())
}

/// Build an `ArgMap` of the CLI flags the caller actually supplied, so the
/// layered `*_with_arguments` lookups treat an absent flag as "fall
/// through", not "overwrite with empty".
fn cli_overrides(cli: &Cli) -> ArgMap {
    let mut map = ArgMap::new();
    let mut set = |key: &str, value: &Option<String>| {
        if let Some(v) = value {
            map.insert(key.to_string(), Value::String(v.clone()));
        }
    };
    set("listen", &cli.listen);
    set("poll_interval", &cli.poll_interval);
    set("java_home", &cli.java_home);
    set("logPath", &cli.log_path);
    set("db_url", &cli.db_url);
    set("db_drv", &cli.db_drv);
    set("db_type", &cli.db_type);
    set("db_table", &cli.db_table);
    map
}

impl Config {
    /// Resolve the full configuration: CLI flags override the config file,
    /// which overrides built-in defaults. Failure to read an explicitly
    /// named `--config` file is an error; failure to find one among the
    /// default search paths is not -- the daemon runs on defaults plus
    /// CLI flags alone.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let root_dir = PathBuf::from(cli.root.clone().unwrap_or_else(|| ".".to_string()));
        let prog = prog_name();

        let config_file = match &cli.config {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(ConfigError::MissingExplicit(explicit.clone()));
                }
                Some(explicit.clone())
            }
            None => find_config_file(&root_dir, &prog),
        };

        let seed: HashMap<String, String> = [
            ("root_dir".to_string(), root_dir.display().to_string()),
            (
                "config_file".to_string(),
                config_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            (
                "java".to_string(),
                cli.java_home.clone().unwrap_or_else(|| DEFAULT_JAVA_HOME.to_string()),
            ),
            ("os".to_string(), std::env::consts::OS.to_string()),
            ("arch".to_string(), std::env::consts::ARCH.to_string()),
        ]
        .into_iter()
        .collect();

        let file_args = match &config_file {
            Some(path) => load_config_file(path, &seed)?,
            None => ArgMap::new(),
        };

        let cli_args = cli_overrides(cli);
        let layers = [&cli_args, &file_args];

        let listen = string_with_arguments(&layers, "listen", DEFAULT_LISTEN);
        let poll_interval = duration_with_arguments(&layers, "poll_interval", DEFAULT_POLL_INTERVAL);
        let java_home = string_with_arguments(&layers, "java_home", DEFAULT_JAVA_HOME);
        let log_dir_str = string_with_arguments(&layers, "logPath", &root_dir.join("logs").display().to_string());
        let job_dir_str = string_with_arguments(&layers, "job_dir", &root_dir.display().to_string());
        let db_url = {
            let v = string_with_arguments(&layers, "db_url", "");
            if v.is_empty() { None } else { Some(v) }
        };
        let db_driver = {
            let db_type = string_with_arguments(&layers, "db_type", "");
            if db_type.is_empty() {
                string_with_arguments(&layers, "db_drv", "")
            } else {
                db_type
            }
        };
        let db_table = string_with_arguments(&layers, "db_table", DEFAULT_DB_TABLE);

        // Merge file and CLI layers into one object: the job loaders'
        // global argument map, CLI values taking priority over the file.
        let mut global_args = file_args.clone();
        for (k, v) in &cli_args {
            global_args.insert(k.clone(), v.clone());
        }
        global_args
            .entry("root_dir".to_string())
            .or_insert_with(|| Value::String(root_dir.display().to_string()));

        Ok(Config {
            lock_path: root_dir.join(format!("{prog}.pid")),
            scheduler_log_path: root_dir.join(format!("{prog}.log")),
            log_dir: PathBuf::from(log_dir_str),
            job_dir: PathBuf::from(job_dir_str),
            root_dir,
            config_file,
            java_home,
            poll_interval,
            listen,
            db_url,
            db_driver,
            db_table,
            global_args,
        })
    }
}

/// Flatten [`Config::global_args`] into the string map the template
/// expander and DB normaliser want.
pub fn global_args_string_map(config: &Config) -> HashMap<String, String> {
    to_string_map(&config.global_args)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
