// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI flag surface. Every flag is `Option` with no clap-level default so
//! [`crate::config::Config::load`] can tell "not supplied" (fall through
//! to the config file, then to a built-in default) apart from "supplied
//! empty".

use std::path::PathBuf;

use clap::Parser;

/// shed: a cron-style scheduler for shell commands.
#[derive(Debug, Parser)]
#[command(name = "shedd", version, about)]
pub struct Cli {
    /// Address the introspection HTTP endpoint binds to (default `:37075`).
    #[arg(long)]
    pub listen: Option<String>,

    /// Database poll cadence, Go-style duration (default `1m`).
    #[arg(long)]
    pub poll_interval: Option<String>,

    /// Root directory config files, job files, and state are resolved
    /// relative to (default `.`).
    #[arg(long)]
    pub root: Option<String>,

    /// Explicit config file path, bypassing the default search order.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Resolved `java` executable for `java`/`java.exe` job normalisation.
    #[arg(long)]
    pub java_home: Option<String>,

    /// Directory per-job logs are written under.
    #[arg(long)]
    pub log_path: Option<String>,

    /// Database connection URL. Omit to run file-sourced jobs only.
    #[arg(long)]
    pub db_url: Option<String>,

    /// Database driver name, used to select bind-placeholder style.
    #[arg(long)]
    pub db_drv: Option<String>,

    /// Database dialect override, takes priority over `--db_drv`.
    #[arg(long)]
    pub db_type: Option<String>,

    /// Jobs table name (default `sched_jobs`).
    #[arg(long)]
    pub db_table: Option<String>,
}
