// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! shedd: the cron-style job scheduler daemon.
//!
//! Wires the four core subsystems (file/DB loaders and the reconciliation
//! loop, the cron dispatcher, the single-flight executor, the log
//! rotator) to the ambient stack: CLI flags, layered configuration,
//! structured logging, a PID-lock lifecycle guard, and the introspection
//! HTTP endpoint.

use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use shed_daemon::cli::Cli;
use shed_daemon::config::Config;
use shed_daemon::http::{router, AppState};
use shed_daemon::{lock, logging};
use shed_engine::{run_dispatcher, start_watch, CronEngine, ErrorMap, ReconcileConfig, ReconcileWorker};
use shed_storage::DbBackend;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    let _lock = match lock::acquire(&config.lock_path) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("shedd: {e}");
            std::process::exit(1);
        }
    };

    let _log_guard = logging::init(&config.scheduler_log_path)?;
    info!(root_dir = %config.root_dir.display(), listen = %config.listen, "starting shed scheduler");

    let db = connect_db(&config).await;

    let cron = Arc::new(Mutex::new(CronEngine::new()));
    let errors = Arc::new(Mutex::new(ErrorMap::new()));
    let healthy = Arc::new(AtomicBool::new(false));

    // File-watch initialization is one of the two fatal startup surfaces.
    let (_watcher, fs_rx) = match start_watch(&[config.job_dir.clone()]) {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, "file watcher init failed");
            return Err(e.into());
        }
    };

    let reconcile_config = ReconcileConfig {
        roots: vec![config.job_dir.clone()],
        global_args: config.global_args.clone(),
        log_path: config.log_dir.clone(),
        java_home: config.java_home.clone(),
        poll_interval: config.poll_interval,
    };

    let mut worker = ReconcileWorker::new(
        Arc::clone(&cron),
        Arc::clone(&errors),
        Arc::clone(&healthy),
        reconcile_config,
        db,
    );
    worker.initial_load().await;
    tokio::spawn(worker.run(fs_rx));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(run_dispatcher(Arc::clone(&cron), shutdown_rx));

    // Binding the introspection listener is the other fatal startup surface.
    let addr = parse_listen_addr(&config.listen);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind introspection listener");
            return Err(e.into());
        }
    };
    info!(%addr, "introspection endpoint listening");
    let app = router(AppState {
        cron: Arc::clone(&cron),
        errors: Arc::clone(&errors),
        healthy: Arc::clone(&healthy),
    });
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "introspection server stopped");
        }
    });

    wait_for_shutdown_signal().await;
    info!("shutdown requested, stopping");
    let _ = shutdown_tx.send(true);

    Ok(())
}

/// A DB connection failure at startup is not fatal: the spec's fail-open
/// policy for DB infrastructure errors applies here too, so the scheduler
/// still starts and serves its file-sourced jobs.
async fn connect_db(config: &Config) -> Option<DbBackend> {
    let url = config.db_url.as_ref()?;
    match DbBackend::connect(url, &config.db_driver, config.db_table.clone()).await {
        Ok(db) => Some(db),
        Err(e) => {
            warn!(error = %e, "db connect failed, running with file-sourced jobs only");
            None
        }
    }
}

/// Parse the Go-style `:PORT` / `host:PORT` listen address the `--listen`
/// flag accepts. An unparseable value falls back to the documented
/// default rather than failing startup over a typo'd flag.
fn parse_listen_addr(listen: &str) -> SocketAddr {
    let normalized = match listen.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => listen.to_string(),
    };
    normalized.parse().unwrap_or(SocketAddr::from(([0, 0, 0, 0], 37075)))
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let sigterm = signal(SignalKind::terminate());
    let sigint = signal(SignalKind::interrupt());
    match (sigterm, sigint) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
            }
        }
        _ => {
            // Signal handlers failed to install; fall back to Ctrl-C only
            // rather than leaving the daemon with no shutdown path at all.
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
