// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The metrics/introspection HTTP endpoint (spec §10.5). Explicitly named
//! "out of core" by the spec but still part of the deployable daemon: how
//! the scheduler is observed in production.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use shed_engine::{CronEngine, ErrorMap};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub cron: Arc<Mutex<CronEngine>>,
    pub errors: Arc<Mutex<ErrorMap>>,
    pub healthy: Arc<AtomicBool>,
}

#[derive(Debug, Serialize)]
struct JobEntry {
    expression: String,
    prev: Option<chrono::DateTime<chrono::Utc>>,
    next: chrono::DateTime<chrono::Utc>,
}

/// Build the router serving `/jobs`, `/errors`, `/healthz`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/jobs", get(jobs))
        .route("/errors", get(errors))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn jobs(State(state): State<AppState>) -> Json<HashMap<String, JobEntry>> {
    let cron = state.cron.lock().await;
    let snapshot = cron
        .entries()
        .into_iter()
        .map(|e| {
            (
                e.id.as_str().to_string(),
                JobEntry {
                    expression: e.expression,
                    prev: e.prev,
                    next: e.next,
                },
            )
        })
        .collect();
    Json(snapshot)
}

async fn errors(State(state): State<AppState>) -> Json<HashMap<String, String>> {
    Json(state.errors.lock().await.snapshot())
}

/// `200 OK` once the reconciliation worker has completed its first pass,
/// `503` before that.
async fn healthz(State(state): State<AppState>) -> StatusCode {
    if state.healthy.load(Ordering::Acquire) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
