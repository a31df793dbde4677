//! Liveness endpoints. Neither touches the store, so they answer even while
//! the database is unreachable.

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::ApiState;

const SERVICE_NAME: &str = "huddle";

#[derive(Serialize)]
struct Liveness {
    status: &'static str,
    message: &'static str,
    service: &'static str,
}

#[derive(Serialize)]
struct BuildInfo {
    service: &'static str,
    version: &'static str,
}

fn liveness() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        message: "Server is running",
        service: SERVICE_NAME,
    })
}

fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/health", get(|| async { liveness() }))
        .route("/version", get(|| async { build_info() }))
}
