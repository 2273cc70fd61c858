use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(root))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    started_at: String,
    uptime: u64,
}

async fn root(State(state): State<AppState>) -> Json<HealthResponse> {
    let started_at: chrono::DateTime<chrono::Utc> = state.started_at_system().into();
    Json(HealthResponse {
        status: "ok",
        timestamp: iso(chrono::Utc::now()),
        started_at: iso(started_at),
        uptime: state.uptime_seconds(),
    })
}

fn iso(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
