mod health;
mod words;

use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/word/:language", get(words::get_word))
        .route("/dump/:language", get(words::dump_word_entries))
        .route("/stats/:language", get(words::pool_stats))
        .route(
            "/check/:language/:original/:transliteration",
            get(words::check_word),
        )
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("route not found").into_response()
}
