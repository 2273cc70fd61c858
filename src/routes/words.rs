use axum::extract::{Path, State};
use axum::Json;

use crate::response::AppError;
use crate::services::grading::CheckResponse;
use crate::services::word_store::{PoolStats, WordRecord};
use crate::state::AppState;

pub async fn get_word(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> Result<Json<WordRecord>, AppError> {
    let word = state.drill().get_word(&language).await.map_err(|err| {
        tracing::error!(error = %err, %language, "failed to fetch word");
        AppError::from(err)
    })?;
    Ok(Json(word))
}

pub async fn dump_word_entries(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> String {
    state.drill().dump_word_entries(&language)
}

pub async fn pool_stats(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> Json<PoolStats> {
    Json(state.drill().stats(&language))
}

pub async fn check_word(
    State(state): State<AppState>,
    Path((language, original, transliteration)): Path<(String, String, String)>,
) -> Result<Json<CheckResponse>, AppError> {
    let checked = state
        .drill()
        .check_attempt(&language, &original, &transliteration)
        .await
        .map_err(|err| {
            tracing::error!(
                error = %err,
                %language,
                %original,
                %transliteration,
                "unable to check transliteration"
            );
            AppError::from(err)
        })?;
    Ok(Json(checked))
}
