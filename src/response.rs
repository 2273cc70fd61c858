use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::drill::DrillError;
use crate::services::word_store::PoolError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: message.into(),
            is_operational: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    fn operational(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            is_operational: true,
        }
    }
}

impl From<DrillError> for AppError {
    fn from(err: DrillError) -> Self {
        let message = err.to_string();
        match err {
            DrillError::Pool(pool) => {
                let (status, code) = match pool {
                    PoolError::PoolExhausted { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "POOL_EXHAUSTED")
                    }
                    PoolError::SourceEmpty { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "SOURCE_EMPTY")
                    }
                    PoolError::FetchBudgetExhausted { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "FETCH_BUDGET_EXHAUSTED")
                    }
                    PoolError::SourceTimeout { .. } => {
                        (StatusCode::GATEWAY_TIMEOUT, "SOURCE_TIMEOUT")
                    }
                    PoolError::Source(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SOURCE_ERROR"),
                    PoolError::NoEligibleWords { .. } => {
                        return Self {
                            code: "NO_ELIGIBLE_WORDS",
                            ..Self::internal(message)
                        };
                    }
                };
                Self::operational(status, code, message)
            }
            DrillError::Grading(_) => {
                Self::operational(StatusCode::INTERNAL_SERVER_ERROR, "GRADING_ERROR", message)
            }
            DrillError::GradingTimeout(_) => {
                Self::operational(StatusCode::GATEWAY_TIMEOUT, "GRADING_TIMEOUT", message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_operational {
            self.message
        } else {
            tracing::error!(code = self.code, error = %self.message, "internal error");
            "internal server error".to_string()
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: self.code.to_string(),
        };

        (self.status, Json(body)).into_response()
    }
}
