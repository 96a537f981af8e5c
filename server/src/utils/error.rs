use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::commands::CommandError;
use crate::store::StoreError;
use crate::utils::response::{error as error_response, ApiErrorBody};
use crate::utils::status::status_for_error_code;
use crate::validation::ValidationErrors;

const INVALID_JSON_MESSAGE: &str = "Invalid JSON in request body";
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unreadable request body: {0}")]
    Body(#[from] BytesRejection),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{message}")]
    Rejected { code: &'static str, message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<CommandError> for AppError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Rejected { code, message } => AppError::Rejected { code, message },
            CommandError::Store(store) => AppError::Store(store),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Body(rejection) => rejection.status(),
            AppError::InvalidJson(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected { code, .. } => status_for_error_code(code),
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        match self {
            AppError::Unauthorized
            | AppError::Body(_)
            | AppError::InvalidJson(_)
            | AppError::Validation(_) => {
                warn!(error = %self, "Rejected request");
            }
            AppError::Rejected { code, message } => {
                warn!(code = %code, message = %message, "Command rejected");
            }
            AppError::Store(e) => {
                error!(error = ?e, "Store error");
            }
            AppError::Unavailable(msg) | AppError::Internal(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
        }
    }

    fn body(&self) -> ApiErrorBody {
        match self {
            AppError::Unauthorized => ApiErrorBody::new("Unauthorized"),
            AppError::Body(rejection) => {
                ApiErrorBody::new("Unreadable request body").with_message(rejection.body_text())
            }
            AppError::InvalidJson(_) => ApiErrorBody::new(INVALID_JSON_MESSAGE),
            AppError::Validation(errors) => {
                let missing_fields = errors.missing_fields();
                let title = if missing_fields.is_empty() {
                    "Invalid request body"
                } else {
                    "Missing required fields"
                };
                ApiErrorBody {
                    missing_fields,
                    fields: errors.invalid_fields(),
                    ..ApiErrorBody::new(title).with_code("VALIDATION_ERROR")
                }
            }
            AppError::Rejected { code, message } => {
                ApiErrorBody::new(message.clone()).with_code(*code)
            }
            AppError::Store(e) => {
                ApiErrorBody::new(INTERNAL_ERROR_MESSAGE).with_message(e.to_string())
            }
            AppError::Unavailable(msg) => ApiErrorBody::new("Service unavailable")
                .with_code("SERVICE_UNAVAILABLE")
                .with_message(msg.clone()),
            AppError::Internal(msg) => {
                ApiErrorBody::new(INTERNAL_ERROR_MESSAGE).with_message(msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        error_response(self.status_code(), self.body())
    }
}
