use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::utils::error::{EnrollError, ErrorCategory, FieldError};

pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::Input => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Conflict => StatusCode::CONFLICT,
        ErrorCategory::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::Storage | ErrorCategory::Configuration => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for EnrollError {
    fn into_response(self) -> Response {
        let category = self.category();
        let status = status_for(category);

        if status.is_server_error() {
            // 使用者只會看到通用訊息，真正原因留在日誌
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                category,
                self.severity()
            );
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = json!({
            "error": {
                "category": category,
                "message": self.user_friendly_message(),
                "fields": self.field_errors(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// A rejected create or edit: the submitted body comes back untouched,
/// wrongly typed values included, alongside what was wrong with it.
#[derive(Debug, Serialize)]
pub struct InvalidSubmission {
    pub enrollment: Value,
    pub errors: Vec<FieldError>,
}

pub fn reject_submission(submitted: Value, err: EnrollError) -> Response {
    if err.category() != ErrorCategory::Validation {
        return err.into_response();
    }

    tracing::debug!("Submission rejected: {}", err);
    let body = InvalidSubmission {
        enrollment: submitted,
        errors: err.field_errors(),
    };
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}
