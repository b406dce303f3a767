use axum::Json;
use axum::http::StatusCode;
use civic_core::error::{CivicError, EventError};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &CivicError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        CivicError::Event(event) => map_event_error(event),
        CivicError::Timeout => (
            StatusCode::REQUEST_TIMEOUT,
            "timeout",
            "request timed out, please try again".to_string(),
        ),
        CivicError::Internal { message } => {
            error!(correlation_id = ?correlation_id, %message, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "an internal error occurred".to_string(),
            )
        }
    };

    (
        status,
        Json(ErrorEnvelope {
            code,
            message,
            correlation_id,
        }),
    )
}

fn map_event_error(err: &EventError) -> (StatusCode, &'static str, String) {
    match err {
        EventError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        EventError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_details_stay_server_side() {
        let err = CivicError::internal("disk I/O error at /var/lib/civic");
        let (status, Json(body)) = map_error(&err, Some("corr_1".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "internal_error");
        assert!(!body.message.contains("/var/lib"));
        assert_eq!(body.correlation_id.as_deref(), Some("corr_1"));
    }

    #[test]
    fn event_errors_map_to_client_statuses() {
        let (status, _) = map_error(&EventError::NotFound.into(), None);
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, Json(body)) = map_error(&CivicError::invalid_input("bad id"), None);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "invalid input: bad id");
        let (status, _) = map_error(&CivicError::Timeout, None);
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }
}
