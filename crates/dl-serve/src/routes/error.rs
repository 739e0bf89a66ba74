use axum::Json;
use axum::http::StatusCode;
use dl_core::error::{DblogError, EventError};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    #[schema(value_type = String)]
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &DblogError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        DblogError::Event(event) => map_event_error(event),
        DblogError::Store(_) | DblogError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            String::new(),
        ),
    };

    // Server-side details stay in the log.
    let message = if status.is_server_error() {
        tracing::error!(error = %err, correlation_id = ?correlation_id, "request failed");
        "internal error".to_string()
    } else {
        tracing::debug!(error = %err, status = status.as_u16(), "request rejected");
        message
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
        EventError::InvalidOrder { .. }
        | EventError::InvalidSort { .. }
        | EventError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dl_core::error::StoreError;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = DblogError::Event(EventError::InvalidOrder {
            value: "wid".to_string(),
        });
        let (status, Json(body)) = map_error(&err, Some("corr_1".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "invalid_input");
        assert_eq!(body.correlation_id.as_deref(), Some("corr_1"));
    }

    #[test]
    fn missing_events_are_not_found() {
        let (status, Json(body)) = map_error(&DblogError::Event(EventError::NotFound), None);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "not_found");
    }

    #[test]
    fn store_failures_are_internal() {
        let err = DblogError::Store(StoreError::CorruptRow {
            message: "bad severity".to_string(),
        });
        let (status, Json(body)) = map_error(&err, None);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "internal_error");
        assert_eq!(body.message, "internal error");
    }
}
