use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use fruitsupply_core::DomainError;
use fruitsupply_infra::document_store::StoreError;
use fruitsupply_infra::tasks::QueueError;

/// Every failure a handler can return. Rendered as `{"error": "<description>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("{}", .0.body_text())]
    Payload(#[from] JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::InvalidId(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Constraint(_)) => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Queue(_) => StatusCode::BAD_GATEWAY,
            ApiError::Domain(_) => StatusCode::BAD_REQUEST,
            ApiError::Payload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        json_error(status, self.to_string())
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_status_codes() {
        assert_eq!(
            ApiError::from(StoreError::not_found("order x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::duplicate("fruits", "name", &json!("Apple"))).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::Backend("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(QueueError::Broker("down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(DomainError::invalid_id("DocumentId: bad")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn message_is_the_error_text() {
        let err = ApiError::from(StoreError::not_found("fruit 'Mango'"));
        assert_eq!(err.to_string(), "fruit 'Mango' not found");
    }
}
