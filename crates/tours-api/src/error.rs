use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tours_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => match e {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::InvalidId(_) | StoreError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                StoreError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let label = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "error"
        } else {
            tracing::debug!(error = %self, "request rejected");
            "fail"
        };

        let body = serde_json::json!({ "status": label, "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}
