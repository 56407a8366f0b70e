//! Maps poll errors onto HTTP status codes and the JSON error envelope.

use archviz_types::{ErrorResponse, OperationError, PollError, RemoteError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: status.as_u16(),
                message: message.into(),
                upstream_status: None,
                upstream_body: None,
            },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<PollError> for ApiError {
    fn from(err: PollError) -> Self {
        let message = err.to_string();
        match err {
            PollError::InvalidJobId(_) | PollError::InvalidRequest(_) => {
                Self::new(StatusCode::BAD_REQUEST, message)
            }
            PollError::Operation(OperationError::Remote(RemoteError::Status { status, body })) => {
                let mut api = Self::new(StatusCode::BAD_GATEWAY, message);
                api.body.upstream_status = Some(status);
                api.body.upstream_body = Some(body);
                api
            }
            PollError::Operation(OperationError::Remote(RemoteError::Timeout(_))) => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, message)
            }
            PollError::Operation(OperationError::Remote(RemoteError::Transport(_))) => {
                Self::new(StatusCode::BAD_GATEWAY, message)
            }
            PollError::Operation(OperationError::DataShape(_)) => {
                tracing::error!(error = %message, "upstream payload shape changed");
                Self::new(StatusCode::BAD_GATEWAY, message)
            }
            PollError::Operation(OperationError::Failed { .. }) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
            }
            PollError::Storage(_) => {
                tracing::error!(error = %message, "artifact storage failure");
                Self::internal(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
