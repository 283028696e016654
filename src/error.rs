use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

pub enum ApiError {
    NotFound(String),

    /// Logged, with only a generic message returned to the client.
    InternalServerError(String),

    /// Internal failure whose message is safe to show.
    Unavailable(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, json!({ "detail": detail })),
            ApiError::InternalServerError(err) => {
                tracing::error!("Internal server error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": "An internal server error occurred" }),
                )
            }
            ApiError::Unavailable(detail) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "detail": detail }))
            }
        };

        (status, Json(body)).into_response()
    }
}
