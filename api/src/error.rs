use axum::{Json, http::StatusCode, response::IntoResponse};
use certward_common::views::ApiErrorResponse;
use thiserror::Error;

use crate::engine::EngineError;

const INTERNAL_MESSAGE: &str = "Something went wrong on our end. Please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    InternalAnyhow(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found() -> Self {
        Self::NotFound
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Engine(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Engine(e) if e.is_user_error() => StatusCode::BAD_REQUEST,
            Self::Engine(_) | Self::InternalAnyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        let status = err.status_code();

        ApiErrorResponse {
            code: Some(
                match status {
                    StatusCode::NOT_FOUND => "NotFound",
                    StatusCode::BAD_REQUEST => "BadRequest",
                    _ => "InternalError",
                }
                .into(),
            ),

            message: match &err {
                ApiError::NotFound => "The requested resource was not found.".into(),
                _ if status.is_server_error() => INTERNAL_MESSAGE.into(),
                _ => err.to_string(),
            },

            #[cfg(debug_assertions)]
            details: Some(err.to_string()),

            #[cfg(not(debug_assertions))]
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("Error returned by handler: {self}");
        } else {
            tracing::debug!("Request rejected: {self}");
        }

        (status_code, Json(Into::<ApiErrorResponse>::into(self))).into_response()
    }
}
