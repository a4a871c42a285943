use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::repositories::RepositoryError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{}", self);
        }

        let body = Json(serde_json::json!({
            "statusCode": status.as_u16(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound("cannot find object.".to_owned()),
            e @ RepositoryError::NoUnique { .. } => AppError::Internal(anyhow::anyhow!(e)),
            RepositoryError::Internal(e) => AppError::Internal(e),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

/// Attaches a resource-specific message to a repository `NotFound`.
pub(crate) trait NotFoundAs<T> {
    fn not_found_as(self, message: impl FnOnce() -> String) -> Result<T, AppError>;
}

impl<T> NotFoundAs<T> for Result<T, RepositoryError> {
    fn not_found_as(self, message: impl FnOnce() -> String) -> Result<T, AppError> {
        self.map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(message()),
            e => e.into(),
        })
    }
}
