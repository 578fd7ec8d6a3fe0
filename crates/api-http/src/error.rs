//! HTTP Error Types
//!
//! Maps application errors to status codes and an HTML error page.

use crate::page;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use ddbackup_core::error::AppError;
use tracing::error;

/// AppError carried out of a handler
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl HttpError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::InvalidSchedule(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        (status, Html(page::render_error(status, &self.0.to_string()))).into_response()
    }
}
