//! Error type returned by request handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taowidget_chain::ChainError;
use thiserror::Error;

use crate::chart::ChartError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error("Chart task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Chart(ChartError::NoData) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors are answered with a plain text body.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
