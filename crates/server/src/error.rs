use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use data_loader::DataLoadError;

use crate::render;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to load ratings: {0}")]
    Data(#[from] DataLoadError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Data(e) => {
                tracing::error!("Data error: {}", e);
                self.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "Internal server error".to_string()
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Html(render::error_page(&message))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
