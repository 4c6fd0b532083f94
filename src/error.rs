use thiserror::Error;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Invalid song name: {0}")]
    InvalidSongName(String),

    #[error("Song not found: {0}")]
    SongNotFound(String),

    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    #[error("URL is required")]
    MissingSourceUrl,

    #[error("Unsupported source URL: {0}")]
    InvalidSourceUrl(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Requested range not satisfiable (file size: {0})")]
    RangeNotSatisfiable(u64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("JSON serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to build response: {0}")]
    HttpError(#[from] axum::http::Error),
}

// Tells Axum how to convert our errors into HTTP responses
impl IntoResponse for PlayerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            PlayerError::InvalidSongName(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            PlayerError::MalformedCommand(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            PlayerError::MissingSourceUrl => (StatusCode::BAD_REQUEST, self.to_string()),
            PlayerError::InvalidSourceUrl(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            PlayerError::SongNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            PlayerError::RangeNotSatisfiable(file_size) => {
                tracing::error!("Request failed: {}", self);
                return (
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [(header::CONTENT_RANGE, format!("bytes */{}", file_size))],
                    self.to_string(),
                )
                    .into_response();
            }
            PlayerError::DownloadFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
        };

        tracing::error!("Request failed: {}", self);

        (status, message).into_response()
    }
}

pub type PlayerResult<T> = Result<T, PlayerError>;
