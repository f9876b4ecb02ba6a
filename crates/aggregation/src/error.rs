use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to {operation}: {status}")]
    Status {
        operation: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, AggregationError>;
