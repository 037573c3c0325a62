use std::{path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidintelError {
    #[error("Could not read video {path}: {source}")]
    VideoUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Backend returned {status} for {endpoint}")]
    BadStatus {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Request to {endpoint} timed out after {}s", .after.as_secs_f64())]
    Timeout {
        endpoint: &'static str,
        after: Duration,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, VidintelError>;
