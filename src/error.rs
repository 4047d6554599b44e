use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchGateError {
    #[error("GitHub API request failed (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid event payload: {0}")]
    EventPayload(String),

    #[error("Pipeline command could not be started: {0}")]
    Spawn(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BenchGateError>;
