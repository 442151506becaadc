use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkoutError {
    #[error("{operation} failed ({status}): {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("missing required configuration: {0}")]
    MissingConfig(String),

    #[error("invalid configuration for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("invalid identifier '{0}': no alphanumeric characters")]
    InvalidId(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WorkoutError>;
