use thiserror::Error;

/// Error type for model fitting, seeding and model files.
#[derive(Debug, Error)]
pub enum LdaError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("numeric instability: {0}")]
    NumericInstability(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Shape error: {0}")]
    Shape(String),
}

impl LdaError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        LdaError::InvalidArgument(message.into())
    }
}
