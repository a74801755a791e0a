use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Data source error [{code}]: {description}")]
    DataSource { code: String, description: String },

    #[error("No price data returned for {0}")]
    NoData(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
