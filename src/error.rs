use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("game config lists no unit at index {index}")]
    MissingUnit { index: usize },

    #[error("invalid strategy config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, StrategyError>;
