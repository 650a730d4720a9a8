use thiserror::Error;

/// Errors raised by the series pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or malformed price sequence, or an invalid build parameter.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Percentage change requested against a zero first value.
    #[error("division by zero: {0}")]
    DivisionByZero(String),

    /// The chart backend failed to draw or present.
    #[error("render failed: {0}")]
    Render(String),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("JSON export failed")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
