use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The market-data or news provider failed. Never coerced into a neutral result.
    #[error("Upstream fetch error: {0}")]
    Upstream(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AnalysisError {
    /// True for failures that originate outside the engine (provider or fetch timeout).
    pub fn is_upstream(&self) -> bool {
        matches!(self, AnalysisError::Upstream(_) | AnalysisError::Timeout(_))
    }
}
