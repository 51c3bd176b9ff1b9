use thiserror::Error;

/// Failures talking to a record store. Callers above `StoreClient` never see
/// these directly; they are logged and collapsed into fail-soft outcomes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("insight backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("insight backend returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("could not decode insight: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown store backend '{0}' (expected 'rest' or 'sqlite')")]
    UnknownStore(String),

    #[error("unknown insight backend '{0}' (expected 'canned' or 'ollama')")]
    UnknownInsightBackend(String),

    #[error("{name} must be a whole number, got '{value}'")]
    NotANumber { name: &'static str, value: String },
}
