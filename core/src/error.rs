use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scenario is missing required key '{key}'")]
    MissingScenarioKey { key: &'static str },

    #[error("Invalid scenario: {reason}")]
    InvalidScenario { reason: String },

    #[error("Invalid model config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Stage '{stage}' ran before its inputs were ready (missing: {missing})")]
    StageOrder { stage: &'static str, missing: &'static str },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ProjResult<T> = Result<T, ProjError>;
