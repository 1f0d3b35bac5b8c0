use thiserror::Error;

/// Result type for evaluation operations
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while preparing or running an evaluation
#[derive(Error, Debug)]
pub enum EvalError {
    /// CSV could not be read or written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is absent
    #[error("Column '{column}' not found in {source_name}")]
    MissingColumn { column: String, source_name: String },

    /// Encounter ids do not fit the task
    #[error("{0}")]
    InvalidIds(String),

    /// Unknown task name
    #[error("Unknown task: {0} (expected taskA, taskB or taskC)")]
    UnknownTask(String),

    /// Section check enabled and no prediction produced a division
    #[error("We detected 0 sections! Disable the section check to run while ignoring this.")]
    NoSectionsDetected,

    /// Reference and prediction instance lists disagree
    #[error("The number of references ({references}) and predictions ({predictions}) does not match expected ({expected})")]
    InstanceMismatch {
        references: usize,
        predictions: usize,
        expected: usize,
    },

    /// A scorer failed or returned malformed columns
    #[error("Scorer '{scorer}' failed: {message}")]
    Scorer { scorer: String, message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EvalError {
    /// Create an invalid ids error
    pub fn invalid_ids(msg: impl Into<String>) -> Self {
        Self::InvalidIds(msg.into())
    }

    /// Create a scorer error
    pub fn scorer(scorer: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Scorer {
            scorer: scorer.into(),
            message: msg.into(),
        }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            source_name: source_name.into(),
        }
    }
}
