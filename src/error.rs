use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuizError>;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Invalid JSON format: {0}")]
    InvalidFormat(String),

    #[error("Question bank is empty. Nothing to export.")]
    EmptyBank,

    #[error("No questions to export for {0}.")]
    EmptyTopic(String),

    /// Persisted value could not be decoded. Callers recover with defaults.
    #[error("Failed to load '{key}' from storage: {reason}")]
    StorageRead { key: String, reason: String },

    #[error("Error reading the file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Question suggestion failed: {0}")]
    SuggestionService(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizError {
    pub fn invalid_format(detail: impl Into<String>) -> Self {
        QuizError::InvalidFormat(detail.into())
    }
}
