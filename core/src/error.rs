use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Risk '{id}' not found")]
    NotFound { id: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RiskError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field:   field.into(),
            message: message.into(),
        }
    }

    /// Stable error code surfaced to collaborators (IPC, HTTP).
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. }   => "NOT_FOUND",
            _                       => "INTERNAL_ERROR",
        }
    }
}

pub type RiskResult<T> = Result<T, RiskError>;
