//! Classifier error types

use thiserror::Error;

use super::payload::ErrorBody;

/// Message returned when the request text is blank
pub const MISSING_TEXT_MESSAGE: &str = "Missing required field 'text'.";

/// Error reported for upstream processing failures
pub const PROCESSING_ERROR: &str = "Processing error";

/// Errors from a classification call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("{}", MISSING_TEXT_MESSAGE)]
    MissingText,

    #[error("Classifier returned {status}: {error}")]
    Upstream {
        status: u16,
        error: String,
        details: Option<String>,
    },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Malformed response: {message}")]
    Malformed { message: String },
}

impl ClassifierError {
    /// Create an upstream error from a non-2xx response
    pub fn upstream(status: u16, error: impl Into<String>, details: Option<String>) -> Self {
        Self::Upstream {
            status,
            error: error.into(),
            details,
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// HTTP-equivalent status code
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingText => 400,
            Self::Upstream { status, .. } => *status,
            Self::Transport { .. } | Self::Malformed { .. } => 500,
        }
    }

    /// Wire error payload
    pub fn to_body(&self) -> ErrorBody {
        match self {
            Self::MissingText => ErrorBody {
                error: MISSING_TEXT_MESSAGE.to_string(),
                details: None,
            },
            Self::Upstream { error, details, .. } => ErrorBody {
                error: error.clone(),
                details: details.clone(),
            },
            Self::Transport { message } | Self::Malformed { message } => ErrorBody {
                error: PROCESSING_ERROR.to_string(),
                details: Some(message.clone()),
            },
        }
    }
}
