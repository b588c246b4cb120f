//! Error types and process exit statuses

use thiserror::Error;

/// Errors returned by platform operations
///
/// A closed set of categories: per-command classifiers and the generic
/// fallback table both match on the variant, never on message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("{0}")]
    Unknown(String),
}

impl ApiError {
    /// Classify an unsuccessful HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => Self::BadRequest(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::Service { status, message },
        }
    }

    /// Server or transport detail carried by the error (may be empty)
    pub fn detail(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::InvalidResponse(m)
            | Self::Unknown(m) => m,
            Self::Service { message, .. } => message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::InvalidResponse(err.to_string());
        }
        match err.status() {
            Some(status) => Self::from_status(status.as_u16(), err.to_string()),
            None => Self::Unknown(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Unknown(err.to_string())
    }
}

/// Problems with local input, detected before any operation runs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("File must have .parquet extension.")]
    ParquetExtension,

    #[error("Invalid more-like-these input: {0}")]
    MoreLikeThese(String),

    #[error("Invalid embedding: {0}")]
    Embedding(String),

    #[error("Invalid collection type: {0}")]
    CollectionType(String),

    #[error("Embeddings dimension must be provided when collection type is UPE.")]
    MissingEmbeddingsDimension,

    #[error("Invalid search option: {0}")]
    SearchOption(String),

    #[error("Missing required option: {0}")]
    MissingOption(String),
}

/// Closed set of process exit statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Command ran; handled API failures also end here
    Success,
    /// Bad usage or no command given
    Usage,
    /// Local validation rejected the input
    Validation,
    /// No usable credential combination
    MissingCredentials,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Usage => 1,
            Self::Validation => 2,
            Self::MissingCredentials => 127,
        }
    }
}
