use atrium_core::ApiError;
use thiserror::Error;

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Errors that can occur during asset operations
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {key}")]
    NotFound { key: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl AssetError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Backend {
            source: error.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }
}

/// Boundary mapping: validation failures are the caller's fault, missing
/// keys are 404, everything else is an opaque storage failure.
impl From<AssetError> for ApiError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NotFound { key } => ApiError::not_found(format!("Asset not found: {key}")),
            AssetError::Invalid { message } => ApiError::bad_request(message),
            other => ApiError::general_error(other.to_string()),
        }
    }
}
