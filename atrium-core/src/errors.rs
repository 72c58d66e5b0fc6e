//! # Errors
//!
//! Atrium services speak one structured error type:
//! - consistent status codes + class names
//! - carried through `anyhow::Error` across service boundaries
//! - transport-agnostic (the server crate decides how to serialize)

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for Atrium service APIs.
pub type ApiResult<T> = std::result::Result<T, AnyError>;

/// Error classes the backend distinguishes, with their HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400
    NotAuthenticated, // 401
    Forbidden,        // 403
    NotFound,         // 404
    Conflict,         // 409
    Unprocessable,    // 422
    GeneralError,     // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
        }
    }

    /// Error `name` as it appears on the wire (e.g. "NotFound").
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
        }
    }

    /// Kebab-cased `className` wire field.
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
        }
    }
}

/// A structured error that can live inside `anyhow::Error`.
///
/// Wire fields:
/// - name
/// - message
/// - code (HTTP status)
/// - className
/// - errors (optional, per-field detail for validation failures)
#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Option<serde_json::Value>,
    pub source: Option<AnyError>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    pub fn with_errors(mut self, errors: serde_json::Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it flows through `?` chains.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Downcast an `anyhow::Error` to an `ApiError` if possible.
    pub fn from_anyhow(err: &AnyError) -> Option<&ApiError> {
        err.downcast_ref::<ApiError>()
    }

    /// Turn any error into an ApiError:
    /// - if it is already an ApiError, keep it (lossless)
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> ApiError {
        match err.downcast::<ApiError>() {
            Ok(api) => api,
            Err(other) => {
                ApiError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// Client-safe copy: keeps kind/message/errors, drops the inner
    /// `source` (stack traces, backend details).
    pub fn sanitize_for_client(&self) -> ApiError {
        ApiError {
            kind: self.kind,
            message: self.message.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    /// Wire payload.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_anyhow() {
        let err = ApiError::not_found("Asset not found: logo").into_anyhow();
        let api = ApiError::from_anyhow(&err).unwrap();
        assert_eq!(api.code(), 404);
        assert_eq!(api.name(), "NotFound");
    }

    #[test]
    fn normalize_wraps_foreign_errors_as_500() {
        let err = anyhow::anyhow!("disk fell off");
        let api = ApiError::normalize(err);
        assert_eq!(api.code(), 500);
        assert_eq!(api.class_name(), "general-error");
    }

    #[test]
    fn wire_payload_includes_validation_errors() {
        let api = ApiError::unprocessable("validation failed")
            .with_errors(serde_json::json!({"email": ["must be a valid email"]}));
        let json = api.to_json();
        assert_eq!(json["code"], 422);
        assert_eq!(json["className"], "unprocessable");
        assert_eq!(json["errors"]["email"][0], "must be a valid email");
    }
}
