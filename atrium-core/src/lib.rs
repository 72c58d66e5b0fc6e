//! atrium-core: shared plumbing for the Atrium site backend.
//!
//! Carries the structured API error type every service speaks and the
//! persisted JSON collection the document-backed services store their
//! records in. Transport concerns live in `atrium-server`.

pub mod collection;
pub mod errors;

pub use collection::JsonCollection;
pub use errors::{ApiError, ApiResult, ErrorKind};
