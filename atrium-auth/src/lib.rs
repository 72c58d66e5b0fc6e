//! atrium-auth: the single-admin authentication flow.
//!
//! One administrator account, configured at startup: a login checks the
//! submitted email and password against the configured credentials and
//! issues a short-lived HS256 access token. Route protection verifies
//! that token. There is no user store and no registration.

pub mod credentials;
pub mod token;

pub use credentials::AdminCredentials;
pub use token::{extract_bearer_token, AdminClaims, TokenIssuer};
