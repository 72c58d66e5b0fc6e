pub mod applications;
pub mod assets;
pub mod auth;
pub mod jobs;
pub mod reviews;
