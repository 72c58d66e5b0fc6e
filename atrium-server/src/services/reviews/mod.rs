mod reviews_service;

pub use reviews_service::{router, Review};
