mod assets_service;

pub use assets_service::router;
