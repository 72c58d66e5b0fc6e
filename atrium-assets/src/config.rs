use std::path::PathBuf;

/// Configuration for the on-disk asset store
#[derive(Debug, Clone)]
pub struct AssetStoreConfig {
    /// Flat directory all uploaded files land in
    pub upload_dir: PathBuf,

    /// Base URL the upload directory is served under; file refs are
    /// appended to this to form public URLs
    pub public_base_url: String,
}

impl Default for AssetStoreConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            public_base_url: "/uploads".to_string(),
        }
    }
}

impl AssetStoreConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the upload directory
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// Set the public base URL
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }
}
