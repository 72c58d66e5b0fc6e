//! # atrium-assets: image asset storage for the Atrium backend
//!
//! An asset is a caller-chosen key ("logo", "hero-banner") mapped to an
//! uploaded file and its public URL. Two stores back that mapping:
//!
//! ```text
//! ┌──────────────┐
//! │  AssetStore  │  ← upload / lookup / list / delete
//! ├──────────────┤
//! │  BlobStore   │  ← physical files on disk
//! │  AssetIndex  │  ← key → {filename, url} records
//! └──────────────┘
//! ```
//!
//! There is no transaction spanning the two. The coordinator keeps them
//! consistent by ordering: the new file is written first, the index record
//! is replaced second, and the old file is removed last, best-effort. A
//! crash mid-operation can orphan a file on disk but never leaves an index
//! record pointing at a file that was deleted by us.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod index;
pub mod store;

pub use config::AssetStoreConfig;
pub use coordinator::{AssetStore, DeletedAsset, StoredAsset};
pub use error::{AssetError, AssetResult};
pub use index::{AssetIndex, AssetRecord, JsonAssetIndex, MemoryAssetIndex};
pub use store::{sanitize_token, BlobStore, FsBlobStore};
