use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::{AssetError, AssetIndex, AssetResult, BlobStore};

/// Successful upload or lookup: the key and its public URL
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAsset {
    pub key: String,
    pub url: String,
}

/// Outcome of a delete. `existed` reports whether a record was actually
/// removed; the HTTP layer treats deletes of unknown keys as success.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedAsset {
    pub key: String,
    pub existed: bool,
}

/// Coordinates the blob store and the asset index.
///
/// The two stores share no transaction. Every mutation follows the same
/// ordering: write the new file, replace the index record, then remove
/// the superseded file best-effort. The index is therefore never left
/// pointing at a file this process deleted; the worst crash outcome is an
/// orphaned file on disk.
pub struct AssetStore {
    blobs: Arc<dyn BlobStore>,
    index: Arc<dyn AssetIndex>,
}

impl AssetStore {
    pub fn new<B, I>(blobs: B, index: I) -> Self
    where
        B: BlobStore + 'static,
        I: AssetIndex + 'static,
    {
        Self {
            blobs: Arc::new(blobs),
            index: Arc::new(index),
        }
    }

    /// Create or replace the asset stored under `key`.
    ///
    /// Validation runs before anything is written, so a rejected upload
    /// leaves no file behind.
    pub async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        original_name: &str,
    ) -> AssetResult<StoredAsset> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AssetError::invalid("Upload requires a non-empty key"));
        }
        if bytes.is_empty() {
            return Err(AssetError::invalid("Upload requires a non-empty file"));
        }

        let new_file_ref = self.blobs.put(bytes, original_name, key).await?;
        let url = self.blobs.public_url(&new_file_ref);

        // Capture the superseded file before the upsert replaces the record.
        let old_file_ref = self
            .index
            .get(key)
            .await?
            .map(|record| record.file_ref)
            .filter(|file_ref| file_ref != &new_file_ref);

        self.index.upsert(key, &new_file_ref, &url).await?;

        // Cleanup runs only after the upsert succeeded. Its failure is
        // logged and swallowed: the upload itself already happened.
        if let Some(old) = old_file_ref {
            if let Err(e) = self.blobs.remove(&old).await {
                tracing::warn!(key, file_ref = %old, error = %e, "failed to remove replaced file");
            }
        }

        Ok(StoredAsset {
            key: key.to_string(),
            url,
        })
    }

    /// Resolve a key to its public URL. Reads the index only; whether the
    /// physical file still exists is not checked here.
    pub async fn lookup(&self, key: &str) -> AssetResult<StoredAsset> {
        match self.index.get(key).await? {
            Some(record) => Ok(StoredAsset {
                key: record.key,
                url: record.url,
            }),
            None => Err(AssetError::not_found(key)),
        }
    }

    /// All stored assets as a key → url mapping
    pub async fn list_all(&self) -> AssetResult<BTreeMap<String, String>> {
        let records = self.index.list().await?;
        Ok(records
            .into_iter()
            .map(|record| (record.key, record.url))
            .collect())
    }

    /// Remove the record for `key` and clean up its file best-effort.
    pub async fn delete(&self, key: &str) -> AssetResult<DeletedAsset> {
        let prior = self.index.remove(key).await?;

        if let Some(record) = &prior {
            if let Err(e) = self.blobs.remove(&record.file_ref).await {
                tracing::warn!(key, file_ref = %record.file_ref, error = %e, "failed to remove deleted file");
            }
        }

        Ok(DeletedAsset {
            key: key.to_string(),
            existed: prior.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssetStoreConfig, FsBlobStore, MemoryAssetIndex};
    use std::path::Path;

    async fn store_in(dir: &Path) -> AssetStore {
        let blobs = FsBlobStore::new(
            AssetStoreConfig::new()
                .with_upload_dir(dir)
                .with_public_base_url("/uploads"),
        )
        .await
        .unwrap();

        AssetStore::new(blobs, MemoryAssetIndex::new())
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn upload_then_lookup_returns_the_same_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        let stored = store
            .upload("logo", Bytes::from_static(b"A"), "logo.png")
            .await
            .unwrap();

        let found = store.lookup("logo").await.unwrap();
        assert_eq!(found, stored);
        assert!(found.url.starts_with("/uploads/"));
        assert!(found.url.ends_with("_logo_logo.png"));
    }

    #[tokio::test]
    async fn reupload_replaces_the_url_and_removes_the_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        let first = store
            .upload("logo", Bytes::from_static(b"A"), "logo.png")
            .await
            .unwrap();
        assert_eq!(files_in(dir.path()).len(), 1);
        let first_file = files_in(dir.path()).remove(0);

        let second = store
            .upload("logo", Bytes::from_static(b"B"), "logo2.png")
            .await
            .unwrap();

        assert_ne!(second.url, first.url);
        assert_eq!(store.lookup("logo").await.unwrap().url, second.url);

        // The bytes-A file is gone; exactly the new file remains.
        let remaining = files_in(dir.path());
        assert_eq!(remaining.len(), 1);
        assert_ne!(remaining[0], first_file);
        assert!(remaining[0].ends_with("_logo_logo2.png"));
    }

    #[tokio::test]
    async fn delete_then_lookup_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        store
            .upload("logo", Bytes::from_static(b"A"), "logo.png")
            .await
            .unwrap();

        let deleted = store.delete("logo").await.unwrap();
        assert!(deleted.existed);
        assert!(files_in(dir.path()).is_empty());

        let err = store.lookup("logo").await.unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_of_an_unknown_key_succeeds_without_a_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        let deleted = store.delete("never-uploaded").await.unwrap();
        assert_eq!(
            deleted,
            DeletedAsset {
                key: "never-uploaded".into(),
                existed: false
            }
        );
    }

    #[tokio::test]
    async fn list_all_reflects_uploads_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        store
            .upload("a", Bytes::from_static(b"A"), "a.png")
            .await
            .unwrap();
        let b = store
            .upload("b", Bytes::from_static(b"B"), "b.png")
            .await
            .unwrap();
        store.delete("a").await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.get("b"), Some(&b.url));
    }

    #[tokio::test]
    async fn invalid_uploads_mutate_neither_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        let err = store
            .upload("", Bytes::from_static(b"A"), "a.png")
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Invalid { .. }));

        let err = store
            .upload("logo", Bytes::new(), "a.png")
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Invalid { .. }));

        assert!(files_in(dir.path()).is_empty());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_uploads_to_one_key_leave_one_record_backed_by_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(dir.path()).await);

        let mut handles = Vec::new();
        for i in 0u8..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upload("banner", Bytes::from(vec![i]), "banner.png")
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        // No winner is asserted, only coherence: one record, and the file
        // it references exists on disk.
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);

        let record_url = all.get("banner").unwrap();
        let file_ref = record_url.rsplit('/').next().unwrap();
        assert!(dir.path().join(file_ref).exists());
    }
}
