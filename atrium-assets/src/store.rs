use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;

use crate::{AssetResult, AssetStoreConfig};

/// Physical file storage - must be implemented by all storage backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist raw bytes under a generated name and return the file ref
    async fn put(&self, bytes: Bytes, original_name: &str, key_hint: &str) -> AssetResult<String>;

    /// Delete a file by ref. An already-missing file is a no-op, not an
    /// error: cleanup must never fail the operation that triggered it.
    async fn remove(&self, file_ref: &str) -> AssetResult<()>;

    /// Externally resolvable URL for a file ref
    fn public_url(&self, file_ref: &str) -> String;
}

/// Reduce a caller-supplied name to a filesystem-safe token: keep
/// `[A-Za-z0-9._-]`, replace everything else with `_`. This closes path
/// traversal and OS-reserved characters in one pass.
pub fn sanitize_token(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Local-filesystem blob store.
///
/// Files land in one flat directory under generated names of the form
/// `{millis}_{key}_{name}`. The millis component comes from a monotonic
/// counter seeded from the wall clock, so concurrent puts in the same
/// millisecond still get distinct names and can never overwrite an
/// unrelated file.
pub struct FsBlobStore {
    dir: PathBuf,
    public_base_url: String,
    clock: AtomicI64,
}

impl FsBlobStore {
    pub async fn new(config: AssetStoreConfig) -> AssetResult<Self> {
        tokio::fs::create_dir_all(&config.upload_dir).await?;

        Ok(Self {
            dir: config.upload_dir,
            public_base_url: config
                .public_base_url
                .trim_end_matches('/')
                .to_string(),
            clock: AtomicI64::new(0),
        })
    }

    /// Directory files are stored in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Strictly-increasing millisecond timestamps. Tracks the wall clock
    /// but never repeats or goes backwards within this process.
    fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.clock.load(Ordering::SeqCst);
        loop {
            let next = now.max(last + 1);
            match self
                .clock
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }

    fn file_ref_for(&self, original_name: &str, key_hint: &str) -> String {
        let name = sanitize_token(original_name);
        let name = if name.is_empty() { "file".to_string() } else { name };
        let key = sanitize_token(key_hint);

        format!("{}_{}_{}", self.next_millis(), key, name)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, bytes: Bytes, original_name: &str, key_hint: &str) -> AssetResult<String> {
        let file_ref = self.file_ref_for(original_name, key_hint);
        let path = self.dir.join(&file_ref);

        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(file_ref = %file_ref, size = bytes.len(), "stored asset file");

        Ok(file_ref)
    }

    async fn remove(&self, file_ref: &str) -> AssetResult<()> {
        let path = self.dir.join(file_ref);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, file_ref: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url,
            urlencoding::encode(file_ref)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_in(dir: &Path) -> FsBlobStore {
        FsBlobStore::new(
            AssetStoreConfig::new()
                .with_upload_dir(dir)
                .with_public_base_url("http://localhost:3030/uploads/"),
        )
        .await
        .unwrap()
    }

    #[test]
    fn sanitize_keeps_the_allow_list_and_replaces_the_rest() {
        assert_eq!(sanitize_token("logo.png"), "logo.png");
        assert_eq!(sanitize_token("hero banner (1).png"), "hero_banner__1_.png");
        assert_eq!(sanitize_token("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_token("naïve café.jpg"), "na_ve_caf_.jpg");
    }

    #[tokio::test]
    async fn put_writes_the_bytes_under_the_generated_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        let file_ref = store
            .put(Bytes::from_static(b"png bytes"), "logo.png", "logo")
            .await
            .unwrap();

        assert!(file_ref.ends_with("_logo_logo.png"));
        let on_disk = std::fs::read(dir.path().join(&file_ref)).unwrap();
        assert_eq!(on_disk, b"png bytes");
    }

    #[tokio::test]
    async fn concurrent_puts_never_collide_on_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(store_in(dir.path()).await);

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .put(Bytes::from(vec![i as u8]), "pic.png", "gallery")
                    .await
                    .unwrap()
            }));
        }

        let mut refs = Vec::new();
        for h in handles {
            refs.push(h.await.unwrap());
        }
        refs.sort();
        refs.dedup();
        assert_eq!(refs.len(), 16);
    }

    #[tokio::test]
    async fn remove_of_a_missing_file_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        store.remove("1700000000000_logo_gone.png").await.unwrap();
    }

    #[tokio::test]
    async fn public_url_is_escaped_and_rooted_at_the_base() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        let url = store.public_url("1700000000000_logo_logo.png");
        assert_eq!(
            url,
            "http://localhost:3030/uploads/1700000000000_logo_logo.png"
        );
    }
}
