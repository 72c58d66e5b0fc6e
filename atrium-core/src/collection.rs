//! Persisted JSON document collections.
//!
//! Each collection is an id → document map held behind a `tokio` RwLock
//! and snapshotted to a single JSON file after every mutation. The write
//! path goes through a temp file + rename, so a mutation is atomic at the
//! file level: readers either see the previous snapshot or the new one.
//! There are no transactions across collections.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

struct Inner<T> {
    path: Option<PathBuf>,
    docs: RwLock<HashMap<String, T>>,
}

/// A persisted id → document map.
///
/// Documents are held in memory; the whole map is flushed to disk on each
/// mutation. Collections opened without a path are memory-only, which the
/// test suites use.
pub struct JsonCollection<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for JsonCollection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Memory-only collection, nothing touches disk.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                path: None,
                docs: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Open a collection backed by `path`, loading the existing snapshot
    /// if one is present.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating collection dir {}", parent.display()))?;
        }

        let docs = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing collection snapshot {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading collection {}", path.display()))
            }
        };

        Ok(Self {
            inner: Arc::new(Inner {
                path: Some(path),
                docs: RwLock::new(docs),
            }),
        })
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.inner.docs.read().await.get(id).cloned()
    }

    pub async fn list(&self) -> Vec<T> {
        self.inner.docs.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.docs.read().await.is_empty()
    }

    /// Atomic create-or-replace.
    pub async fn upsert(&self, id: &str, doc: T) -> Result<T> {
        let mut docs = self.inner.docs.write().await;
        docs.insert(id.to_string(), doc.clone());
        self.persist(&docs).await?;
        Ok(doc)
    }

    /// Atomic create-or-replace where the new document is computed from
    /// the prior one under the same write lock.
    pub async fn upsert_with<F>(&self, id: &str, f: F) -> Result<T>
    where
        F: FnOnce(Option<&T>) -> T,
    {
        let mut docs = self.inner.docs.write().await;
        let doc = f(docs.get(id));
        docs.insert(id.to_string(), doc.clone());
        self.persist(&docs).await?;
        Ok(doc)
    }

    /// Atomic remove-and-return-prior. Returns None if the id was absent.
    pub async fn remove(&self, id: &str) -> Result<Option<T>> {
        let mut docs = self.inner.docs.write().await;
        let prior = docs.remove(id);
        if prior.is_some() {
            self.persist(&docs).await?;
        }
        Ok(prior)
    }

    /// Flush the current map to disk. Called with the write lock held so
    /// snapshots never interleave.
    async fn persist(&self, docs: &HashMap<String, T>) -> Result<()> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(docs).context("serializing collection")?;
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &bytes)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("renaming {} into place", tmp.display()))?;

        Ok(())
    }
}
