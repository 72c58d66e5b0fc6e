use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use atrium_core::JsonCollection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AssetError, AssetResult};

/// Persisted record for one asset key.
///
/// `file_ref` is the generated physical filename currently backing the
/// key; `url` is derived from it. Replacing the key's file replaces both
/// and orphans the previous file for cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub key: String,
    #[serde(rename = "filename")]
    pub file_ref: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Key-unique asset metadata store
#[async_trait]
pub trait AssetIndex: Send + Sync {
    async fn get(&self, key: &str) -> AssetResult<Option<AssetRecord>>;

    async fn list(&self) -> AssetResult<Vec<AssetRecord>>;

    /// Atomic create-or-replace keyed on `key`. Preserves `created_at`
    /// across replacements and refreshes `updated_at`.
    async fn upsert(&self, key: &str, file_ref: &str, url: &str) -> AssetResult<AssetRecord>;

    /// Atomic remove-and-return-prior. The caller needs the prior record
    /// to know which physical file to clean up.
    async fn remove(&self, key: &str) -> AssetResult<Option<AssetRecord>>;
}

fn next_record(prior: Option<&AssetRecord>, key: &str, file_ref: &str, url: &str) -> AssetRecord {
    let now = Utc::now();
    AssetRecord {
        key: key.to_string(),
        file_ref: file_ref.to_string(),
        url: url.to_string(),
        created_at: prior.map(|r| r.created_at).unwrap_or(now),
        updated_at: now,
    }
}

/// In-memory index for tests and ephemeral setups
#[derive(Clone, Default)]
pub struct MemoryAssetIndex {
    records: Arc<Mutex<HashMap<String, AssetRecord>>>,
}

impl MemoryAssetIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetIndex for MemoryAssetIndex {
    async fn get(&self, key: &str) -> AssetResult<Option<AssetRecord>> {
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    async fn list(&self) -> AssetResult<Vec<AssetRecord>> {
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }

    async fn upsert(&self, key: &str, file_ref: &str, url: &str) -> AssetResult<AssetRecord> {
        let mut records = self.records.lock().unwrap();
        let record = next_record(records.get(key), key, file_ref, url);
        records.insert(key.to_string(), record.clone());
        Ok(record)
    }

    async fn remove(&self, key: &str) -> AssetResult<Option<AssetRecord>> {
        Ok(self.records.lock().unwrap().remove(key))
    }
}

/// Index persisted as a JSON collection on disk
#[derive(Clone)]
pub struct JsonAssetIndex {
    records: JsonCollection<AssetRecord>,
}

impl JsonAssetIndex {
    pub async fn open(path: impl AsRef<Path>) -> AssetResult<Self> {
        let records = JsonCollection::open(path)
            .await
            .map_err(AssetError::backend)?;
        Ok(Self { records })
    }
}

#[async_trait]
impl AssetIndex for JsonAssetIndex {
    async fn get(&self, key: &str) -> AssetResult<Option<AssetRecord>> {
        Ok(self.records.get(key).await)
    }

    async fn list(&self) -> AssetResult<Vec<AssetRecord>> {
        Ok(self.records.list().await)
    }

    async fn upsert(&self, key: &str, file_ref: &str, url: &str) -> AssetResult<AssetRecord> {
        self.records
            .upsert_with(key, |prior| next_record(prior, key, file_ref, url))
            .await
            .map_err(AssetError::backend)
    }

    async fn remove(&self, key: &str) -> AssetResult<Option<AssetRecord>> {
        self.records.remove(key).await.map_err(AssetError::backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_preserves_created_at_across_replacement() {
        let index = MemoryAssetIndex::new();

        let first = index
            .upsert("logo", "1_logo_a.png", "/uploads/1_logo_a.png")
            .await
            .unwrap();
        let second = index
            .upsert("logo", "2_logo_b.png", "/uploads/2_logo_b.png")
            .await
            .unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.file_ref, "2_logo_b.png");
    }

    #[tokio::test]
    async fn remove_returns_the_prior_record() {
        let index = MemoryAssetIndex::new();
        index
            .upsert("logo", "1_logo_a.png", "/uploads/1_logo_a.png")
            .await
            .unwrap();

        let prior = index.remove("logo").await.unwrap().unwrap();
        assert_eq!(prior.file_ref, "1_logo_a.png");
        assert!(index.remove("logo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn json_index_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");

        {
            let index = JsonAssetIndex::open(&path).await.unwrap();
            index
                .upsert("logo", "1_logo_a.png", "/uploads/1_logo_a.png")
                .await
                .unwrap();
        }

        let index = JsonAssetIndex::open(&path).await.unwrap();
        let record = index.get("logo").await.unwrap().unwrap();
        assert_eq!(record.url, "/uploads/1_logo_a.png");
    }

    #[test]
    fn record_wire_format_matches_the_persisted_layout() {
        let record = AssetRecord {
            key: "logo".into(),
            file_ref: "1_logo_a.png".into(),
            url: "/uploads/1_logo_a.png".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("filename").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("fileRef").is_none());
    }
}
