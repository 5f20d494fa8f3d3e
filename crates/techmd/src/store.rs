//! On-disk document store with injected memoization
//!
//! One JSON document per druid under a metadata root, rewritten atomically.
//! The cache is an explicit seam: callers inject it instead of this crate
//! holding process-wide state.

use crate::document::TechDocument;
use crate::Result;
use dashmap::DashMap;
use plinth_core::druid::Druid;
use plinth_core::fsops::atomic_write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cache seam for parsed documents
pub trait DocumentCache {
    fn get(&self, druid: &Druid) -> Option<Arc<TechDocument>>;
    fn put(&self, druid: &Druid, doc: Arc<TechDocument>);
    fn invalidate(&self, druid: &Druid);
}

/// In-memory cache backed by a concurrent map
#[derive(Default)]
pub struct MemoryCache {
    inner: DashMap<Druid, Arc<TechDocument>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentCache for MemoryCache {
    fn get(&self, druid: &Druid) -> Option<Arc<TechDocument>> {
        self.inner.get(druid).map(|entry| Arc::clone(&entry))
    }

    fn put(&self, druid: &Druid, doc: Arc<TechDocument>) {
        self.inner.insert(druid.clone(), doc);
    }

    fn invalidate(&self, druid: &Druid) {
        self.inner.remove(druid);
    }
}

/// A cache that never remembers, for callers that want every read from disk
#[derive(Default)]
pub struct NoCache;

impl DocumentCache for NoCache {
    fn get(&self, _druid: &Druid) -> Option<Arc<TechDocument>> {
        None
    }

    fn put(&self, _druid: &Druid, _doc: Arc<TechDocument>) {}

    fn invalidate(&self, _druid: &Druid) {}
}

/// Stores one technical-metadata document per druid
pub struct DocumentStore<C: DocumentCache> {
    root: PathBuf,
    cache: C,
}

impl<C: DocumentCache> DocumentStore<C> {
    pub fn new(root: PathBuf, cache: C) -> Self {
        Self { root, cache }
    }

    fn doc_path(&self, druid: &Druid) -> PathBuf {
        self.root.join(format!("{}.json", druid.id()))
    }

    /// Load a druid's document, hitting the cache first
    ///
    /// Returns None when no document was ever persisted (first version).
    pub fn load(&self, druid: &Druid) -> Result<Option<Arc<TechDocument>>> {
        if let Some(cached) = self.cache.get(druid) {
            return Ok(Some(cached));
        }

        let path = self.doc_path(druid);
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&path)?;
        let doc = Arc::new(TechDocument::from_json(&raw)?);
        self.cache.put(druid, Arc::clone(&doc));
        Ok(Some(doc))
    }

    /// Persist a druid's document atomically and refresh the cache
    pub fn save(&self, druid: &Druid, doc: TechDocument) -> Result<()> {
        let json = doc.to_json()?;
        let tmp_dir = self.root.join("tmp");

        atomic_write(&tmp_dir, &self.doc_path(druid), json.as_bytes())
            .map_err(crate::TechmdError::Write)?;

        self.cache.put(druid, Arc::new(doc));
        Ok(())
    }

    /// Drop a druid's document and forget it
    ///
    /// Idempotent: OK if no document exists.
    pub fn remove(&self, druid: &Druid) -> Result<()> {
        let path = self.doc_path(druid);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        self.cache.invalidate(druid);
        Ok(())
    }

    /// The metadata root this store reads and writes under
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FileRecord;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn druid() -> Druid {
        Druid::parse("ab123cd4567").unwrap()
    }

    fn doc(marker: &str) -> TechDocument {
        TechDocument::new(
            "ab123cd4567",
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            vec![FileRecord {
                path: "page-1.jpg".into(),
                properties: json!({"marker": marker}),
            }],
        )
    }

    #[test]
    fn test_save_and_load() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let store = DocumentStore::new(temp.path().to_path_buf(), MemoryCache::new());

        store.save(&druid(), doc("v1"))?;

        let loaded = store.load(&druid())?.expect("document should exist");
        assert_eq!(loaded.files[0].properties["marker"], "v1");

        Ok(())
    }

    #[test]
    fn test_load_absent_is_none() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let store = DocumentStore::new(temp.path().to_path_buf(), MemoryCache::new());

        assert!(store.load(&druid())?.is_none());
        Ok(())
    }

    #[test]
    fn test_load_hits_cache() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let store = DocumentStore::new(temp.path().to_path_buf(), MemoryCache::new());

        store.save(&druid(), doc("v1"))?;

        // Remove the file behind the cache; a memoized load still answers
        std::fs::remove_file(temp.path().join("ab123cd4567.json"))?;
        assert!(store.load(&druid())?.is_some());

        Ok(())
    }

    #[test]
    fn test_no_cache_reads_disk_every_time() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let store = DocumentStore::new(temp.path().to_path_buf(), NoCache);

        store.save(&druid(), doc("v1"))?;
        std::fs::remove_file(temp.path().join("ab123cd4567.json"))?;

        assert!(store.load(&druid())?.is_none());
        Ok(())
    }

    #[test]
    fn test_save_replaces_document() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let store = DocumentStore::new(temp.path().to_path_buf(), MemoryCache::new());

        store.save(&druid(), doc("v1"))?;
        store.save(&druid(), doc("v2"))?;

        let loaded = store.load(&druid())?.unwrap();
        assert_eq!(loaded.files[0].properties["marker"], "v2");

        Ok(())
    }

    #[test]
    fn test_remove_is_idempotent() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let store = DocumentStore::new(temp.path().to_path_buf(), MemoryCache::new());

        store.save(&druid(), doc("v1"))?;
        store.remove(&druid())?;
        store.remove(&druid())?;

        assert!(store.load(&druid())?.is_none());
        Ok(())
    }
}
