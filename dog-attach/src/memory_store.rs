use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;

use crate::{AttachError, AttachResult, BlobStore, Visibility};

/// In-memory store for testing and development.
///
/// Counts writes and directory deletes so callers can assert on how often
/// the store was touched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<BTreeMap<String, StoredBlob>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
}

#[derive(Debug, Clone)]
struct StoredBlob {
    content: Bytes,
    visibility: Visibility,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls served so far
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of `delete_dir` calls served so far
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Every stored path, sorted
    pub fn paths(&self) -> Vec<String> {
        self.blobs.read().keys().cloned().collect()
    }

    /// Visibility recorded for `path`
    pub fn visibility_of(&self, path: &str) -> Option<Visibility> {
        self.blobs.read().get(path).map(|blob| blob.visibility)
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn has(&self, path: &str) -> AttachResult<bool> {
        Ok(self.blobs.read().contains_key(path))
    }

    fn get(&self, path: &str) -> AttachResult<Bytes> {
        self.blobs
            .read()
            .get(path)
            .map(|blob| blob.content.clone())
            .ok_or_else(|| AttachError::not_found(path))
    }

    fn put(&self, path: &str, content: &[u8], visibility: Visibility) -> AttachResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.blobs.write().insert(
            path.to_string(),
            StoredBlob {
                content: Bytes::copy_from_slice(content),
                visibility,
            },
        );
        Ok(())
    }

    fn delete_dir(&self, path: &str) -> AttachResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut blobs = self.blobs.write();
        let before = blobs.len();
        blobs.retain(|key, _| !key.starts_with(&prefix));
        debug!("Removed {} blobs under {}", before - blobs.len(), prefix);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_has() {
        let store = MemoryStore::new();
        assert!(!store.has("a/b.txt").unwrap());

        store.put("a/b.txt", b"hello", Visibility::Private).unwrap();
        assert!(store.has("a/b.txt").unwrap());
        assert_eq!(store.get("a/b.txt").unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(store.visibility_of("a/b.txt"), Some(Visibility::Private));
        assert_eq!(store.put_count(), 1);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_dir_is_recursive_and_prefix_exact() {
        let store = MemoryStore::new();
        store.put("d/ab/stem/stem.png", b"1", Visibility::Public).unwrap();
        store.put("d/ab/stem/stem_thumb.png", b"2", Visibility::Public).unwrap();
        store.put("d/ab/stem/deep/x", b"3", Visibility::Public).unwrap();
        store.put("d/ab/stem2/stem2.png", b"4", Visibility::Public).unwrap();

        store.delete_dir("d/ab/stem").unwrap();

        assert_eq!(store.paths(), vec!["d/ab/stem2/stem2.png".to_string()]);
        assert_eq!(store.delete_count(), 1);
    }
}
