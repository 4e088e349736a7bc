use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{AttachError, AttachResult, BlobStore, Visibility};

/// Store rooted at a local directory.
///
/// Each write goes to its own temporary sibling and is renamed into place,
/// so concurrent writers to one path never share a temp file.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store-relative path below the root, refusing anything that could escape it
    fn full_path(&self, path: &str) -> AttachResult<PathBuf> {
        let relative = Path::new(path);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(AttachError::invalid(format!(
                        "Path escapes the store root: {}",
                        path
                    )))
                }
            }
        }
        Ok(self.root.join(relative))
    }

    #[cfg(unix)]
    fn apply_visibility(path: &Path, visibility: Visibility) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let mode = match visibility {
            Visibility::Public => 0o644,
            Visibility::Private => 0o600,
        };
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }

    #[cfg(not(unix))]
    fn apply_visibility(_path: &Path, _visibility: Visibility) -> io::Result<()> {
        Ok(())
    }
}

impl BlobStore for FilesystemStore {
    fn has(&self, path: &str) -> AttachResult<bool> {
        let full_path = self.full_path(path)?;
        match fs::metadata(&full_path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn get(&self, path: &str) -> AttachResult<Bytes> {
        let full_path = self.full_path(path)?;
        match fs::read(&full_path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(AttachError::not_found(path)),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, path: &str, content: &[u8], visibility: Visibility) -> AttachResult<()> {
        let full_path = self.full_path(path)?;
        debug!("fs_store: write {} ({} bytes)", full_path.display(), content.len());

        let parent = full_path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(parent).map_err(|e| {
            warn!("fs_store: create_dir_all {} failed: {}", parent.display(), e);
            e
        })?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
            warn!("fs_store: temp file in {} failed: {}", parent.display(), e);
            e
        })?;
        temp.write_all(content)?;
        temp.as_file().sync_all()?;

        Self::apply_visibility(temp.path(), visibility)?;
        temp.persist(&full_path).map_err(|e| {
            warn!("fs_store: persist {} failed: {}", full_path.display(), e);
            AttachError::backend(e)
        })?;
        Ok(())
    }

    fn delete_dir(&self, path: &str) -> AttachResult<()> {
        let full_path = self.full_path(path)?;
        if full_path == self.root {
            return Err(AttachError::invalid("Refusing to delete the store root"));
        }
        debug!("fs_store: remove_dir_all {}", full_path.display());
        fs::remove_dir_all(&full_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());

        store.put("data/ab/12/stem/stem.png", b"pixels", Visibility::Public).unwrap();

        assert!(store.has("data/ab/12/stem/stem.png").unwrap());
        assert!(!store.has("data/ab/12/stem").unwrap());
        assert_eq!(store.get("data/ab/12/stem/stem.png").unwrap(), Bytes::from_static(b"pixels"));
        let entries = fs::read_dir(dir.path().join("data/ab/12/stem")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_concurrent_writers_to_one_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());
        let path = "d/ab/stem/stem_thumb.png";

        std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8u8)
                .map(|worker| {
                    let store = &store;
                    scope.spawn(move || {
                        let content = vec![worker; 64 * 1024];
                        for _ in 0..20 {
                            store.put(path, &content, Visibility::Public)?;
                        }
                        Ok::<_, AttachError>(())
                    })
                })
                .collect();
            for worker in workers {
                worker.join().unwrap().unwrap();
            }
        });

        let stored = store.get(path).unwrap();
        assert_eq!(stored.len(), 64 * 1024);
        assert!(stored.iter().all(|b| *b == stored[0]));
        let entries = fs::read_dir(dir.path().join("d/ab/stem")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_missing_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());

        assert!(!store.has("nothing/here").unwrap());
        assert!(store.get("nothing/here").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_dir_removes_everything_below() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());
        store.put("d/ab/stem/stem.png", b"1", Visibility::Public).unwrap();
        store.put("d/ab/stem/stem_small.png", b"2", Visibility::Public).unwrap();

        store.delete_dir("d/ab/stem").unwrap();

        assert!(!dir.path().join("d/ab/stem").exists());
        assert!(dir.path().join("d/ab").exists());
    }

    #[test]
    fn test_delete_missing_dir_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());
        let err = store.delete_dir("never/created").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());

        assert!(matches!(
            store.put("../outside.txt", b"x", Visibility::Public),
            Err(AttachError::Invalid { .. })
        ));
        assert!(matches!(store.has("/etc/passwd"), Err(AttachError::Invalid { .. })));
        assert!(matches!(store.delete_dir(""), Err(AttachError::Invalid { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_private_visibility_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path());
        store.put("secret.bin", b"x", Visibility::Private).unwrap();

        let mode = fs::metadata(dir.path().join("secret.bin")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
