use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AttachResult;

/// Blob storage primitives - must be implemented by every backend.
///
/// Paths are store-relative strings built by the attachment handles. Calls
/// block until the backend answers.
pub trait BlobStore: Send + Sync {
    /// Whether a blob exists at `path`
    fn has(&self, path: &str) -> AttachResult<bool>;

    /// Read the whole blob at `path`
    fn get(&self, path: &str) -> AttachResult<Bytes>;

    /// Write `content` to `path`, replacing any previous blob
    fn put(&self, path: &str, content: &[u8], visibility: Visibility) -> AttachResult<()>;

    /// Recursively delete the directory at `path`
    fn delete_dir(&self, path: &str) -> AttachResult<()>;
}

/// Access hint passed along with every write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// Strategy for generating the unique part of stored filenames
pub trait FilenameStrategy: Send + Sync {
    /// A new identifier, effectively unique within the attachment's directory scope
    fn unique_id(&self) -> String;
}

/// Default strategy: 32 hex characters of a random v4 UUID
#[derive(Debug, Clone, Default)]
pub struct UuidFilenames;

impl FilenameStrategy for UuidFilenames {
    fn unique_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_filenames_are_hex_and_distinct() {
        let names = UuidFilenames;
        let a = names.unique_id();
        let b = names.unique_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_visibility_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Visibility::Public).unwrap(), "\"public\"");
        assert_eq!(Visibility::Private.as_str(), "private");
    }
}
