use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::AttachResult;

/// Something content can be attached from
pub trait UploadSource {
    /// Read the full content
    fn read_all(&self) -> AttachResult<Bytes>;

    /// Size of the content in bytes
    fn size(&self) -> AttachResult<u64>;

    /// Extension declared by the client that sent the upload, if any
    fn client_extension(&self) -> Option<String> {
        None
    }

    /// Extension of the file's own path, if any
    fn path_extension(&self) -> Option<String> {
        None
    }

    /// Client-declared extension, falling back to the path extension
    fn extension(&self) -> Option<String> {
        self.client_extension().or_else(|| self.path_extension())
    }
}

/// A file on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub path: PathBuf,
}

impl LocalFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl UploadSource for LocalFile {
    fn read_all(&self) -> AttachResult<Bytes> {
        Ok(Bytes::from(fs::read(&self.path)?))
    }

    fn size(&self) -> AttachResult<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    fn path_extension(&self) -> Option<String> {
        extension_of(&self.path)
    }
}

/// An upload spooled to a temporary file, with the name the client sent.
///
/// Only the client's filename supplies the extension; the spool path's
/// own name is never used.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub client_filename: Option<String>,
}

impl UploadedFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            client_filename: None,
        }
    }

    pub fn with_client_filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.client_filename = Some(filename.into());
        self
    }
}

impl UploadSource for UploadedFile {
    fn read_all(&self) -> AttachResult<Bytes> {
        Ok(Bytes::from(fs::read(&self.path)?))
    }

    fn size(&self) -> AttachResult<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    fn client_extension(&self) -> Option<String> {
        self.client_filename
            .as_deref()
            .and_then(|name| extension_of(Path::new(name)))
    }
}

/// An upload already held in memory, e.g. a parsed multipart field
#[derive(Debug, Clone)]
pub struct InMemoryUpload {
    pub data: Bytes,
    pub client_filename: Option<String>,
}

impl InMemoryUpload {
    pub fn new<B: Into<Bytes>>(data: B) -> Self {
        Self {
            data: data.into(),
            client_filename: None,
        }
    }

    pub fn with_client_filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.client_filename = Some(filename.into());
        self
    }
}

impl UploadSource for InMemoryUpload {
    fn read_all(&self) -> AttachResult<Bytes> {
        Ok(self.data.clone())
    }

    fn size(&self) -> AttachResult<u64> {
        Ok(self.data.len() as u64)
    }

    fn client_extension(&self) -> Option<String> {
        self.client_filename
            .as_deref()
            .and_then(|name| extension_of(Path::new(name)))
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
}
