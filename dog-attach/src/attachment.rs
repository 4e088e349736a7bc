use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use crate::{
    shard::{shard_dir, split_filename},
    AttachConfig, AttachError, AttachResult, BlobStore, FieldAccess, FilenameStrategy,
    ShardDepth, UploadSource, UuidFilenames, Visibility,
};

/// Attempts at drawing a filename that differs from the one being replaced
const MAX_NAME_ATTEMPTS: usize = 8;

/// Binds one field of an owning record to a blob in a [`BlobStore`].
///
/// The field holds only the generated filename; everything else (directory,
/// path, URL) is derived from it:
///
/// ```text
/// {base_directory}{shard segments}{stem}/{stem}.{ext}
/// ```
pub struct AttachmentHandle<O> {
    owner: O,
    field: String,
    store: Arc<dyn BlobStore>,
    filenames: Arc<dyn FilenameStrategy>,
    base_directory: String,
    base_url: String,
    depth: ShardDepth,
    visibility: Visibility,
}

impl<O: FieldAccess> AttachmentHandle<O> {
    /// Create a handle for `field` on `owner`.
    ///
    /// Fails with [`AttachError::ShardDepthOutOfRange`] when the configured
    /// depth is outside `1..=6`.
    pub fn new<S: Into<String>>(
        owner: O,
        field: S,
        store: Arc<dyn BlobStore>,
        config: AttachConfig,
    ) -> AttachResult<Self> {
        let depth = ShardDepth::new(config.shard_depth)?;
        let config = config.normalized();

        Ok(Self {
            owner,
            field: field.into(),
            store,
            filenames: Arc::new(UuidFilenames),
            base_directory: config.base_directory,
            base_url: config.base_url,
            depth,
            visibility: config.visibility,
        })
    }

    /// Use a custom filename strategy
    pub fn with_filenames<F: FilenameStrategy + 'static>(mut self, filenames: F) -> Self {
        self.filenames = Arc::new(filenames);
        self
    }

    /// The filename currently stored in the owner's field, if not blank
    pub fn stored_filename(&self) -> Option<String> {
        self.owner
            .get_field(&self.field)
            .filter(|value| !value.is_empty())
    }

    /// Whether the owner's field names a blob
    pub fn attached(&self) -> bool {
        self.stored_filename().is_some()
    }

    /// Whether the field names a blob and the store actually holds it
    pub fn has_data(&self) -> AttachResult<bool> {
        match self.stored_filename() {
            Some(filename) => self.store.has(&self.primary_path_for(&filename)),
            None => Ok(false),
        }
    }

    /// Store-relative path of the primary blob
    pub fn get_path(&self) -> Option<String> {
        self.stored_filename()
            .map(|filename| self.primary_path_for(&filename))
    }

    /// Public URL of the primary blob
    pub fn get_url(&self) -> Option<String> {
        self.get_path().map(|path| self.url_for(&path))
    }

    /// Content of the primary blob
    pub fn get_content(&self) -> AttachResult<Option<Bytes>> {
        match self.get_path() {
            Some(path) => Ok(Some(self.store.get(&path)?)),
            None => Ok(None),
        }
    }

    /// Directory holding the primary blob and every derived blob
    pub fn directory(&self) -> Option<String> {
        self.stored_filename()
            .map(|filename| self.directory_for(&filename))
    }

    /// Replace whatever is attached with `content`.
    ///
    /// Returns the newly generated filename, which is also written to the
    /// owner's field.
    pub fn attach_content(&mut self, content: &[u8], extension: &str) -> AttachResult<String> {
        let previous = self.stored_filename();
        let filename = self.next_filename(extension, previous.as_deref())?;
        self.clear()?;

        self.owner.set_field(&self.field, filename.clone());

        let path = self.primary_path_for(&filename);
        self.store.put(&path, content, self.visibility)?;

        info!("Attached {} ({} bytes) to field {}", filename, content.len(), self.field);
        Ok(filename)
    }

    /// Read `source` fully and attach it
    pub fn attach_file<U: UploadSource + ?Sized>(&mut self, source: &U) -> AttachResult<String> {
        let content = source.read_all()?;
        let extension = source.extension().unwrap_or_default();
        self.attach_content(&content, &extension)
    }

    /// Delete the attachment's directory if the primary blob exists, keeping the field
    pub fn clear_data(&mut self) -> AttachResult<()> {
        if self.has_data()? {
            if let Some(dir) = self.directory() {
                debug!("Deleting attachment directory {}", dir);
                self.store.delete_dir(&dir)?;
            }
        }
        Ok(())
    }

    /// Delete the attachment's directory and blank the field
    pub fn clear(&mut self) -> AttachResult<()> {
        self.clear_data()?;
        if self.attached() {
            info!("Cleared field {}", self.field);
        }
        self.owner.set_field(&self.field, String::new());
        Ok(())
    }

    /// Name of the owner's field
    pub fn field_name(&self) -> &str {
        &self.field
    }

    pub fn owner(&self) -> &O {
        &self.owner
    }

    pub fn owner_mut(&mut self) -> &mut O {
        &mut self.owner
    }

    pub fn into_owner(self) -> O {
        self.owner
    }

    pub fn base_directory(&self) -> &str {
        &self.base_directory
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn shard_depth(&self) -> ShardDepth {
        self.depth
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub(crate) fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }

    pub(crate) fn directory_for(&self, filename: &str) -> String {
        let (stem, _) = split_filename(filename);
        format!("{}{}", shard_dir(&self.base_directory, filename, self.depth), stem)
    }

    pub(crate) fn primary_path_for(&self, filename: &str) -> String {
        format!("{}/{}", self.directory_for(filename), filename)
    }

    pub(crate) fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn next_filename(&self, extension: &str, previous: Option<&str>) -> AttachResult<String> {
        let extension = extension.to_lowercase();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let id = self.filenames.unique_id();
            let filename = if extension.is_empty() {
                id
            } else {
                format!("{}.{}", id, extension)
            };
            if previous != Some(filename.as_str()) {
                return Ok(filename);
            }
            debug!("Filename strategy repeated {}, drawing again", filename);
        }
        Err(AttachError::invalid(
            "Filename strategy keeps repeating the current filename",
        ))
    }
}
