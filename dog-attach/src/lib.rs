//! # dog-attach: record-field attachments on top of blob storage
//!
//! `dog-attach` binds one field of a record to a blob in a [`BlobStore`]. The
//! field only ever holds a generated filename; the blob's directory, path and
//! public URL are all derived from it, spread over sharded directories so no
//! single directory grows without bound.
//!
//! For images, [`ImageAttachment`] adds named variants (thumbnails, previews,
//! ...) that are produced by an injected transform and stored next to the
//! original according to a per-variant [`Materialize`] policy:
//!
//! - **OnAttach**: computed and stored as soon as content is attached
//! - **OnGet**: computed and stored by the first read that finds it missing
//! - **OnDemand**: computed on every read, never stored
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dog_attach::prelude::*;
//!
//! # fn main() -> AttachResult<()> {
//! let store = Arc::new(MemoryStore::new());
//! let config = AttachConfig::for_field("User", "resume")
//!     .with_base_url("https://files.example.com")
//!     .with_shard_depth(2);
//!
//! let mut record = serde_json::Map::new();
//! let mut resume = AttachmentHandle::new(&mut record, "resume", store, config)?;
//!
//! resume.attach_content(b"%PDF-1.7 ...", "PDF")?;
//! assert!(resume.has_data()?);
//! assert!(resume.get_url().unwrap().starts_with("https://files.example.com/data/user/resume/"));
//!
//! resume.clear()?;
//! assert!(!resume.attached());
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout
//!
//! ```text
//! {base_directory}{shard segments}{stem}/{stem}.{ext}
//! {base_directory}{shard segments}{stem}/{stem}_{variant}.{ext}
//! ```
//!
//! With shard depth 2 and filename `ab12cd34.png` under `data/user/avatar/`:
//!
//! ```text
//! data/user/avatar/ab/12/ab12cd34/ab12cd34.png
//! data/user/avatar/ab/12/ab12cd34/ab12cd34_thumb.png
//! ```

mod attachment;
mod config;
mod error;
mod fs_store;
mod image;
mod memory_store;
pub mod probe;
pub mod shard;
pub mod store;
mod types;
mod upload;
mod variant;

// Re-export main types for clean API
pub use attachment::AttachmentHandle;
pub use config::{AttachConfig, ImageOptions};
pub use error::{AttachError, AttachResult};
pub use fs_store::FilesystemStore;
pub use image::{ImageAttachment, UrlFormat};
pub use memory_store::MemoryStore;
pub use probe::ImageFormat;
pub use shard::ShardDepth;
pub use store::{BlobStore, FilenameStrategy, UuidFilenames, Visibility};
pub use types::FieldAccess;
pub use upload::{InMemoryUpload, LocalFile, UploadSource, UploadedFile};
pub use variant::{Materialize, VariantSpec, VariantTransform};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AttachConfig, AttachError, AttachResult, AttachmentHandle, BlobStore, FieldAccess,
        ImageAttachment, Materialize, MemoryStore, UrlFormat, VariantSpec, Visibility,
    };
}
