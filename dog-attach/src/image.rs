use std::collections::{BTreeMap, HashSet};

use bytes::Bytes;
use tracing::{debug, warn};

use crate::{
    probe::{data_uri, probe},
    shard::split_filename,
    AttachError, AttachResult, AttachmentHandle, FieldAccess, ImageOptions, Materialize,
    UploadSource, VariantSpec,
};

/// How [`ImageAttachment::get_url`] renders its answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UrlFormat {
    /// Public URL of the stored blob
    #[default]
    Link,
    /// Inline `data:` URI carrying the content itself
    Base64,
}

/// An [`AttachmentHandle`] for images, with named derived variants.
///
/// Variants live next to the primary blob:
///
/// ```text
/// {base_directory}{shard segments}{stem}/{stem}.{ext}          primary
/// {base_directory}{shard segments}{stem}/{stem}_{variant}.{ext} variant
/// ```
///
/// so clearing or replacing the primary blob drops every variant with it.
pub struct ImageAttachment<O> {
    handle: AttachmentHandle<O>,
    variants: BTreeMap<String, VariantSpec>,
    options: ImageOptions,
}

impl<O: FieldAccess> ImageAttachment<O> {
    /// Wrap `handle` with a variant table.
    ///
    /// Variant names must be non-empty, free of path separators and unique
    /// ignoring case, since they are lowercased into storage paths.
    pub fn new<I>(handle: AttachmentHandle<O>, variants: I) -> AttachResult<Self>
    where
        I: IntoIterator<Item = VariantSpec>,
    {
        let mut table = BTreeMap::new();
        let mut lowered = HashSet::new();

        for spec in variants {
            let name = spec.name();
            if name.is_empty() {
                return Err(AttachError::invalid_variant("variant name is empty"));
            }
            if name.contains('/') || name.contains('\\') || name.contains("..") {
                return Err(AttachError::invalid_variant(format!(
                    "variant name \"{}\" is not a valid path component",
                    name
                )));
            }
            if !lowered.insert(name.to_lowercase()) {
                return Err(AttachError::invalid_variant(format!(
                    "variant name \"{}\" is declared more than once",
                    name
                )));
            }
            table.insert(name.to_string(), spec);
        }

        Ok(Self {
            handle,
            variants: table,
            options: ImageOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ImageOptions) -> Self {
        self.options = options;
        self
    }

    /// Configured variant names, sorted
    pub fn variant_names(&self) -> Vec<&str> {
        self.variants.keys().map(String::as_str).collect()
    }

    pub fn variant(&self, name: &str) -> Option<&VariantSpec> {
        self.variants.get(name)
    }

    pub fn handle(&self) -> &AttachmentHandle<O> {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut AttachmentHandle<O> {
        &mut self.handle
    }

    pub fn into_handle(self) -> AttachmentHandle<O> {
        self.handle
    }

    pub fn stored_filename(&self) -> Option<String> {
        self.handle.stored_filename()
    }

    pub fn attached(&self) -> bool {
        self.handle.attached()
    }

    pub fn has_data(&self) -> AttachResult<bool> {
        self.handle.has_data()
    }

    /// Whether the primary blob (`None`) or a variant blob is in the store
    pub fn has_variant_data(&self, variant: Option<&str>) -> AttachResult<bool> {
        let Some(filename) = self.attached_filename(variant)? else {
            return Ok(false);
        };
        let path = self.path_for(&filename, variant)?;
        self.handle.store().has(&path)
    }

    /// Decide whether `variant` must be computed for this read.
    ///
    /// Returns the freshly produced bytes when the variant is on-demand or
    /// not yet materialized (storing them unless on-demand), and `None` when
    /// the stored blob should be read instead. `None` is also returned for
    /// the primary blob and for unattached handles.
    pub fn resolve(&self, variant: Option<&str>) -> AttachResult<Option<Bytes>> {
        let Some(name) = variant else {
            return Ok(None);
        };
        let spec = self.spec(name)?;
        let Some(filename) = self.handle.stored_filename() else {
            return Ok(None);
        };

        let path = self.variant_path(&filename, spec);
        let recompute = match spec.policy() {
            Materialize::OnDemand => true,
            Materialize::OnAttach => false,
            Materialize::OnGet => !self.handle.store().has(&path)?,
        };
        if !recompute {
            return Ok(None);
        }

        let source = self
            .handle
            .store()
            .get(&self.handle.primary_path_for(&filename))?;
        self.materialize(spec, &source, &path).map(Some)
    }

    /// Content of the primary blob or of a variant
    pub fn get_content(&self, variant: Option<&str>) -> AttachResult<Option<Bytes>> {
        let Some(filename) = self.attached_filename(variant)? else {
            return Ok(None);
        };
        if let Some(content) = self.resolve(variant)? {
            return Ok(Some(content));
        }
        let path = self.path_for(&filename, variant)?;
        Ok(Some(self.handle.store().get(&path)?))
    }

    /// Store-relative path of the primary blob or of a variant, materializing it first
    pub fn get_path(&self, variant: Option<&str>) -> AttachResult<Option<String>> {
        let Some(filename) = self.attached_filename(variant)? else {
            return Ok(None);
        };
        self.resolve(variant)?;
        self.path_for(&filename, variant).map(Some)
    }

    /// URL of the primary blob or of a variant, as a link or an inline data URI
    pub fn get_url(&self, variant: Option<&str>, format: UrlFormat) -> AttachResult<Option<String>> {
        match format {
            UrlFormat::Link => Ok(self
                .get_path(variant)?
                .map(|path| self.handle.url_for(&path))),
            UrlFormat::Base64 => Ok(self
                .get_content(variant)?
                .map(|content| data_uri(&content))),
        }
    }

    /// Attach image content and materialize every on-attach variant.
    ///
    /// Without `extension` the probed format's extension is used. Content the
    /// probe does not recognise leaves the attachment untouched and returns
    /// `Ok(None)`, or fails with [`AttachError::NotAnImage`] when
    /// `ImageOptions::reject_non_images` is set.
    pub fn attach_content(
        &mut self,
        content: &[u8],
        extension: Option<&str>,
    ) -> AttachResult<Option<String>> {
        let Some(format) = probe(content) else {
            if self.options.reject_non_images {
                return Err(AttachError::NotAnImage);
            }
            warn!(
                "Ignoring non-image content ({} bytes) for field {}",
                content.len(),
                self.handle.field_name()
            );
            return Ok(None);
        };

        let extension = extension.unwrap_or(format.extension());
        let filename = self.handle.attach_content(content, extension)?;

        for spec in self
            .variants
            .values()
            .filter(|spec| spec.policy() == Materialize::OnAttach)
        {
            let path = self.variant_path(&filename, spec);
            self.materialize(spec, content, &path)?;
        }

        Ok(Some(filename))
    }

    /// Read `source` fully and attach it as an image
    pub fn attach_file<U: UploadSource + ?Sized>(
        &mut self,
        source: &U,
    ) -> AttachResult<Option<String>> {
        let content = source.read_all()?;
        let extension = source.extension();
        self.attach_content(&content, extension.as_deref())
    }

    /// Delete the primary blob with all variants and blank the field
    pub fn clear(&mut self) -> AttachResult<()> {
        self.handle.clear()
    }

    fn spec(&self, name: &str) -> AttachResult<&VariantSpec> {
        self.variants
            .get(name)
            .ok_or_else(|| AttachError::unsupported_variant(name))
    }

    /// Validates `variant` before looking at the field, so unknown names fail even when unattached
    fn attached_filename(&self, variant: Option<&str>) -> AttachResult<Option<String>> {
        if let Some(name) = variant {
            self.spec(name)?;
        }
        Ok(self.handle.stored_filename())
    }

    fn path_for(&self, filename: &str, variant: Option<&str>) -> AttachResult<String> {
        match variant {
            Some(name) => Ok(self.variant_path(filename, self.spec(name)?)),
            None => Ok(self.handle.primary_path_for(filename)),
        }
    }

    fn variant_path(&self, filename: &str, spec: &VariantSpec) -> String {
        let (stem, extension) = split_filename(filename);
        let variant_name = format!("{}_{}", stem, spec.name().to_lowercase());
        let name = match extension {
            Some(ext) => format!("{}.{}", variant_name, ext),
            None => variant_name,
        };
        format!("{}/{}", self.handle.directory_for(filename), name)
    }

    fn materialize(&self, spec: &VariantSpec, source: &[u8], path: &str) -> AttachResult<Bytes> {
        debug!("Computing variant {} ({:?}) from {} bytes", spec.name(), spec.policy(), source.len());
        let produced = spec
            .transform()
            .apply(source)
            .map_err(|err| AttachError::transform(spec.name(), err))?;

        if spec.policy().persists() {
            debug!("Materializing variant {} at {}", spec.name(), path);
            self.handle
                .store()
                .put(path, &produced, self.handle.visibility())?;
        }
        Ok(Bytes::from(produced))
    }
}
