use serde::{Deserialize, Serialize};

use crate::{AttachResult, Visibility};

/// Configuration for one attachment field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachConfig {
    /// Store-relative directory all blobs of this field live under
    pub base_directory: String,

    /// Public URL prefix the store serves `base_directory` from
    pub base_url: String,

    /// Number of 2-character shard levels (1..=6), checked when a handle is built
    pub shard_depth: u8,

    /// Access hint handed to the store on every write
    pub visibility: Visibility,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            base_directory: "data/".to_string(),
            base_url: "/".to_string(),
            shard_depth: 1,
            visibility: Visibility::Public,
        }
    }
}

impl AttachConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default layout for a record type and field: `data/<record>/<field>/`
    pub fn for_field(record_type: &str, field: &str) -> Self {
        Self::default().with_base_directory(format!(
            "data/{}/{}",
            record_type.to_lowercase(),
            field.to_lowercase()
        ))
    }

    /// Parse an already-loaded config fragment
    pub fn from_json(value: &serde_json::Value) -> AttachResult<Self> {
        let config: Self = serde_json::from_value(value.clone())?;
        Ok(config.normalized())
    }

    /// Set the base directory
    pub fn with_base_directory<S: AsRef<str>>(mut self, dir: S) -> Self {
        self.base_directory = with_trailing_slash(dir.as_ref());
        self
    }

    /// Set the base URL
    pub fn with_base_url<S: AsRef<str>>(mut self, url: S) -> Self {
        self.base_url = with_trailing_slash(url.as_ref());
        self
    }

    /// Set the shard depth
    pub fn with_shard_depth(mut self, depth: u8) -> Self {
        self.shard_depth = depth;
        self
    }

    /// Set the write visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Re-apply trailing slash normalization (for values set directly on the fields)
    pub fn normalized(mut self) -> Self {
        self.base_directory = with_trailing_slash(&self.base_directory);
        self.base_url = with_trailing_slash(&self.base_url);
        self
    }
}

/// Options for image attachments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    /// Fail with `NotAnImage` instead of ignoring payloads the probe rejects
    pub reject_non_images: bool,
}

impl ImageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn ignored non-image payloads into errors
    pub fn reject_non_images(mut self) -> Self {
        self.reject_non_images = true;
        self
    }
}

fn with_trailing_slash(value: &str) -> String {
    format!("{}/", value.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_field_lowercases_names() {
        let config = AttachConfig::for_field("UserProfile", "Avatar");
        assert_eq!(config.base_directory, "data/userprofile/avatar/");
    }

    #[test]
    fn test_trailing_slashes_collapse() {
        let config = AttachConfig::new()
            .with_base_directory("media/photos//")
            .with_base_url("https://cdn.example.com");
        assert_eq!(config.base_directory, "media/photos/");
        assert_eq!(config.base_url, "https://cdn.example.com/");
    }

    #[test]
    fn test_from_json_fills_defaults_and_normalizes() {
        let value = serde_json::json!({
            "base_directory": "uploads",
            "shard_depth": 3,
            "visibility": "private"
        });
        let config = AttachConfig::from_json(&value).unwrap();
        assert_eq!(config.base_directory, "uploads/");
        assert_eq!(config.base_url, "/");
        assert_eq!(config.shard_depth, 3);
        assert_eq!(config.visibility, Visibility::Private);
    }

    #[test]
    fn test_from_json_rejects_bad_types() {
        let value = serde_json::json!({ "shard_depth": "deep" });
        assert!(AttachConfig::from_json(&value).is_err());
    }
}
