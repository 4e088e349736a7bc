use thiserror::Error;

/// Result type for attachment operations
pub type AttachResult<T> = Result<T, AttachError>;

/// Errors that can occur while attaching, reading or clearing content
#[derive(Error, Debug)]
pub enum AttachError {
    #[error("Shard depth must be in range from 1 to 6, got {depth}")]
    ShardDepthOutOfRange { depth: u8 },

    #[error("Unsupported variant: \"{name}\"")]
    UnsupportedVariant { name: String },

    #[error("Invalid variant table: {message}")]
    InvalidVariant { message: String },

    #[error("Content is not a recognised image")]
    NotAnImage,

    #[error("Blob not found: {path}")]
    NotFound { path: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Transform for variant \"{variant}\" failed: {source}")]
    Transform {
        variant: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl AttachError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Wrap a failure raised by a variant transform
    pub fn transform<S, E>(variant: S, error: E) -> Self
    where
        S: Into<String>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Transform {
            variant: variant.into(),
            source: error.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(path: S) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create an unsupported variant error
    pub fn unsupported_variant<S: Into<String>>(name: S) -> Self {
        Self::UnsupportedVariant { name: name.into() }
    }

    /// Create an invalid variant table error
    pub fn invalid_variant<S: Into<String>>(message: S) -> Self {
        Self::InvalidVariant {
            message: message.into(),
        }
    }

    /// True when the error means the blob simply isn't there
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io { source } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
