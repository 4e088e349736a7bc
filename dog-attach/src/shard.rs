//! Sharded directory naming.
//!
//! Blobs are spread over up to six levels of 2-character buckets taken
//! straight from the front of their (unique) filename, so no index is needed
//! to find them again:
//!
//! ```text
//! depth 2, "ab12cd34.png"  ->  ab/12/
//! depth 3, "ab12cd34.png"  ->  ab/12/cd/
//! ```

use std::fmt;

use crate::{AttachError, AttachResult};

/// Number of 2-character directory levels, always within `1..=6`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardDepth(u8);

impl ShardDepth {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(depth: u8) -> AttachResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&depth) {
            return Err(AttachError::ShardDepthOutOfRange { depth });
        }
        Ok(Self(depth))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for ShardDepth {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for ShardDepth {
    type Error = AttachError;

    fn try_from(depth: u8) -> AttachResult<Self> {
        Self::new(depth)
    }
}

impl fmt::Display for ShardDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shard segments for `filename`, each followed by `/`.
///
/// Filenames shorter than `2 * depth` characters yield short or empty
/// segments (`"a/"`, `"/"`) instead of an error.
pub fn shard_prefix(filename: &str, depth: ShardDepth) -> String {
    let chars: Vec<char> = filename.chars().collect();
    let mut prefix = String::with_capacity(depth.get() as usize * 3);
    for level in 0..depth.get() as usize {
        let start = (level * 2).min(chars.len());
        let end = (start + 2).min(chars.len());
        prefix.extend(&chars[start..end]);
        prefix.push('/');
    }
    prefix
}

/// `base_directory` followed by the shard segments of `filename`
pub fn shard_dir(base_directory: &str, filename: &str, depth: ShardDepth) -> String {
    format!("{}{}", base_directory, shard_prefix(filename, depth))
}

/// Split a filename at its last `.` into stem and extension
pub fn split_filename(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(dot) => (&filename[..dot], Some(&filename[dot + 1..])),
        None => (filename, None),
    }
}
