//! Image header sniffing.
//!
//! Only the leading bytes are inspected; nothing is decoded.

use base64::Engine;

/// Image formats recognised by [`probe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
    Tiff,
    Ico,
}

impl ImageFormat {
    /// Canonical file extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Ico => "ico",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Ico => "image/vnd.microsoft.icon",
        }
    }
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Detect the image format of `content` from its header
pub fn probe(content: &[u8]) -> Option<ImageFormat> {
    if content.len() >= 16 && content.starts_with(PNG_SIGNATURE) && &content[12..16] == b"IHDR" {
        return Some(ImageFormat::Png);
    }
    if content.len() >= 4 && content.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }
    if content.len() >= 10 && (content.starts_with(b"GIF87a") || content.starts_with(b"GIF89a")) {
        return Some(ImageFormat::Gif);
    }
    if content.len() >= 16 && content.starts_with(b"RIFF") && &content[8..12] == b"WEBP" {
        return Some(ImageFormat::WebP);
    }
    if content.len() >= 26 && content.starts_with(b"BM") {
        return Some(ImageFormat::Bmp);
    }
    if content.len() >= 8 && (content.starts_with(b"II*\0") || content.starts_with(b"MM\0*")) {
        return Some(ImageFormat::Tiff);
    }
    if content.len() >= 6 && content.starts_with(&[0, 0, 1, 0]) && content[4..6] != [0, 0] {
        return Some(ImageFormat::Ico);
    }
    None
}

/// `data:` URI for `content`, typed by its probed image format
pub fn data_uri(content: &[u8]) -> String {
    let mime = probe(content)
        .map(|format| format.mime_type())
        .unwrap_or("application/octet-stream");
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(content)
    )
}
