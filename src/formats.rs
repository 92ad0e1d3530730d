//! Target formats and content-type helpers
//!
//! Output formats are a closed enum; input files only carry a declared
//! content type, derived from their extension the way a browser would.

use crate::constants::{FALLBACK_CONTENT_TYPE, IMAGE_CONTENT_TYPE_PREFIX};
use crate::error::{CompressionError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFormat {
    /// Lossy WebP, the default conversion target
    #[default]
    WebP,
    /// Baseline JPEG
    Jpeg,
    /// PNG, optimized losslessly
    Png,
}

impl TargetFormat {
    /// Returns the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::WebP => "webp",
            TargetFormat::Jpeg => "jpg",
            TargetFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            TargetFormat::WebP => "image/webp",
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::Png => "image/png",
        }
    }

    /// Format names accepted on the command line
    pub fn format_names() -> &'static [&'static str] {
        &["webp", "jpeg", "jpg", "png"]
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetFormat::WebP => "WebP",
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Png => "PNG",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TargetFormat {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "webp" => Ok(TargetFormat::WebP),
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            "png" => Ok(TargetFormat::Png),
            _ => Err(CompressionError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Declared content type for a file name, by extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("avif") => "image/avif",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with(IMAGE_CONTENT_TYPE_PREFIX)
}

/// Replaces the extension of `input_name` with the target format's extension.
///
/// Names without an extension get one appended. A leading dot (`.hidden`)
/// is part of the stem, not an extension. A trailing dot is an empty extension.
pub fn output_file_name(input_name: &str, format: TargetFormat) -> String {
    let stem = match input_name.rfind('.') {
        Some(idx) if idx > 0 => &input_name[..idx],
        _ => input_name,
    };
    format!("{}.{}", stem, format.extension())
}
