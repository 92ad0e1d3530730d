use crate::constants::{
    BYTES_PER_MB, DEFAULT_MAX_SIZE_MB, DEFAULT_QUALITY, FIT_SCALE_FACTOR, LIBDEFLATER_HIGH_LEVEL,
    LIBDEFLATER_LOW_LEVEL, MAX_FIT_ATTEMPTS, MAX_IMAGE_DIMENSION, MAX_INPUT_SIZE, MAX_QUALITY,
    MIN_MAX_SIZE_MB, MIN_QUALITY, OXIPNG_PRESET, ZOPFLI_ITERATIONS,
};
use crate::error::{CodecError, CompressionError, Result};
use crate::formats::TargetFormat;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use oxipng::{Deflaters, Options};
use std::io::Cursor;
use std::num::NonZeroU8;
use tracing::debug;

/// Per-run conversion settings. Immutable once a batch starts.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionConfig {
    /// Maximum encoded size per file, in bytes
    pub target_size_limit: u64,
    /// Longest side in pixels; larger images are downscaled
    pub max_dimension: Option<u32>,
    /// Fidelity hint between 0.0 and 1.0
    pub quality: f32,
    /// Run the codec on the blocking worker pool instead of the driving task
    pub offload: bool,
    pub format: TargetFormat,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            target_size_limit: mb_to_bytes(DEFAULT_MAX_SIZE_MB),
            max_dimension: None,
            quality: DEFAULT_QUALITY,
            offload: true,
            format: TargetFormat::default(),
        }
    }
}

impl CompressionConfig {
    pub fn new(
        quality: Option<f32>,
        max_size_mb: Option<f64>,
        max_dimension: Option<u32>,
        format: TargetFormat,
        offload: bool,
    ) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        let max_size_mb = max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB);
        if !max_size_mb.is_finite() || max_size_mb < MIN_MAX_SIZE_MB {
            return Err(CompressionError::InvalidMaxSize(max_size_mb));
        }

        if max_dimension == Some(0) {
            return Err(CompressionError::InvalidMaxDimension);
        }

        Ok(Self {
            target_size_limit: mb_to_bytes(max_size_mb),
            max_dimension,
            quality,
            offload,
            format,
        })
    }
}

fn mb_to_bytes(mb: f64) -> u64 {
    (mb * BYTES_PER_MB).round() as u64
}

/// Re-encodes one image under the constraints of a [`CompressionConfig`].
///
/// Implementations must be deterministic for identical input and config;
/// the batch loop relies on that for reproducible results.
pub trait Codec: Send + Sync + 'static {
    fn encode(
        &self,
        bytes: &[u8],
        config: &CompressionConfig,
    ) -> std::result::Result<Vec<u8>, CodecError>;
}

/// Codec backed by the `image` crate for decoding, `webp` for lossy WebP,
/// and `oxipng` for PNG optimization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn encode(
        &self,
        bytes: &[u8],
        config: &CompressionConfig,
    ) -> std::result::Result<Vec<u8>, CodecError> {
        let mut img = decode_image(bytes)?;
        bound_dimensions(&mut img, config.max_dimension);
        fit_to_size(img, config)
    }
}

/// Decodes raw bytes, sniffing the container format.
///
/// # Security
/// - Refuses inputs above the maximum input size before decoding
/// - Refuses images whose sides exceed the maximum dimension
pub fn decode_image(bytes: &[u8]) -> std::result::Result<DynamicImage, CodecError> {
    let size = bytes.len() as u64;
    if size > MAX_INPUT_SIZE {
        return Err(CodecError::InputTooLarge(size, MAX_INPUT_SIZE));
    }

    let img = image::load_from_memory(bytes).map_err(CodecError::Decode)?;

    let (width, height) = img.dimensions();
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(CodecError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }

    Ok(img)
}

/// Downscales so the longer side is at most `max_dimension`, keeping the aspect ratio.
/// Images already within bounds are left untouched.
pub fn bound_dimensions(img: &mut DynamicImage, max_dimension: Option<u32>) {
    let Some(max) = max_dimension.filter(|&m| m > 0) else {
        return;
    };

    let (width, height) = img.dimensions();
    if width.max(height) <= max {
        return;
    }

    *img = img.resize(max, max, FilterType::Lanczos3);
    debug!(
        width,
        height,
        new_width = img.width(),
        new_height = img.height(),
        "Resized to max dimension"
    );
}

/// Encodes at the configured quality, then keeps shrinking quality and
/// dimensions until the output fits `target_size_limit`.
fn fit_to_size(
    mut img: DynamicImage,
    config: &CompressionConfig,
) -> std::result::Result<Vec<u8>, CodecError> {
    let mut quality = config.quality;
    let mut smallest = u64::MAX;

    for attempt in 0..=MAX_FIT_ATTEMPTS {
        let encoded = encode_image(&img, config.format, quality)?;
        let size = encoded.len() as u64;
        if size <= config.target_size_limit {
            debug!(attempt, size, quality, "Encoded within size limit");
            return Ok(encoded);
        }

        smallest = smallest.min(size);
        debug!(
            attempt,
            size,
            limit = config.target_size_limit,
            "Encoded output over size limit"
        );

        if attempt < MAX_FIT_ATTEMPTS {
            quality *= FIT_SCALE_FACTOR;
            img = shrink(&img);
        }
    }

    Err(CodecError::SizeLimitUnmet {
        limit: config.target_size_limit,
        smallest,
    })
}

fn shrink(img: &DynamicImage) -> DynamicImage {
    let scale = |side: u32| ((side as f32 * FIT_SCALE_FACTOR).round() as u32).max(1);
    let (width, height) = img.dimensions();
    img.resize_exact(scale(width), scale(height), FilterType::Lanczos3)
}

fn quality_percent(quality: f32) -> f32 {
    (quality * 100.0).clamp(1.0, 100.0)
}

pub fn encode_image(
    img: &DynamicImage,
    format: TargetFormat,
    quality: f32,
) -> std::result::Result<Vec<u8>, CodecError> {
    match format {
        TargetFormat::WebP => encode_webp(img, quality),
        TargetFormat::Jpeg => encode_jpeg(img, quality),
        TargetFormat::Png => encode_png(img, quality),
    }
}

fn encode_webp(img: &DynamicImage, quality: f32) -> std::result::Result<Vec<u8>, CodecError> {
    // libwebp only takes 8-bit RGB or RGBA buffers.
    let source = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let encoder = webp::Encoder::from_image(&source)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    let memory = encoder
        .encode_simple(false, quality_percent(quality))
        .map_err(|e| CodecError::Encode(format!("{:?}", e)))?;

    Ok(memory.to_vec())
}

fn encode_jpeg(img: &DynamicImage, quality: f32) -> std::result::Result<Vec<u8>, CodecError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality_percent(quality).round() as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    Ok(buffer)
}

fn encode_png(img: &DynamicImage, quality: f32) -> std::result::Result<Vec<u8>, CodecError> {
    let mut raw = Vec::new();
    img.write_to(&mut Cursor::new(&mut raw), ImageFormat::Png)
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    let mut options = Options::from_preset(OXIPNG_PRESET);
    options.deflate = png_deflater(quality);

    oxipng::optimize_from_memory(&raw, &options).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Higher quality buys a slower, tighter deflate pass.
fn png_deflater(quality: f32) -> Deflaters {
    if quality >= 0.9 {
        if let Some(iterations) = NonZeroU8::new(ZOPFLI_ITERATIONS) {
            return Deflaters::Zopfli { iterations };
        }
    }

    let compression = if quality >= 0.7 {
        LIBDEFLATER_HIGH_LEVEL
    } else {
        LIBDEFLATER_LOW_LEVEL
    };
    Deflaters::Libdeflater { compression }
}
