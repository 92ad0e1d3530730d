pub const DEFAULT_QUALITY: f32 = 0.8;
pub const MIN_QUALITY: f32 = 0.1;
pub const MAX_QUALITY: f32 = 1.0;

pub const DEFAULT_MAX_SIZE_MB: f64 = 1.0;
pub const MIN_MAX_SIZE_MB: f64 = 0.1;
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Inputs above this size are refused before decoding (100 MiB).
pub const MAX_INPUT_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 16384;

// Size fitting: each extra attempt shrinks quality and both sides by this factor.
pub const MAX_FIT_ATTEMPTS: usize = 10;
pub const FIT_SCALE_FACTOR: f32 = 0.95;

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;

pub const DEFAULT_ARCHIVE_NAME: &str = "converted-images.zip";

pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({prefix}%) {msg}";

pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const INFO_PREFIX: &str = "📋";
