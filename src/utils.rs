/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Signed size change as a readable string, e.g. "-1.5 MB" or "+200 B".
pub fn format_size_delta(saved_bytes: i64) -> String {
    let magnitude = format_file_size(saved_bytes.unsigned_abs());
    if saved_bytes > 0 {
        format!("-{}", magnitude)
    } else if saved_bytes < 0 {
        format!("+{}", magnitude)
    } else {
        magnitude
    }
}
