//! Common CLI helpers shared across commands.

/// Parse a byte-size string like "512K", "64M", "1G" (bare numbers are
/// bytes). Used as a clap `value_parser`.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_uppercase();
    if s.is_empty() {
        return Err("empty size specification".to_string());
    }

    let (num_str, multiplier) = if let Some(rest) = s.strip_suffix('G') {
        (rest, 1024u64 * 1024 * 1024)
    } else if let Some(rest) = s.strip_suffix('M') {
        (rest, 1024 * 1024)
    } else if let Some(rest) = s.strip_suffix('K') {
        (rest, 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: f64 = num_str.parse().map_err(|_| format!("invalid number: {num_str}"))?;
    if num < 0.0 {
        return Err("size must be positive".to_string());
    }
    Ok((num * multiplier as f64) as u64)
}
