//! Human-readable byte counts.

use humansize::{WINDOWS, format_size};

/// Format a byte count with 1024-based magnitudes (`KB`, `MB`, ...).
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    format_size(bytes, WINDOWS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(format_bytes(0), "0 Bytes");
    }

    #[test]
    fn test_magnitudes() {
        assert!(format_bytes(3 * 1024 * 1024).contains("MB"));
        assert!(format_bytes(5 * 1024 * 1024 * 1024).contains("GB"));
        assert!(format_bytes(3 * 1024 * 1024).starts_with('3'));
    }
}
