//! File size display
//!
//! Binary-unit (1024) formatting shared by the file-size field and the
//! bitrate-based size estimate.

use std::fmt;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count with two fraction digits: `1536000.0` → `"1.46 MB"`.
///
/// Divides by 1024 while the value is at least 1024 and a larger unit
/// remains, so anything past the TB range stays in TB.
pub fn format_size(bytes: f64) -> String {
    let mut size = bytes;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// Byte count of a file on disk.
///
/// # Examples
/// ```
/// use shared_utils::types::file_size::FileSize;
///
/// let size = FileSize::new(1024 * 1024);
/// assert_eq!(size.bytes(), 1048576);
/// assert_eq!(size.display(), "1.00 MB");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileSize(u64);

impl FileSize {
    pub const ZERO: FileSize = FileSize(0);

    #[inline]
    pub const fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn bytes(&self) -> u64 {
        self.0
    }

    pub fn display(&self) -> String {
        format_size(self.0 as f64)
    }
}

impl fmt::Debug for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileSize({} bytes, {})", self.0, self.display())
    }
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<u64> for FileSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_known_values() {
        assert_eq!(format_size(0.0), "0.00 B");
        assert_eq!(format_size(512.0), "512.00 B");
        assert_eq!(format_size(1023.0), "1023.00 B");
        assert_eq!(format_size(1024.0), "1.00 KB");
        assert_eq!(format_size(1536.0), "1.50 KB");
        assert_eq!(format_size(1_536_000.0), "1.46 MB");
        assert_eq!(format_size(10_000_000.0), "9.54 MB");
        assert_eq!(format_size(45_000_000.0), "42.92 MB");
        assert_eq!(format_size(1_073_741_824.0), "1.00 GB");
        assert_eq!(format_size(1_099_511_627_776.0), "1.00 TB");
    }

    #[test]
    fn test_format_size_caps_at_terabytes() {
        let five_pb = 5.0 * 1024f64.powi(5);
        assert_eq!(format_size(five_pb), "5120.00 TB");
    }

    #[test]
    fn test_file_size_display() {
        assert_eq!(FileSize::ZERO.display(), "0.00 B");
        assert_eq!(FileSize::new(1536).to_string(), "1.50 KB");
        assert_eq!(FileSize::from(45_000_000).bytes(), 45_000_000);
    }
}
