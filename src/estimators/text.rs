//! Plain text estimation

use std::fs;
use std::path::Path;

use super::{pages_from_chars, Estimator};
use crate::error::EstimateError;
use crate::models::DocumentType;

/// Estimates `.txt` files by character count.
///
/// `\r\n` and lone `\r` each count as a single newline character.
pub struct TextEstimator;

impl Estimator for TextEstimator {
    fn document_type(&self) -> DocumentType {
        DocumentType::Txt
    }

    fn estimate(&self, path: &Path) -> Result<u64, EstimateError> {
        let bytes = fs::read(path)?;
        let text = std::str::from_utf8(&bytes).map_err(|_| EstimateError::InvalidUtf8)?;
        Ok(pages_from_chars(count_chars(text)))
    }
}

/// Count characters with newline sequences collapsed to one character
pub(crate) fn count_chars(text: &str) -> usize {
    let crlf = text.matches("\r\n").count();
    text.chars().count() - crlf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_chars_unicode() {
        assert_eq!(count_chars("héllo"), 5);
        assert_eq!(count_chars("페이지"), 3);
        assert_eq!(count_chars(""), 0);
    }

    #[test]
    fn test_count_chars_newlines() {
        assert_eq!(count_chars("a\r\nb"), 3);
        assert_eq!(count_chars("a\rb"), 3);
        assert_eq!(count_chars("a\nb"), 3);
    }

    #[test]
    fn test_estimate_text_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.txt");
        fs::write(&path, "x".repeat(2500)).unwrap();

        assert_eq!(TextEstimator.estimate(&path).unwrap(), 2);
    }

    #[test]
    fn test_short_text_is_zero_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.txt");
        fs::write(&path, "x".repeat(999)).unwrap();
        assert_eq!(TextEstimator.estimate(&path).unwrap(), 0);

        let empty = dir.path().join("empty.txt");
        fs::write(&empty, "").unwrap();
        assert_eq!(TextEstimator.estimate(&empty).unwrap(), 0);
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [0x66, 0x6f, 0xff, 0xfe]).unwrap();

        assert!(matches!(
            TextEstimator.estimate(&path),
            Err(EstimateError::InvalidUtf8)
        ));
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(matches!(
            TextEstimator.estimate(Path::new("/no/such/file.txt")),
            Err(EstimateError::Io(_))
        ));
    }
}
