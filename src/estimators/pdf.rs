//! PDF page counting

use lopdf::Document;
use std::path::Path;

use super::Estimator;
use crate::error::EstimateError;
use crate::models::DocumentType;

/// Reads the page count from the PDF page tree
pub struct PdfEstimator;

impl Estimator for PdfEstimator {
    fn document_type(&self) -> DocumentType {
        DocumentType::Pdf
    }

    fn estimate(&self, path: &Path) -> Result<u64, EstimateError> {
        let mut doc = Document::load(path)?;
        // Owner-password-only files open with the empty user password
        if doc.is_encrypted() {
            doc.decrypt("").map_err(|_| EstimateError::Encrypted)?;
        }
        Ok(doc.get_pages().len() as u64)
    }
}
