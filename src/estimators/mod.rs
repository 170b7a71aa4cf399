//! # Page Count Estimators
//!
//! One estimator per supported format, plus the registry that dispatches a
//! file to its estimator.
//!
//! ## Estimation Strategy
//!
//! - **PDF**: exact page count from the document's page tree
//! - **PPTX**: slide count from the presentation part
//! - **DOCX / ODT / TXT**: characters divided by [`CHARS_PER_PAGE`]
//! - **DOC**: Word automation, Windows only
//!
//! Estimators report failures as [`EstimateError`]. The registry is the
//! boundary: it turns every failure, and every parser panic, into a zero
//! count plus a warning, so one bad file never aborts a run.

mod legacy_word;
mod odf;
mod ooxml;
mod pdf;
mod text;

use log::{debug, warn};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::error::EstimateError;
use crate::models::DocumentType;

pub use legacy_word::LegacyWordEstimator;
pub use odf::OdtEstimator;
pub use ooxml::{DocxEstimator, PptxEstimator};
pub use pdf::PdfEstimator;
pub use text::TextEstimator;

/// Characters assumed to fill one page for formats without pagination
pub const CHARS_PER_PAGE: usize = 1000;

/// Convert a character count to whole pages
pub fn pages_from_chars(chars: usize) -> u64 {
    (chars / CHARS_PER_PAGE) as u64
}

/// Optional capabilities an estimator may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Slide counting for presentations
    Presentation,
    /// Text extraction from OpenDocument files
    OpenDocument,
    /// Native Word automation for legacy binary documents
    WordAutomation,
}

impl Capability {
    /// Human-readable name used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            Capability::Presentation => "Presentation support",
            Capability::OpenDocument => "OpenDocument support",
            Capability::WordAutomation => "Word automation",
        }
    }
}

/// What this process can do, decided once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub presentation: bool,
    pub open_document: bool,
    pub word_automation: bool,
}

impl Capabilities {
    /// Detect capabilities from the build features and the platform
    pub fn detect() -> Self {
        Self {
            presentation: cfg!(feature = "presentation"),
            open_document: cfg!(feature = "opendocument"),
            word_automation: cfg!(windows),
        }
    }

    /// No optional capability at all
    pub fn none() -> Self {
        Self {
            presentation: false,
            open_document: false,
            word_automation: false,
        }
    }

    /// Check whether a capability is available
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Presentation => self.presentation,
            Capability::OpenDocument => self.open_document,
            Capability::WordAutomation => self.word_automation,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

/// A format-specific page estimator
pub trait Estimator: Send + Sync {
    /// The format this estimator handles
    fn document_type(&self) -> DocumentType;

    /// The optional capability this estimator needs, if any
    fn requires(&self) -> Option<Capability> {
        None
    }

    /// Estimate the page count of the file at `path`
    fn estimate(&self, path: &Path) -> Result<u64, EstimateError>;
}

/// Stand-in for an estimator whose capability is missing
struct Unavailable {
    doc_type: DocumentType,
    capability: Capability,
}

impl Estimator for Unavailable {
    fn document_type(&self) -> DocumentType {
        self.doc_type
    }

    fn requires(&self) -> Option<Capability> {
        Some(self.capability)
    }

    fn estimate(&self, _path: &Path) -> Result<u64, EstimateError> {
        Err(EstimateError::CapabilityMissing(self.capability.describe()))
    }
}

/// Lookup table from document type to estimator
pub struct EstimatorRegistry {
    estimators: HashMap<DocumentType, Box<dyn Estimator>>,
    missing: HashMap<DocumentType, Capability>,
}

impl EstimatorRegistry {
    /// Build the registry with every built-in estimator.
    ///
    /// Estimators whose capability is missing are replaced by a stub that
    /// always reports the capability as unavailable.
    pub fn new(capabilities: &Capabilities) -> Self {
        let builtins: Vec<Box<dyn Estimator>> = vec![
            Box::new(PdfEstimator),
            Box::new(DocxEstimator),
            Box::new(LegacyWordEstimator),
            Box::new(TextEstimator),
            Box::new(PptxEstimator),
            Box::new(OdtEstimator),
        ];

        let mut registry = Self::empty();
        for estimator in builtins {
            registry.register_checked(estimator, capabilities);
        }
        registry
    }

    /// A registry with no estimators
    pub fn empty() -> Self {
        Self {
            estimators: HashMap::new(),
            missing: HashMap::new(),
        }
    }

    /// Register an estimator, replacing any previous one for its type
    pub fn register(&mut self, estimator: Box<dyn Estimator>) {
        let doc_type = estimator.document_type();
        self.missing.remove(&doc_type);
        self.estimators.insert(doc_type, estimator);
    }

    fn register_checked(&mut self, estimator: Box<dyn Estimator>, capabilities: &Capabilities) {
        match estimator.requires() {
            Some(capability) if !capabilities.has(capability) => {
                debug!(
                    "{} unavailable, .{} files will count as 0 pages",
                    capability.describe(),
                    estimator.document_type()
                );
                let doc_type = estimator.document_type();
                self.register(Box::new(Unavailable {
                    doc_type,
                    capability,
                }));
                self.missing.insert(doc_type, capability);
            }
            _ => self.register(estimator),
        }
    }

    /// Check whether a type has a working estimator
    pub fn is_available(&self, doc_type: DocumentType) -> bool {
        self.estimators.contains_key(&doc_type) && !self.missing.contains_key(&doc_type)
    }

    /// Estimate `path` as `doc_type`, never failing.
    ///
    /// Errors and panics are logged and become a zero count.
    pub fn estimate(&self, doc_type: DocumentType, path: &Path) -> u64 {
        let Some(estimator) = self.estimators.get(&doc_type) else {
            warn!("No estimator registered for .{} files: {}", doc_type, path.display());
            return 0;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| estimator.estimate(path)))
            .unwrap_or_else(|payload| Err(EstimateError::Panicked(panic_message(&*payload))));

        match outcome {
            Ok(pages) => pages,
            Err(e) => {
                warn!("Error processing {} file {}: {}", doc_type, path.display(), e);
                0
            }
        }
    }
}

impl Default for EstimatorRegistry {
    fn default() -> Self {
        Self::new(&Capabilities::detect())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Exploding;

    impl Estimator for Exploding {
        fn document_type(&self) -> DocumentType {
            DocumentType::Txt
        }

        fn estimate(&self, _path: &Path) -> Result<u64, EstimateError> {
            panic!("corrupt input");
        }
    }

    struct Fixed(u64);

    impl Estimator for Fixed {
        fn document_type(&self) -> DocumentType {
            DocumentType::Pdf
        }

        fn estimate(&self, _path: &Path) -> Result<u64, EstimateError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_pages_from_chars() {
        assert_eq!(pages_from_chars(0), 0);
        assert_eq!(pages_from_chars(999), 0);
        assert_eq!(pages_from_chars(1000), 1);
        assert_eq!(pages_from_chars(2500), 2);
    }

    #[test]
    fn test_capabilities_none() {
        let caps = Capabilities::none();
        assert!(!caps.has(Capability::Presentation));
        assert!(!caps.has(Capability::OpenDocument));
        assert!(!caps.has(Capability::WordAutomation));
    }

    #[test]
    fn test_registry_covers_catalog() {
        let registry = EstimatorRegistry::new(&Capabilities::detect());
        for doc_type in DocumentType::ALL {
            assert!(registry.estimators.contains_key(&doc_type));
        }
    }

    #[test]
    fn test_missing_capability_counts_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        fs::write(&path, b"not really a deck").unwrap();

        let registry = EstimatorRegistry::new(&Capabilities::none());
        assert!(!registry.is_available(DocumentType::Pptx));
        assert!(!registry.is_available(DocumentType::Odt));
        assert!(!registry.is_available(DocumentType::Doc));
        assert!(registry.is_available(DocumentType::Pdf));
        assert_eq!(registry.estimate(DocumentType::Pptx, &path), 0);
    }

    #[test]
    fn test_panicking_estimator_is_contained() {
        let mut registry = EstimatorRegistry::empty();
        registry.register(Box::new(Exploding));
        assert_eq!(registry.estimate(DocumentType::Txt, Path::new("/x.txt")), 0);
    }

    #[test]
    fn test_unregistered_type_counts_zero() {
        let mut registry = EstimatorRegistry::empty();
        registry.register(Box::new(Fixed(7)));
        assert_eq!(registry.estimate(DocumentType::Pdf, Path::new("/a.pdf")), 7);
        assert_eq!(registry.estimate(DocumentType::Odt, Path::new("/a.odt")), 0);
    }

    #[test]
    fn test_estimate_error_becomes_zero() {
        let registry = EstimatorRegistry::new(&Capabilities::detect());
        assert_eq!(
            registry.estimate(DocumentType::Pdf, Path::new("/definitely/missing.pdf")),
            0
        );
    }
}
