//! Core data models for the page counter

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::error::CountError;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Legacy binary Word document
    Doc,
    /// Office Open XML word processing document
    Docx,
    /// Portable Document Format
    Pdf,
    /// Plain UTF-8 text
    Txt,
    /// Office Open XML presentation
    Pptx,
    /// OpenDocument text
    Odt,
}

impl DocumentType {
    /// Every format the counter knows how to estimate, in catalog order
    pub const ALL: [DocumentType; 6] = [
        DocumentType::Doc,
        DocumentType::Docx,
        DocumentType::Pdf,
        DocumentType::Txt,
        DocumentType::Pptx,
        DocumentType::Odt,
    ];

    /// Infer the document type from a file extension.
    ///
    /// Matching is case-insensitive and tolerates a leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext_lower = ext.trim().trim_start_matches('.').to_lowercase();
        match ext_lower.as_str() {
            "doc" => Some(DocumentType::Doc),
            "docx" => Some(DocumentType::Docx),
            "pdf" => Some(DocumentType::Pdf),
            "txt" => Some(DocumentType::Txt),
            "pptx" => Some(DocumentType::Pptx),
            "odt" => Some(DocumentType::Odt),
            _ => None,
        }
    }

    /// Infer the document type from the suffix of a path's file name.
    ///
    /// A file named exactly `.pdf` counts as a PDF.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Get the string representation (lowercase, no dot)
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Doc => "doc",
            DocumentType::Docx => "docx",
            DocumentType::Pdf => "pdf",
            DocumentType::Txt => "txt",
            DocumentType::Pptx => "pptx",
            DocumentType::Odt => "odt",
        }
    }

    /// Get the extension with its leading dot, as stored in settings
    pub fn dotted(&self) -> String {
        format!(".{}", self.as_str())
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = CountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| {
            CountError::invalid_input(None, format!("Unsupported file type: {}", s))
        })
    }
}

/// The set of document types chosen for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSelection(BTreeSet<DocumentType>);

impl ExtensionSelection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Every supported type
    pub fn all() -> Self {
        DocumentType::ALL.into_iter().collect()
    }

    /// The types selected on a first run with no stored settings
    pub fn first_run() -> Self {
        [DocumentType::Doc, DocumentType::Docx, DocumentType::Pdf]
            .into_iter()
            .collect()
    }

    /// Parse a comma-joined list such as `.pdf,.docx` or `pdf,DOCX`.
    ///
    /// Unknown entries are skipped.
    pub fn parse_lenient(list: &str) -> Self {
        list.split(',')
            .filter_map(DocumentType::from_extension)
            .collect()
    }

    /// Parse a comma-joined list, rejecting unknown entries
    pub fn parse_strict(list: &str) -> Result<Self, CountError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<DocumentType>)
            .collect()
    }

    /// Encode as comma-joined dotted extensions, e.g. `.pdf,.docx`
    pub fn to_dotted_list(&self) -> String {
        self.0
            .iter()
            .map(DocumentType::dotted)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Add a type to the selection
    pub fn insert(&mut self, doc_type: DocumentType) -> bool {
        self.0.insert(doc_type)
    }

    /// Check whether a type is selected
    pub fn contains(&self, doc_type: DocumentType) -> bool {
        self.0.contains(&doc_type)
    }

    /// Return the selected type for a path, if its extension is selected
    pub fn match_path(&self, path: &Path) -> Option<DocumentType> {
        DocumentType::from_path(path).filter(|t| self.contains(*t))
    }

    /// Number of selected types
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the selected types in catalog order
    pub fn iter(&self) -> impl Iterator<Item = DocumentType> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<DocumentType> for ExtensionSelection {
    fn from_iter<I: IntoIterator<Item = DocumentType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One estimated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResult {
    /// Detected document format
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Full path to the file
    pub path: PathBuf,
    /// File name without path
    pub name: String,
    /// Estimated page (or slide) count
    pub pages: u64,
    /// Directory containing the file
    pub folder: PathBuf,
}

impl FileResult {
    /// Build a result for `path`, deriving its name and folder
    pub fn new(doc_type: DocumentType, path: PathBuf, pages: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let folder = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            doc_type,
            path,
            name,
            pages,
            folder,
        }
    }
}

/// Page sums keyed by containing folder, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderTotals {
    entries: Vec<(PathBuf, u64)>,
    index: HashMap<PathBuf, usize>,
}

impl FolderTotals {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `pages` to `folder`, inserting it at the end if unseen
    pub fn add(&mut self, folder: &Path, pages: u64) {
        match self.index.get(folder) {
            Some(&i) => self.entries[i].1 += pages,
            None => {
                self.index.insert(folder.to_path_buf(), self.entries.len());
                self.entries.push((folder.to_path_buf(), pages));
            }
        }
    }

    /// Get the total for a folder
    pub fn get(&self, folder: &Path) -> Option<u64> {
        self.index.get(folder).map(|&i| self.entries[i].1)
    }

    /// Iterate over `(folder, total)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&Path, u64)> {
        self.entries.iter().map(|(p, n)| (p.as_path(), *n))
    }

    /// Sum of all folder totals
    pub fn sum(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Number of distinct folders
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no folder has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FolderTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (folder, pages) in &self.entries {
            map.serialize_entry(&folder.to_string_lossy(), pages)?;
        }
        map.end()
    }
}

/// Result of a folder walk
#[derive(Debug, Clone, Default, Serialize)]
pub struct WalkOutcome {
    /// One entry per matching file, in walk order
    pub results: Vec<FileResult>,
    /// Page sums per containing folder
    pub folder_totals: FolderTotals,
    /// Sum of every result's pages
    pub run_total: u64,
    /// Entries that could not be read during traversal
    #[serde(skip)]
    pub issues: Vec<CountError>,
}

impl WalkOutcome {
    /// Create an empty outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished file, keeping every total in step
    pub fn record(&mut self, result: FileResult) {
        self.folder_totals.add(&result.folder, result.pages);
        self.run_total += result.pages;
        self.results.push(result);
    }

    /// Number of files processed
    pub fn file_count(&self) -> usize {
        self.results.len()
    }

    /// Number of non-fatal traversal issues
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_document_type_from_extension() {
        assert_eq!(DocumentType::from_extension("pdf"), Some(DocumentType::Pdf));
        assert_eq!(DocumentType::from_extension("PDF"), Some(DocumentType::Pdf));
        assert_eq!(DocumentType::from_extension(".Docx"), Some(DocumentType::Docx));
        assert_eq!(DocumentType::from_extension("odt"), Some(DocumentType::Odt));
        assert_eq!(DocumentType::from_extension("xlsx"), None);
        assert_eq!(DocumentType::from_extension(""), None);
    }

    #[test]
    fn test_document_type_from_path() {
        assert_eq!(
            DocumentType::from_path(Path::new("/docs/REPORT.PDF")),
            Some(DocumentType::Pdf)
        );
        assert_eq!(DocumentType::from_path(Path::new("/docs/README")), None);
        assert_eq!(
            DocumentType::from_path(Path::new("/docs/.pdf")),
            Some(DocumentType::Pdf)
        );
        assert_eq!(
            DocumentType::from_path(Path::new("/docs/.Notes.TXT")),
            Some(DocumentType::Txt)
        );
        assert_eq!(DocumentType::from_path(Path::new("/docs/pdf")), None);
        // "doc" must not match "docx" or the other way round
        assert_eq!(
            DocumentType::from_path(Path::new("a.docx")),
            Some(DocumentType::Docx)
        );
        assert_eq!(
            DocumentType::from_path(Path::new("a.doc")),
            Some(DocumentType::Doc)
        );
    }

    #[test]
    fn test_selection_dotted_round_trip() {
        let selection = ExtensionSelection::parse_lenient(".pdf,.docx");
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.to_dotted_list(), ".docx,.pdf");
        assert_eq!(
            ExtensionSelection::parse_lenient(&selection.to_dotted_list()),
            selection
        );
    }

    #[test]
    fn test_selection_lenient_skips_unknown() {
        let selection = ExtensionSelection::parse_lenient(".pdf,.xls,,TXT");
        assert!(selection.contains(DocumentType::Pdf));
        assert!(selection.contains(DocumentType::Txt));
        assert_eq!(selection.len(), 2);
        assert!(ExtensionSelection::parse_lenient("").is_empty());
    }

    #[test]
    fn test_selection_strict_rejects_unknown() {
        assert!(ExtensionSelection::parse_strict("pdf,xls").is_err());
        let selection = ExtensionSelection::parse_strict("pdf, pptx").unwrap();
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_first_run_selection() {
        let selection = ExtensionSelection::first_run();
        assert_eq!(selection.to_dotted_list(), ".doc,.docx,.pdf");
    }

    #[test]
    fn test_match_path_is_case_insensitive() {
        let selection: ExtensionSelection = [DocumentType::Pdf].into_iter().collect();
        assert_eq!(
            selection.match_path(Path::new("/x/REPORT.PDF")),
            Some(DocumentType::Pdf)
        );
        assert_eq!(selection.match_path(Path::new("/x/notes.txt")), None);
    }

    #[test]
    fn test_file_result_creation() {
        let result = FileResult::new(DocumentType::Pdf, PathBuf::from("/docs/a.pdf"), 3);
        assert_eq!(result.name, "a.pdf");
        assert_eq!(result.folder, PathBuf::from("/docs"));
        assert_eq!(result.pages, 3);
    }

    #[test]
    fn test_folder_totals_first_seen_order() {
        let mut totals = FolderTotals::new();
        totals.add(Path::new("/b"), 1);
        totals.add(Path::new("/a"), 2);
        totals.add(Path::new("/b"), 4);

        let order: Vec<_> = totals.iter().collect();
        assert_eq!(order, vec![(Path::new("/b"), 5), (Path::new("/a"), 2)]);
        assert_eq!(totals.sum(), 7);
    }

    #[test]
    fn test_folder_totals_serialize_as_map() {
        let mut totals = FolderTotals::new();
        totals.add(Path::new("/docs"), 5);
        let json = serde_json::to_value(&totals).unwrap();
        assert_eq!(json["/docs"], 5);
    }

    #[test]
    fn test_walk_outcome_default() {
        let outcome = WalkOutcome::new();
        assert_eq!(outcome.file_count(), 0);
        assert_eq!(outcome.run_total, 0);
        assert!(outcome.folder_totals.is_empty());
    }

    proptest! {
        #[test]
        fn prop_totals_stay_consistent(
            entries in proptest::collection::vec((0usize..4, 0u64..500), 0..40)
        ) {
            let folders = ["/r", "/r/a", "/r/b", "/r/a/c"];
            let mut outcome = WalkOutcome::new();
            for (i, (folder, pages)) in entries.iter().enumerate() {
                let path = Path::new(folders[*folder]).join(format!("f{}.txt", i));
                outcome.record(FileResult::new(DocumentType::Txt, path, *pages));

                // Every folder sum matches its results at every step
                for (folder, total) in outcome.folder_totals.iter() {
                    let expected: u64 = outcome
                        .results
                        .iter()
                        .filter(|r| r.folder == folder)
                        .map(|r| r.pages)
                        .sum();
                    prop_assert_eq!(total, expected);
                }
            }

            let from_results: u64 = outcome.results.iter().map(|r| r.pages).sum();
            prop_assert_eq!(outcome.run_total, outcome.folder_totals.sum());
            prop_assert_eq!(outcome.run_total, from_results);
        }

        #[test]
        fn prop_extension_match_ignores_case(
            ext in prop::sample::select(vec!["doc", "docx", "pdf", "txt", "pptx", "odt"]),
            upper in proptest::collection::vec(any::<bool>(), 4)
        ) {
            let mixed: String = ext
                .chars()
                .zip(upper.iter().cycle())
                .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
                .collect();
            prop_assert_eq!(
                DocumentType::from_extension(&mixed),
                DocumentType::from_extension(ext)
            );
        }
    }
}
