//! Office Open XML estimators (`.docx`, `.pptx`)
//!
//! Both formats are zip containers of XML parts; only the parts that carry
//! text or the slide list are read.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Reader};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

use super::text::count_chars;
use super::{pages_from_chars, Capability, Estimator};
use crate::error::EstimateError;
use crate::models::DocumentType;

const DOCUMENT_PART: &str = "word/document.xml";
const PRESENTATION_PART: &str = "ppt/presentation.xml";

const WORDML_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Open a document container
pub(super) fn open_archive(path: &Path) -> Result<ZipArchive<File>, EstimateError> {
    let file = File::open(path)?;
    Ok(ZipArchive::new(file)?)
}

/// Read one XML part of a container into memory
pub(super) fn read_part(
    archive: &mut ZipArchive<File>,
    name: &'static str,
) -> Result<String, EstimateError> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Err(EstimateError::MissingPart(name)),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Estimates `.docx` files from their extracted text
pub struct DocxEstimator;

impl Estimator for DocxEstimator {
    fn document_type(&self) -> DocumentType {
        DocumentType::Docx
    }

    fn estimate(&self, path: &Path) -> Result<u64, EstimateError> {
        let text = extract_docx_text(path)?;
        Ok(pages_from_chars(count_chars(&text)))
    }
}

/// Extract the plain text of a `.docx`: headers, body, then footers.
///
/// Each paragraph starts with a blank line, tabs and breaks become `\t` and
/// `\n`, and the result is trimmed.
pub fn extract_docx_text(path: &Path) -> Result<String, EstimateError> {
    let mut archive = open_archive(path)?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let headers: Vec<&String> = names.iter().filter(|n| is_numbered_part(n, "word/header")).collect();
    let footers: Vec<&String> = names.iter().filter(|n| is_numbered_part(n, "word/footer")).collect();

    let mut text = String::new();
    for name in headers {
        text.push_str(&wordml_text(&read_named(&mut archive, name)?)?);
    }
    text.push_str(&wordml_text(&read_part(&mut archive, DOCUMENT_PART)?)?);
    for name in footers {
        text.push_str(&wordml_text(&read_named(&mut archive, name)?)?);
    }

    Ok(text.trim().to_string())
}

/// Match `word/header.xml`, `word/header1.xml`, ...
fn is_numbered_part(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_digit()))
}

fn read_named(archive: &mut ZipArchive<File>, name: &str) -> Result<String, EstimateError> {
    let mut part = archive.by_name(name)?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Flatten one WordprocessingML part to text
fn wordml_text(xml: &str) -> Result<String, EstimateError> {
    let mut reader = NsReader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let wordml = matches!(ns, ResolveResult::Bound(Namespace(uri)) if uri == WORDML_NS);
        match event {
            Event::Start(e) if wordml => {
                if e.local_name().as_ref() == b"t" {
                    in_run_text = true;
                } else {
                    push_wordml_marker(&e, &mut text);
                }
            }
            Event::Empty(e) if wordml => push_wordml_marker(&e, &mut text),
            Event::End(e) if wordml && e.local_name().as_ref() == b"t" => in_run_text = false,
            Event::Text(e) if in_run_text => text.push_str(&unescape(&e)?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Decode entity references in a text node
pub(super) fn unescape(e: &BytesText<'_>) -> Result<String, EstimateError> {
    e.unescape()
        .map(|cow| cow.into_owned())
        .map_err(|err| EstimateError::Xml(err.to_string()))
}

fn push_wordml_marker(e: &BytesStart<'_>, text: &mut String) {
    match e.local_name().as_ref() {
        b"tab" => text.push('\t'),
        b"br" | b"cr" => text.push('\n'),
        b"p" => text.push_str("\n\n"),
        _ => {}
    }
}

/// Counts slides in a `.pptx`
pub struct PptxEstimator;

impl Estimator for PptxEstimator {
    fn document_type(&self) -> DocumentType {
        DocumentType::Pptx
    }

    fn requires(&self) -> Option<Capability> {
        Some(Capability::Presentation)
    }

    fn estimate(&self, path: &Path) -> Result<u64, EstimateError> {
        let mut archive = open_archive(path)?;
        let xml = read_part(&mut archive, PRESENTATION_PART)?;
        count_slide_ids(&xml)
    }
}

/// Count `<p:sldId>` entries in the presentation's slide list
fn count_slide_ids(xml: &str) -> Result<u64, EstimateError> {
    let mut reader = Reader::from_str(xml);
    let mut slides = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                slides += 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(slides)
}
