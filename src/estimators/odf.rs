//! OpenDocument text estimation

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

use super::ooxml::{open_archive, read_part, unescape};
use super::text::count_chars;
use super::{pages_from_chars, Capability, Estimator};
use crate::error::EstimateError;
use crate::models::DocumentType;

const CONTENT_PART: &str = "content.xml";

/// Estimates `.odt` files from the text of their body
pub struct OdtEstimator;

impl Estimator for OdtEstimator {
    fn document_type(&self) -> DocumentType {
        DocumentType::Odt
    }

    fn requires(&self) -> Option<Capability> {
        Some(Capability::OpenDocument)
    }

    fn estimate(&self, path: &Path) -> Result<u64, EstimateError> {
        let mut archive = open_archive(path)?;
        let xml = read_part(&mut archive, CONTENT_PART)?;
        Ok(pages_from_chars(odf_body_chars(&xml)?))
    }
}

/// Count the characters of every paragraph and heading in `content.xml`.
///
/// Only text inside `text:p` / `text:h` counts. `text:s` counts as its
/// `text:c` spaces, `text:tab` and `text:line-break` as one character each,
/// and each paragraph or heading ends with one newline. Counts saturate.
fn odf_body_chars(xml: &str) -> Result<usize, EstimateError> {
    let mut reader = Reader::from_str(xml);
    let mut chars = 0usize;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" | b"h" => depth += 1,
                _ if depth > 0 => chars = chars.saturating_add(marker_chars(&e)),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" | b"h" => chars = chars.saturating_add(1),
                _ if depth > 0 => chars = chars.saturating_add(marker_chars(&e)),
                _ => {}
            },
            Event::End(e) => {
                if matches!(e.local_name().as_ref(), b"p" | b"h") && depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        chars = chars.saturating_add(1);
                    }
                }
            }
            Event::Text(e) if depth > 0 => {
                chars = chars.saturating_add(count_chars(&unescape(&e)?));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(chars)
}

fn marker_chars(e: &BytesStart<'_>) -> usize {
    match e.local_name().as_ref() {
        b"s" => e
            .attributes()
            .flatten()
            .find(|a| a.key.local_name().as_ref() == b"c")
            .and_then(|a| std::str::from_utf8(&a.value).ok()?.parse::<usize>().ok())
            .unwrap_or(1),
        b"tab" | b"line-break" => 1,
        _ => 0,
    }
}
