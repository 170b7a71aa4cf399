//! Document fixtures shared by the unit tests

use lopdf::{dictionary, Document, Object, StringFormat};
use md5::{Digest, Md5};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_container(path: &Path, parts: &[(&str, String)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, body) in parts {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Write a minimal PDF with `pages` empty pages
pub fn write_pdf(path: &Path, pages: usize) {
    save_pdf(build_pdf(pages), path);
}

fn save_pdf(mut doc: Document, path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    doc.save(path).unwrap();
}

fn build_pdf(pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Standard security handler padding string
const PASSWORD_PAD: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut s: Vec<u8> = (0..=255).collect();
    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
        s.swap(i, j as usize);
    }

    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(s[i as usize]);
            s.swap(i as usize, j as usize);
            byte ^ s[s[i as usize].wrapping_add(s[j as usize]) as usize]
        })
        .collect()
}

/// Write a PDF protected by the 40-bit RC4 standard security handler.
///
/// With `empty_user_password` the file only carries an owner password and
/// opens without credentials; otherwise the user entry matches no password.
pub fn write_encrypted_pdf(path: &Path, pages: usize, empty_user_password: bool) {
    let mut doc = build_pdf(pages);
    let file_id = b"page-tally-fixture".to_vec();
    let owner = vec![0x4F; 32];
    let permissions: i32 = -44;

    let mut seed = PASSWORD_PAD.to_vec();
    seed.extend_from_slice(&owner);
    seed.extend_from_slice(&(permissions as u32).to_le_bytes());
    seed.extend_from_slice(&file_id);
    let digest = Md5::digest(&seed);
    let key = &digest[..5];

    let user = if empty_user_password {
        rc4(key, &PASSWORD_PAD)
    } else {
        vec![0xAA; 32]
    };

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "O" => Object::String(owner, StringFormat::Hexadecimal),
        "U" => Object::String(user, StringFormat::Hexadecimal),
        "P" => permissions as i64,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        vec![
            Object::String(file_id.clone(), StringFormat::Hexadecimal),
            Object::String(file_id, StringFormat::Hexadecimal),
        ],
    );
    save_pdf(doc, path);
}

/// Write a `.docx` whose body is a single paragraph of `text`
pub fn write_docx(path: &Path, text: &str) {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>"#,
        text
    );
    write_container(path, &[("word/document.xml", document)]);
}

/// Write a `.pptx` with `slides` entries in its slide list
pub fn write_pptx(path: &Path, slides: usize) {
    let ids: String = (0..slides)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2))
        .collect();
    let presentation = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
        ids
    );
    write_container(path, &[("ppt/presentation.xml", presentation)]);
}

/// Write an `.odt` whose body is a single paragraph of `text`
pub fn write_odt(path: &Path, text: &str) {
    let content = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><office:body><office:text><text:p>{}</text:p></office:text></office:body></office:document-content>"#,
        text
    );
    write_container(
        path,
        &[
            ("mimetype", "application/vnd.oasis.opendocument.text".to_string()),
            ("content.xml", content),
        ],
    );
}
