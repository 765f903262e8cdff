#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-page PDF text extraction for uploaded resumes.
//!
//! Uploaded bytes are opened with pure-Rust [`lopdf`] and exposed through
//! the [`PageTextSource`] trait: page count, encryption flag, metadata and
//! the text of each page. Encrypted files are opened with the empty user
//! password when possible. [`load_document`] drives any source into a
//! [`Document`], isolating per-page failures so that one malformed content
//! stream never aborts the whole upload.
//!
//! The [`assemble`] module turns a [`Document`] back into text, either as
//! one continuous analysis string or as a page-marked export.

pub mod assemble;

use lopdf::Object;
use resume_ledger_record_models::{Document, DocumentMetadata, Page};

/// Errors raised while opening a PDF.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The bytes are not a readable PDF (bad header, corrupt structure,
    /// unsupported encoding).
    #[error("Failed to open PDF: {0}")]
    Parse(String),
}

/// Text extraction failed for a single page.
///
/// Recovered locally by [`load_document`]: the page resolves to empty
/// text and the rest of the document is still processed.
#[derive(Debug, thiserror::Error)]
#[error("Text extraction failed on page {page}: {message}")]
pub struct PageExtractionError {
    /// Zero-based page index.
    pub page: usize,
    /// Description of the underlying failure.
    pub message: String,
}

/// A page-structured document whose text can be read page by page.
pub trait PageTextSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Whether the document is encrypted.
    fn is_encrypted(&self) -> bool;

    /// Raw key/value metadata.
    fn metadata(&self) -> DocumentMetadata;

    /// Extracts the plain text of the page at `index`
    /// (`0 <= index < page_count()`).
    ///
    /// # Errors
    ///
    /// Returns [`PageExtractionError`] if the page's content cannot be
    /// decoded.
    fn page_text(&self, index: usize) -> Result<String, PageExtractionError>;
}

/// A [`PageTextSource`] backed by an in-memory [`lopdf::Document`].
#[derive(Debug)]
pub struct LopdfSource {
    doc: lopdf::Document,
    /// One-based page numbers as `lopdf` reports them, in document order.
    page_numbers: Vec<u32>,
    /// Whether the file carried an `Encrypt` dictionary when loaded.
    encrypted: bool,
    /// Set when the document stayed encrypted; its strings and streams
    /// are ciphertext.
    locked: bool,
}

impl LopdfSource {
    /// Parses `bytes` as a PDF.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Parse`] if the bytes cannot be loaded as a PDF.
    /// An encrypted file that the empty password does not open is not an
    /// error: it loads with every page failing extraction.
    pub fn open(bytes: &[u8]) -> Result<Self, PdfError> {
        let mut doc =
            lopdf::Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Decryption removes the Encrypt entry, so the flag is read first.
        let encrypted = doc.is_encrypted();
        let locked = encrypted
            && match doc.decrypt("") {
                Ok(()) => {
                    log::debug!("Decrypted PDF with the empty user password");
                    false
                }
                Err(e) => {
                    log::warn!(
                        "PDF is encrypted and the empty password does not open it ({e}); \
                         pages will have no text"
                    );
                    true
                }
            };

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();

        log::debug!(
            "Opened PDF: {} bytes, {} pages, encrypted: {encrypted}",
            bytes.len(),
            page_numbers.len()
        );

        Ok(Self {
            doc,
            page_numbers,
            encrypted,
            locked,
        })
    }
}

impl PageTextSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn metadata(&self) -> DocumentMetadata {
        if self.locked {
            return DocumentMetadata::default();
        }
        read_info_dictionary(&self.doc)
    }

    fn page_text(&self, index: usize) -> Result<String, PageExtractionError> {
        let page_number = *self
            .page_numbers
            .get(index)
            .ok_or_else(|| PageExtractionError {
                page: index,
                message: format!(
                    "page index out of range (document has {} pages)",
                    self.page_numbers.len()
                ),
            })?;

        if self.locked {
            return Err(PageExtractionError {
                page: index,
                message: "document is encrypted and could not be decrypted".to_owned(),
            });
        }

        self.doc
            .extract_text(&[page_number])
            .map_err(|e| PageExtractionError {
                page: index,
                message: e.to_string(),
            })
    }
}

/// Reads every page of `source` into a [`Document`].
///
/// A page whose extraction fails is logged and resolves to empty text;
/// the remaining pages are still read.
pub fn load_document<S: PageTextSource + ?Sized>(source: &S, byte_len: usize) -> Document {
    let page_count = source.page_count();
    let mut pages = Vec::with_capacity(page_count);

    for index in 0..page_count {
        let text = match source.page_text(index) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("{e}; continuing with empty text");
                String::new()
            }
        };
        pages.push(Page { index, text });
    }

    Document {
        pages,
        is_encrypted: source.is_encrypted(),
        metadata: source.metadata(),
        byte_len,
    }
}

/// Opens `bytes` with [`LopdfSource`] and reads all pages.
///
/// # Errors
///
/// Returns [`PdfError::Parse`] if the bytes are not a readable PDF.
pub fn open_document(bytes: &[u8]) -> Result<Document, PdfError> {
    let source = LopdfSource::open(bytes)?;
    let document = load_document(&source, bytes.len());

    let empty = document.pages_without_text();
    if !empty.is_empty() {
        log::info!(
            "{} of {} pages have no selectable text",
            empty.len(),
            document.page_count()
        );
    }

    Ok(document)
}

/// Collects the trailer `Info` dictionary as key/value text.
fn read_info_dictionary(doc: &lopdf::Document) -> DocumentMetadata {
    let Ok(info) = doc.trailer.get(b"Info") else {
        return DocumentMetadata::default();
    };

    let dict = match info {
        Object::Reference(id) => doc.get_object(*id).and_then(Object::as_dict),
        other => other.as_dict(),
    };

    let Ok(dict) = dict else {
        log::debug!("Info entry is not a dictionary; ignoring metadata");
        return DocumentMetadata::default();
    };

    let entries = dict
        .iter()
        .filter_map(|(key, value)| {
            let value = object_to_text(doc, value)?;
            Some((String::from_utf8_lossy(key).into_owned(), value))
        })
        .collect();

    DocumentMetadata::new(entries)
}

/// Renders a metadata value as text, following one level of reference.
fn object_to_text(doc: &lopdf::Document, object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Reference(_)) | Err(_) => None,
            Ok(target) => object_to_text(doc, target),
        },
        _ => None,
    }
}

/// `PDFDocEncoding` characters for bytes `0x80..=0x9F`. `0x9F` is undefined.
const PDF_DOC_ENCODING_HIGH: [char; 32] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
];

/// `PDFDocEncoding` accents for bytes `0x18..=0x1F`.
const PDF_DOC_ENCODING_ACCENTS: [char; 8] = [
    '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}', '\u{02DC}',
];

/// Maps one `PDFDocEncoding` byte to its character.
///
/// Elsewhere the encoding agrees with Latin-1, except `0xA0` which is the
/// euro sign.
fn pdf_doc_char(byte: u8) -> char {
    match byte {
        0x18..=0x1F => PDF_DOC_ENCODING_ACCENTS[usize::from(byte - 0x18)],
        0x80..=0x9F => PDF_DOC_ENCODING_HIGH[usize::from(byte - 0x80)],
        0xA0 => '\u{20AC}',
        _ => char::from(byte),
    }
}

/// Decodes a PDF text string: UTF-16BE when it starts with a byte order
/// mark, UTF-8 with its BOM, otherwise `PDFDocEncoding`.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes.iter().copied().map(pdf_doc_char).collect()
}
