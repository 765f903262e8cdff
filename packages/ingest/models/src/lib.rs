#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Upload stage, document info, and environment types.

use resume_ledger_record_models::{Document, DocumentMetadata};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// Environment variable overriding the master CSV path.
pub const STORE_PATH_ENV: &str = "RESUME_LEDGER_STORE";

/// Environment variable pointing at a replacement vocabulary TOML.
pub const VOCABULARY_PATH_ENV: &str = "RESUME_LEDGER_VOCABULARY";

/// Stage of processing one upload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Opening the PDF and reading its pages.
    Parse,
    /// Deriving the record from the document text.
    Extract,
    /// Merging the record into the master table and writing it out.
    Persist,
}

/// Summary of an uploaded PDF, as shown by the info report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub byte_len: usize,
    pub is_encrypted: bool,
    pub metadata: DocumentMetadata,
    /// Zero-based indices of pages without selectable text.
    pub pages_without_text: Vec<usize>,
}

impl DocumentInfo {
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        Self {
            page_count: document.page_count(),
            byte_len: document.byte_len,
            is_encrypted: document.is_encrypted,
            metadata: document.metadata.clone(),
            pages_without_text: document.pages_without_text(),
        }
    }

    /// File size in kilobytes (1 KB = 1024 bytes).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_kb(&self) -> f64 {
        self.byte_len as f64 / 1024.0
    }
}
