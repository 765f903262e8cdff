#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Resume upload pipeline.
//!
//! One upload flows through three stages: **parse** (PDF bytes to a
//! [`Document`]), **extract** (assembled text to a [`ParsedRecord`]), and
//! **persist** (merge into the master table and write it out). Errors are
//! tagged with the stage they came from.

pub mod render;

use std::path::{Path, PathBuf};

use resume_ledger_extract::{ConfigError, ExtractionConfig, FieldExtractor};
use resume_ledger_ingest_models::{DocumentInfo, STORE_PATH_ENV, Stage, VOCABULARY_PATH_ENV};
use resume_ledger_nlp::{Analyzer, RuleBasedAnalyzer};
use resume_ledger_pdf::{PdfError, assemble::assemble, open_document};
use resume_ledger_record_models::{Document, ParsedRecord};
use resume_ledger_store::{MasterTable, RecordStore, StoreError, default_store_path};
use serde::Serialize;

/// Errors from processing one upload, tagged by stage.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The bytes could not be opened as a PDF. No record was produced and
    /// the store was not touched.
    #[error("parse stage failed: {0}")]
    Parse(#[from] PdfError),

    /// The extraction vocabulary could not be loaded.
    #[error("extract stage failed: {0}")]
    Extract(#[from] ConfigError),

    /// The record was extracted but could not be stored.
    #[error("persist stage failed: {source}")]
    Persist {
        /// Underlying store error.
        source: StoreError,
        /// The merged table, when the failure came after the merge.
        table: Option<MasterTable>,
    },
}

impl IngestError {
    /// Stage that failed.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Parse(_) => Stage::Parse,
            Self::Extract(_) => Stage::Extract,
            Self::Persist { .. } => Stage::Persist,
        }
    }
}

/// Result of processing one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedUpload {
    /// The record derived from the upload.
    pub record: ParsedRecord,
    /// Zero-based indices of pages without selectable text.
    pub pages_without_text: Vec<usize>,
    /// The master table after the record was appended.
    #[serde(skip)]
    pub table: MasterTable,
}

/// Runs uploads through parse, extract, and persist.
#[derive(Debug)]
pub struct Pipeline<S: RecordStore, A: Analyzer = RuleBasedAnalyzer> {
    analyzer: A,
    extractor: FieldExtractor,
    store: S,
}

impl<S: RecordStore> Pipeline<S> {
    /// Creates a pipeline using the built-in analyzer.
    #[must_use]
    pub fn new(extractor: FieldExtractor, store: S) -> Self {
        Self::with_analyzer(RuleBasedAnalyzer::new(), extractor, store)
    }
}

impl<S: RecordStore, A: Analyzer> Pipeline<S, A> {
    #[must_use]
    pub const fn with_analyzer(analyzer: A, extractor: FieldExtractor, store: S) -> Self {
        Self {
            analyzer,
            extractor,
            store,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Derives the record for an already-parsed document.
    #[must_use]
    pub fn extract(&self, document: &Document) -> ParsedRecord {
        let text = assemble(document);
        log::debug!(
            "Assembled {} pages into {} bytes of text",
            document.page_count(),
            text.len()
        );
        self.extractor.extract_with(&self.analyzer, &text)
    }

    /// Extracts the record for `document` and appends it to the store.
    ///
    /// # Errors
    ///
    /// * [`IngestError::Persist`] if the store cannot be read or written
    pub fn process_document(&self, document: &Document) -> Result<ProcessedUpload, IngestError> {
        log::info!("Extracting fields from {} pages", document.page_count());
        let record = self.extract(document);

        log::info!("Persisting record");
        let table = self
            .store
            .append(record.clone())
            .map_err(|e| IngestError::Persist {
                source: e.source,
                table: e.table,
            })?;
        log::info!("Master table now has {} rows", table.len());

        Ok(ProcessedUpload {
            record,
            pages_without_text: document.pages_without_text(),
            table,
        })
    }

    /// Processes raw uploaded PDF bytes.
    ///
    /// # Errors
    ///
    /// * [`IngestError::Parse`] if the bytes are not a loadable PDF; the
    ///   store is left untouched
    /// * [`IngestError::Persist`] if the store cannot be read or written
    pub fn process_upload(&self, bytes: &[u8]) -> Result<ProcessedUpload, IngestError> {
        log::info!("Parsing upload ({} bytes)", bytes.len());
        let document = open_document(bytes)?;
        self.process_document(&document)
    }
}

/// Opens PDF bytes and summarizes them for the info report.
///
/// # Errors
///
/// * [`IngestError::Parse`] if the bytes are not a loadable PDF
pub fn document_info(bytes: &[u8]) -> Result<DocumentInfo, IngestError> {
    let document = open_document(bytes)?;
    Ok(DocumentInfo::from_document(&document))
}

/// Builds the extractor from `vocabulary`, or the built-in vocabulary.
///
/// # Errors
///
/// * [`IngestError::Extract`] if the vocabulary cannot be loaded
pub fn load_extractor(vocabulary: Option<&Path>) -> Result<FieldExtractor, IngestError> {
    let config = match vocabulary {
        Some(path) => {
            log::info!("Using vocabulary {}", path.display());
            ExtractionConfig::from_path(path)?
        }
        None => ExtractionConfig::builtin()?,
    };
    Ok(FieldExtractor::new(config))
}

/// Master CSV path: the flag, else `RESUME_LEDGER_STORE`, else the default.
#[must_use]
pub fn resolve_store_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os(STORE_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(default_store_path)
}

/// Vocabulary override: the flag, else `RESUME_LEDGER_VOCABULARY`.
#[must_use]
pub fn resolve_vocabulary_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| std::env::var_os(VOCABULARY_PATH_ENV).map(PathBuf::from))
}
