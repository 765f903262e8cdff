//! Document assembly: turning a [`Document`] back into text.
//!
//! Two layouts are produced:
//! - **Analysis text**: page texts joined by a blank line with no page
//!   boundaries, so field extraction sees one continuous body
//! - **Page-marked export**: every page preceded by a `===== Page N =====`
//!   banner, for the downloadable `.txt` export

use resume_ledger_record_models::Document;

/// Separator placed between consecutive pages in the analysis text.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Joins every page's text, in page order, separated by a blank line.
///
/// Deterministic: the same [`Document`] always yields the same string.
#[must_use]
pub fn assemble(document: &Document) -> String {
    document
        .pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

/// Builds the page-marked text export.
///
/// Each page contributes `"\n\n===== Page {n} =====\n\n"` (one-based `n`)
/// followed by its text.
#[must_use]
pub fn assemble_with_page_markers(document: &Document) -> String {
    document
        .pages
        .iter()
        .map(|page| format!("\n\n===== Page {} =====\n\n{}", page.index + 1, page.text))
        .collect()
}

/// Returns the text of the page at zero-based `index`.
#[must_use]
pub fn page_text(document: &Document, index: usize) -> Option<&str> {
    document.pages.get(index).map(|p| p.text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resume_ledger_record_models::{DocumentMetadata, Page};

    fn document(texts: &[&str]) -> Document {
        Document {
            pages: texts
                .iter()
                .enumerate()
                .map(|(index, text)| Page {
                    index,
                    text: (*text).to_owned(),
                })
                .collect(),
            is_encrypted: false,
            metadata: DocumentMetadata::default(),
            byte_len: 0,
        }
    }

    #[test]
    fn joins_pages_with_blank_line() {
        let doc = document(&["Page one", "Page two", "Page three"]);
        assert_eq!(assemble(&doc), "Page one\n\nPage two\n\nPage three");
    }

    #[test]
    fn keeps_empty_pages_in_position() {
        let doc = document(&["a", "", "c"]);
        assert_eq!(assemble(&doc), "a\n\n\n\nc");
    }

    #[test]
    fn empty_document_assembles_to_empty_string() {
        assert_eq!(assemble(&document(&[])), "");
    }

    #[test]
    fn assembly_is_deterministic() {
        let doc = document(&["Ada Lovelace", "ada@example.com"]);
        assert_eq!(assemble(&doc), assemble(&doc.clone()));
    }

    #[test]
    fn analysis_text_has_no_page_markers() {
        let doc = document(&["x", "y"]);
        assert!(!assemble(&doc).contains("====="));
    }

    #[test]
    fn export_marks_each_page() {
        let doc = document(&["first", "second"]);
        assert_eq!(
            assemble_with_page_markers(&doc),
            "\n\n===== Page 1 =====\n\nfirst\n\n===== Page 2 =====\n\nsecond"
        );
    }

    #[test]
    fn export_keeps_markers_for_pages_without_text() {
        let doc = document(&["", "second"]);
        assert_eq!(
            assemble_with_page_markers(&doc),
            "\n\n===== Page 1 =====\n\n\n\n===== Page 2 =====\n\nsecond"
        );
    }

    #[test]
    fn looks_up_single_page() {
        let doc = document(&["first", "second"]);
        assert_eq!(page_text(&doc, 1), Some("second"));
        assert_eq!(page_text(&doc, 2), None);
    }
}
