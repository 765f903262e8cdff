//! Plain-text reports printed by the CLI.

use resume_ledger_ingest_models::DocumentInfo;
use resume_ledger_record_models::{Field, ParsedRecord};
use resume_ledger_store::MasterTable;

/// Column widths of the `rows` listing.
const NAME_WIDTH: usize = 24;
const EMAILS_WIDTH: usize = 32;
const PHONES_WIDTH: usize = 16;

/// Joins report lines, ending every line with a newline.
fn join_lines(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

/// Formats a record with one labelled entry per field.
///
/// Empty fields show as `N/A`. Multi-line fields are printed below their
/// label, indented.
#[must_use]
pub fn record(record: &ParsedRecord) -> String {
    let mut lines = Vec::new();
    for field in Field::ALL {
        let value = record.display_value(field);
        if value.contains('\n') {
            lines.push(format!("{}:", field.label()));
            lines.extend(value.lines().map(|line| format!("  {line}")));
        } else {
            lines.push(format!("{}: {value}", field.label()));
        }
    }
    join_lines(&lines)
}

/// Formats the info report for an uploaded PDF.
///
/// # Errors
///
/// * If the metadata cannot be encoded as JSON
pub fn info(info: &DocumentInfo) -> Result<String, serde_json::Error> {
    let mut lines = vec![
        format!("Pages: {}", info.page_count),
        format!("Size: {:.1} KB", info.size_kb()),
        format!(
            "Encrypted: {}",
            if info.is_encrypted { "yes" } else { "no" }
        ),
        format!(
            "Metadata: {}",
            serde_json::to_string_pretty(&info.metadata)?
        ),
    ];
    lines.extend(info.pages_without_text.iter().map(|&i| no_text_warning(i)));
    Ok(join_lines(&lines))
}

/// Warning for a page without selectable text (`index` is zero-based).
#[must_use]
pub fn no_text_warning(index: usize) -> String {
    format!(
        "Warning: page {} has no selectable text (it may be a scanned image; consider OCR)",
        index + 1
    )
}

/// Formats the master table as a fixed-width listing.
#[must_use]
pub fn rows(table: &MasterTable) -> String {
    let mut lines = vec![
        format!(
            "{:<5} {:<NAME_WIDTH$} {:<EMAILS_WIDTH$} {:<PHONES_WIDTH$} SKILLS",
            "#", "NAME", "EMAILS", "PHONES"
        ),
        "-".repeat(100),
    ];
    lines.extend(table.rows().iter().enumerate().map(|(i, row)| {
        format!(
            "{:<5} {:<NAME_WIDTH$} {:<EMAILS_WIDTH$} {:<PHONES_WIDTH$} {}",
            i + 1,
            truncate(row.display_value(Field::Name), NAME_WIDTH),
            truncate(row.display_value(Field::Emails), EMAILS_WIDTH),
            truncate(row.display_value(Field::Phones), PHONES_WIDTH),
            row.display_value(Field::Skills),
        )
    }));
    lines.push(format!("{} rows", table.len()));
    join_lines(&lines)
}

/// Shortens `value` to at most `width` characters, marking the cut with
/// `…`.
fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_owned();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use resume_ledger_record_models::{Document, DocumentMetadata, Page};
    use resume_ledger_store::merge;

    use super::*;

    #[test]
    fn record_shows_sentinels_and_multiline_fields() {
        let rec = ParsedRecord {
            name: "Ada Lovelace".to_owned(),
            education: "Masters\nUniversity of London".to_owned(),
            ..ParsedRecord::default()
        };
        let text = record(&rec);

        assert!(text.starts_with("Name: Ada Lovelace\n"));
        assert!(text.contains("Phone Numbers: N/A\n"));
        assert!(text.contains("Education:\n  Masters\n  University of London\n"));
    }

    #[test]
    fn info_reports_size_encryption_and_metadata() {
        let document = Document {
            pages: vec![
                Page {
                    index: 0,
                    text: "Ada".to_owned(),
                },
                Page {
                    index: 1,
                    text: String::new(),
                },
            ],
            is_encrypted: true,
            metadata: DocumentMetadata::new(vec![("Author".to_owned(), "Ada".to_owned())]),
            byte_len: 1536,
        };
        let text = info(&DocumentInfo::from_document(&document)).unwrap();

        assert!(text.contains("Pages: 2\n"));
        assert!(text.contains("Size: 1.5 KB\n"));
        assert!(text.contains("Encrypted: yes\n"));
        assert!(text.contains("\"Author\": \"Ada\""));
        assert!(text.contains("Warning: page 2 has no selectable text"));
    }

    #[test]
    fn rows_lists_every_record() {
        let table = merge(
            Some(merge(
                None,
                ParsedRecord {
                    name: "Ada Lovelace".to_owned(),
                    ..ParsedRecord::default()
                },
            )),
            ParsedRecord::default(),
        );
        let text = rows(&table);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("1     Ada Lovelace"));
        assert!(lines[3].starts_with("2     N/A"));
        assert_eq!(lines[4], "2 rows");
    }

    #[test]
    fn every_report_line_ends_with_a_newline() {
        let text = rows(&MasterTable::new());

        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with("0 rows\n"));
        assert!(record(&ParsedRecord::default()).ends_with("Profile / Summary: N/A\n"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
