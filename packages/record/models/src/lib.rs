#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Document and parsed resume record types.
//!
//! This crate defines the shapes that flow through the resume ledger:
//! a [`Document`] of extracted [`Page`] texts (ephemeral, one per upload),
//! the fixed-schema [`ParsedRecord`] derived from it, and the [`Field`]
//! enum that fixes the column set of the master table.

use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Display placeholder for a field with no extracted value.
pub const NOT_AVAILABLE: &str = "N/A";

/// One page of a source document, represented by its extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based position of the page in the document.
    pub index: usize,
    /// Extracted plain text (empty when the page has no selectable text
    /// or its extraction failed).
    pub text: String,
}

/// Key/value metadata reported by the PDF (title, author, producer, ...).
///
/// Entries keep the order the document reports them in. Keys may repeat
/// and values may be empty; nothing is validated or normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    entries: Vec<(String, String)>,
}

impl DocumentMetadata {
    /// Creates metadata from raw key/value pairs.
    #[must_use]
    pub const fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Returns the first value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over all entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document reported no metadata at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for DocumentMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// A parsed source document: its pages in order plus the facts reported
/// by the PDF itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Pages in document order.
    pub pages: Vec<Page>,
    /// Whether the PDF carries an encryption dictionary.
    pub is_encrypted: bool,
    /// Raw document metadata.
    pub metadata: DocumentMetadata,
    /// Size of the uploaded bytes.
    pub byte_len: usize,
}

impl Document {
    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Indices of pages without any selectable text.
    ///
    /// These are usually scanned images; the ledger reports them but does
    /// not attempt OCR.
    #[must_use]
    pub fn pages_without_text(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.text.trim().is_empty())
            .map(|p| p.index)
            .collect()
    }
}

/// Columns of the master table, in their canonical order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Field {
    /// First person entity found in the document.
    Name,
    /// Email-like tokens, comma-joined.
    Emails,
    /// Phone-number-like digit runs, comma-joined.
    Phones,
    /// Vocabulary skills mentioned anywhere, comma-joined.
    Skills,
    /// Lines mentioning an education keyword, newline-joined.
    Education,
    /// Lines mentioning a project keyword, newline-joined.
    Projects,
    /// Summary sentences, newline-joined.
    Profile,
}

impl Field {
    /// Every column, in schema order.
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Emails,
        Self::Phones,
        Self::Skills,
        Self::Education,
        Self::Projects,
        Self::Profile,
    ];

    /// Column names of the master table header row.
    #[must_use]
    pub fn header() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.column_name()).collect()
    }

    /// Column name used in the persisted table.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Emails => "Emails",
            Self::Phones => "Phones",
            Self::Skills => "Skills",
            Self::Education => "Education",
            Self::Projects => "Projects",
            Self::Profile => "Profile",
        }
    }

    /// Human-readable heading for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Emails => "Emails",
            Self::Phones => "Phone Numbers",
            Self::Skills => "Skills",
            Self::Education => "Education",
            Self::Projects => "Projects",
            Self::Profile => "Profile / Summary",
        }
    }
}

/// The fixed-shape record extracted from one document.
///
/// An empty string means "nothing found" and is what gets persisted;
/// [`ParsedRecord::display_value`] substitutes [`NOT_AVAILABLE`] for
/// presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedRecord {
    /// Candidate name.
    pub name: String,
    /// Comma-joined email addresses.
    pub emails: String,
    /// Comma-joined phone numbers.
    pub phones: String,
    /// Comma-joined skills.
    pub skills: String,
    /// Newline-joined education lines.
    pub education: String,
    /// Newline-joined project lines.
    pub projects: String,
    /// Newline-joined profile sentences.
    pub profile: String,
}

impl ParsedRecord {
    /// Returns the stored value of `field` (empty when nothing was found).
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Emails => &self.emails,
            Field::Phones => &self.phones,
            Field::Skills => &self.skills,
            Field::Education => &self.education,
            Field::Projects => &self.projects,
            Field::Profile => &self.profile,
        }
    }

    /// Returns the value of `field` for display, or [`NOT_AVAILABLE`].
    #[must_use]
    pub fn display_value(&self, field: Field) -> &str {
        let value = self.get(field);
        if value.is_empty() {
            NOT_AVAILABLE
        } else {
            value
        }
    }

    /// Values in schema order, ready to be written as one table row.
    #[must_use]
    pub fn to_row(&self) -> Vec<&str> {
        Field::ALL.iter().map(|&f| self.get(f)).collect()
    }

    /// Builds a record from values in schema order.
    ///
    /// Missing trailing values become empty strings.
    #[must_use]
    pub fn from_row<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = values.into_iter().map(Into::into);
        let mut next = || values.next().unwrap_or_default();
        Self {
            name: next(),
            emails: next(),
            phones: next(),
            skills: next(),
            education: next(),
            projects: next(),
            profile: next(),
        }
    }

    /// Whether every field is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        Field::ALL.iter().all(|&f| self.get(f).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParsedRecord {
        ParsedRecord {
            name: "Ada Lovelace".to_owned(),
            emails: "ada@example.com".to_owned(),
            phones: String::new(),
            skills: "Python, SQL".to_owned(),
            education: "University of London".to_owned(),
            projects: String::new(),
            profile: "Passionate about engines.".to_owned(),
        }
    }

    #[test]
    fn header_matches_field_order() {
        assert_eq!(
            Field::header(),
            vec![
                "Name",
                "Emails",
                "Phones",
                "Skills",
                "Education",
                "Projects",
                "Profile"
            ]
        );
    }

    #[test]
    fn strum_names_match_column_names() {
        for field in Field::ALL {
            assert_eq!(field.to_string(), field.column_name());
            assert_eq!(field.column_name().parse::<Field>().unwrap(), field);
        }
    }

    #[test]
    fn display_value_substitutes_placeholder() {
        let record = sample();
        assert_eq!(record.display_value(Field::Phones), "N/A");
        assert_eq!(record.display_value(Field::Name), "Ada Lovelace");
        assert_eq!(record.get(Field::Phones), "");
    }

    #[test]
    fn row_conversion_preserves_values() {
        let record = sample();
        let row: Vec<String> = record.to_row().into_iter().map(str::to_owned).collect();
        assert_eq!(ParsedRecord::from_row(row), record);
    }

    #[test]
    fn from_short_row_fills_empty() {
        let record = ParsedRecord::from_row(["Only Name"]);
        assert_eq!(record.name, "Only Name");
        assert!(record.profile.is_empty());
    }

    #[test]
    fn default_record_is_blank() {
        assert!(ParsedRecord::default().is_blank());
        assert!(!sample().is_blank());
    }

    #[test]
    fn serde_uses_column_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["Name"], "Ada Lovelace");
        assert_eq!(json["Skills"], "Python, SQL");
    }

    #[test]
    fn metadata_keeps_duplicates_in_order() {
        let meta = DocumentMetadata::new(vec![
            ("Author".to_owned(), "A".to_owned()),
            ("Title".to_owned(), String::new()),
            ("Author".to_owned(), "B".to_owned()),
        ]);
        assert_eq!(meta.len(), 3);
        assert_eq!(meta.get("Author"), Some("A"));
        assert_eq!(meta.get("Title"), Some(""));
        let keys: Vec<&str> = meta.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Author", "Title", "Author"]);
    }

    #[test]
    fn reports_pages_without_text() {
        let doc = Document {
            pages: vec![
                Page {
                    index: 0,
                    text: "Hello".to_owned(),
                },
                Page {
                    index: 1,
                    text: "  \n ".to_owned(),
                },
            ],
            is_encrypted: false,
            metadata: DocumentMetadata::default(),
            byte_len: 10,
        };
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages_without_text(), vec![1]);
    }
}
