//! The in-memory master table and its CSV encoding.

use std::io::{Read, Write};

use resume_ledger_record_models::{Field, ParsedRecord};

use crate::StoreError;

/// Every parsed record, in upload order.
///
/// Rows can only be appended; existing rows are never changed or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterTable {
    rows: Vec<ParsedRecord>,
}

impl MasterTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Appends `record` as the last row.
    pub fn append(&mut self, record: ParsedRecord) {
        self.rows.push(record);
    }

    /// Rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[ParsedRecord] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the header row followed by every record.
    ///
    /// # Errors
    ///
    /// * If writing to `writer` fails
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(Field::header())?;
        for row in &self.rows {
            wtr.write_record(row.to_row())?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Encodes the table exactly as it is stored on disk.
    ///
    /// # Errors
    ///
    /// * If CSV encoding fails
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }

    /// Decodes a table, requiring the header to match the current columns
    /// exactly (same names, same order).
    ///
    /// # Errors
    ///
    /// * If the header differs from [`Field::header`]
    /// * If the CSV is malformed or a row has the wrong number of fields
    pub fn read_csv<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut rdr = csv::ReaderBuilder::new().from_reader(reader);

        let found: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
        let expected = Field::header();
        if found != expected {
            return Err(StoreError::SchemaMismatch {
                expected: expected.into_iter().map(str::to_owned).collect(),
                found,
            });
        }

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(ParsedRecord::from_row(record.iter()));
        }

        Ok(Self { rows })
    }
}
