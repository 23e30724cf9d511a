//! CSV decoding and row splitting
//!
//! Turns uploaded bytes into the header plus numbered data rows. The first
//! non-empty line is the header. Blank and whitespace-only lines are skipped
//! and never become rows. Row numbers are spreadsheet rows: the header is
//! row 1, so the first data line directly below it is row 2.

use csv::{ReaderBuilder, Trim};
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

use super::ImportError;
use crate::models::ImportRow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header and data rows of one uploaded file
#[derive(Debug, Clone, Default)]
pub struct CsvDocument {
    pub header: Vec<String>,
    pub rows: Vec<ImportRow>,
}

/// Comma-separated reader with quote handling and per-cell trimming
#[derive(Debug, Clone)]
pub struct CsvReader {
    delimiter: u8,
    latin1_fallback: bool,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            latin1_fallback: true,
        }
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode non-UTF-8 input as Windows-1252 instead of rejecting it
    pub fn with_latin1_fallback(mut self, enabled: bool) -> Self {
        self.latin1_fallback = enabled;
        self
    }

    /// Decode `bytes` and split them into rows
    pub fn read(&self, bytes: &[u8]) -> Result<CsvDocument, ImportError> {
        let text = self.decode(bytes)?;
        Ok(self.parse(&text))
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, ImportError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(Cow::Borrowed(text)),
            Err(e) if self.latin1_fallback => {
                tracing::debug!(
                    valid_up_to = e.valid_up_to(),
                    "Input is not UTF-8, decoding as Windows-1252"
                );
                let (text, _, _) = WINDOWS_1252.decode(bytes);
                Ok(text)
            }
            Err(e) => Err(ImportError::FileRead(format!(
                "File is not valid UTF-8 (byte {}): {}",
                e.valid_up_to(),
                e
            ))),
        }
    }

    /// Split decoded text; never fails, malformed records become empty rows
    pub fn parse(&self, text: &str) -> CsvDocument {
        if text.trim().is_empty() {
            return CsvDocument::default();
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let header = match reader.headers() {
            Ok(record) => record.iter().map(str::to_string).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read CSV header");
                Vec::new()
            }
        };

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    let row_number = record
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(index + 2);
                    let row =
                        ImportRow::new(row_number, record.iter().map(str::to_string).collect());
                    if !row.is_blank() {
                        rows.push(row);
                    }
                }
                Err(e) => {
                    // Kept as a row so it is counted and reported as invalid
                    let row_number = e
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(index + 2);
                    tracing::warn!(row = row_number, error = %e, "Malformed CSV record");
                    rows.push(ImportRow::new(row_number, Vec::new()));
                }
            }
        }

        CsvDocument { header, rows }
    }
}
