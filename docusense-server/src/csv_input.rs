//! CSV upload validation and row normalization
//!
//! Turns an uploaded file into [`TicketRow`]s:
//! - filename must end in `.csv` (case-insensitive)
//! - bytes are decoded as UTF-8, dropping undecodable sequences
//! - headers are lowercased and trimmed once, and must include `subject` and `body`
//! - missing or empty cells become empty strings; values are trimmed

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

/// Columns every upload must carry
pub const REQUIRED_COLUMNS: [&str; 2] = ["subject", "body"];

/// Upload parsing failures
#[derive(Debug, Error)]
pub enum CsvInputError {
    /// Header row lacks `subject` and/or `body`
    #[error("CSV must include columns: subject, body")]
    MissingColumns { missing: Vec<String> },

    /// Content is not parseable as CSV
    #[error("Malformed CSV: {0}")]
    Malformed(#[from] csv::Error),

    /// A data row has more fields than the header
    #[error("Malformed CSV: line {line} has {found} fields, header has {expected}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// True if `filename` carries the `.csv` suffix
pub fn has_csv_extension(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".csv")
}

/// Decode upload bytes, dropping invalid UTF-8 sequences and a leading BOM
pub fn decode_lossy(bytes: &[u8]) -> String {
    let text: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Header positions of the columns the ingest reads
///
/// Resolved once per upload; the first matching header wins when a name repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub subject: usize,
    pub body: usize,
    pub width: usize,
}

impl ColumnLayout {
    /// Normalize headers and locate the required columns
    pub fn from_headers(headers: &StringRecord) -> Result<Self, CsvInputError> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);

        match (find("subject"), find("body")) {
            (Some(subject), Some(body)) => Ok(Self {
                subject,
                body,
                width: normalized.len(),
            }),
            (subject, body) => {
                let mut missing = Vec::new();
                if subject.is_none() {
                    missing.push("subject".to_string());
                }
                if body.is_none() {
                    missing.push("body".to_string());
                }
                Err(CsvInputError::MissingColumns { missing })
            }
        }
    }

    /// Read a record through this layout
    pub fn row(&self, record: &StringRecord) -> TicketRow {
        TicketRow::new(
            record.get(self.subject).unwrap_or(""),
            record.get(self.body).unwrap_or(""),
        )
    }
}

/// One normalized ticket from an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRow {
    pub subject: String,
    pub body: String,
}

impl TicketRow {
    pub fn new(subject: &str, body: &str) -> Self {
        Self {
            subject: subject.trim().to_string(),
            body: body.trim().to_string(),
        }
    }

    /// Classifier input: subject and body joined by a space, trimmed
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.subject, self.body).trim().to_string()
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Parse decoded CSV text into ticket rows in file order
pub fn parse_ticket_rows(text: &str) -> Result<Vec<TicketRow>, CsvInputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let layout = ColumnLayout::from_headers(reader.headers()?)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        if record.len() > layout.width {
            return Err(CsvInputError::TooManyFields {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: layout.width,
                found: record.len(),
            });
        }
        rows.push(layout.row(&record));
    }

    Ok(rows)
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|field| field.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_extension_case_insensitive() {
        assert!(has_csv_extension("tickets.csv"));
        assert!(has_csv_extension("TICKETS.CSV"));
        assert!(!has_csv_extension("tickets.xlsx"));
        assert!(!has_csv_extension("tickets.csv.txt"));
        assert!(!has_csv_extension(""));
    }

    #[test]
    fn test_decode_drops_invalid_bytes() {
        let bytes = b"subject,body\nhel\xfflo,world\n";
        assert_eq!(decode_lossy(bytes), "subject,body\nhello,world\n");
    }

    #[test]
    fn test_decode_strips_bom() {
        let bytes = b"\xef\xbb\xbfsubject,body\n";
        assert_eq!(decode_lossy(bytes), "subject,body\n");
    }

    #[test]
    fn test_headers_any_case_any_order_with_extras() {
        let rows = parse_ticket_rows("Priority, BODY ,Subject\nhigh,  no refund ,  Billing issue \n")
            .unwrap();
        assert_eq!(rows, vec![TicketRow::new("Billing issue", "no refund")]);
    }

    #[test]
    fn test_missing_body_column() {
        let err = parse_ticket_rows("subject,description\na,b\n").unwrap_err();
        match err {
            CsvInputError::MissingColumns { missing } => assert_eq!(missing, vec!["body"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_subject_column() {
        let err = parse_ticket_rows("body,priority\nreset password,high\n").unwrap_err();
        match err {
            CsvInputError::MissingColumns { missing } => assert_eq!(missing, vec!["subject"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_both_columns_missing_listed_in_order() {
        let err = parse_ticket_rows("title,description\na,b\n").unwrap_err();
        match err {
            CsvInputError::MissingColumns { missing } => {
                assert_eq!(missing, vec!["subject", "body"])
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_is_missing_columns() {
        assert!(matches!(
            parse_ticket_rows(""),
            Err(CsvInputError::MissingColumns { .. })
        ));
    }

    #[test]
    fn test_short_rows_default_to_empty() {
        let rows = parse_ticket_rows("subject,body\nonly subject\n").unwrap();
        assert_eq!(rows, vec![TicketRow::new("only subject", "")]);
        assert_eq!(rows[0].combined_text(), "only subject");
    }

    #[test]
    fn test_long_rows_rejected() {
        let err = parse_ticket_rows("subject,body\na,b,c\n").unwrap_err();
        assert!(matches!(
            err,
            CsvInputError::TooManyFields {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_quoted_fields_and_blank_lines() {
        let rows =
            parse_ticket_rows("Subject,Body\n\"Can't log in\",\"forgot, password\"\n\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].combined_text(), "Can't log in forgot, password");
    }

    #[test]
    fn test_combined_text_trimmed_and_idempotent() {
        let cases = [("  a ", " b  "), ("", "  body"), ("subject ", ""), ("", "")];
        for (subject, body) in cases {
            let row = TicketRow::new(subject, body);
            let combined = row.combined_text();
            let expected = format!("{} {}", subject.trim(), body.trim()).trim().to_string();
            assert_eq!(combined, expected);
            assert_eq!(combined.trim(), combined);
        }
    }
}
