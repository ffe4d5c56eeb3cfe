use std::io;

use thiserror::Error;

const MEBIBYTE: u64 = 1024 * 1024;

#[allow(clippy::cast_precision_loss, clippy::trivially_copy_pass_by_ref)]
fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / MEBIBYTE as f64
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn whole_megabytes(bytes: &u64) -> u64 {
    *bytes / MEBIBYTE
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn megabytes_over(size: &u64, limit: &u64) -> f64 {
    megabytes(&size.saturating_sub(*limit))
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn rows_over(rows: &usize, limit: &usize) -> usize {
    rows.saturating_sub(*limit)
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Please upload a {expected} file.")]
    UnsupportedExtension { expected: &'static str },

    #[error(
        "File is too large ({:.2}MB). Maximum size is {}MB ({:.2}MB over). Please split your file or use a smaller file.",
        megabytes(.size),
        whole_megabytes(.limit),
        megabytes_over(.size, .limit)
    )]
    FileTooLarge { size: u64, limit: u64 },

    #[error(
        "File has too many rows ({rows}). Maximum is {limit} rows ({} over). Please filter or split your file.",
        rows_over(.rows, .limit)
    )]
    TooManyRows { rows: usize, limit: usize },

    #[error(
        "No extractable text found in PDF. This may be a scanned PDF (image-based). Please use a PDF with selectable text."
    )]
    NoExtractableText,

    #[error("No table data found in PDF. Please ensure the PDF contains structured data.")]
    NoTableData,

    #[error(
        "Failed to parse PDF file. Please ensure it contains extractable text data and is not password-protected."
    )]
    EncryptedPdf,

    #[error("Invalid PDF file: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to render PDF: {0}")]
    PdfRender(String),

    #[error("nothing to render: the table has no columns")]
    EmptyTable,

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet packaging error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// A failure inside the converter itself, not caused by the input.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("cannot apply '{event}' while the converter is {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

impl ConvertError {
    /// Validation failures the user fixes by changing the input, as opposed to
    /// parse or encoding failures.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedExtension { .. }
                | Self::FileTooLarge { .. }
                | Self::TooManyRows { .. }
                | Self::InvalidOption(_)
        )
    }

    /// How far a limit was exceeded: bytes for `FileTooLarge`, rows for `TooManyRows`.
    #[must_use]
    pub fn excess(&self) -> Option<u64> {
        match self {
            Self::FileTooLarge { size, limit } => Some(size.saturating_sub(*limit)),
            Self::TooManyRows { rows, limit } => {
                Some(u64::try_from(rows.saturating_sub(*limit)).unwrap_or(u64::MAX))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ConvertError;

    #[test]
    fn internal_failures_are_not_input_errors() {
        assert!(!ConvertError::Internal("no table loaded".to_string()).is_input_error());
        assert!(ConvertError::InvalidOption("page size".to_string()).is_input_error());
    }

    #[test]
    fn excess_reports_bytes_or_rows_over() {
        let size = ConvertError::FileTooLarge {
            size: 12,
            limit: 10,
        };
        assert_eq!(size.excess(), Some(2));

        let rows = ConvertError::TooManyRows {
            rows: 50_001,
            limit: 50_000,
        };
        assert_eq!(rows.excess(), Some(1));
        assert_eq!(ConvertError::EmptyTable.excess(), None);
    }
}
