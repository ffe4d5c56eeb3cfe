use crate::delimiter::Delimiter;

/// An uploaded file as received, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl RawInput {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    #[must_use]
    pub fn declared_size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn has_extension(&self, extension: &str) -> bool {
        self.file_name
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", extension.to_ascii_lowercase()))
    }

    /// File name without the given extension, e.g. `report.CSV` -> `report`.
    #[must_use]
    pub fn stem(&self, extension: &str) -> String {
        if self.has_extension(extension) {
            let cut = self.file_name.len() - extension.len() - 1;
            self.file_name[..cut].to_string()
        } else {
            self.file_name.clone()
        }
    }

    /// UTF-8 text with invalid sequences replaced and a leading BOM removed.
    #[must_use]
    pub fn decode_text(&self) -> String {
        let text = String::from_utf8_lossy(&self.bytes);
        text.strip_prefix('\u{FEFF}').unwrap_or(&text).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub rows: Vec<Vec<String>>,
    /// `None` for tables recovered from PDF text.
    pub delimiter: Option<Delimiter>,
    pub file_name: String,
    pub file_size: u64,
}

impl ParsedTable {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    #[must_use]
    pub fn max_width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn header(&self, has_header: bool) -> Option<&[String]> {
        if has_header {
            self.rows.first().map(Vec::as_slice)
        } else {
            None
        }
    }

    #[must_use]
    pub fn data_rows(&self, has_header: bool) -> &[Vec<String>] {
        if has_header && !self.rows.is_empty() {
            &self.rows[1..]
        } else {
            &self.rows
        }
    }

    /// First rows for a preview grid.
    #[must_use]
    pub fn preview(&self, limit: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(limit)]
    }
}

/// A generated file ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Download(Artifact),
    Remote { resource_id: String, url: String },
}

#[cfg(test)]
mod tests {
    use super::{ParsedTable, RawInput};

    #[test]
    fn strips_extension_case_insensitively() {
        let raw = RawInput::new("Quarterly Report.CSV", Vec::new());
        assert!(raw.has_extension("csv"));
        assert_eq!(raw.stem("csv"), "Quarterly Report");
        assert_eq!(raw.stem("pdf"), "Quarterly Report.CSV");
    }

    #[test]
    fn decodes_lossily_and_drops_bom() {
        let raw = RawInput::new("a.csv", b"\xEF\xBB\xBFa,b\xFF".to_vec());
        assert_eq!(raw.decode_text(), "a,b\u{FFFD}");
    }

    #[test]
    fn splits_header_from_data() {
        let table = ParsedTable {
            rows: vec![vec!["h".to_string()], vec!["1".to_string(), "2".to_string()]],
            delimiter: None,
            file_name: "t".to_string(),
            file_size: 0,
        };
        assert_eq!(table.header(true), Some(&["h".to_string()][..]));
        assert_eq!(table.data_rows(true).len(), 1);
        assert_eq!(table.data_rows(false).len(), 2);
        assert_eq!(table.max_width(), 2);
        assert_eq!(table.preview(10).len(), 2);
    }
}
