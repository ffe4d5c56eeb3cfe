use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::csv_out::{CSV_MIME, write_csv_to_string};
use crate::delimiter::Delimiter;
use crate::error::ConvertError;
use crate::json_out::{JSON_MIME, write_json};
use crate::model::{Artifact, ParsedTable};
use crate::options::ConversionOptions;
use crate::pdf_out::{PDF_MIME, write_pdf_table};
use crate::xlsx_out::{XLSX_MIME, write_xlsx};

/// Turns a parsed table into one downloadable format.
pub trait Emitter {
    fn extension(&self) -> &'static str;

    fn emit(&self, table: &ParsedTable, options: &ConversionOptions)
    -> Result<Artifact, ConvertError>;
}

fn artifact(table: &ParsedTable, extension: &str, mime_type: &'static str, bytes: Vec<u8>) -> Artifact {
    Artifact {
        bytes,
        file_name: format!("{}.{extension}", table.file_name),
        mime_type,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxEmitter;

impl Emitter for XlsxEmitter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn emit(
        &self,
        table: &ParsedTable,
        _options: &ConversionOptions,
    ) -> Result<Artifact, ConvertError> {
        // The header, when present, is simply the first worksheet row.
        let bytes = write_xlsx(&table.rows)?;
        Ok(artifact(table, self.extension(), XLSX_MIME, bytes))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter;

impl Emitter for JsonEmitter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn emit(&self, table: &ParsedTable, options: &ConversionOptions) -> Result<Artifact, ConvertError> {
        let text = write_json(&table.rows, options.has_header, options.json_shape, options.pretty)?;
        Ok(artifact(table, self.extension(), JSON_MIME, text.into_bytes()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTableEmitter;

impl Emitter for PdfTableEmitter {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn emit(&self, table: &ParsedTable, options: &ConversionOptions) -> Result<Artifact, ConvertError> {
        let bytes = write_pdf_table(
            &table.rows,
            options.has_header,
            options.page_size,
            options.orientation,
        )?;
        Ok(artifact(table, self.extension(), PDF_MIME, bytes))
    }
}

/// Writes rows back out as delimited text; used for tables recovered from PDFs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvEmitter;

impl Emitter for CsvEmitter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn emit(&self, table: &ParsedTable, options: &ConversionOptions) -> Result<Artifact, ConvertError> {
        let delimiter = options.delimiter.unwrap_or(Delimiter::Comma);
        let text = write_csv_to_string(&table.rows, delimiter)?;
        Ok(artifact(table, self.extension(), CSV_MIME, text.into_bytes()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Xlsx,
    Json,
    Pdf,
    Csv,
}

impl TargetFormat {
    #[must_use]
    pub fn emitter(self) -> &'static dyn Emitter {
        match self {
            Self::Xlsx => &XlsxEmitter,
            Self::Json => &JsonEmitter,
            Self::Pdf => &PdfTableEmitter,
            Self::Csv => &CsvEmitter,
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        self.emitter().extension()
    }
}

impl Display for TargetFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "json" => Ok(Self::Json),
            "pdf" => Ok(Self::Pdf),
            "csv" => Ok(Self::Csv),
            other => Err(format!(
                "unsupported output format '{other}', expected xlsx, json, pdf or csv"
            )),
        }
    }
}
