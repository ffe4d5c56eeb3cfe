mod csv_out;
mod delimiter;
mod emit;
mod error;
mod json_out;
mod limits;
mod model;
mod options;
mod pdf_out;
mod pdf_reader;
mod state;
mod table_parse;
mod tokenizer;
mod xlsx_out;

pub use delimiter::{Delimiter, SAMPLE_LINES, detect_delimiter};
pub use emit::{CsvEmitter, Emitter, JsonEmitter, PdfTableEmitter, TargetFormat, XlsxEmitter};
pub use error::ConvertError;
pub use limits::{MAX_FILE_BYTES, MAX_ROWS, check_file_size, check_row_count};
pub use model::{Artifact, ConversionResult, ParsedTable, RawInput};
pub use options::{ConversionOptions, DEFAULT_SHEET_NAME, JsonShape, Orientation, PageSize};
pub use pdf_out::{PageGeometry, TableStyle, WIDE_TABLE_COLUMNS, page_geometry};
pub use state::{Converter, ConverterEvent, ConverterState};
pub use table_parse::rows_from_text;
pub use tokenizer::tokenize;

/// Rows shown in the preview grid before conversion.
pub const PREVIEW_ROWS: usize = 10;

fn ensure_extension(raw: &RawInput, extension: &'static str) -> Result<(), ConvertError> {
    if raw.has_extension(extension) {
        return Ok(());
    }
    let expected = match extension {
        "pdf" => ".pdf",
        _ => ".csv",
    };
    Err(ConvertError::UnsupportedExtension { expected })
}

/// Validates and tokenizes an uploaded `.csv` file.
///
/// The size ceiling is checked before decoding and the row ceiling after
/// tokenizing; neither truncates.
pub fn parse_table(raw: &RawInput, options: &ConversionOptions) -> Result<ParsedTable, ConvertError> {
    ensure_extension(raw, "csv")?;
    check_file_size(raw.declared_size())?;

    let text = raw.decode_text();
    let delimiter = options
        .delimiter
        .unwrap_or_else(|| detect_delimiter(&text));
    let rows = tokenize(&text, delimiter);
    check_row_count(rows.len())?;

    tracing::debug!(
        file = %raw.file_name,
        rows = rows.len(),
        %delimiter,
        "parsed delimited input"
    );

    Ok(ParsedTable {
        rows,
        delimiter: Some(delimiter),
        file_name: raw.stem("csv"),
        file_size: raw.declared_size(),
    })
}

/// Runs one emitter over a parsed table.
pub fn convert_table(
    table: &ParsedTable,
    format: TargetFormat,
    options: &ConversionOptions,
) -> Result<Artifact, ConvertError> {
    let artifact = format.emitter().emit(table, options)?;
    tracing::debug!(
        format = %format,
        rows = table.row_count(),
        bytes = artifact.bytes.len(),
        "conversion finished"
    );
    Ok(artifact)
}

/// Recovers rows from the text layer of an uploaded `.pdf` file.
pub fn extract_pdf(raw: &RawInput) -> Result<ParsedTable, ConvertError> {
    ensure_extension(raw, "pdf")?;
    check_file_size(raw.declared_size())?;

    let text = pdf_reader::read_pdf_text(&raw.bytes)?;
    let rows = rows_from_text(&text)?;

    Ok(ParsedTable {
        rows,
        delimiter: None,
        file_name: raw.stem("pdf"),
        file_size: raw.declared_size(),
    })
}

/// PDF in, delimited text out.
pub fn extract_pdf_to_csv(raw: &RawInput, delimiter: Delimiter) -> Result<Artifact, ConvertError> {
    let table = extract_pdf(raw)?;
    let options = ConversionOptions {
        delimiter: Some(delimiter),
        ..ConversionOptions::default()
    };
    convert_table(&table, TargetFormat::Csv, &options)
}
