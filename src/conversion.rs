use std::collections::HashMap;
use std::str::FromStr;

use csvshift::{
    Artifact, ConversionOptions, ConversionResult, Delimiter, RawInput, TargetFormat,
    convert_table, extract_pdf, parse_table,
};
use worker::{Response, Result};

use crate::error::ApiError;

pub const DEFAULT_CSV_FILE_NAME: &str = "upload.csv";
pub const DEFAULT_PDF_FILE_NAME: &str = "upload.pdf";

/// A finished server-side conversion and the number of rows it carried.
#[derive(Debug)]
pub struct Converted {
    pub result: ConversionResult,
    pub row_count: usize,
}

fn parse_bool_query(query: &HashMap<String, String>, key: &str, default: bool) -> bool {
    query.get(key).map_or(default, |value| {
        let lowered = value.trim().to_ascii_lowercase();
        lowered == "true" || lowered == "1" || lowered == "yes"
    })
}

fn parse_enum_query<T>(query: &HashMap<String, String>, key: &str) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = String>,
{
    query
        .get(key)
        .map(|value| value.parse::<T>())
        .transpose()
        .map_err(ApiError::BadRequest)
}

pub fn options_from_query(query: &HashMap<String, String>) -> Result<ConversionOptions, ApiError> {
    let defaults = ConversionOptions::default();
    Ok(ConversionOptions {
        has_header: parse_bool_query(query, "has_header", defaults.has_header),
        delimiter: parse_enum_query(query, "delimiter")?,
        json_shape: parse_enum_query(query, "shape")?.unwrap_or(defaults.json_shape),
        pretty: parse_bool_query(query, "pretty", defaults.pretty),
        page_size: parse_enum_query(query, "page_size")?.unwrap_or(defaults.page_size),
        orientation: parse_enum_query(query, "orientation")?.unwrap_or(defaults.orientation),
        sheet_name: query
            .get("sheet_name")
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map_or(defaults.sheet_name, str::to_string),
    })
}

/// Output delimiter for PDF extraction; comma unless `delimiter` says otherwise.
pub fn delimiter_from_query(query: &HashMap<String, String>) -> Result<Delimiter, ApiError> {
    Ok(parse_enum_query(query, "delimiter")?.unwrap_or(Delimiter::Comma))
}

pub fn input_file_name(query: &HashMap<String, String>, default: &str) -> String {
    query
        .get("file_name")
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(default)
        .to_string()
}

pub fn convert_csv_bytes(
    bytes: Vec<u8>,
    file_name: String,
    format: TargetFormat,
    options: &ConversionOptions,
) -> Result<Converted, ApiError> {
    let raw = RawInput::new(file_name, bytes);
    let table = parse_table(&raw, options)?;
    let artifact = convert_table(&table, format, options)?;

    worker::console_log!(
        "csv conversion completed: format={format}, rows={}, bytes={}",
        table.row_count(),
        artifact.bytes.len()
    );

    Ok(Converted {
        result: ConversionResult::Download(artifact),
        row_count: table.row_count(),
    })
}

pub fn convert_pdf_bytes(
    bytes: Vec<u8>,
    file_name: String,
    delimiter: Delimiter,
) -> Result<Converted, ApiError> {
    let raw = RawInput::new(file_name, bytes);
    let table = extract_pdf(&raw)?;
    let options = ConversionOptions {
        delimiter: Some(delimiter),
        ..ConversionOptions::default()
    };
    let artifact = convert_table(&table, TargetFormat::Csv, &options)?;

    worker::console_log!(
        "pdf extraction completed: rows={}, columns={}",
        table.row_count(),
        table.max_width()
    );

    Ok(Converted {
        result: ConversionResult::Download(artifact),
        row_count: table.row_count(),
    })
}

/// `attachment` disposition with an ASCII fallback name and the exact name in `filename*`.
pub fn content_disposition(file_name: &str) -> String {
    let fallback = file_name
        .chars()
        .map(|ch| {
            if (ch.is_ascii_graphic() || ch == ' ') && ch != '"' && ch != '\\' {
                ch
            } else {
                '_'
            }
        })
        .collect::<String>();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}

pub fn artifact_response(artifact: Artifact, row_count: usize) -> Result<Response> {
    let disposition = content_disposition(&artifact.file_name);
    let mut response = Response::from_bytes(artifact.bytes)?;
    response
        .headers_mut()
        .set("Content-Type", artifact.mime_type)?;
    response
        .headers_mut()
        .set("Content-Disposition", &disposition)?;
    response
        .headers_mut()
        .set("X-Row-Count", &row_count.to_string())?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}
