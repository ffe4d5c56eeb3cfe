mod common;

use std::io::{Cursor, Read};
use std::process::Command;

use csvshift::{
    ConversionOptions, ConvertError, Delimiter, JsonShape, Orientation, RawInput, TargetFormat,
    convert_table, extract_pdf, extract_pdf_to_csv, parse_table,
};
use lopdf::Document;
use tempfile::tempdir;

fn sample_input() -> RawInput {
    RawInput::new("contacts.csv", common::SAMPLE_CSV.as_bytes().to_vec())
}

fn worksheet_xml(xlsx: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(xlsx)).expect("xlsx should be a zip");
    let mut sheet = archive
        .by_name("xl/worksheets/sheet1.xml")
        .expect("worksheet part should exist");
    let mut xml = String::new();
    sheet.read_to_string(&mut xml).expect("worksheet should be utf-8");
    xml
}

#[test]
fn sample_csv_becomes_five_by_four_spreadsheet() {
    let options = ConversionOptions::default();
    let table = parse_table(&sample_input(), &options).expect("sample should parse");
    assert_eq!(table.delimiter, Some(Delimiter::Comma));
    assert_eq!(table.row_count(), 5);

    let artifact = convert_table(&table, TargetFormat::Xlsx, &options).expect("xlsx conversion");
    assert_eq!(artifact.file_name, "contacts.xlsx");

    let xml = worksheet_xml(&artifact.bytes);
    let rows = xml.split("<row ").skip(1).collect::<Vec<_>>();
    assert_eq!(rows.len(), 5, "worksheet: {xml}");
    for row in rows {
        assert_eq!(row.matches("<c ").count(), 4, "row: {row}");
    }
    assert!(xml.contains(">Portland, OR<"));
    assert!(xml.contains(">00123<"));
    assert!(xml.contains(">Carol &quot;CJ&quot; Jones<"));
}

#[test]
fn sample_csv_becomes_header_keyed_json() {
    let options = ConversionOptions {
        pretty: false,
        ..ConversionOptions::default()
    };
    let table = parse_table(&sample_input(), &options).expect("sample should parse");
    let artifact = convert_table(&table, TargetFormat::Json, &options).expect("json conversion");

    let value: serde_json::Value =
        serde_json::from_slice(&artifact.bytes).expect("output should be JSON");
    let records = value.as_array().expect("top level array");
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["City"], "Portland, OR");
    assert_eq!(records[3]["Zip"], "80014");
    assert_eq!(records[2]["Zip"], "02108");
}

#[test]
fn array_shape_keeps_header_row() {
    let options = ConversionOptions {
        json_shape: JsonShape::Arrays,
        ..ConversionOptions::default()
    };
    let table = parse_table(&sample_input(), &options).expect("sample should parse");
    let artifact = convert_table(&table, TargetFormat::Json, &options).expect("json conversion");

    let value: serde_json::Value =
        serde_json::from_slice(&artifact.bytes).expect("output should be JSON");
    assert_eq!(value[0][0], "Name");
    assert_eq!(value.as_array().map(Vec::len), Some(5));
}

#[test]
fn wide_csv_renders_landscape_pdf() {
    let raw = RawInput::new("wide.csv", b"a,b,c,d,e\n1,2,3,4,5\n6,7\n".to_vec());
    let options = ConversionOptions {
        orientation: Orientation::Portrait,
        ..ConversionOptions::default()
    };
    let table = parse_table(&raw, &options).expect("wide csv should parse");
    let artifact = convert_table(&table, TargetFormat::Pdf, &options).expect("pdf conversion");
    assert_eq!(artifact.mime_type, "application/pdf");

    let doc = Document::load_mem(&artifact.bytes).expect("pdf should load");
    let (_, page_id) = doc
        .get_pages()
        .into_iter()
        .next()
        .expect("at least one page");
    let page = doc.get_dictionary(page_id).expect("page dictionary");
    let parent = page
        .get(b"Parent")
        .and_then(lopdf::Object::as_reference)
        .expect("page parent");
    let media_box = doc
        .get_dictionary(parent)
        .and_then(|pages| pages.get(b"MediaBox"))
        .and_then(lopdf::Object::as_array)
        .expect("media box");
    let width = media_box[2].as_float().expect("width");
    let height = media_box[3].as_float().expect("height");
    assert!(width > height, "expected landscape, got {width}x{height}");
}

#[test]
fn recovers_rows_from_text_pdf() {
    let pdf = common::text_pdf(&[vec!["Name  Age  Score", "Alice  30  98", "Bob  22  87"]])
        .expect("PDF fixture should be created");
    let raw = RawInput::new("scores.PDF", pdf);

    let table = extract_pdf(&raw).expect("extraction should succeed");
    assert_eq!(table.file_name, "scores");
    assert!(
        table.rows.iter().any(|row| row == &["Alice", "30", "98"]),
        "rows: {:?}",
        table.rows
    );

    let artifact = extract_pdf_to_csv(&raw, Delimiter::Semicolon).expect("csv output");
    let csv = String::from_utf8(artifact.bytes).expect("utf-8 csv");
    assert!(csv.contains("Bob;22;87"), "csv: {csv:?}");
    assert_eq!(artifact.file_name, "scores.csv");
}

#[test]
fn image_only_pdf_has_no_extractable_text() {
    let pdf = common::text_pdf(&[vec![]]).expect("PDF fixture should be created");
    let raw = RawInput::new("scan.pdf", pdf);

    let err = extract_pdf(&raw).expect_err("blank page has no text");
    assert!(matches!(err, ConvertError::NoExtractableText), "{err:?}");
}

#[test]
fn cli_converts_csv_file() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("contacts.csv");
    let output = dir.path().join("contacts.json");
    std::fs::write(&input, common::SAMPLE_CSV).expect("input should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_csvshift"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
            "--compact",
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(0));
    let json = std::fs::read_to_string(&output).expect("output should exist");
    assert!(json.starts_with(r#"[{"Name":"Alice""#), "json: {json}");
}

#[test]
fn cli_exits_with_code_2_when_no_data_rows() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("header-only.csv");
    let output = dir.path().join("header-only.json");
    std::fs::write(&input, "Name,Email\n").expect("input should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_csvshift"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}

#[test]
fn cli_exits_with_code_1_on_wrong_extension() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("notes.txt");
    let output = dir.path().join("notes.json");
    std::fs::write(&input, "a,b\n").expect("input should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_csvshift"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(1));
}

#[test]
fn cli_extract_rejects_non_pdf_input() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("contacts.csv");
    let output = dir.path().join("contacts-out.csv");
    std::fs::write(&input, common::SAMPLE_CSV).expect("input should be written");

    let result = Command::new(env!("CARGO_BIN_EXE_csvshift"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .output()
        .expect("CLI should run");

    assert_eq!(result.status.code(), Some(1));
    assert!(!output.exists(), "nothing should be written for a CSV input");
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Please upload a .pdf file."), "stderr: {stderr}");
}
