use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::delimiter::Delimiter;
use crate::error::ConvertError;

pub const CSV_MIME: &str = "text/csv";

/// Writes rows as delimited text, quoting only fields that need it.
pub(crate) fn write_csv_to_string(
    rows: &[Vec<String>],
    delimiter: Delimiter,
) -> Result<String, ConvertError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::<u8>::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ConvertError::Io(error.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|error| ConvertError::Internal(format!("invalid utf-8 csv output: {error}")))
}
