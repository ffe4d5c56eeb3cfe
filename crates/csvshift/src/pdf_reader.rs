use lopdf::Document;

use crate::error::ConvertError;

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

/// Extracts the text of every page, in page order, one page per block.
///
/// `pdf-extract` output is preferred; pages it leaves empty fall back to the
/// text `lopdf` finds in the page content stream.
pub(crate) fn read_pdf_text(input_pdf: &[u8]) -> Result<String, ConvertError> {
    let document = Document::load_mem(input_pdf)?;
    if document.is_encrypted() {
        return Err(ConvertError::EncryptedPdf);
    }
    let pages_map = document.get_pages();

    let extracted_pages = match pdf_extract::extract_text_from_mem(input_pdf) {
        Ok(text) => split_text_into_pages(&text),
        Err(error) => {
            tracing::debug!(%error, "pdf-extract failed; falling back to content streams");
            Vec::new()
        }
    };

    if !extracted_pages.is_empty() && extracted_pages.len() != pages_map.len() {
        let whole = extracted_pages.join("\n");
        if !whole.trim().is_empty() {
            return Ok(whole);
        }
    }

    let mut texts = Vec::with_capacity(pages_map.len());
    for (index, page_no) in pages_map.keys().enumerate() {
        let text = extracted_pages
            .get(index)
            .filter(|text| !text.trim().is_empty())
            .cloned()
            .or_else(|| {
                document
                    .extract_text(&[*page_no])
                    .ok()
                    .filter(|text| !text.trim().is_empty())
            })
            .unwrap_or_default();
        texts.push(text);
    }

    tracing::debug!(pages = texts.len(), "extracted PDF text");
    Ok(texts.join("\n"))
}
