use encoding_rs::WINDOWS_1252;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use crate::error::ConvertError;
use crate::options::{Orientation, PageSize};
use crate::table_parse::normalize_rows;

pub const PDF_MIME: &str = "application/pdf";

/// Above this many columns the page is turned to landscape.
pub const WIDE_TABLE_COLUMNS: usize = 4;

const MM_TO_PT: f32 = 72.0 / 25.4;
const TOP_MARGIN_MM: f32 = 20.0;
const AVERAGE_GLYPH_EM: f32 = 0.5;
const LINE_HEIGHT_EM: f32 = 1.15;
const ASCENT_EM: f32 = 0.8;
const HEADER_FILL: [f32; 3] = [66.0 / 255.0, 139.0 / 255.0, 202.0 / 255.0];
const STRIPE_FILL: [f32; 3] = [245.0 / 255.0, 245.0 / 255.0, 245.0 / 255.0];

#[derive(Debug, Clone, Copy)]
struct RowPaint {
    fill: Option<[f32; 3]>,
    font: &'static str,
    text: [f32; 3],
}

const HEADER_PAINT: RowPaint = RowPaint {
    fill: Some(HEADER_FILL),
    font: "F2",
    text: [1.0, 1.0, 1.0],
};

const BODY_PAINT: RowPaint = RowPaint {
    fill: None,
    font: "F1",
    text: [0.0, 0.0, 0.0],
};

/// Font, spacing and wrapping for one column-count band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub font_size: f32,
    pub margin_mm: f32,
    pub padding_mm: f32,
    pub header_wrap: usize,
    pub body_wrap: usize,
}

impl TableStyle {
    #[must_use]
    pub fn for_columns(columns: usize) -> Self {
        match columns {
            0..=4 => Self {
                font_size: 9.0,
                margin_mm: 10.0,
                padding_mm: 2.0,
                header_wrap: 30,
                body_wrap: 40,
            },
            5..=8 => Self {
                font_size: 7.0,
                margin_mm: 10.0,
                padding_mm: 2.0,
                header_wrap: 30,
                body_wrap: 40,
            },
            9..=12 => Self {
                font_size: 6.0,
                margin_mm: 7.0,
                padding_mm: 1.5,
                header_wrap: 25,
                body_wrap: 30,
            },
            _ => Self {
                font_size: 5.0,
                margin_mm: 5.0,
                padding_mm: 1.0,
                header_wrap: 20,
                body_wrap: 25,
            },
        }
    }

    fn leading(&self) -> f32 {
        self.font_size * LINE_HEIGHT_EM
    }

    fn padding_pt(&self) -> f32 {
        self.padding_mm * MM_TO_PT
    }

    fn min_row_height_pt(&self) -> f32 {
        (self.font_size + 2.0) * MM_TO_PT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub orientation: Orientation,
    pub width_pt: f32,
    pub height_pt: f32,
}

/// Page orientation and size in points; wide tables always go landscape.
#[must_use]
pub fn page_geometry(columns: usize, page_size: PageSize, requested: Orientation) -> PageGeometry {
    let orientation = if columns > WIDE_TABLE_COLUMNS {
        if requested == Orientation::Portrait {
            tracing::warn!(columns, "forcing landscape orientation for wide table");
        }
        Orientation::Landscape
    } else {
        requested
    };

    let (short_mm, long_mm) = page_size.dimensions_mm();
    let (width_mm, height_mm) = match orientation {
        Orientation::Portrait => (short_mm, long_mm),
        Orientation::Landscape => (long_mm, short_mm),
    };

    PageGeometry {
        orientation,
        width_pt: width_mm * MM_TO_PT,
        height_pt: height_mm * MM_TO_PT,
    }
}

/// Breaks text longer than `max_len` characters into space-separated chunks.
pub(crate) fn hard_wrap(text: &str, max_len: usize) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    if max_len == 0 || chars.len() <= max_len {
        return text.to_string();
    }

    chars
        .chunks(max_len)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Greedy word wrap to at most `width` characters per line.
pub(crate) fn word_wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0_usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().collect::<Vec<_>>();
        for piece in word_chars.chunks(width) {
            let piece_len = piece.len();
            if current_len > 0 && current_len + 1 + piece_len > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece.iter());
            current_len += piece_len;
        }
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut buffer = [0_u8; 4];
    for ch in text.chars() {
        if ch.is_ascii() && !ch.is_ascii_control() {
            bytes.push(ch as u8);
            continue;
        }
        let (encoded, _, had_errors) = WINDOWS_1252.encode(ch.encode_utf8(&mut buffer));
        if had_errors || encoded.len() != 1 || ch.is_control() {
            bytes.push(b'?');
        } else {
            bytes.extend_from_slice(&encoded);
        }
    }
    bytes
}

fn rgb(color: [f32; 3]) -> Vec<Object> {
    color.iter().map(|&value| Object::Real(value)).collect()
}

struct TableLayout {
    style: TableStyle,
    geometry: PageGeometry,
    column_width: f32,
    chars_per_line: usize,
}

impl TableLayout {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn new(columns: usize, page_size: PageSize, orientation: Orientation) -> Self {
        let style = TableStyle::for_columns(columns);
        let geometry = page_geometry(columns, page_size, orientation);
        let available = geometry.width_pt - style.margin_mm * MM_TO_PT * 2.0;
        let column_width = available / columns as f32;
        let text_width = (column_width - style.padding_pt() * 2.0).max(1.0);
        let chars_per_line = (text_width / (style.font_size * AVERAGE_GLYPH_EM)).floor().max(1.0) as usize;

        Self {
            style,
            geometry,
            column_width,
            chars_per_line,
        }
    }

    fn cell_lines(&self, text: &str, wrap: usize) -> Vec<String> {
        word_wrap(&hard_wrap(text, wrap), self.chars_per_line)
    }

    #[allow(clippy::cast_precision_loss)]
    fn row_height(&self, cells: &[Vec<String>]) -> f32 {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let natural = lines as f32 * self.style.leading() + self.style.padding_pt() * 2.0;
        natural.max(self.style.min_row_height_pt())
    }

    /// Text lines a row fragment may carry within `space` points.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn lines_fitting(&self, space: f32) -> usize {
        if space < self.style.min_row_height_pt() {
            return 0;
        }
        ((space - self.style.padding_pt() * 2.0) / self.style.leading())
            .floor()
            .max(0.0) as usize
    }

    fn left(&self) -> f32 {
        self.style.margin_mm * MM_TO_PT
    }

    fn top(&self) -> f32 {
        self.geometry.height_pt - TOP_MARGIN_MM * MM_TO_PT
    }

    fn bottom(&self) -> f32 {
        self.style.margin_mm * MM_TO_PT
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_row(
        &self,
        operations: &mut Vec<Operation>,
        cells: &[Vec<String>],
        top: f32,
        height: f32,
        paint: RowPaint,
    ) {
        let width = self.column_width * cells.len() as f32;
        if let Some(color) = paint.fill {
            operations.push(Operation::new("rg", rgb(color)));
            operations.push(Operation::new(
                "re",
                vec![
                    Object::Real(self.left()),
                    Object::Real(top - height),
                    Object::Real(width),
                    Object::Real(height),
                ],
            ));
            operations.push(Operation::new("f", vec![]));
        }

        let padding = self.style.padding_pt();
        let leading = self.style.leading();
        for (index, lines) in cells.iter().enumerate() {
            let x = self.left() + self.column_width * index as f32 + padding;
            let baseline = top - padding - self.style.font_size * ASCENT_EM;
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![paint.font.into(), Object::Real(self.style.font_size)],
            ));
            operations.push(Operation::new("rg", rgb(paint.text)));
            operations.push(Operation::new("TL", vec![Object::Real(leading)]));
            operations.push(Operation::new(
                "Td",
                vec![Object::Real(x), Object::Real(baseline)],
            ));
            for (line_index, line) in lines.iter().enumerate() {
                if line_index > 0 {
                    operations.push(Operation::new("T*", vec![]));
                }
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
                ));
            }
            operations.push(Operation::new("ET", vec![]));
        }
    }
}

/// Splits every cell after its first `keep` lines; returns the kept part and the rest.
fn split_cell_lines(cells: Vec<Vec<String>>, keep: usize) -> (Vec<Vec<String>>, Vec<Vec<String>>) {
    cells
        .into_iter()
        .map(|mut lines| {
            let rest = lines.split_off(keep.min(lines.len()));
            (lines, rest)
        })
        .unzip()
}

/// Accumulates content operations page by page.
struct PageWriter<'a> {
    layout: &'a TableLayout,
    /// Header drawn at the top of every page, with its height.
    header: Option<(&'a [Vec<String>], f32)>,
    pages: Vec<Vec<Operation>>,
    operations: Vec<Operation>,
    cursor: f32,
    rows_on_page: usize,
}

impl<'a> PageWriter<'a> {
    fn new(layout: &'a TableLayout, header: Option<(&'a [Vec<String>], f32)>) -> Self {
        let mut writer = Self {
            layout,
            header,
            pages: Vec::new(),
            operations: Vec::new(),
            cursor: layout.top(),
            rows_on_page: 0,
        };
        writer.draw_header();
        writer
    }

    fn draw_header(&mut self) {
        if let Some((cells, height)) = self.header {
            self.layout
                .draw_row(&mut self.operations, cells, self.cursor, height, HEADER_PAINT);
            self.cursor -= height;
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.operations));
        self.cursor = self.layout.top();
        self.rows_on_page = 0;
        self.draw_header();
    }

    fn fresh_page_space(&self) -> f32 {
        let header_height = self.header.map_or(0.0, |(_, height)| height);
        self.layout.top() - self.layout.bottom() - header_height
    }

    fn draw(&mut self, cells: &[Vec<String>], height: f32, paint: RowPaint) {
        self.layout
            .draw_row(&mut self.operations, cells, self.cursor, height, paint);
        self.cursor -= height;
        self.rows_on_page += 1;
    }

    /// Places one row, moving it to a new page when it does not fit and
    /// splitting its lines across pages when it is taller than a page.
    fn place_row(&mut self, cells: Vec<Vec<String>>, paint: RowPaint) {
        let mut remaining = cells;
        loop {
            let height = self.layout.row_height(&remaining);
            if self.cursor - height >= self.layout.bottom() {
                self.draw(&remaining, height, paint);
                return;
            }
            if self.rows_on_page > 0 && height <= self.fresh_page_space() {
                self.new_page();
                continue;
            }

            let mut keep = self.layout.lines_fitting(self.cursor - self.layout.bottom());
            if keep == 0 {
                if self.rows_on_page > 0 {
                    self.new_page();
                    continue;
                }
                // Not even one line fits on an empty page; draw one anyway.
                keep = 1;
            }

            let (head, tail) = split_cell_lines(remaining, keep);
            let head_height = self.layout.row_height(&head);
            self.draw(&head, head_height, paint);
            if tail.iter().all(Vec::is_empty) {
                return;
            }
            self.new_page();
            remaining = tail;
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(self.operations);
        self.pages
    }
}

/// Lays the table out over as many pages as needed, repeating the header on
/// each page and shading alternate body rows.
///
/// Rows taller than a page continue on the next one. A header taller than half
/// a page is drawn once, as a splittable row, instead of being repeated.
pub(crate) fn write_pdf_table(
    rows: &[Vec<String>],
    has_header: bool,
    page_size: PageSize,
    orientation: Orientation,
) -> Result<Vec<u8>, ConvertError> {
    let (header, body) = match rows.split_first() {
        Some((first, rest)) if has_header => (Some(first.as_slice()), rest),
        _ => (None, rows),
    };

    let columns = header
        .map(<[String]>::len)
        .filter(|len| *len > 0)
        .or_else(|| body.first().map(Vec::len))
        .unwrap_or(0);
    if columns == 0 {
        return Err(ConvertError::EmptyTable);
    }

    let layout = TableLayout::new(columns, page_size, orientation);
    tracing::debug!(
        columns,
        font_size = layout.style.font_size,
        orientation = layout.geometry.orientation.label(),
        "laying out PDF table"
    );

    let header_cells = header.map(|cells| {
        let mut cells = cells.to_vec();
        cells.resize(columns, String::new());
        cells
            .iter()
            .map(|text| layout.cell_lines(text, layout.style.header_wrap))
            .collect::<Vec<_>>()
    });
    let header_height = header_cells
        .as_ref()
        .map_or(0.0, |cells| layout.row_height(cells));
    let repeat_header = header_height <= (layout.top() - layout.bottom()) / 2.0;

    let mut writer = PageWriter::new(
        &layout,
        header_cells
            .as_deref()
            .filter(|_| repeat_header)
            .map(|cells| (cells, header_height)),
    );
    if let Some(cells) = header_cells.clone().filter(|_| !repeat_header) {
        writer.place_row(cells, HEADER_PAINT);
    }

    for (index, row) in normalize_rows(body, columns).iter().enumerate() {
        let cells = row
            .iter()
            .map(|text| layout.cell_lines(text, layout.style.body_wrap))
            .collect::<Vec<_>>();
        let paint = RowPaint {
            fill: (index % 2 == 0).then_some(STRIPE_FILL),
            ..BODY_PAINT
        };
        writer.place_row(cells, paint);
    }

    build_document(writer.finish(), &layout.geometry)
}

fn build_document(pages: Vec<Vec<Operation>>, geometry: &PageGeometry) -> Result<Vec<u8>, ConvertError> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut page_ids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|error| ConvertError::PdfRender(error.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let page_count =
        i64::try_from(page_ids.len()).map_err(|error| ConvertError::PdfRender(error.to_string()))?;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<Object>>(),
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(geometry.width_pt),
                Object::Real(geometry.height_pt),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|error| ConvertError::PdfRender(error.to_string()))?;
    Ok(bytes)
}
