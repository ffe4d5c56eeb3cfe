use std::str::FromStr;

use crate::delimiter::Delimiter;

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    /// One object per data row, keyed by header or by position.
    Objects,
    /// The table verbatim, header row included.
    Arrays,
}

impl FromStr for JsonShape {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "objects" | "object-array" | "object" => Ok(Self::Objects),
            "arrays" | "array-of-arrays" | "array" => Ok(Self::Arrays),
            other => Err(format!(
                "invalid JSON shape '{other}', expected objects or arrays"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    /// Portrait width and height in millimetres.
    #[must_use]
    pub const fn dimensions_mm(self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::Letter => (215.9, 279.4),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A4 => "a4",
            Self::Letter => "letter",
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            other => Err(format!("invalid page size '{other}', expected a4 or letter")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            other => Err(format!(
                "invalid orientation '{other}', expected portrait or landscape"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    pub has_header: bool,
    /// `None` detects the delimiter from the input.
    pub delimiter: Option<Delimiter>,
    pub json_shape: JsonShape,
    pub pretty: bool,
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub sheet_name: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: None,
            json_shape: JsonShape::Objects,
            pretty: true,
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConversionOptions, JsonShape, Orientation, PageSize};
    use std::str::FromStr;

    #[test]
    fn parses_option_values() {
        assert_eq!(JsonShape::from_str("Arrays"), Ok(JsonShape::Arrays));
        assert_eq!(JsonShape::from_str("object-array"), Ok(JsonShape::Objects));
        assert_eq!(PageSize::from_str("LETTER"), Ok(PageSize::Letter));
        assert_eq!(Orientation::from_str("landscape"), Ok(Orientation::Landscape));
    }

    #[test]
    fn rejects_unknown_values() {
        let err = PageSize::from_str("a3").expect_err("a3 is not offered");
        assert!(err.contains("a4 or letter"));
    }

    #[test]
    fn defaults_match_converter_pages() {
        let options = ConversionOptions::default();
        assert!(options.has_header);
        assert!(options.pretty);
        assert_eq!(options.delimiter, None);
        assert_eq!(options.sheet_name, "Sheet1");
    }
}
