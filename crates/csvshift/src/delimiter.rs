use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Lines inspected when guessing the delimiter.
pub const SAMPLE_LINES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    /// Candidates in tie-break order.
    pub const CANDIDATES: [Self; 3] = [Self::Comma, Self::Semicolon, Self::Tab];

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Semicolon => ';',
            Self::Tab => '\t',
        }
    }

    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Semicolon => b';',
            Self::Tab => b'\t',
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Comma => "comma",
            Self::Semicolon => "semicolon",
            Self::Tab => "tab",
        }
    }
}

impl Display for Delimiter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "," => return Ok(Self::Comma),
            ";" => return Ok(Self::Semicolon),
            "\t" | "\\t" => return Ok(Self::Tab),
            _ => {}
        }

        match value.trim().to_ascii_lowercase().as_str() {
            "comma" => Ok(Self::Comma),
            "semicolon" => Ok(Self::Semicolon),
            "tab" => Ok(Self::Tab),
            other => Err(format!(
                "unsupported delimiter '{other}', expected comma, semicolon or tab"
            )),
        }
    }
}

/// Picks the candidate occurring most often in the first few lines.
///
/// Ties go to the earlier candidate, so comma wins when nothing stands out.
#[must_use]
pub fn detect_delimiter(text: &str) -> Delimiter {
    let sample = text.split('\n').take(SAMPLE_LINES).collect::<Vec<_>>();

    let mut best = Delimiter::Comma;
    let mut best_count = 0_usize;
    for candidate in Delimiter::CANDIDATES {
        let count = sample
            .iter()
            .map(|line| line.matches(candidate.as_char()).count())
            .sum::<usize>();
        if count > best_count {
            best_count = count;
            best = candidate;
        }
    }

    tracing::debug!(delimiter = %best, occurrences = best_count, "detected delimiter");
    best
}

#[cfg(test)]
mod tests {
    use super::{Delimiter, detect_delimiter};

    #[test]
    fn defaults_to_comma_without_candidates() {
        assert_eq!(detect_delimiter("just some words"), Delimiter::Comma);
        assert_eq!(detect_delimiter(""), Delimiter::Comma);
    }

    #[test]
    fn ties_prefer_comma() {
        assert_eq!(detect_delimiter("a,b;c"), Delimiter::Comma);
        assert_eq!(detect_delimiter("a;b\tc"), Delimiter::Semicolon);
    }

    #[test]
    fn picks_most_frequent_candidate() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), Delimiter::Semicolon);
        assert_eq!(detect_delimiter("a\tb\tc,d\n1\t2\t3"), Delimiter::Tab);
    }

    #[test]
    fn only_samples_leading_lines() {
        let text = "a,b\n1,2\n3,4\n5,6\n7,8\n;;;;;;;;;;;;;;;;";
        assert_eq!(detect_delimiter(text), Delimiter::Comma);
    }

    #[test]
    fn parses_symbols_and_names() {
        assert_eq!(",".parse::<Delimiter>(), Ok(Delimiter::Comma));
        assert_eq!("Semicolon".parse::<Delimiter>(), Ok(Delimiter::Semicolon));
        assert_eq!("\t".parse::<Delimiter>(), Ok(Delimiter::Tab));
        assert_eq!("tab".parse::<Delimiter>(), Ok(Delimiter::Tab));
        assert!("|".parse::<Delimiter>().is_err());
    }
}
