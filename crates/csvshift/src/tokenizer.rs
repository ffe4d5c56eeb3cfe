use crate::delimiter::Delimiter;

/// Splits delimited text into rows of cells.
///
/// Quoting is per line: a quoted field never spans a line break, and an
/// unterminated quote runs to the end of its line. Blank lines are dropped and
/// rows keep whatever width their line produced.
#[must_use]
pub fn tokenize(text: &str, delimiter: Delimiter) -> Vec<Vec<String>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| tokenize_line(line, delimiter.as_char()))
        .collect()
}

pub(crate) fn tokenize_line(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if ch == delimiter && !in_quotes {
            cells.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }

    cells.push(current);
    cells
}

#[cfg(test)]
mod tests {
    use super::{tokenize, tokenize_line};
    use crate::delimiter::Delimiter;

    #[test]
    fn splits_simple_rows() {
        let rows = tokenize("a,b\nc,d", Delimiter::Comma);
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn keeps_delimiter_inside_quotes() {
        let rows = tokenize("\"a,b\",c", Delimiter::Comma);
        assert_eq!(rows, vec![vec!["a,b", "c"]]);
    }

    #[test]
    fn unescapes_doubled_quotes() {
        let rows = tokenize("\"a\"\"b\",c", Delimiter::Comma);
        assert_eq!(rows, vec![vec!["a\"b", "c"]]);
    }

    #[test]
    fn drops_blank_lines_and_handles_crlf() {
        let rows = tokenize("a;b\r\n\r\n   \r\nc;d\r\n", Delimiter::Semicolon);
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn unterminated_quote_consumes_rest_of_line() {
        let rows = tokenize("\"a,b,c\nd,e", Delimiter::Comma);
        assert_eq!(rows, vec![vec!["a,b,c"], vec!["d", "e"]]);
    }

    #[test]
    fn keeps_ragged_rows_and_empty_cells() {
        let rows = tokenize("a\tb\tc\n1\t\n", Delimiter::Tab);
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", ""]]);
    }

    #[test]
    fn does_not_trim_cells() {
        assert_eq!(tokenize_line(" a , b ", ','), vec![" a ", " b "]);
    }
}
