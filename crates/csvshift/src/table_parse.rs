use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConvertError;

static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("hardcoded whitespace-run regex is valid"));

/// Guesses the cells of one line of extracted PDF text.
///
/// Tabs win over pipes, pipes over runs of two or more spaces; anything else
/// is a single cell. Pipe splitting drops empty fragments so `| a | b |`
/// yields two cells.
pub(crate) fn split_extracted_line(line: &str) -> Vec<String> {
    if line.contains('\t') {
        return line.split('\t').map(|cell| cell.trim().to_string()).collect();
    }

    if line.contains('|') {
        return line
            .split('|')
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .map(str::to_string)
            .collect();
    }

    if SPACE_RUN.is_match(line) {
        return SPACE_RUN
            .split(line)
            .map(|cell| cell.trim().to_string())
            .collect();
    }

    vec![line.trim().to_string()]
}

/// Recovers rows from extracted PDF text with the line heuristics above.
pub fn rows_from_text(text: &str) -> Result<Vec<Vec<String>>, ConvertError> {
    if text.trim().is_empty() {
        return Err(ConvertError::NoExtractableText);
    }

    let lines = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>();

    let rows = lines
        .iter()
        .map(|line| split_extracted_line(line))
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
        .collect::<Vec<_>>();
    if !rows.is_empty() {
        return Ok(rows);
    }

    let fallback = lines
        .iter()
        .map(|line| vec![line.trim().to_string()])
        .collect::<Vec<_>>();
    if fallback.is_empty() {
        return Err(ConvertError::NoTableData);
    }
    Ok(fallback)
}

/// Pads short rows and truncates long ones to `width` cells.
pub(crate) fn normalize_rows(rows: &[Vec<String>], width: usize) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let mut out = row.clone();
            out.resize(width, String::new());
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_rows, rows_from_text, split_extracted_line};
    use crate::error::ConvertError;

    #[test]
    fn splits_tab_separated_cells() {
        assert_eq!(split_extracted_line("A\t B \tC"), vec!["A", "B", "C"]);
    }

    #[test]
    fn splits_pipes_and_drops_empty_fragments() {
        assert_eq!(split_extracted_line("| Name | Age |"), vec!["Name", "Age"]);
    }

    #[test]
    fn splits_double_space_separated_cells() {
        assert_eq!(split_extracted_line("Alice  30   98"), vec!["Alice", "30", "98"]);
    }

    #[test]
    fn splits_on_space_runs_only() {
        assert_eq!(split_extracted_line("  indented text "), vec!["", "indented text"]);
        assert_eq!(split_extracted_line("Name Age Score"), vec!["Name Age Score"]);
    }

    #[test]
    fn empty_text_has_nothing_to_extract() {
        assert!(matches!(rows_from_text(""), Err(ConvertError::NoExtractableText)));
        assert!(matches!(
            rows_from_text(" \n\t\n"),
            Err(ConvertError::NoExtractableText)
        ));
    }

    #[test]
    fn falls_back_to_whole_lines_when_every_row_is_empty() {
        let rows = rows_from_text("|||\n| |").expect("fallback rows");
        assert_eq!(rows, vec![vec!["|||"], vec!["| |"]]);
    }

    #[test]
    fn recovers_mixed_rows() {
        let rows = rows_from_text("Name  Age\nAlice  30\nFooter line\n").expect("rows");
        assert_eq!(
            rows,
            vec![vec!["Name", "Age"], vec!["Alice", "30"], vec!["Footer line"]]
        );
    }

    #[test]
    fn normalizes_ragged_rows() {
        let rows = vec![
            vec!["a".to_string()],
            vec!["b".to_string(), "c".to_string(), "d".to_string()],
        ];
        let normalized = normalize_rows(&rows, 2);
        assert_eq!(normalized[0], vec!["a", ""]);
        assert_eq!(normalized[1], vec!["b", "c"]);
    }
}
