//! Paste decoding

use log::trace;

use crate::error::ClipboardResult;
use crate::options::PasteOptions;

/// Field delimiter for one pasted line: tab wins over comma
pub fn detect_delimiter(line: &str) -> u8 {
    if line.contains('\t') {
        b'\t'
    } else if line.contains(',') {
        b','
    } else {
        b'\t'
    }
}

/// Split clipboard text into a row-major block of fields
///
/// Lines are split on CRLF or LF and each line picks its own delimiter.
/// Quoted fields may contain the delimiter but not a line break. A trailing
/// line terminator does not produce an extra row; an empty line in the
/// middle yields a row with a single empty field.
pub fn parse_clipboard_text(text: &str, options: &PasteOptions) -> ClipboardResult<Vec<Vec<String>>> {
    let body = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);

    if body.is_empty() {
        return Ok(Vec::new());
    }

    let rows = body
        .split('\n')
        .map(|line| parse_line(line.strip_suffix('\r').unwrap_or(line), options))
        .collect::<ClipboardResult<Vec<_>>>()?;
    trace!("decoded {} pasted rows", rows.len());
    Ok(rows)
}

fn parse_line(line: &str, options: &PasteOptions) -> ClipboardResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(line))
        .quote(options.quote)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut fields = match reader.records().next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => vec![String::new()],
    };

    if options.trim_fields {
        for field in &mut fields {
            *field = field.trim().to_string();
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<Vec<String>> {
        parse_clipboard_text(text, &PasteOptions::default()).unwrap()
    }

    #[test]
    fn test_tab_separated_block() {
        assert_eq!(parse("1\t2\n3\t4"), vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_crlf_and_trailing_newline() {
        assert_eq!(parse("a,b\r\nc,d\r\n"), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_tab_wins_over_comma() {
        assert_eq!(parse("1,5\t2"), vec![vec!["1,5", "2"]]);
    }

    #[test]
    fn test_quoted_delimiters_are_kept() {
        assert_eq!(
            parse("\"Smith, John\",42"),
            vec![vec!["Smith, John", "42"]]
        );
        assert_eq!(parse("\"say \"\"hi\"\"\"\tx"), vec![vec!["say \"hi\"", "x"]]);
    }

    #[test]
    fn test_delimiter_chosen_per_line() {
        assert_eq!(parse("a\tb\nc,d"), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(parse("").is_empty());
        assert!(parse("\n").is_empty());
        assert_eq!(parse("a\n\nb"), vec![vec!["a"], vec![""], vec!["b"]]);
    }

    #[test]
    fn test_trim_fields() {
        let options = PasteOptions {
            trim_fields: true,
            ..Default::default()
        };
        assert_eq!(
            parse_clipboard_text(" a , b ", &options).unwrap(),
            vec![vec!["a", "b"]]
        );
    }

    #[test]
    fn test_single_value() {
        assert_eq!(parse("hello world"), vec![vec!["hello world"]]);
    }
}
