//! CSV output of a display grid

use std::io::Write;

use crate::error::ClipboardResult;

/// Writes rectangular blocks of display strings as CSV
pub struct GridWriter;

impl GridWriter {
    /// Write `rows` to `writer`, LF-terminated, quoting only where needed
    pub fn write<W: Write, R: AsRef<[String]>>(rows: &[R], writer: W) -> ClipboardResult<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(writer);

        for row in rows {
            csv_writer.write_record(row.as_ref())?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Render `rows` as a CSV string
    pub fn to_string<R: AsRef<[String]>>(rows: &[R]) -> ClipboardResult<String> {
        let mut out = Vec::new();
        Self::write(rows, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_only_when_needed() {
        let rows = vec![
            vec!["a".to_string(), "b, c".to_string()],
            vec!["1".to_string(), String::new()],
        ];
        assert_eq!(GridWriter::to_string(&rows).unwrap(), "a,\"b, c\"\n1,\n");
    }
}
