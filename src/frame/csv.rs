//! CSV import and export for frames.
//!
//! Every non-empty cell is read as text; empty cells become `Value::Null`.

use csv::{ReaderBuilder, Writer};
use std::io::{Read, Write};

use super::{Column, Frame, Value};
use crate::error_handling::FrameError;

impl Frame {
    /// Reads a frame from CSV with a header row.
    pub fn read_csv<R: Read>(reader: R) -> Result<Frame, FrameError> {
        let mut reader = ReaderBuilder::new().flexible(false).from_reader(reader);
        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            Value::Null
                        } else {
                            Value::Text(cell.to_string())
                        }
                    })
                    .collect(),
            );
        }

        if rows.is_empty() {
            // Keep the header even when there is no data
            let columns = header
                .into_iter()
                .map(|name| Column {
                    name,
                    values: Vec::new(),
                })
                .collect();
            return Frame::from_columns(columns);
        }

        Frame::from_rows(&header, rows)
    }

    /// Writes the frame as CSV with a header row. Nulls are written as empty cells.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), FrameError> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(self.columns.iter().map(|c| c.name.as_str()))?;
        for row in 0..self.rows {
            writer.write_record(self.columns.iter().map(|c| c.values[row].to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_maps_empty_cells_to_null() {
        let data = "label,url\ntest1,http://www.google.com\ntest2,\n";
        let frame = Frame::read_csv(data.as_bytes()).expect("valid csv");
        assert_eq!(frame.len(), 2);
        assert_eq!(
            frame.get(0, "url"),
            Some(&Value::Text("http://www.google.com".to_string()))
        );
        assert_eq!(frame.get(1, "url"), Some(&Value::Null));
    }

    #[test]
    fn test_read_csv_header_only() {
        let frame = Frame::read_csv("domain,cat\n".as_bytes()).expect("valid csv");
        assert!(frame.is_empty());
        assert_eq!(frame.column_names(), vec!["domain", "cat"]);
    }

    #[test]
    fn test_write_csv_round_trips_text_and_nulls() {
        let frame = Frame::from_rows(
            &["url", "cat"],
            vec![
                vec!["a.com".into(), "news".into()],
                vec!["b.com".into(), Value::Null],
            ],
        )
        .expect("valid frame");

        let mut out = Vec::new();
        frame.write_csv(&mut out).expect("write succeeds");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "url,cat\na.com,news\nb.com,\n");

        let back = Frame::read_csv(text.as_bytes()).expect("read back");
        assert_eq!(back, frame);
    }
}
