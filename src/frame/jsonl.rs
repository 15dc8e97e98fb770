//! JSONL export for frames.
//!
//! One JSON object per row, keys in column order.

use std::io::Write;

use super::Frame;
use crate::error_handling::FrameError;

impl Frame {
    /// Writes one JSON object per row.
    ///
    /// Returns the number of rows written.
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> Result<usize, FrameError> {
        for row in 0..self.rows {
            let mut obj = serde_json::Map::with_capacity(self.columns.len());
            for column in &self.columns {
                obj.insert(
                    column.name.clone(),
                    serde_json::to_value(&column.values[row])?,
                );
            }
            serde_json::to_writer(&mut writer, &obj)?;
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(self.rows)
    }
}
