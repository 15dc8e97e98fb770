//! Parsing reference table files.
//!
//! Files are CSV with a header row, bzip2-compressed as published upstream.
//! Gzip and plain CSV are also accepted; the format is sniffed from the magic
//! bytes. Column names differ per dataset and are mapped through
//! [`TableSchema`](super::TableSchema).

use anyhow::{Context, Result};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::io::Read;

use super::{Dataset, ReferenceTable, ReferenceTableBuilder};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";

/// Parses a downloaded or cached table for `(dataset, year)`.
pub fn parse_table(dataset: Dataset, year: u16, bytes: &[u8]) -> Result<ReferenceTable> {
    if bytes.starts_with(&GZIP_MAGIC) {
        read_table(dataset, year, GzDecoder::new(bytes))
            .with_context(|| format!("Failed to read gzip {} table", dataset))
    } else if bytes.starts_with(BZIP2_MAGIC) {
        read_table(dataset, year, BzDecoder::new(bytes))
            .with_context(|| format!("Failed to read bzip2 {} table", dataset))
    } else {
        read_table(dataset, year, bytes)
            .with_context(|| format!("Failed to read {} table", dataset))
    }
}

/// Reads a table from CSV.
///
/// Rows with an empty domain or category are skipped. Duplicate domains keep
/// their first category, and the registrable-domain index (when the dataset
/// has one) keeps the first category seen for each registrable domain.
pub fn read_table<R: Read>(dataset: Dataset, year: u16, reader: R) -> Result<ReferenceTable> {
    let schema = dataset.schema();
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers().context("Failed to read header")?.clone();

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow::anyhow!("Column `{}` not found in {} table", name, dataset))
    };
    let domain_idx = position(schema.domain)?;
    let category_idx = position(schema.category)?;
    let registrable_idx = schema.registrable.map(position).transpose()?;

    let mut builder = ReferenceTableBuilder::new(dataset, year);
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.context("Failed to read row")?;
        let domain = record.get(domain_idx).unwrap_or_default();
        let category = record.get(category_idx).unwrap_or_default();
        if domain.is_empty() || category.is_empty() {
            skipped += 1;
            continue;
        }

        builder.insert(domain, category);
        if let Some(idx) = registrable_idx {
            if let Some(registrable) = record.get(idx).filter(|r| !r.is_empty()) {
                builder.insert_registrable(registrable, category);
            }
        }
    }

    let table = builder.build();
    log::info!(
        "Loaded {} table for {}: {} entries, {} registrable fallbacks ({} rows skipped)",
        dataset,
        year,
        table.len(),
        table.registrable_len(),
        skipped
    );
    Ok(table)
}
