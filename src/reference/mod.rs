//! Reference tables.
//!
//! This module handles:
//! - The catalogue of datasets (taxonomy, aggregated blacklist, phishing list)
//! - Per-dataset column mapping and artifact naming
//! - Building and parsing immutable [`ReferenceTable`]s
//!
//! Fetching and caching the files is the job of [`crate::artifact`]; the
//! process-wide cache of parsed tables lives in [`crate::Categorizer`].

mod load;
mod table;

use strum_macros::{AsRefStr, Display, EnumIter};

pub use load::{parse_table, read_table};
pub use table::{ReferenceTable, ReferenceTableBuilder};

/// Datasets available for exact/fallback lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Dataset {
    /// Open-directory taxonomy: one category path per domain, with a
    /// registrable-domain column used for the fallback join.
    Dmoz,
    /// Aggregated blacklist: `|`-joined categories of every list a domain was on.
    Shalla,
    /// Verified phishing domains.
    Phish,
}

/// Columns read from a dataset's table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Canonical domain column
    pub domain: &'static str,
    /// Category column
    pub category: &'static str,
    /// Registrable-domain column, for datasets with a fallback index
    pub registrable: Option<&'static str>,
}

impl Dataset {
    /// Year used when the caller does not ask for one.
    pub fn default_year(&self) -> u16 {
        match self {
            Dataset::Dmoz => 2016,
            Dataset::Shalla => 2017,
            Dataset::Phish => 2017,
        }
    }

    /// Column mapping for this dataset's files.
    pub fn schema(&self) -> TableSchema {
        match self {
            Dataset::Dmoz => TableSchema {
                domain: "domain",
                category: "cat_labels_en",
                registrable: Some("rdomain"),
            },
            Dataset::Shalla => TableSchema {
                domain: "domain",
                category: "shalla_cat",
                registrable: None,
            },
            Dataset::Phish => TableSchema {
                domain: "domain",
                category: "verified",
                registrable: None,
            },
        }
    }

    /// Cache and download file name for `year`.
    pub fn file_name(&self, year: u16) -> String {
        format!("{}_{}.csv.bz2", self.as_ref(), year)
    }
}
