//! Reference table and its builder.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::config::LABEL_SEPARATOR;

use super::Dataset;

/// Immutable domain → category lookup for one (dataset, year).
///
/// Holds the exact index keyed by canonical domain and a secondary index keyed
/// by registrable domain, where only the first occurrence of each registrable
/// domain is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTable {
    dataset: Dataset,
    year: u16,
    exact: HashMap<String, String>,
    registrable: HashMap<String, String>,
}

impl ReferenceTable {
    /// Dataset this table was built from.
    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    /// Dataset year.
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Category recorded for exactly this canonical domain.
    pub fn exact(&self, domain: &str) -> Option<&str> {
        self.exact.get(domain).map(String::as_str)
    }

    /// Category recorded for a registrable domain (first occurrence in the source).
    pub fn by_registrable(&self, registrable: &str) -> Option<&str> {
        self.registrable.get(registrable).map(String::as_str)
    }

    /// Number of exact entries.
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    /// Returns true when the table has no exact entries.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Number of registrable-domain fallback entries.
    pub fn registrable_len(&self) -> usize {
        self.registrable.len()
    }
}

/// Accumulates entries before freezing them into a [`ReferenceTable`].
#[derive(Debug, Clone)]
pub struct ReferenceTableBuilder {
    dataset: Dataset,
    year: u16,
    exact: HashMap<String, String>,
    registrable: HashMap<String, String>,
}

impl ReferenceTableBuilder {
    /// Starts an empty table for `(dataset, year)`.
    pub fn new(dataset: Dataset, year: u16) -> Self {
        Self {
            dataset,
            year,
            exact: HashMap::new(),
            registrable: HashMap::new(),
        }
    }

    /// Inserts an exact entry; the first category seen for a domain wins.
    pub fn insert(&mut self, domain: impl Into<String>, category: impl Into<String>) -> &mut Self {
        self.exact.entry(domain.into()).or_insert_with(|| category.into());
        self
    }

    /// Adds one source category for a domain, building a multi-label value.
    ///
    /// Distinct labels are joined with `|` in the order they were first added,
    /// so a domain listed under `news` and then `shopping` ends up as
    /// `news|shopping`.
    pub fn add_label(&mut self, domain: impl Into<String>, label: &str) -> &mut Self {
        match self.exact.entry(domain.into()) {
            Entry::Vacant(e) => {
                e.insert(label.to_string());
            }
            Entry::Occupied(mut e) => {
                let value = e.get_mut();
                if !value.split(LABEL_SEPARATOR).any(|existing| existing == label) {
                    value.push(LABEL_SEPARATOR);
                    value.push_str(label);
                }
            }
        }
        self
    }

    /// Inserts a registrable-domain fallback entry; the first occurrence wins.
    pub fn insert_registrable(
        &mut self,
        registrable: impl Into<String>,
        category: impl Into<String>,
    ) -> &mut Self {
        self.registrable
            .entry(registrable.into())
            .or_insert_with(|| category.into());
        self
    }

    /// Freezes the builder.
    pub fn build(self) -> ReferenceTable {
        ReferenceTable {
            dataset: self.dataset,
            year: self.year,
            exact: self.exact,
            registrable: self.registrable,
        }
    }
}
