//! Two-tier category resolution.
//!
//! Each row's canonical domain is looked up in the table's exact index first.
//! Only when that misses is the row's registrable domain looked up in the
//! registrable-domain index. A row matching neither gets a null category.

use crate::assemble::{ColumnPrefix, DerivedColumns};
use crate::domain::{normalize, registrable_domain, ExcludeSubdomains};
use crate::error_handling::CategoryError;
use crate::frame::{Frame, Value};
use crate::reference::ReferenceTable;

/// Where a resolved category came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// The canonical domain itself is in the table.
    Exact,
    /// Only its registrable domain is.
    Registrable,
}

/// Looks up one canonical domain in both tiers.
///
/// An exact hit always wins over the registrable-domain fallback.
pub fn lookup<'t>(table: &'t ReferenceTable, domain: &str) -> Option<(&'t str, MatchTier)> {
    if domain.is_empty() {
        return None;
    }
    if let Some(category) = table.exact(domain) {
        return Some((category, MatchTier::Exact));
    }
    let registrable = registrable_domain(domain);
    if registrable.is_empty() {
        return None;
    }
    table
        .by_registrable(&registrable)
        .map(|category| (category, MatchTier::Registrable))
}

/// Appends `{dataset}_{year}_domain` and `{dataset}_{year}_cat` to a copy of `frame`.
///
/// Non-text cells in `column` normalize to an empty domain and resolve to a
/// null category.
pub fn resolve(
    frame: &Frame,
    column: &str,
    table: &ReferenceTable,
) -> Result<Frame, CategoryError> {
    let values = frame
        .column(column)
        .ok_or_else(|| CategoryError::MissingColumn(column.to_string()))?;

    let domains: Vec<String> = values
        .iter()
        .map(|value| {
            value
                .as_str()
                .map(|raw| normalize(raw, &ExcludeSubdomains::Never))
                .unwrap_or_default()
        })
        .collect();

    let (mut exact_hits, mut fallback_hits) = (0usize, 0usize);
    let categories: Vec<Value> = domains
        .iter()
        .map(|domain| match lookup(table, domain) {
            Some((category, tier)) => {
                match tier {
                    MatchTier::Exact => exact_hits += 1,
                    MatchTier::Registrable => fallback_hits += 1,
                }
                Value::Text(category.to_string())
            }
            None => Value::Null,
        })
        .collect();

    log::debug!(
        "Resolved {} rows against {} {}: {} exact, {} fallback, {} unmatched",
        domains.len(),
        table.dataset(),
        table.year(),
        exact_hits,
        fallback_hits,
        domains.len() - exact_hits - fallback_hits
    );

    let mut derived = DerivedColumns::new(ColumnPrefix::new(
        table.dataset().to_string(),
        table.year(),
    ));
    derived.push("domain", domains).push("cat", categories);
    derived.apply(frame)
}
