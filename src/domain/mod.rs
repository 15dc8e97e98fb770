//! Domain extraction and normalization utilities.
//!
//! This module splits URLs and hostnames into (subdomain, registrable label,
//! public suffix) using the Public Suffix List, and reassembles the canonical
//! domain string that every lookup and prediction pipeline joins on.
//!
//! Key functions:
//! - `split_domain()` - Splits a URL or hostname into its three parts
//! - `normalize()` - Canonical domain under a subdomain-inclusion policy
//! - `registrable_domain()` - Label plus suffix, ignoring the subdomain

use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Which subdomains to keep when building a canonical domain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExcludeSubdomains {
    /// Always keep the subdomain.
    #[default]
    Never,
    /// Always drop the subdomain.
    Always,
    /// Drop the subdomain only when it equals one of these literals.
    Only(HashSet<String>),
}

impl ExcludeSubdomains {
    /// Drops only the listed literal subdomains (e.g. `["www"]`).
    pub fn only<I, S>(subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExcludeSubdomains::Only(subdomains.into_iter().map(Into::into).collect())
    }

    fn keeps(&self, subdomain: &str) -> bool {
        match self {
            ExcludeSubdomains::Never => true,
            ExcludeSubdomains::Always => false,
            ExcludeSubdomains::Only(set) => !set.contains(subdomain),
        }
    }
}

impl From<bool> for ExcludeSubdomains {
    fn from(exclude: bool) -> Self {
        if exclude {
            ExcludeSubdomains::Always
        } else {
            ExcludeSubdomains::Never
        }
    }
}

/// The three parts of a host name. Absent parts are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainParts {
    /// Everything left of the registrable label (e.g. `www`, `a.b`)
    pub subdomain: String,
    /// The label registered under the suffix (e.g. `example`)
    pub label: String,
    /// Public suffix (e.g. `com`, `co.uk`); empty for IPs and unknown TLDs
    pub suffix: String,
}

impl DomainParts {
    /// Joins the retained parts with `.`, skipping empty ones.
    pub fn join(&self, exclude: &ExcludeSubdomains) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if !self.subdomain.is_empty() && exclude.keeps(&self.subdomain) {
            parts.push(&self.subdomain);
        }
        if !self.label.is_empty() {
            parts.push(&self.label);
        }
        if !self.suffix.is_empty() {
            parts.push(&self.suffix);
        }
        parts.join(".")
    }

    /// Label plus suffix: the smallest unit a registrant can own.
    pub fn registrable(&self) -> String {
        self.join(&ExcludeSubdomains::Always)
    }
}

/// Splits a URL or bare hostname into subdomain, registrable label and suffix.
///
/// Returns `None` for input with no usable host (empty strings, unparsable URLs,
/// `file:` URLs). IP addresses come back as a label with no suffix, and hosts
/// under a TLD missing from the Public Suffix List keep their last label as the
/// registrable label with no suffix.
pub fn split_domain(url_or_host: &str) -> Option<DomainParts> {
    let host = extract_host(url_or_host)?;

    if host.parse::<Ipv4Addr>().is_ok() || host.parse::<Ipv6Addr>().is_ok() {
        return Some(DomainParts {
            label: host,
            ..Default::default()
        });
    }

    let suffix = psl::suffix(host.as_bytes())
        .filter(|s| s.is_known())
        .map(|s| String::from_utf8_lossy(s.as_bytes()).to_string())
        .unwrap_or_default();

    // Everything left of the suffix, without the joining dot
    let rest = if suffix.is_empty() {
        host.as_str()
    } else if suffix == host {
        ""
    } else {
        &host[..host.len() - suffix.len() - 1]
    };

    let (subdomain, label) = match rest.rsplit_once('.') {
        Some((sub, label)) => (sub.to_string(), label.to_string()),
        None => (String::new(), rest.to_string()),
    };

    Some(DomainParts {
        subdomain,
        label,
        suffix,
    })
}

/// Canonical domain for a URL or hostname.
///
/// Unparsable input yields an empty string, the "no match" sentinel used by
/// every downstream join.
pub fn normalize(url_or_host: &str, exclude: &ExcludeSubdomains) -> String {
    split_domain(url_or_host)
        .map(|parts| parts.join(exclude))
        .unwrap_or_default()
}

/// Registrable domain (label + suffix) for a URL or hostname, or an empty string.
pub fn registrable_domain(url_or_host: &str) -> String {
    split_domain(url_or_host)
        .map(|parts| parts.registrable())
        .unwrap_or_default()
}

/// Pulls the lowercase host out of a URL, accepting scheme-less hostnames.
fn extract_host(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    // A bare IPv6 literal would read as host:port once a scheme is prepended.
    let unbracketed = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    if let Ok(ip) = unbracketed.parse::<Ipv6Addr>() {
        return Some(ip.to_string());
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let parsed = url::Url::parse(&with_scheme).ok()?;
    let host = match parsed.host()? {
        url::Host::Domain(d) => d.trim_end_matches('.').to_ascii_lowercase(),
        url::Host::Ipv4(ip) => ip.to_string(),
        url::Host::Ipv6(ip) => ip.to_string(),
    };

    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}
