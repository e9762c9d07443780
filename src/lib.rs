//! Resolve host names against the Mozilla Public Suffix List.
//!
//! A [`List`] owns the parsed rule trees for both PSL sections. Resolving a
//! [`Host`] yields a [`ResolvedDomain`] carrying the public suffix (tagged
//! with its [`Section`]), the registrable domain and the sub-domain, all as
//! immutable values that stay convertible between their ASCII and Unicode
//! forms.
//!
//! ```rust
//! use domainparts::{List, Policy};
//!
//! let psl = "\
//! // ===BEGIN ICANN DOMAINS===
//! be
//! ac.be
//! // ===END ICANN DOMAINS===
//! // ===BEGIN PRIVATE DOMAINS===
//! // ===END PRIVATE DOMAINS===
//! ";
//! let list: List = psl.parse().expect("valid list");
//! let resolved = list.resolve_str("www.ulb.ac.be", Policy::Cookie).unwrap();
//! assert_eq!(
//!     resolved.registrable_domain().unwrap().content().as_deref(),
//!     Some("ulb.ac.be"),
//! );
//! assert!(resolved.suffix().is_icann());
//! ```

pub mod cache;
pub mod errors;
pub mod options;
pub mod uts46;

mod engine;
mod host;
#[cfg(feature = "fetch")]
mod http;
mod loader;
mod resolved;
mod rules;
mod suffix;

pub use errors::{Error, Result};
pub use host::Host;
pub use options::{IdnaOptions, Policy};
pub use resolved::ResolvedDomain;
pub use rules::RuleSet;
pub use suffix::{Section, Suffix};
pub use uts46::ConversionFlags;

#[cfg(feature = "fetch")]
use cache::SnapshotCache;
use core::str::FromStr;
use std::path::Path;

/// Where Mozilla publishes the list.
pub const PUBLIC_SUFFIX_LIST_URL: &str = "https://publicsuffix.org/list/public_suffix_list.dat";

/// A compiled Public Suffix List and resolver.
///
/// The rule trees are built once and read-only afterwards, so one `List`
/// can serve concurrent resolutions without coordination.
#[derive(Clone, Debug)]
pub struct List {
    rules: RuleSet,
}

impl FromStr for List {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl List {
    /// Parses the raw Public Suffix List text.
    pub fn parse(text: &str) -> Result<Self> {
        RuleSet::from_text(text).map(|rules| Self { rules })
    }

    /// Rebuilds a list from a snapshot produced by
    /// [`to_snapshot`](Self::to_snapshot).
    pub fn from_snapshot(snapshot: &str) -> Result<Self> {
        RuleSet::from_snapshot(snapshot).map(|rules| Self { rules })
    }

    /// Serializes the rule trees to their JSON snapshot form.
    pub fn to_snapshot(&self) -> Result<String> {
        self.rules.to_snapshot()
    }

    /// Parses a list from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Fetches and parses the list from a URL.
    ///
    /// This method is only available when the `fetch` feature is enabled.
    #[cfg(feature = "fetch")]
    pub fn from_url(url: &str) -> Result<Self> {
        let text = http::get(url)?;
        Self::parse(&text)
    }

    /// Like [`from_url`](Self::from_url), but consults `cache` first and
    /// stores the parsed snapshot on a miss. A stale or corrupt cached
    /// snapshot falls back to a fresh fetch.
    ///
    /// This method is only available when the `fetch` feature is enabled.
    #[cfg(feature = "fetch")]
    pub fn from_url_cached(url: &str, cache: &dyn SnapshotCache) -> Result<Self> {
        if let Some(snapshot) = cache.fetch(url) {
            match Self::from_snapshot(&snapshot) {
                Ok(list) => return Ok(list),
                Err(err) => tracing::warn!(?err, url, "discarding unreadable cached snapshot"),
            }
        }
        let list = Self::from_url(url)?;
        if let Ok(snapshot) = list.to_snapshot() {
            cache.store(url, &snapshot);
        }
        Ok(list)
    }

    /// The underlying rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Resolves `host` under `policy`.
    pub fn resolve(&self, host: &Host, policy: Policy) -> Result<ResolvedDomain> {
        self.rules.resolve(host, policy)
    }

    /// Parses `host` with default IDNA options and resolves it.
    pub fn resolve_str(&self, host: &str, policy: Policy) -> Result<ResolvedDomain> {
        self.resolve(&Host::parse(host)?, policy)
    }

    /// Resolution under [`Policy::Cookie`].
    pub fn cookie_domain(&self, host: &str) -> Result<ResolvedDomain> {
        self.resolve_str(host, Policy::Cookie)
    }

    /// Resolution restricted to the ICANN section.
    pub fn icann_domain(&self, host: &str) -> Result<ResolvedDomain> {
        self.resolve_str(host, Policy::Icann)
    }

    /// Resolution restricted to the PRIVATE section.
    pub fn private_domain(&self, host: &str) -> Result<ResolvedDomain> {
        self.resolve_str(host, Policy::Private)
    }
}
