use crate::errors::{Error, Result};
use crate::host::Host;
use crate::options::IdnaOptions;
use core::fmt;
use core::str::FromStr;

/// PSL section a suffix belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    /// Matched in the registry-run half of the list.
    Icann,
    /// Matched in the community-delegated half of the list.
    Private,
    /// Assigned without a match in either section.
    Unknown,
    /// No suffix at all; the unique value with null content.
    None,
}

/// A public suffix: a [`Host`] carrying the section it was matched from.
///
/// The null host forces [`Section::None`]; every non-null suffix has at
/// least one label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Suffix {
    host: Host,
    section: Section,
}

impl Suffix {
    /// The suffix with no content.
    pub fn none() -> Self {
        Self {
            host: Host::null(IdnaOptions::default_ascii(), IdnaOptions::default_unicode()),
            section: Section::None,
        }
    }

    /// Tags `host` as an ICANN-section suffix.
    pub fn from_icann(host: Host) -> Self {
        Self::tagged(host, Section::Icann)
    }

    /// Tags `host` as a PRIVATE-section suffix.
    pub fn from_private(host: Host) -> Self {
        Self::tagged(host, Section::Private)
    }

    /// Tags `host` as a suffix not found in any section.
    pub fn from_unknown(host: Host) -> Self {
        Self::tagged(host, Section::Unknown)
    }

    pub(crate) fn tagged(host: Host, section: Section) -> Self {
        let section = if host.is_null() { Section::None } else { section };
        Self { host, section }
    }

    /// Parses a bare content string into an [`Section::Unknown`] suffix.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self::from_unknown(Host::parse(content)?))
    }

    /// The section tag.
    pub fn section(&self) -> Section {
        self.section
    }

    /// Whether the suffix was found in either PSL section.
    pub fn is_known(&self) -> bool {
        matches!(self.section, Section::Icann | Section::Private)
    }

    /// Whether the suffix comes from the ICANN section.
    pub fn is_icann(&self) -> bool {
        self.section == Section::Icann
    }

    /// Whether the suffix comes from the PRIVATE section.
    pub fn is_private(&self) -> bool {
        self.section == Section::Private
    }

    /// The underlying host value.
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// The dot-joined content, `None` for [`Suffix::none`].
    pub fn content(&self) -> Option<String> {
        self.host.content()
    }

    /// Number of labels in the suffix.
    pub fn count(&self) -> usize {
        self.host.count()
    }

    /// The labels in reverse DNS order.
    pub fn labels(&self) -> Vec<String> {
        self.host.labels()
    }

    /// The label at a signed offset.
    pub fn label_at(&self, key: isize) -> Option<&str> {
        self.host.label_at(key)
    }

    /// The suffix in A-label form.
    pub fn to_ascii(&self) -> Result<Self> {
        Ok(Self {
            host: self.host.to_ascii()?,
            section: self.section,
        })
    }

    /// The suffix in U-label form.
    pub fn to_unicode(&self) -> Result<Self> {
        Ok(Self {
            host: self.host.to_unicode()?,
            section: self.section,
        })
    }

    /// Replaces the A-label conversion options of the underlying host.
    pub fn with_ascii_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        Ok(Self {
            host: self.host.with_ascii_idna_option(options)?,
            section: self.section,
        })
    }

    /// Replaces the U-label conversion options of the underlying host.
    pub fn with_unicode_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        Ok(Self {
            host: self.host.with_unicode_idna_option(options)?,
            section: self.section,
        })
    }
}

impl From<Host> for Suffix {
    fn from(host: Host) -> Self {
        Self::from_unknown(host)
    }
}

impl FromStr for Suffix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}
