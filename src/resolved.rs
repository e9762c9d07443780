use crate::errors::{Error, Result};
use crate::host::Host;
use crate::options::IdnaOptions;
use crate::suffix::{Section, Suffix};
use crate::uts46::ConversionFlags;
use core::fmt;

/// The outcome of a resolution: the full host together with its matched
/// suffix, registrable domain and sub-domain.
///
/// The four slots always decompose consistently: the host's labels are the
/// sub-domain labels followed by the registrable labels, and the
/// registrable labels are one extra label followed by the suffix labels.
/// Registrable and sub-domain are `None` when not applicable. Mutators
/// recompute the decomposition and return a new value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDomain {
    host: Host,
    suffix: Suffix,
    registrable: Option<Host>,
    sub_domain: Option<Host>,
}

impl ResolvedDomain {
    /// Builds the result of a rule match: the first `suffix_len` reversed
    /// labels of `host` become the suffix, in the host's own form.
    pub(crate) fn from_match(host: &Host, suffix_len: usize, section: Section) -> Self {
        let labels = host.labels_slice();
        let suffix_host = Host::from_trusted(
            labels[..suffix_len].to_vec(),
            host.ascii_options(),
            host.unicode_options(),
        );
        let suffix = Suffix::tagged(suffix_host, section);
        Self::decompose(host.clone(), suffix, suffix_len)
    }

    /// Recomputes registrable and sub-domain for a host whose first
    /// `suffix_len` reversed labels are covered by `suffix`.
    fn decompose(host: Host, suffix: Suffix, suffix_len: usize) -> Self {
        let labels = host.labels_slice();
        let count = labels.len();
        let (registrable, sub_domain) = if suffix_len > 0 && suffix_len < count {
            let registrable = Host::from_trusted(
                labels[..suffix_len + 1].to_vec(),
                host.ascii_options(),
                host.unicode_options(),
            );
            let sub_domain = (count > suffix_len + 1).then(|| {
                Host::from_trusted(
                    labels[suffix_len + 1..].to_vec(),
                    host.ascii_options(),
                    host.unicode_options(),
                )
            });
            (Some(registrable), sub_domain)
        } else {
            (None, None)
        };
        Self {
            host,
            suffix,
            registrable,
            sub_domain,
        }
    }

    /// The full host.
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// The matched public suffix.
    pub fn suffix(&self) -> &Suffix {
        &self.suffix
    }

    /// The registrable domain (suffix plus one label), when applicable.
    pub fn registrable_domain(&self) -> Option<&Host> {
        self.registrable.as_ref()
    }

    /// The labels above the registrable domain, when any.
    pub fn sub_domain(&self) -> Option<&Host> {
        self.sub_domain.as_ref()
    }

    /// Replaces the public suffix, moving the suffix boundary.
    ///
    /// A non-null `suffix` must already be the tail of the host; the new
    /// suffix keeps the host's form and carries `suffix`'s section tag. A
    /// single-label host is instead extended with the new suffix. A null
    /// `suffix` clears the decomposition.
    pub fn with_public_suffix(&self, suffix: Suffix) -> Result<Self> {
        if self.host.is_null() || self.host.has_trailing_dot() {
            return Err(Error::UnableToResolveDomain {
                host: self.host.content(),
            });
        }
        if suffix.content().is_none() {
            return Ok(Self::decompose(self.host.clone(), Suffix::none(), 0));
        }

        if self.host.count() == 1 {
            let content = format!("{}.{}", self.host, suffix);
            let host = Host::new(
                Some(&content),
                self.host.ascii_options(),
                self.host.unicode_options(),
            )?;
            return Ok(Self::from_match(&host, suffix.count(), suffix.section()));
        }

        let suffix_len = suffix.count();
        if suffix_len >= self.host.count() || !self.ends_with(&suffix)? {
            return Err(Error::UnableToResolveDomain {
                host: self.host.content(),
            });
        }
        Ok(Self::from_match(&self.host, suffix_len, suffix.section()))
    }

    /// Attaches an explicit suffix, typically to re-classify the current
    /// one without consulting the rules again. Equal input returns an
    /// equal value.
    pub fn resolve(&self, suffix: Suffix) -> Result<Self> {
        if suffix == self.suffix {
            return Ok(self.clone());
        }
        self.with_public_suffix(suffix)
    }

    /// Replaces the sub-domain portion; `None` removes it.
    ///
    /// The replacement inherits the IDNA form of the host: it is converted
    /// to Unicode when the host carries any Unicode label, to ASCII
    /// otherwise.
    pub fn with_sub_domain(&self, sub_domain: Option<&str>) -> Result<Self> {
        let Some(registrable) = &self.registrable else {
            return Err(Error::UnableToResolveSubDomain);
        };
        let Some(value) = sub_domain else {
            return Ok(Self::decompose(
                registrable.clone(),
                self.suffix.clone(),
                self.suffix.count(),
            ));
        };
        if value.is_empty() {
            return Err(Error::InvalidDomain {
                content: Some(String::new()),
                flags: ConversionFlags::EMPTY_LABEL,
            });
        }

        let fresh = Host::new(
            Some(value),
            self.host.ascii_options(),
            self.host.unicode_options(),
        )?;
        let fresh = if self.host.is_ascii() {
            fresh.to_ascii()?
        } else {
            fresh.to_unicode()?
        };

        let mut labels = registrable.labels_slice().to_vec();
        labels.extend(fresh.labels_slice().iter().cloned());
        let host = Host::from_trusted(
            labels,
            self.host.ascii_options(),
            self.host.unicode_options(),
        );
        Ok(Self {
            host,
            suffix: self.suffix.clone(),
            registrable: Some(registrable.clone()),
            sub_domain: Some(fresh),
        })
    }

    /// The whole composite in A-label form, all four slots in lockstep.
    pub fn to_ascii(&self) -> Result<Self> {
        let host = self.host.to_ascii()?;
        let suffix = self.suffix.to_ascii()?;
        let suffix_len = suffix.count();
        Ok(Self::decompose(host, suffix, suffix_len))
    }

    /// The whole composite in U-label form, all four slots in lockstep.
    pub fn to_unicode(&self) -> Result<Self> {
        let host = self.host.to_unicode()?;
        let suffix = self.suffix.to_unicode()?;
        let suffix_len = suffix.count();
        Ok(Self::decompose(host, suffix, suffix_len))
    }

    /// Replaces the A-label conversion options on both halves.
    pub fn with_ascii_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        if options == self.host.ascii_options() {
            return Ok(self.clone());
        }
        let host = self.host.with_ascii_idna_option(options)?;
        let suffix = self.suffix.with_ascii_idna_option(options)?;
        let suffix_len = suffix.count();
        Ok(Self::decompose(host, suffix, suffix_len))
    }

    /// Replaces the U-label conversion options on both halves.
    pub fn with_unicode_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        if options == self.host.unicode_options() {
            return Ok(self.clone());
        }
        let host = self.host.with_unicode_idna_option(options)?;
        let suffix = self.suffix.with_unicode_idna_option(options)?;
        let suffix_len = suffix.count();
        Ok(Self::decompose(host, suffix, suffix_len))
    }

    /// Whether the host's reversed labels start with the suffix's, compared
    /// in A-label form.
    fn ends_with(&self, suffix: &Suffix) -> Result<bool> {
        let host = self.host.to_ascii()?;
        let tail = suffix.host().to_ascii()?;
        Ok(host.labels_slice().starts_with(tail.labels_slice()))
    }
}

impl fmt::Display for ResolvedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}
