use crate::errors::{Error, Result};
use crate::options::IdnaOptions;
use crate::uts46::{self, ConversionFlags};
use core::fmt;
use core::str::FromStr;
use percent_encoding::percent_decode_str;

/// An immutable, label-indexed host name.
///
/// Labels are stored in reverse DNS order: offset 0 is the TLD and offset
/// `count - 1` is the leftmost label of the printed form. Negative offsets
/// mirror the reversed sequence, so `-1` addresses the leftmost label.
///
/// Three shapes exist:
/// - the *null* host (`new(None, ..)`), which has no content at all,
/// - the one-label empty-string host (`new(Some(""), ..)`),
/// - regular hosts with one or more non-empty labels.
///
/// A single trailing dot is preserved in the content string but excluded
/// from label-count semantics.
///
/// Every constructor and mutator validates through IDNA conversion, so a
/// `Host` value is always representable in both A-label and U-label form.
/// Mutations return a new value and leave the receiver untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Host {
    /// Reversed labels, TLD first. Empty means the null host.
    labels: Vec<String>,
    trailing_dot: bool,
    ascii_options: IdnaOptions,
    unicode_options: IdnaOptions,
}

impl Host {
    /// Builds a host from a nullable content string.
    ///
    /// The string is URL-decoded once when it contains `%XX` escapes,
    /// ASCII-lowercased (Unicode case folding is delegated to IDNA) and
    /// split on `.`. Each label is validated through ASCII conversion under
    /// `ascii_options`; the stored form keeps the caller's labels, so
    /// Unicode input stays Unicode until [`to_ascii`](Self::to_ascii).
    pub fn new(
        content: Option<&str>,
        ascii_options: IdnaOptions,
        unicode_options: IdnaOptions,
    ) -> Result<Self> {
        let Some(raw) = content else {
            return Ok(Self::null(ascii_options, unicode_options));
        };

        let decoded = if raw.contains('%') {
            percent_decode_str(raw)
                .decode_utf8()
                .map_err(|_| Error::InvalidDomain {
                    content: Some(raw.to_owned()),
                    flags: ConversionFlags::DISALLOWED,
                })?
                .into_owned()
        } else {
            raw.to_owned()
        };
        let lowered = decoded.to_ascii_lowercase();

        let (body, trailing_dot) = match lowered.strip_suffix('.') {
            Some(rest) => (rest, true),
            None => (lowered.as_str(), false),
        };
        let forward: Vec<String> = body.split('.').map(str::to_owned).collect();
        Self::validated(forward, trailing_dot, ascii_options, unicode_options)
    }

    /// Builds a host from a content string with the default IDNA options.
    pub fn parse(content: &str) -> Result<Self> {
        Self::new(
            Some(content),
            IdnaOptions::default_ascii(),
            IdnaOptions::default_unicode(),
        )
    }

    /// The host with no content.
    pub fn null(ascii_options: IdnaOptions, unicode_options: IdnaOptions) -> Self {
        Self {
            labels: Vec::new(),
            trailing_dot: false,
            ascii_options,
            unicode_options,
        }
    }

    /// Validates a forward-order label sequence and builds the host.
    fn validated(
        forward: Vec<String>,
        trailing_dot: bool,
        ascii_options: IdnaOptions,
        unicode_options: IdnaOptions,
    ) -> Result<Self> {
        let content = || Some(forward.join("."));

        // the lone empty-string host carries no label to convert
        if forward.len() == 1 && forward[0].is_empty() {
            return Ok(Self {
                labels: forward,
                trailing_dot,
                ascii_options,
                unicode_options,
            });
        }

        let mut flags = ConversionFlags::empty();
        for label in &forward {
            if let Err(raised) = uts46::label_to_ascii(label, ascii_options) {
                flags.insert(raised);
            }
        }
        // an IPv4-looking top label cannot anchor a domain name
        if forward.len() >= 2
            && forward
                .last()
                .is_some_and(|tld| tld.bytes().all(|b| b.is_ascii_digit()))
        {
            flags.insert(ConversionFlags::DISALLOWED);
        }
        if !flags.is_empty() {
            return Err(Error::InvalidDomain {
                content: content(),
                flags,
            });
        }

        let labels: Vec<String> = forward.into_iter().rev().collect();
        Ok(Self {
            labels,
            trailing_dot,
            ascii_options,
            unicode_options,
        })
    }

    /// Internal constructor for label sequences already validated by this
    /// type (engine slices, converted forms).
    pub(crate) fn from_trusted(
        labels: Vec<String>,
        ascii_options: IdnaOptions,
        unicode_options: IdnaOptions,
    ) -> Self {
        Self {
            labels,
            trailing_dot: false,
            ascii_options,
            unicode_options,
        }
    }

    /// The canonical dot-joined content, `None` for the null host.
    pub fn content(&self) -> Option<String> {
        if self.labels.is_empty() {
            return None;
        }
        let mut joined = self
            .labels
            .iter()
            .rev()
            .cloned()
            .collect::<Vec<_>>()
            .join(".");
        if self.trailing_dot {
            joined.push('.');
        }
        Some(joined)
    }

    /// Number of labels; 0 for the null host, 1 for the empty-string host.
    /// A preserved trailing dot does not count.
    pub fn count(&self) -> usize {
        self.labels.len()
    }

    /// Whether this is the null host.
    pub fn is_null(&self) -> bool {
        self.labels.is_empty()
    }

    /// The labels in reverse DNS order (TLD first).
    pub fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }

    pub(crate) fn labels_slice(&self) -> &[String] {
        &self.labels
    }

    /// The label at a signed offset, or `None` when out of range.
    pub fn label_at(&self, key: isize) -> Option<&str> {
        self.index_of(key).map(|idx| self.labels[idx].as_str())
    }

    /// All offsets whose label equals `label`.
    pub fn keys(&self, label: &str) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.as_str() == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether every label is ASCII.
    pub fn is_ascii(&self) -> bool {
        self.labels.iter().all(|l| l.is_ascii())
    }

    /// Whether the content carries a preserved trailing dot.
    pub fn has_trailing_dot(&self) -> bool {
        self.trailing_dot
    }

    /// The A-label conversion options.
    pub fn ascii_options(&self) -> IdnaOptions {
        self.ascii_options
    }

    /// The U-label conversion options.
    pub fn unicode_options(&self) -> IdnaOptions {
        self.unicode_options
    }

    /// Whether transitional and non-transitional ASCII conversion disagree
    /// for this host.
    pub fn is_transitionally_different(&self) -> bool {
        self.content()
            .is_some_and(|c| uts46::is_transitionally_different(&c, self.ascii_options))
    }

    /// Replaces the label at `key` with `value`.
    ///
    /// `key = count` adds a new leftmost label and `key = -count - 1` adds
    /// a new label on the TLD side; [`prepend`](Self::prepend) and
    /// [`append`](Self::append) wrap those two offsets. `value` may contain
    /// dots, in which case the labels it holds are substituted in place; a
    /// dot at either end of `value` is an empty label and is rejected.
    pub fn with_label(&self, key: isize, value: &str) -> Result<Self> {
        let count = self.count() as isize;
        if !(-count - 1..=count).contains(&key) {
            return Err(Error::InvalidLabelKey {
                key,
                count: self.count(),
            });
        }
        // after normalization, `count` adds leftmost and `-1` adds at the TLD
        let key = if key < 0 { count + key } else { key };

        let parts = Self::split_value(value, self.ascii_options)?;
        let mut forward: Vec<String> = self.labels.iter().rev().cloned().collect();
        if key == count {
            let mut fresh = parts;
            fresh.extend(forward);
            forward = fresh;
        } else if key == -1 {
            forward.extend(parts);
        } else {
            let at = (count - 1 - key) as usize;
            if parts.len() == 1 && forward[at] == parts[0] {
                return Ok(self.clone());
            }
            forward.splice(at..=at, parts);
        }
        Self::validated(
            forward,
            self.trailing_dot,
            self.ascii_options,
            self.unicode_options,
        )
    }

    /// Removes the labels at the given offsets.
    ///
    /// Offsets are normalized to positive form and deduplicated; removing
    /// every label yields the null host.
    pub fn without_label(&self, keys: &[isize]) -> Result<Self> {
        let count = self.count();
        let mut drop = Vec::with_capacity(keys.len());
        for &key in keys {
            let idx = if key < 0 { count as isize + key } else { key };
            if idx < 0 || idx >= count as isize {
                return Err(Error::InvalidLabelKey { key, count });
            }
            drop.push(idx as usize);
        }
        drop.sort_unstable();
        drop.dedup();

        let kept: Vec<String> = self
            .labels
            .iter()
            .enumerate()
            .filter(|(i, _)| drop.binary_search(i).is_err())
            .map(|(_, l)| l.clone())
            .collect();
        if kept.is_empty() {
            return Ok(Self::null(self.ascii_options, self.unicode_options));
        }
        let forward: Vec<String> = kept.into_iter().rev().collect();
        Self::validated(
            forward,
            self.trailing_dot,
            self.ascii_options,
            self.unicode_options,
        )
    }

    /// Adds `value` as the new leftmost label(s).
    pub fn prepend(&self, value: &str) -> Result<Self> {
        self.with_label(self.count() as isize, value)
    }

    /// Adds `value` as the new rightmost label(s).
    pub fn append(&self, value: &str) -> Result<Self> {
        self.with_label(-(self.count() as isize) - 1, value)
    }

    /// The host in A-label form; returns an equal value when nothing needs
    /// converting.
    pub fn to_ascii(&self) -> Result<Self> {
        if self.is_ascii() {
            return Ok(self.clone());
        }
        self.convert(uts46::label_to_ascii, self.ascii_options)
    }

    /// The host in U-label form; returns an equal value when nothing needs
    /// converting.
    pub fn to_unicode(&self) -> Result<Self> {
        if self
            .labels
            .iter()
            .all(|l| l.is_ascii() && !l.starts_with("xn--"))
        {
            return Ok(self.clone());
        }
        self.convert(uts46::label_to_unicode, self.unicode_options)
    }

    fn convert(
        &self,
        convert: fn(&str, IdnaOptions) -> core::result::Result<String, ConversionFlags>,
        options: IdnaOptions,
    ) -> Result<Self> {
        let mut flags = ConversionFlags::empty();
        let mut labels = Vec::with_capacity(self.labels.len());
        for label in &self.labels {
            match convert(label, options) {
                Ok(converted) => labels.push(converted),
                Err(raised) => {
                    flags.insert(raised);
                    labels.push(label.clone());
                }
            }
        }
        if !flags.is_empty() {
            return Err(Error::InvalidDomain {
                content: self.content(),
                flags,
            });
        }
        Ok(Self {
            labels,
            trailing_dot: self.trailing_dot,
            ascii_options: self.ascii_options,
            unicode_options: self.unicode_options,
        })
    }

    /// Replaces the A-label conversion options, revalidating the content
    /// under the new mask. Returns an equal value when `options` matches
    /// the current mask.
    pub fn with_ascii_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        if options == self.ascii_options {
            return Ok(self.clone());
        }
        if self.is_null() {
            return Ok(Self::null(options, self.unicode_options));
        }
        let forward: Vec<String> = self.labels.iter().rev().cloned().collect();
        Self::validated(forward, self.trailing_dot, options, self.unicode_options)
    }

    /// Replaces the U-label conversion options. Returns an equal value when
    /// `options` matches the current mask.
    pub fn with_unicode_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        if options == self.unicode_options {
            return Ok(self.clone());
        }
        let mut host = self.clone();
        host.unicode_options = options;
        Ok(host)
    }

    fn index_of(&self, key: isize) -> Option<usize> {
        let count = self.labels.len() as isize;
        let idx = if key < 0 { count + key } else { key };
        (0..count).contains(&idx).then_some(idx as usize)
    }

    /// Splits and validates a replacement value into forward-order labels.
    fn split_value(value: &str, options: IdnaOptions) -> Result<Vec<String>> {
        if value.is_empty() {
            return Err(Error::InvalidLabel {
                label: value.to_owned(),
                flags: ConversionFlags::EMPTY_LABEL,
            });
        }
        let lowered = value.to_ascii_lowercase();
        let mut parts = Vec::new();
        for part in lowered.split('.') {
            if part.is_empty() {
                return Err(Error::InvalidLabel {
                    label: value.to_owned(),
                    flags: ConversionFlags::EMPTY_LABEL,
                });
            }
            if let Err(flags) = uts46::label_to_ascii(part, options) {
                return Err(Error::InvalidLabel {
                    label: part.to_owned(),
                    flags,
                });
            }
            parts.push(part.to_owned());
        }
        Ok(parts)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content().as_deref().unwrap_or(""))
    }
}

impl FromStr for Host {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Host {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(content: &str) -> Host {
        Host::parse(content).expect("valid host")
    }

    #[test]
    fn construction_lowercases_and_reverses() {
        let h = host("WwW.Example.COM");
        assert_eq!(h.content().as_deref(), Some("www.example.com"));
        assert_eq!(h.labels(), ["com", "example", "www"]);
        assert_eq!(h.count(), 3);
    }

    #[test]
    fn null_and_empty_hosts_are_distinct() {
        let null = Host::new(
            None,
            IdnaOptions::default_ascii(),
            IdnaOptions::default_unicode(),
        )
        .unwrap();
        assert!(null.is_null());
        assert_eq!(null.content(), None);
        assert_eq!(null.count(), 0);

        let empty = host("");
        assert!(!empty.is_null());
        assert_eq!(empty.content().as_deref(), Some(""));
        assert_eq!(empty.count(), 1);

        assert_ne!(null, empty);
    }

    #[test]
    fn trailing_dot_preserved_but_uncounted() {
        let h = host("example.com.");
        assert_eq!(h.content().as_deref(), Some("example.com."));
        assert_eq!(h.count(), 2);
        assert!(h.has_trailing_dot());
    }

    #[test]
    fn percent_escapes_decoded_once() {
        let h = host("b%C3%A9b%C3%A9.be");
        assert_eq!(h.content().as_deref(), Some("bébé.be"));
        assert!(!h.is_ascii());
    }

    #[test]
    fn interior_empty_label_rejected() {
        assert!(matches!(
            Host::parse("a..b"),
            Err(Error::InvalidDomain { flags, .. }) if flags.contains(ConversionFlags::EMPTY_LABEL)
        ));
        assert!(Host::parse(".example.com").is_err());
    }

    #[test]
    fn numeric_top_label_rejected() {
        assert!(Host::parse("example.42").is_err());
        // a lone numeric label is tolerated
        assert!(Host::parse("42").is_ok());
    }

    #[test]
    fn signed_label_access() {
        let h = host("www.example.com");
        assert_eq!(h.label_at(0), Some("com"));
        assert_eq!(h.label_at(2), Some("www"));
        assert_eq!(h.label_at(-1), Some("www"));
        assert_eq!(h.label_at(-3), Some("com"));
        assert_eq!(h.label_at(3), None);
        assert_eq!(h.label_at(-4), None);
    }

    #[test]
    fn keys_find_equal_labels() {
        let h = host("www.example.www.com");
        assert_eq!(h.keys("www"), [1, 3]);
        assert_eq!(h.keys("absent"), Vec::<usize>::new());
    }

    #[test]
    fn with_label_replaces() {
        let h = host("www.example.com");
        let swapped = h.with_label(0, "org").unwrap();
        assert_eq!(swapped.content().as_deref(), Some("www.example.org"));
        // receiver untouched
        assert_eq!(h.content().as_deref(), Some("www.example.com"));
    }

    #[test]
    fn with_label_identity_returns_equal_value() {
        let h = host("www.example.com");
        assert_eq!(h.with_label(0, "com").unwrap(), h);
    }

    #[test]
    fn with_label_boundary_offsets() {
        let h = host("example.com");
        let prepended = h.with_label(2, "www").unwrap();
        assert_eq!(prepended.content().as_deref(), Some("www.example.com"));
        let appended = h.with_label(-3, "org").unwrap();
        assert_eq!(appended.content().as_deref(), Some("example.com.org"));
    }

    #[test]
    fn with_label_multi_label_value_spliced() {
        let h = host("www.example.com");
        let spliced = h.with_label(1, "a.b").unwrap();
        assert_eq!(spliced.content().as_deref(), Some("www.a.b.com"));
    }

    #[test]
    fn with_label_rejects_bad_keys_and_values() {
        let h = host("example.com");
        assert!(matches!(
            h.with_label(3, "x"),
            Err(Error::InvalidLabelKey { key: 3, count: 2 })
        ));
        assert!(matches!(
            h.with_label(-4, "x"),
            Err(Error::InvalidLabelKey { key: -4, count: 2 })
        ));
        assert!(matches!(h.with_label(0, ""), Err(Error::InvalidLabel { .. })));
        // a dot at either end of the value is an empty label
        assert!(matches!(
            h.with_label(0, ".org"),
            Err(Error::InvalidLabel { .. })
        ));
        assert!(matches!(
            h.with_label(0, "org."),
            Err(Error::InvalidLabel { .. })
        ));
    }

    #[test]
    fn prepend_and_append() {
        let h = host("example.com");
        assert_eq!(
            h.prepend("www").unwrap().content().as_deref(),
            Some("www.example.com")
        );
        assert_eq!(
            h.append("org").unwrap().content().as_deref(),
            Some("example.com.org")
        );
    }

    #[test]
    fn without_label_normalizes_and_dedupes() {
        let h = host("www.example.com");
        let trimmed = h.without_label(&[2, -1]).unwrap();
        assert_eq!(trimmed.content().as_deref(), Some("example.com"));

        let gone = h.without_label(&[0, 1, 2]).unwrap();
        assert!(gone.is_null());

        assert!(matches!(
            h.without_label(&[5]),
            Err(Error::InvalidLabelKey { key: 5, count: 3 })
        ));
    }

    #[test]
    fn without_label_revalidates_result() {
        // dropping "com" leaves "42" as top label of a two-label host
        let h = host("a.42.com");
        assert!(h.without_label(&[0]).is_err());
    }

    #[test]
    fn ascii_unicode_round_trip() {
        let h = host("www.食狮.公司.cn");
        let ascii = h.to_ascii().unwrap();
        assert_eq!(
            ascii.content().as_deref(),
            Some("www.xn--85x722f.xn--55qx5d.cn")
        );
        assert_eq!(ascii.to_unicode().unwrap().content(), h.content());
    }

    #[test]
    fn ascii_host_conversion_is_identity() {
        let h = host("www.example.com");
        assert_eq!(h.to_ascii().unwrap(), h);
        assert_eq!(h.to_unicode().unwrap(), h);
    }

    #[test]
    fn idna_option_identity() {
        let h = host("example.com");
        assert_eq!(
            h.with_ascii_idna_option(h.ascii_options()).unwrap(),
            h
        );
        assert_eq!(
            h.with_unicode_idna_option(h.unicode_options()).unwrap(),
            h
        );
    }

    #[test]
    fn stricter_options_revalidate() {
        let h = host("_dmarc.example.com");
        let err = h.with_ascii_idna_option(
            IdnaOptions::default_ascii() | IdnaOptions::USE_STD3_ASCII_RULES,
        );
        assert!(matches!(err, Err(Error::InvalidDomain { .. })));
    }

    #[test]
    fn equality_is_structural_over_labels_and_options() {
        let a = host("example.com");
        let b = host("example.com");
        assert_eq!(a, b);

        let other_options = Host::new(
            Some("example.com"),
            IdnaOptions::default_ascii() | IdnaOptions::USE_STD3_ASCII_RULES,
            IdnaOptions::default_unicode(),
        )
        .unwrap();
        assert_ne!(a, other_options);
    }

    #[test]
    fn transitional_difference_exposed() {
        assert!(host("faß.de").is_transitionally_different());
        assert!(!host("example.de").is_transitionally_different());
    }

    #[test]
    fn display_and_fromstr() {
        let h: Host = "Example.COM".parse().unwrap();
        assert_eq!(h.to_string(), "example.com");
        let null = Host::new(
            None,
            IdnaOptions::default_ascii(),
            IdnaOptions::default_unicode(),
        )
        .unwrap();
        assert_eq!(null.to_string(), "");
    }
}
