//! Conversion between A-label (Punycode) and U-label forms.
//!
//! The `idna` crate performs the UTS#46 mapping and the bidi checks; this
//! module adds per-label bookkeeping so a failed conversion can be reported
//! against the labels that caused it, enforces the contextual-joiner rule,
//! and implements the ASCII fast path (an all-ASCII label never goes
//! through the full mapping).

use crate::errors::{Error, Result};
use crate::options::IdnaOptions;
use core::fmt;
use core::ops::BitOr;

/// The IDNA ACE prefix marking an encoded label.
const ACE_PREFIX: &str = "xn--";

const ZWNJ: char = '\u{200c}';
const ZWJ: char = '\u{200d}';

/// Maximum length of a label in octets, per RFC 1035.
const MAX_LABEL_OCTETS: usize = 63;

/// Per-label conversion error flags.
///
/// A conversion raises any number of these; callers receive the union over
/// all labels of a host.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConversionFlags(u16);

impl ConversionFlags {
    /// A label was empty where the host has more than one label.
    pub const EMPTY_LABEL: Self = Self(1 << 0);
    /// The converted label exceeds 63 octets.
    pub const LABEL_TOO_LONG: Self = Self(1 << 1);
    /// A character is not allowed in the label.
    pub const DISALLOWED: Self = Self(1 << 2);
    /// The label starts or ends with a hyphen.
    pub const HYPHEN: Self = Self(1 << 3);
    /// The label violates bidirectional-text constraints.
    pub const BIDI: Self = Self(1 << 4);
    /// A joiner character appears in a forbidden context.
    pub const CONTEXTJ: Self = Self(1 << 5);
    /// An ACE label could not be Punycode-decoded.
    pub const PUNYCODE: Self = Self(1 << 6);
    /// An ACE label decoded but is not the canonical encoding of its
    /// Unicode form.
    pub const INVALID_ACE: Self = Self(1 << 7);

    /// The empty flag set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Whether no flag is raised.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag of `other` is raised in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub(crate) fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for ConversionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for ConversionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ConversionFlags, &str); 8] = [
            (ConversionFlags::EMPTY_LABEL, "EMPTY_LABEL"),
            (ConversionFlags::LABEL_TOO_LONG, "LABEL_TOO_LONG"),
            (ConversionFlags::DISALLOWED, "DISALLOWED"),
            (ConversionFlags::HYPHEN, "HYPHEN"),
            (ConversionFlags::BIDI, "BIDI"),
            (ConversionFlags::CONTEXTJ, "CONTEXTJ"),
            (ConversionFlags::PUNYCODE, "PUNYCODE"),
            (ConversionFlags::INVALID_ACE, "INVALID_ACE"),
        ];

        if self.is_empty() {
            return f.write_str("(none)");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ConversionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConversionFlags({self})")
    }
}

fn config(options: IdnaOptions) -> idna::Config {
    idna::Config::default()
        .use_std3_ascii_rules(options.contains(IdnaOptions::USE_STD3_ASCII_RULES))
        .transitional_processing(options.is_transitional())
        .verify_dns_length(false)
        .check_hyphens(false)
}

/// Converts one label to its A-label form.
///
/// The label must not contain a dot. All failed checks are reported
/// together in the returned flag set.
pub fn label_to_ascii(
    label: &str,
    options: IdnaOptions,
) -> core::result::Result<String, ConversionFlags> {
    if label.is_empty() {
        return Err(ConversionFlags::EMPTY_LABEL);
    }

    let mut flags = ConversionFlags::empty();
    let converted = if label.is_ascii() {
        let lowered = label.to_ascii_lowercase();
        if let Some(encoded) = lowered.strip_prefix(ACE_PREFIX) {
            check_ace(encoded, &lowered, options, &mut flags);
        } else {
            check_ascii(&lowered, options, &mut flags);
        }
        lowered
    } else {
        if options.contains(IdnaOptions::CHECK_CONTEXTJ) && !options.is_transitional() {
            check_contextj(label, &mut flags);
        }
        match config(options).to_ascii(label) {
            Ok(ascii) => ascii,
            Err(_) => {
                flags.insert(classify_failure(label));
                // keep the input so length/hyphen checks still run
                label.to_owned()
            }
        }
    };

    if converted.len() > MAX_LABEL_OCTETS {
        flags.insert(ConversionFlags::LABEL_TOO_LONG);
    }
    if converted.starts_with('-') || converted.ends_with('-') {
        flags.insert(ConversionFlags::HYPHEN);
    }

    if flags.is_empty() { Ok(converted) } else { Err(flags) }
}

/// Converts one label to its U-label form.
pub fn label_to_unicode(
    label: &str,
    options: IdnaOptions,
) -> core::result::Result<String, ConversionFlags> {
    if label.is_empty() {
        return Err(ConversionFlags::EMPTY_LABEL);
    }

    if label.is_ascii() {
        let lowered = label.to_ascii_lowercase();
        let Some(encoded) = lowered.strip_prefix(ACE_PREFIX) else {
            let mut flags = ConversionFlags::empty();
            check_ascii(&lowered, options, &mut flags);
            if lowered.starts_with('-') || lowered.ends_with('-') {
                flags.insert(ConversionFlags::HYPHEN);
            }
            if lowered.len() > MAX_LABEL_OCTETS {
                flags.insert(ConversionFlags::LABEL_TOO_LONG);
            }
            return if flags.is_empty() { Ok(lowered) } else { Err(flags) };
        };
        let Some(decoded) = idna::punycode::decode_to_string(encoded) else {
            return Err(ConversionFlags::PUNYCODE);
        };
        let roundtrip = config(options.difference(IdnaOptions::TRANSITIONAL)).to_ascii(&decoded);
        return match roundtrip {
            Ok(ascii) if ascii == lowered => Ok(decoded),
            _ => Err(ConversionFlags::INVALID_ACE),
        };
    }

    if options.contains(IdnaOptions::CHECK_CONTEXTJ) && !options.is_transitional() {
        let mut flags = ConversionFlags::empty();
        check_contextj(label, &mut flags);
        if !flags.is_empty() {
            return Err(flags);
        }
    }
    let (unicode, outcome) = config(options).to_unicode(label);
    match outcome {
        Ok(()) => Ok(unicode),
        Err(_) => Err(classify_failure(label)),
    }
}

/// Converts a dot-joined host to its ASCII form.
///
/// The empty host passes through unchanged and a single trailing dot is
/// preserved. Per-label failures are aggregated into one `InvalidDomain`.
pub fn host_to_ascii(host: &str, options: IdnaOptions) -> Result<String> {
    convert_host(host, options, label_to_ascii)
}

/// Converts a dot-joined host to its Unicode form.
pub fn host_to_unicode(host: &str, options: IdnaOptions) -> Result<String> {
    convert_host(host, options, label_to_unicode)
}

/// Whether transitional and non-transitional ASCII conversion disagree for
/// this host (UTS#46 deviation characters: `ß`, `ς`, ZWJ, ZWNJ).
pub fn is_transitionally_different(host: &str, options: IdnaOptions) -> bool {
    let transitional = host_to_ascii(
        host,
        options
            .difference(IdnaOptions::NONTRANSITIONAL_TO_ASCII)
            .union(IdnaOptions::TRANSITIONAL),
    );
    let nontransitional = host_to_ascii(
        host,
        options
            .difference(IdnaOptions::TRANSITIONAL)
            .union(IdnaOptions::NONTRANSITIONAL_TO_ASCII),
    );
    match (transitional, nontransitional) {
        (Ok(a), Ok(b)) => a != b,
        _ => false,
    }
}

fn convert_host(
    host: &str,
    options: IdnaOptions,
    convert: fn(&str, IdnaOptions) -> core::result::Result<String, ConversionFlags>,
) -> Result<String> {
    if host.is_empty() {
        return Ok(String::new());
    }
    let (body, dotted) = match host.strip_suffix('.') {
        Some(rest) => (rest, true),
        None => (host, false),
    };
    if body.is_empty() {
        // "." is the root alone
        return Ok(host.to_owned());
    }

    let mut flags = ConversionFlags::empty();
    let mut labels = Vec::new();
    for label in body.split('.') {
        match convert(label, options) {
            Ok(converted) => labels.push(converted),
            Err(raised) => {
                flags.insert(raised);
                labels.push(label.to_owned());
            }
        }
    }
    if !flags.is_empty() {
        return Err(Error::InvalidDomain {
            content: Some(host.to_owned()),
            flags,
        });
    }

    let mut joined = labels.join(".");
    if dotted {
        joined.push('.');
    }
    Ok(joined)
}

/// Validates an already-lowercased all-ASCII label.
fn check_ascii(label: &str, options: IdnaOptions, flags: &mut ConversionFlags) {
    let std3 = options.contains(IdnaOptions::USE_STD3_ASCII_RULES);
    for byte in label.bytes() {
        let allowed = if std3 {
            byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-'
        } else {
            // anything printable except the separator
            (0x21..0x7f).contains(&byte) && byte != b'.'
        };
        if !allowed {
            flags.insert(ConversionFlags::DISALLOWED);
            return;
        }
    }
}

/// Validates an ACE label: the Punycode payload must decode, and the
/// decoded form must re-encode to exactly this label.
fn check_ace(encoded: &str, full: &str, options: IdnaOptions, flags: &mut ConversionFlags) {
    let Some(decoded) = idna::punycode::decode_to_string(encoded) else {
        flags.insert(ConversionFlags::PUNYCODE);
        return;
    };
    match config(options.difference(IdnaOptions::TRANSITIONAL)).to_ascii(&decoded) {
        Ok(ascii) if ascii == full => {}
        _ => flags.insert(ConversionFlags::INVALID_ACE),
    }
}

/// ContextJ (RFC 5892, appendix A): a joiner is only valid directly after
/// a virama. The `idna` crate does not enforce this rule itself.
fn check_contextj(label: &str, flags: &mut ConversionFlags) {
    let mut prev: Option<char> = None;
    for c in label.chars() {
        if (c == ZWNJ || c == ZWJ) && !prev.is_some_and(is_virama) {
            flags.insert(ConversionFlags::CONTEXTJ);
            return;
        }
        prev = Some(c);
    }
}

fn is_virama(c: char) -> bool {
    matches!(
        c,
        '\u{094d}'
            | '\u{09cd}'
            | '\u{0a4d}'
            | '\u{0acd}'
            | '\u{0b4d}'
            | '\u{0bcd}'
            | '\u{0c4d}'
            | '\u{0ccd}'
            | '\u{0d4d}'
            | '\u{0dca}'
            | '\u{0e3a}'
            | '\u{0f84}'
            | '\u{1039}'
            | '\u{1714}'
            | '\u{1734}'
            | '\u{17d2}'
            | '\u{a8c4}'
            | '\u{a953}'
            | '\u{abed}'
    )
}

/// Best-effort classification of an opaque `idna` processing failure.
fn classify_failure(label: &str) -> ConversionFlags {
    if label.chars().any(|c| c == '\u{200c}' || c == '\u{200d}') {
        return ConversionFlags::CONTEXTJ;
    }
    let has_rtl = label.chars().any(is_rtl);
    if has_rtl && label.chars().any(|c| c.is_ascii_alphanumeric()) {
        return ConversionFlags::BIDI;
    }
    ConversionFlags::DISALLOWED
}

fn is_rtl(c: char) -> bool {
    matches!(c,
        '\u{0590}'..='\u{05ff}'
        | '\u{0600}'..='\u{06ff}'
        | '\u{0750}'..='\u{077f}'
        | '\u{08a0}'..='\u{08ff}'
        | '\u{fb50}'..='\u{fdff}'
        | '\u{fe70}'..='\u{feff}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii_opts() -> IdnaOptions {
        IdnaOptions::default_ascii()
    }

    fn unicode_opts() -> IdnaOptions {
        IdnaOptions::default_unicode()
    }

    #[test]
    fn ascii_label_passes_through_lowercased() {
        assert_eq!(label_to_ascii("Example", ascii_opts()).unwrap(), "example");
        assert_eq!(label_to_ascii("a-b-c", ascii_opts()).unwrap(), "a-b-c");
    }

    #[test]
    fn underscore_allowed_without_std3() {
        assert_eq!(label_to_ascii("_dmarc", ascii_opts()).unwrap(), "_dmarc");
        let err = label_to_ascii(
            "_dmarc",
            ascii_opts() | IdnaOptions::USE_STD3_ASCII_RULES,
        )
        .unwrap_err();
        assert!(err.contains(ConversionFlags::DISALLOWED));
    }

    #[test]
    fn unicode_label_encodes() {
        assert_eq!(label_to_ascii("bébé", ascii_opts()).unwrap(), "xn--bb-bjab");
        assert_eq!(label_to_ascii("公司", ascii_opts()).unwrap(), "xn--55qx5d");
    }

    #[test]
    fn ace_label_decodes() {
        assert_eq!(
            label_to_unicode("xn--bb-bjab", unicode_opts()).unwrap(),
            "bébé"
        );
    }

    #[test]
    fn empty_label_flagged() {
        assert_eq!(
            label_to_ascii("", ascii_opts()).unwrap_err(),
            ConversionFlags::EMPTY_LABEL
        );
    }

    #[test]
    fn hyphen_misuse_flagged() {
        let err = label_to_ascii("-leading", ascii_opts()).unwrap_err();
        assert!(err.contains(ConversionFlags::HYPHEN));
        let err = label_to_ascii("trailing-", ascii_opts()).unwrap_err();
        assert!(err.contains(ConversionFlags::HYPHEN));
    }

    #[test]
    fn overlong_label_flagged() {
        let long = "a".repeat(64);
        let err = label_to_ascii(&long, ascii_opts()).unwrap_err();
        assert!(err.contains(ConversionFlags::LABEL_TOO_LONG));
    }

    #[test]
    fn bad_punycode_flagged() {
        let err = label_to_ascii("xn--0", ascii_opts()).unwrap_err();
        assert!(err.contains(ConversionFlags::PUNYCODE));
    }

    #[test]
    fn non_canonical_ace_flagged() {
        // decodes to plain "abc", whose canonical form has no ACE prefix
        let err = label_to_ascii("xn--abc-", ascii_opts()).unwrap_err();
        assert!(err.contains(ConversionFlags::INVALID_ACE));
    }

    #[test]
    fn joiner_outside_context_flagged() {
        let err = label_to_ascii("a\u{200d}b", ascii_opts()).unwrap_err();
        assert!(err.contains(ConversionFlags::CONTEXTJ));
    }

    #[test]
    fn joiner_after_virama_is_allowed() {
        assert!(label_to_ascii("क\u{094d}\u{200d}ष", ascii_opts()).is_ok());
    }

    #[test]
    fn host_conversion_preserves_structure() {
        assert_eq!(
            host_to_ascii("www.食狮.公司.cn", ascii_opts()).unwrap(),
            "www.xn--85x722f.xn--55qx5d.cn"
        );
        assert_eq!(
            host_to_unicode("www.xn--85x722f.xn--55qx5d.cn", unicode_opts()).unwrap(),
            "www.食狮.公司.cn"
        );
    }

    #[test]
    fn empty_and_root_hosts_pass_through() {
        assert_eq!(host_to_ascii("", ascii_opts()).unwrap(), "");
        assert_eq!(host_to_ascii(".", ascii_opts()).unwrap(), ".");
    }

    #[test]
    fn trailing_dot_preserved() {
        assert_eq!(
            host_to_ascii("example.com.", ascii_opts()).unwrap(),
            "example.com."
        );
    }

    #[test]
    fn host_errors_are_aggregated() {
        let err = host_to_ascii("-a.b\u{200d}c.example", ascii_opts()).unwrap_err();
        match err {
            Error::InvalidDomain { flags, .. } => {
                assert!(flags.contains(ConversionFlags::HYPHEN));
                assert!(flags.contains(ConversionFlags::CONTEXTJ));
            }
            other => panic!("expected InvalidDomain, got {other:?}"),
        }
    }

    #[test]
    fn transitional_difference_detected() {
        assert!(is_transitionally_different("faß.de", ascii_opts()));
        assert!(!is_transitionally_different("fass.de", ascii_opts()));
        assert!(!is_transitionally_different("bébé.be", ascii_opts()));
    }

    #[test]
    fn transitional_processing_maps_deviations() {
        let transitional = ascii_opts()
            .difference(IdnaOptions::NONTRANSITIONAL_TO_ASCII)
            .union(IdnaOptions::TRANSITIONAL);
        assert_eq!(host_to_ascii("faß.de", transitional).unwrap(), "fass.de");
        assert_eq!(
            host_to_ascii("faß.de", ascii_opts()).unwrap(),
            "xn--fa-hia.de"
        );
    }
}
