use crate::errors::{Error, Result};
use core::fmt;
use core::ops::BitOr;
use core::str::FromStr;

/// UTS#46 processing options threaded through every [`Host`](crate::Host).
///
/// The set is a bitmask over the six flags below; combinations containing
/// any other bit are rejected by [`IdnaOptions::from_bits`]. A `Host`
/// carries two masks, one used for A-label conversion and one for U-label
/// conversion.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdnaOptions(u8);

impl IdnaOptions {
    /// Apply the transitional processing of UTS#46 (deviation characters
    /// such as `ß` are mapped instead of preserved).
    pub const TRANSITIONAL: Self = Self(1 << 0);
    /// Non-transitional processing for A-label conversion.
    pub const NONTRANSITIONAL_TO_ASCII: Self = Self(1 << 1);
    /// Non-transitional processing for U-label conversion.
    pub const NONTRANSITIONAL_TO_UNICODE: Self = Self(1 << 2);
    /// Check bidirectional-text constraints (RFC 5893).
    pub const CHECK_BIDI: Self = Self(1 << 3);
    /// Check contextual-joiner constraints (RFC 5892, appendix A).
    pub const CHECK_CONTEXTJ: Self = Self(1 << 4);
    /// Restrict ASCII labels to letters, digits and hyphens.
    pub const USE_STD3_ASCII_RULES: Self = Self(1 << 5);

    const KNOWN: u8 = (1 << 6) - 1;

    /// The empty option set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Default mask for A-label conversion.
    pub const fn default_ascii() -> Self {
        Self(Self::NONTRANSITIONAL_TO_ASCII.0 | Self::CHECK_BIDI.0 | Self::CHECK_CONTEXTJ.0)
    }

    /// Default mask for U-label conversion.
    pub const fn default_unicode() -> Self {
        Self(Self::NONTRANSITIONAL_TO_UNICODE.0 | Self::CHECK_BIDI.0 | Self::CHECK_CONTEXTJ.0)
    }

    /// Builds an option set from raw bits, rejecting bits outside the
    /// enumerated set.
    pub fn from_bits(bits: u8) -> Result<Self> {
        if bits & !Self::KNOWN != 0 {
            return Err(Error::UnsupportedIdnaOption { bits });
        }
        Ok(Self(bits))
    }

    /// The raw bit representation.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// The union of the two sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// `self` with every flag of `other` cleared.
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Whether transitional processing is requested.
    pub const fn is_transitional(self) -> bool {
        self.contains(Self::TRANSITIONAL)
    }
}

impl BitOr for IdnaOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for IdnaOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(IdnaOptions, &str); 6] = [
            (IdnaOptions::TRANSITIONAL, "TRANSITIONAL"),
            (IdnaOptions::NONTRANSITIONAL_TO_ASCII, "NONTRANSITIONAL_TO_ASCII"),
            (
                IdnaOptions::NONTRANSITIONAL_TO_UNICODE,
                "NONTRANSITIONAL_TO_UNICODE",
            ),
            (IdnaOptions::CHECK_BIDI, "CHECK_BIDI"),
            (IdnaOptions::CHECK_CONTEXTJ, "CHECK_CONTEXTJ"),
            (IdnaOptions::USE_STD3_ASCII_RULES, "USE_STD3_ASCII_RULES"),
        ];

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
        if first {
            f.write_str("(empty)")?;
        }
        Ok(())
    }
}

/// Which PSL sections participate in a resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Policy {
    /// Consult both sections; the longer match wins and PRIVATE wins ties.
    /// Without any match the rightmost label becomes an UNKNOWN suffix.
    #[default]
    Cookie,
    /// Consult the ICANN section only; no match is a resolution failure.
    Icann,
    /// Consult the PRIVATE section only; no match is a resolution failure.
    Private,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cookie => "cookie",
            Self::Icann => "icann",
            Self::Private => "private",
        })
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cookie" => Ok(Self::Cookie),
            "icann" => Ok(Self::Icann),
            "private" => Ok(Self::Private),
            other => Err(format!(
                "unknown policy `{other}`, expected cookie, icann or private"
            )),
        }
    }
}
