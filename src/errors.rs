use crate::uts46::ConversionFlags;
use std::io;

/// A specialized `Result` type for this crate's operations.
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for operations that can fail.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The host content is null where a value is required, or IDNA
    /// validation failed for the host as a whole. Conversion errors are
    /// aggregated across all labels into a single flag set.
    #[error("invalid domain `{}`: {flags}", .content.as_deref().unwrap_or("<null>"))]
    InvalidDomain {
        /// The offending content, if any.
        content: Option<String>,
        /// The aggregated per-label conversion flags.
        flags: ConversionFlags,
    },

    /// A single label failed validation.
    #[error("invalid label `{label}`: {flags}")]
    InvalidLabel {
        /// The offending label.
        label: String,
        /// The conversion flags raised for it.
        flags: ConversionFlags,
    },

    /// A label offset outside `[-count - 1, count]` was used in a mutation.
    #[error("invalid label key {key} for a host with {count} label(s)")]
    InvalidLabelKey {
        /// The offset as given by the caller.
        key: isize,
        /// The host's label count.
        count: usize,
    },

    /// The host has too few labels, a trailing dot, equals its own suffix,
    /// or no rule of the requested section matches it.
    #[error("unable to resolve domain `{}`", .host.as_deref().unwrap_or("<null>"))]
    UnableToResolveDomain {
        /// The host that could not be resolved.
        host: Option<String>,
    },

    /// A sub-domain operation was attempted on a host without a registrable
    /// portion.
    #[error("the domain has no registrable part to carry a sub-domain")]
    UnableToResolveSubDomain,

    /// The Public Suffix List text or snapshot could not be parsed.
    #[error("invalid public suffix list: {reason}")]
    InvalidRules {
        /// What was wrong with the input.
        reason: String,
    },

    /// An IDNA option bitmask contained bits outside the enumerated set.
    #[error("unsupported IDNA option bits {bits:#04x}")]
    UnsupportedIdnaOption {
        /// The rejected raw bits.
        bits: u8,
    },

    /// The Public Suffix List could not be fetched from its remote source.
    #[error("unable to load the public suffix list")]
    UnableToLoadPublicSuffixList(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// An I/O error occurred while reading the Public Suffix List.
    #[error(transparent)]
    Io(#[from] io::Error),
}
