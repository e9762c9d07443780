use crate::errors::{Error, Result};
use crate::host::Host;
use crate::options::Policy;
use crate::resolved::ResolvedDomain;
use crate::rules::{Node, RuleSet};
use crate::suffix::Section;
use crate::uts46::ConversionFlags;
use tracing::trace;

impl RuleSet {
    /// Resolves `host` into its public suffix, registrable domain and
    /// sub-domain under `policy`.
    ///
    /// The search runs over the A-label form in reverse DNS order; the
    /// returned parts keep the form of the input host. The host must carry
    /// at least two labels and no trailing dot, and a public suffix can
    /// never cover the whole host.
    pub fn resolve(&self, host: &Host, policy: Policy) -> Result<ResolvedDomain> {
        if host.is_null() || host.labels_slice().first().is_some_and(|l| l.is_empty()) {
            return Err(Error::InvalidDomain {
                content: host.content(),
                flags: ConversionFlags::empty(),
            });
        }
        if host.count() < 2 || host.has_trailing_dot() {
            return Err(Error::UnableToResolveDomain {
                host: host.content(),
            });
        }

        let ascii = host.to_ascii()?;
        let labels = ascii.labels_slice();

        let (length, section) = match policy {
            Policy::Cookie => {
                let icann = match_labels(&self.icann, labels);
                let private = match_labels(&self.private, labels);
                if private > 0 && private >= icann {
                    (private, Section::Private)
                } else if icann > 0 {
                    (icann, Section::Icann)
                } else {
                    // unlisted: the rightmost label alone
                    (1, Section::Unknown)
                }
            }
            Policy::Icann => match match_labels(&self.icann, labels) {
                0 => {
                    return Err(Error::UnableToResolveDomain {
                        host: host.content(),
                    });
                }
                n => (n, Section::Icann),
            },
            Policy::Private => match match_labels(&self.private, labels) {
                0 => {
                    return Err(Error::UnableToResolveDomain {
                        host: host.content(),
                    });
                }
                n => (n, Section::Private),
            },
        };
        trace!(host = %ascii, %policy, matched = length, ?section, "suffix match");

        if length >= host.count() {
            return Err(Error::UnableToResolveDomain {
                host: host.content(),
            });
        }
        Ok(ResolvedDomain::from_match(host, length, section))
    }
}

/// Walks one section trie along the reversed labels; returns the number of
/// labels in the longest matching rule, 0 without a match.
///
/// An exact child is preferred over the wildcard child at the same node. An
/// exception child overrides the surrounding wildcard by ending the walk
/// one label early.
fn match_labels(root: &Node, labels: &[String]) -> usize {
    let mut node = root;
    let mut best = 0;
    for (i, label) in labels.iter().enumerate() {
        let next = match node.child(label) {
            Some(child) => child,
            None => match node.wildcard() {
                Some(wild) => wild,
                None => break,
            },
        };
        if next.exception {
            return i;
        }
        if next.terminal {
            best = i + 1;
        }
        node = next;
    }
    best
}
