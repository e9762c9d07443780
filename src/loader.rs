//! Parser for the raw Public Suffix List text.
//!
//! The list is two marker-delimited sections of one rule per line. Rules
//! are inserted into the matching section's trie after A-label conversion,
//! so lookups never have to consider the Unicode form of a rule.

use crate::errors::{Error, Result};
use crate::options::IdnaOptions;
use crate::rules::{Node, RuleSet};
use crate::uts46;
use tracing::debug;

const BEGIN_ICANN: &str = "===BEGIN ICANN DOMAINS===";
const END_ICANN: &str = "===END ICANN DOMAINS===";
const BEGIN_PRIVATE: &str = "===BEGIN PRIVATE DOMAINS===";
const END_PRIVATE: &str = "===END PRIVATE DOMAINS===";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SectionMarker {
    Icann,
    Private,
}

pub(crate) fn load(text: &str) -> Result<RuleSet> {
    let mut rules = RuleSet::default();
    let mut current: Option<SectionMarker> = None;
    let mut saw_section = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix("//") {
            marker(comment.trim(), &mut current, &mut saw_section)?;
            continue;
        }

        // the rule is the first whitespace-separated token
        let token = line.split_whitespace().next().unwrap_or(line);
        let Some(section) = current else {
            return Err(Error::InvalidRules {
                reason: format!("rule `{token}` outside of any section"),
            });
        };
        let (exception, rule) = token
            .strip_prefix('!')
            .map(|r| (true, r))
            .unwrap_or((false, token));
        if rule.is_empty() || rule.starts_with('.') || rule.ends_with('.') || rule.contains("..") {
            return Err(Error::InvalidRules {
                reason: format!("malformed rule `{token}`"),
            });
        }

        let root = match section {
            SectionMarker::Icann => &mut rules.icann,
            SectionMarker::Private => &mut rules.private,
        };
        insert(root, rule, exception)?;
    }

    if let Some(open) = current {
        return Err(Error::InvalidRules {
            reason: format!("unterminated {open:?} section"),
        });
    }
    if !saw_section {
        return Err(Error::InvalidRules {
            reason: "missing section markers".to_owned(),
        });
    }

    debug!(
        icann = rules.icann.rule_count(),
        private = rules.private.rule_count(),
        "parsed public suffix list"
    );
    Ok(rules)
}

fn marker(comment: &str, current: &mut Option<SectionMarker>, saw: &mut bool) -> Result<()> {
    let begins = match comment {
        BEGIN_ICANN => Some(SectionMarker::Icann),
        BEGIN_PRIVATE => Some(SectionMarker::Private),
        _ => None,
    };
    if let Some(section) = begins {
        if let Some(open) = *current {
            return Err(Error::InvalidRules {
                reason: format!("{section:?} section begins inside {open:?} section"),
            });
        }
        *current = Some(section);
        *saw = true;
        return Ok(());
    }

    let ends = match comment {
        END_ICANN => Some(SectionMarker::Icann),
        END_PRIVATE => Some(SectionMarker::Private),
        _ => None,
    };
    if let Some(section) = ends {
        if *current != Some(section) {
            return Err(Error::InvalidRules {
                reason: format!("unexpected end of {section:?} section"),
            });
        }
        *current = None;
    }
    Ok(())
}

fn insert(root: &mut Node, rule: &str, exception: bool) -> Result<()> {
    let mut node = root;
    for label in rule.rsplit('.') {
        let key = if label == "*" {
            label.to_owned()
        } else {
            uts46::label_to_ascii(label, IdnaOptions::default_ascii()).map_err(|flags| {
                Error::InvalidRules {
                    reason: format!("rule label `{label}`: {flags}"),
                }
            })?
        };
        node = node.kids.entry(key).or_default();
    }
    node.terminal = true;
    node.exception = exception;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_icann(rules: &str) -> String {
        format!("// ===BEGIN ICANN DOMAINS===\n{rules}\n// ===END ICANN DOMAINS===\n")
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let text = wrap_icann("// just a comment\n\ncom\n\n// another\nnet");
        let rules = load(&text).unwrap();
        assert_eq!(rules.icann.rule_count(), 2);
    }

    #[test]
    fn only_first_token_is_the_rule() {
        let text = wrap_icann("com trailing words ignored");
        let rules = load(&text).unwrap();
        assert!(rules.icann.child("com").unwrap().terminal);
    }

    #[test]
    fn unicode_rules_are_stored_as_a_labels() {
        let text = wrap_icann("公司.cn");
        let rules = load(&text).unwrap();
        let cn = rules.icann.child("cn").unwrap();
        assert!(cn.child("xn--55qx5d").unwrap().terminal);
        assert!(cn.child("公司").is_none());
    }

    #[test]
    fn ace_rules_are_accepted_verbatim() {
        let text = wrap_icann("xn--55qx5d.cn");
        let rules = load(&text).unwrap();
        assert!(
            rules
                .icann
                .child("cn")
                .unwrap()
                .child("xn--55qx5d")
                .unwrap()
                .terminal
        );
    }

    #[test]
    fn exception_and_wildcard_markers() {
        let text = wrap_icann("*.ck\n!www.ck");
        let rules = load(&text).unwrap();
        let ck = rules.icann.child("ck").unwrap();
        assert!(ck.wildcard().unwrap().terminal);
        assert!(ck.child("www").unwrap().exception);
    }

    #[test]
    fn rule_outside_section_rejected() {
        let err = load("com\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRules { .. }));
    }

    #[test]
    fn missing_markers_rejected() {
        let err = load("// no sections here\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRules { .. }));
    }

    #[test]
    fn unterminated_section_rejected() {
        let err = load("// ===BEGIN ICANN DOMAINS===\ncom\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRules { .. }));
    }

    #[test]
    fn mismatched_end_marker_rejected() {
        let text = "// ===BEGIN ICANN DOMAINS===\ncom\n// ===END PRIVATE DOMAINS===\n";
        let err = load(text).unwrap_err();
        assert!(matches!(err, Error::InvalidRules { .. }));
    }

    #[test]
    fn nested_section_rejected() {
        let text = "// ===BEGIN ICANN DOMAINS===\n// ===BEGIN PRIVATE DOMAINS===\n";
        let err = load(text).unwrap_err();
        assert!(matches!(err, Error::InvalidRules { .. }));
    }

    #[test]
    fn malformed_rules_rejected() {
        for bad in [".com", "com.", "a..b", "!"] {
            let err = load(&wrap_icann(bad)).unwrap_err();
            assert!(matches!(err, Error::InvalidRules { .. }), "rule: {bad}");
        }
    }
}
