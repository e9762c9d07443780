use crate::errors::{Error, Result};
use crate::loader;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Node in a reverse-label rule trie.
///
/// Children are keyed by A-label strings as they appear in the list,
/// including `"*"` for wildcard entries, so a node with a `*` child is a
/// wildcard-bearing node. Traversal starts at the rightmost label of the
/// input host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Node {
    /// Whether the label path ending here is a rule.
    #[serde(default, skip_serializing_if = "skip_false")]
    pub terminal: bool,
    /// Whether that rule is a PSL `!` exception.
    #[serde(default, skip_serializing_if = "skip_false")]
    pub exception: bool,
    /// Child labels reachable from this node.
    #[serde(default, rename = "children", skip_serializing_if = "HashMap::is_empty")]
    pub kids: HashMap<String, Node>,
}

fn skip_false(value: &bool) -> bool {
    !*value
}

impl Node {
    pub(crate) fn child(&self, label: &str) -> Option<&Node> {
        self.kids.get(label)
    }

    pub(crate) fn wildcard(&self) -> Option<&Node> {
        self.kids.get("*")
    }

    pub(crate) fn rule_count(&self) -> usize {
        usize::from(self.terminal) + self.kids.values().map(Node::rule_count).sum::<usize>()
    }
}

/// The parsed Public Suffix List: one rule trie per section.
///
/// Built once from the list text or a snapshot, read-only afterwards;
/// resolutions may share one instance freely across threads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub(crate) icann: Node,
    pub(crate) private: Node,
}

impl RuleSet {
    /// Parses the raw Public Suffix List text.
    pub fn from_text(text: &str) -> Result<Self> {
        loader::load(text)
    }

    /// Rebuilds a rule set from a snapshot produced by
    /// [`to_snapshot`](Self::to_snapshot).
    pub fn from_snapshot(snapshot: &str) -> Result<Self> {
        serde_json::from_str(snapshot).map_err(|e| Error::InvalidRules {
            reason: format!("snapshot: {e}"),
        })
    }

    /// Serializes the rule set to its JSON snapshot form, a nested mapping
    /// per section with `terminal` / `exception` markers on rule nodes.
    pub fn to_snapshot(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidRules {
            reason: format!("snapshot: {e}"),
        })
    }

    /// Total number of rules across both sections.
    pub fn len(&self) -> usize {
        self.icann.rule_count() + self.private.rule_count()
    }

    /// Whether the set contains no rules at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = "\
// ===BEGIN ICANN DOMAINS===
com
uk
co.uk
*.ck
!www.ck
// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===
github.io
// ===END PRIVATE DOMAINS===
";

    #[test]
    fn trie_shape_after_parse() {
        let rules = RuleSet::from_text(LIST).unwrap();

        let com = rules.icann.child("com").unwrap();
        assert!(com.terminal && !com.exception);

        let uk = rules.icann.child("uk").unwrap();
        assert!(uk.terminal);
        assert!(uk.child("co").unwrap().terminal);

        let ck = rules.icann.child("ck").unwrap();
        assert!(!ck.terminal);
        assert!(ck.wildcard().unwrap().terminal);
        let www = ck.child("www").unwrap();
        assert!(www.exception);

        let io = rules.private.child("io").unwrap();
        assert!(!io.terminal);
        assert!(io.child("github").unwrap().terminal);
    }

    #[test]
    fn rule_counts_per_section() {
        let rules = RuleSet::from_text(LIST).unwrap();
        assert_eq!(rules.icann.rule_count(), 5);
        assert_eq!(rules.private.rule_count(), 1);
        assert_eq!(rules.len(), 6);
        assert!(!rules.is_empty());
    }

    #[test]
    fn snapshot_round_trip_is_lossless() {
        let rules = RuleSet::from_text(LIST).unwrap();
        let snapshot = rules.to_snapshot().unwrap();
        let again = RuleSet::from_snapshot(&snapshot).unwrap();
        assert_eq!(again, rules);
    }

    #[test]
    fn snapshot_elides_defaults() {
        let rules = RuleSet::from_text(LIST).unwrap();
        let snapshot = rules.to_snapshot().unwrap();
        // interior nodes carry no flags and rule nodes no child map
        assert!(snapshot.contains("\"terminal\":true"));
        assert!(snapshot.contains("\"exception\":true"));
        assert!(!snapshot.contains("\"terminal\":false"));
        assert!(!snapshot.contains("\"children\":{}"));
    }

    #[test]
    fn bad_snapshot_is_invalid_rules() {
        assert!(matches!(
            RuleSet::from_snapshot("{not json"),
            Err(Error::InvalidRules { .. })
        ));
    }
}
