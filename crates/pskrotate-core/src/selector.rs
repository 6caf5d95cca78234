// ── Network selection by tag ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use pskrotate_api::dashboard_types::TagsFilterType;

use crate::model::Network;

/// Whether a network must carry every required tag or just one of them.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TagMatchMode {
    /// Required tags ⊆ network tags.
    #[default]
    All,
    /// Required tags ∩ network tags ≠ ∅.
    Any,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TagCase {
    #[default]
    Sensitive,
    Insensitive,
}

/// How required tags are compared against a network's tags.
///
/// The default (`All` + `Sensitive`) is strict superset containment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPolicy {
    #[serde(default)]
    pub mode: TagMatchMode,
    #[serde(default)]
    pub case: TagCase,
}

impl TagPolicy {
    pub fn new(mode: TagMatchMode, case: TagCase) -> Self {
        Self { mode, case }
    }

    /// Does `network_tags` satisfy `required` under this policy?
    ///
    /// An empty tag set never matches a non-empty requirement.
    pub fn matches(&self, network_tags: &BTreeSet<String>, required: &BTreeSet<String>) -> bool {
        if required.is_empty() {
            return true;
        }
        if network_tags.is_empty() {
            return false;
        }

        let has = |tag: &String| match self.case {
            TagCase::Sensitive => network_tags.contains(tag),
            TagCase::Insensitive => network_tags.iter().any(|t| t.eq_ignore_ascii_case(tag)),
        };

        match self.mode {
            TagMatchMode::All => required.iter().all(has),
            TagMatchMode::Any => required.iter().any(has),
        }
    }

    /// Server-side filter type the Dashboard can apply for this policy.
    ///
    /// `None` when the server's semantics can't express it (its tag
    /// comparison is case-sensitive), so the full listing is fetched.
    pub fn server_filter(&self) -> Option<TagsFilterType> {
        match (self.case, self.mode) {
            (TagCase::Insensitive, _) => None,
            (TagCase::Sensitive, TagMatchMode::All) => Some(TagsFilterType::WithAllTags),
            (TagCase::Sensitive, TagMatchMode::Any) => Some(TagsFilterType::WithAnyTags),
        }
    }
}

/// Networks matching `required` under `policy`, in input order.
pub fn select(networks: &[Network], required: &BTreeSet<String>, policy: &TagPolicy) -> Vec<Network> {
    networks
        .iter()
        .filter(|n| policy.matches(&n.tags, required))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceFamily;

    fn net(id: &str, tags: &[&str]) -> Network {
        Network::new(id, id, tags.iter().copied(), DeviceFamily::WirelessAp)
    }

    fn tags(t: &[&str]) -> BTreeSet<String> {
        t.iter().map(|s| (*s).to_owned()).collect()
    }

    fn ids(nets: &[Network]) -> Vec<&str> {
        nets.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn superset_selection() {
        let nets = [net("N1", &["psk-rotate"]), net("N2", &[])];
        let picked = select(&nets, &tags(&["psk-rotate"]), &TagPolicy::default());
        assert_eq!(ids(&picked), vec!["N1"]);
    }

    #[test]
    fn all_mode_requires_containment_not_intersection() {
        let nets = [
            net("N1", &["a", "b", "c"]),
            net("N2", &["a"]),
            net("N3", &["b", "a"]),
        ];
        let picked = select(&nets, &tags(&["a", "b"]), &TagPolicy::default());
        assert_eq!(ids(&picked), vec!["N1", "N3"]);
    }

    #[test]
    fn any_mode_accepts_intersection() {
        let nets = [net("N1", &["a"]), net("N2", &["c"]), net("N3", &["b"])];
        let policy = TagPolicy::new(TagMatchMode::Any, TagCase::Sensitive);
        let picked = select(&nets, &tags(&["a", "b"]), &policy);
        assert_eq!(ids(&picked), vec!["N1", "N3"]);
    }

    #[test]
    fn case_sensitivity_is_configurable() {
        let nets = [net("N1", &["PSK-Rotate"])];
        let required = tags(&["psk-rotate"]);

        assert!(select(&nets, &required, &TagPolicy::default()).is_empty());

        let insensitive = TagPolicy::new(TagMatchMode::All, TagCase::Insensitive);
        assert_eq!(ids(&select(&nets, &required, &insensitive)), vec!["N1"]);
    }

    #[test]
    fn preserves_input_order() {
        let nets = [net("Z", &["t"]), net("A", &["t"]), net("M", &["t"])];
        let picked = select(&nets, &tags(&["t"]), &TagPolicy::default());
        assert_eq!(ids(&picked), vec!["Z", "A", "M"]);
    }

    #[test]
    fn server_filter_hint() {
        assert_eq!(
            TagPolicy::default().server_filter(),
            Some(TagsFilterType::WithAllTags)
        );
        assert_eq!(
            TagPolicy::new(TagMatchMode::Any, TagCase::Sensitive).server_filter(),
            Some(TagsFilterType::WithAnyTags)
        );
        assert_eq!(
            TagPolicy::new(TagMatchMode::All, TagCase::Insensitive).server_filter(),
            None
        );
    }
}
