use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of record types eligible for display identifiers.
///
/// `ALL` lists kinds in backfill order: core tenancy records first, then
/// content, marketplace, and the rest. Each kind owns exactly one 3-letter
/// prefix and no two kinds share one (checked by tests in both directions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Organization,
    Client,
    Campaign,
    Template,
    Content,
    Project,
    Listing,
    Boost,
    Review,
    Transaction,
    Report,
    Analytics,
    Activity,
    Notification,
    Comment,
    Approval,
    Asset,
    Media,
    Audience,
    Segment,
    Event,
    Calendar,
    Integration,
    SocialAccount,
    Workflow,
    Automation,
}

/// (kind, prefix, canonical name) registry. Single source of truth for the
/// bidirectional lookups below.
const REGISTRY: &[(EntityKind, &str, &str)] = &[
    (EntityKind::User, "USR", "USER"),
    (EntityKind::Organization, "ORG", "ORGANIZATION"),
    (EntityKind::Client, "CLI", "CLIENT"),
    (EntityKind::Campaign, "CAM", "CAMPAIGN"),
    (EntityKind::Template, "TMP", "TEMPLATE"),
    (EntityKind::Content, "CNT", "CONTENT"),
    (EntityKind::Project, "PRJ", "PROJECT"),
    (EntityKind::Listing, "LST", "LISTING"),
    (EntityKind::Boost, "BST", "BOOST"),
    (EntityKind::Review, "REV", "REVIEW"),
    (EntityKind::Transaction, "TXN", "TRANSACTION"),
    (EntityKind::Report, "RPT", "REPORT"),
    (EntityKind::Analytics, "ANA", "ANALYTICS"),
    (EntityKind::Activity, "ACT", "ACTIVITY"),
    (EntityKind::Notification, "NOT", "NOTIFICATION"),
    (EntityKind::Comment, "CMT", "COMMENT"),
    (EntityKind::Approval, "APR", "APPROVAL"),
    (EntityKind::Asset, "AST", "ASSET"),
    (EntityKind::Media, "MED", "MEDIA"),
    (EntityKind::Audience, "AUD", "AUDIENCE"),
    (EntityKind::Segment, "SEG", "SEGMENT"),
    (EntityKind::Event, "EVT", "EVENT"),
    (EntityKind::Calendar, "CAL", "CALENDAR"),
    (EntityKind::Integration, "INT", "INTEGRATION"),
    (EntityKind::SocialAccount, "SOC", "SOCIALACCOUNT"),
    (EntityKind::Workflow, "WFL", "WORKFLOW"),
    (EntityKind::Automation, "AUT", "AUTOMATION"),
];

impl EntityKind {
    /// All kinds, in declared backfill order.
    pub const ALL: [EntityKind; 27] = [
        EntityKind::User,
        EntityKind::Organization,
        EntityKind::Client,
        EntityKind::Campaign,
        EntityKind::Template,
        EntityKind::Content,
        EntityKind::Project,
        EntityKind::Listing,
        EntityKind::Boost,
        EntityKind::Review,
        EntityKind::Transaction,
        EntityKind::Report,
        EntityKind::Analytics,
        EntityKind::Activity,
        EntityKind::Notification,
        EntityKind::Comment,
        EntityKind::Approval,
        EntityKind::Asset,
        EntityKind::Media,
        EntityKind::Audience,
        EntityKind::Segment,
        EntityKind::Event,
        EntityKind::Calendar,
        EntityKind::Integration,
        EntityKind::SocialAccount,
        EntityKind::Workflow,
        EntityKind::Automation,
    ];

    /// The registered 3-letter prefix for this kind.
    #[must_use]
    pub fn prefix(self) -> Prefix {
        let raw = REGISTRY
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, prefix, _)| *prefix)
            .expect("every kind is registered");
        Prefix::new(raw).expect("registry prefixes are valid")
    }

    /// Canonical upper-case name, e.g. `CLIENT`.
    #[must_use]
    pub fn name(self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, _, name)| *name)
            .expect("every kind is registered")
    }

    /// Reverse prefix lookup. `None` for well-formed but unregistered
    /// prefixes (diagnostic tooling still round-trips those).
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<EntityKind> {
        REGISTRY
            .iter()
            .find(|(_, p, _)| *p == prefix)
            .map(|(kind, _, _)| *kind)
    }

    /// Exact kind lookup by name, case-insensitive and ignoring non-letters
    /// (`social_account`, `SocialAccount`, and `SOCIALACCOUNT` all match).
    #[must_use]
    pub fn from_name(name: &str) -> Option<EntityKind> {
        let normalized = normalize_name(name);
        REGISTRY
            .iter()
            .find(|(_, _, n)| *n == normalized)
            .map(|(kind, _, _)| *kind)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 3-character upper-case ASCII prefix.
///
/// Covers both registered prefixes (see [`EntityKind::prefix`]) and derived
/// ones minted for ad-hoc kind names via [`prefix_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix([u8; 3]);

impl Prefix {
    /// Validate and wrap a candidate prefix. `None` unless the input is
    /// exactly 3 upper-case ASCII letters.
    #[must_use]
    pub fn new(raw: &str) -> Option<Prefix> {
        let bytes = raw.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_uppercase) {
            return None;
        }
        Some(Prefix([bytes[0], bytes[1], bytes[2]]))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("prefix bytes are ASCII")
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`prefix_for`]: callers can tell a registered kind from a
/// best-effort guess derived from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixLookup {
    /// The name matched a registered kind exactly.
    Registered(EntityKind),
    /// No registered kind; prefix derived from the name's first letters.
    Derived(Prefix),
}

impl PrefixLookup {
    #[must_use]
    pub fn prefix(&self) -> Prefix {
        match self {
            PrefixLookup::Registered(kind) => kind.prefix(),
            PrefixLookup::Derived(prefix) => *prefix,
        }
    }
}

/// Fallback prefix when a free-text name yields fewer than 3 letters.
const GENERIC_PREFIX: &str = "GEN";

/// Resolve a free-text kind name to a prefix.
///
/// Exact registry match wins; otherwise the prefix is derived by upper-casing
/// the input, stripping non-letters, and taking the first 3 characters. The
/// derivation is deterministic, so ad-hoc kinds keep a stable prefix.
#[must_use]
pub fn prefix_for(name: &str) -> PrefixLookup {
    if let Some(kind) = EntityKind::from_name(name) {
        return PrefixLookup::Registered(kind);
    }

    let normalized = normalize_name(name);
    let derived = if normalized.len() >= 3 {
        &normalized[..3]
    } else {
        GENERIC_PREFIX
    };
    PrefixLookup::Derived(Prefix::new(derived).expect("derived prefix is 3 ASCII letters"))
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn prefix_mapping_is_bijective() {
        let mut seen = HashSet::new();
        for kind in EntityKind::ALL {
            let prefix = kind.prefix();
            assert!(seen.insert(prefix), "duplicate prefix {prefix} for {kind}");
            assert_eq!(EntityKind::from_prefix(prefix.as_str()), Some(kind));
        }
        assert_eq!(seen.len(), EntityKind::ALL.len());
    }

    #[test]
    fn registry_covers_every_kind() {
        assert_eq!(REGISTRY.len(), EntityKind::ALL.len());
    }

    #[test]
    fn name_lookup_ignores_case_and_punctuation() {
        assert_eq!(EntityKind::from_name("client"), Some(EntityKind::Client));
        assert_eq!(
            EntityKind::from_name("Social_Account"),
            Some(EntityKind::SocialAccount)
        );
        assert_eq!(EntityKind::from_name("no-such-kind"), None);
    }

    #[test]
    fn prefix_for_prefers_registry() {
        assert_eq!(
            prefix_for("campaign"),
            PrefixLookup::Registered(EntityKind::Campaign)
        );
        assert_eq!(prefix_for("campaign").prefix().as_str(), "CAM");
    }

    #[test]
    fn prefix_for_derives_from_unregistered_names() {
        let lookup = prefix_for("webhook-subscription");
        assert_eq!(lookup, PrefixLookup::Derived(Prefix::new("WEB").unwrap()));
    }

    #[test]
    fn prefix_for_falls_back_when_too_few_letters() {
        assert_eq!(prefix_for("x1").prefix().as_str(), "GEN");
        assert_eq!(prefix_for("").prefix().as_str(), "GEN");
    }

    #[test]
    fn prefix_rejects_malformed_input() {
        assert!(Prefix::new("AB").is_none());
        assert!(Prefix::new("ABCD").is_none());
        assert!(Prefix::new("ab1").is_none());
        assert!(Prefix::new("A_B").is_none());
    }
}
