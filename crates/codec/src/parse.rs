use crate::generate::SUFFIX_LEN;
use crate::kind::{EntityKind, Prefix};

/// Components of a well-formed display identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    pub prefix: Prefix,
    /// Base-36 timestamp portion. May be empty for hand-crafted short ids.
    pub timestamp_part: String,
    /// The trailing `SUFFIX_LEN` characters.
    pub random_part: String,
    /// Registered kind for the prefix, or `None` for well-formed but
    /// unregistered prefixes.
    pub kind: Option<EntityKind>,
}

impl ParsedId {
    /// Decode the timestamp portion back to millis since epoch, when it is
    /// non-empty and valid base-36.
    #[must_use]
    pub fn timestamp_millis(&self) -> Option<u64> {
        if self.timestamp_part.is_empty() {
            return None;
        }
        u64::from_str_radix(&self.timestamp_part, 36).ok()
    }
}

/// Parse a candidate display identifier.
///
/// Classification of arbitrary external input is an expected code path, so
/// malformed input yields `None`, never an error. Invalid when:
/// - there is not exactly one `_` separating prefix and remainder,
/// - the prefix is not exactly 3 upper-case ASCII letters,
/// - the remainder is shorter than the fixed suffix length.
///
/// A well-formed identifier whose prefix is unregistered still parses, with
/// `kind = None`, so diagnostic tooling can round-trip it.
#[must_use]
pub fn parse(candidate: &str) -> Option<ParsedId> {
    let mut parts = candidate.split('_');
    let prefix_part = parts.next()?;
    let rest = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let prefix = Prefix::new(prefix_part)?;
    if !rest.is_ascii() || rest.len() < SUFFIX_LEN {
        return None;
    }

    let split_at = rest.len() - SUFFIX_LEN;
    Some(ParsedId {
        prefix,
        timestamp_part: rest[..split_at].to_string(),
        random_part: rest[split_at..].to_string(),
        kind: EntityKind::from_prefix(prefix.as_str()),
    })
}

/// True iff [`parse`] succeeds, whether or not the kind resolved.
#[must_use]
pub fn is_well_formed(candidate: &str) -> bool {
    parse(candidate).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::generate;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_generated_ids_for_every_kind() {
        // Well above 10k samples across the registry; zero parse failures
        // tolerated.
        for kind in EntityKind::ALL {
            for _ in 0..400 {
                let id = generate(kind);
                let parsed = parse(&id).unwrap_or_else(|| panic!("failed to parse {id}"));
                assert_eq!(parsed.kind, Some(kind));
                assert_eq!(parsed.prefix, kind.prefix());
                assert_eq!(parsed.random_part.len(), SUFFIX_LEN);
                assert!(parsed.timestamp_millis().is_some());
            }
        }
    }

    #[test]
    fn rejects_malformed_input() {
        // Prefix too short.
        assert!(parse("XX_AB").is_none());
        // Prefix too long.
        assert!(parse("ABCD_123").is_none());
        // No separator.
        assert!(parse("ABC123").is_none());
        // Empty.
        assert!(parse("").is_none());
        // Extra separator.
        assert!(parse("ABC_12_34").is_none());
        // Remainder shorter than the suffix.
        assert!(parse("ABC_AB").is_none());
        // Lower-case prefix.
        assert!(parse("cli_L8X5M2A").is_none());
    }

    #[test]
    fn unregistered_prefix_parses_with_unknown_kind() {
        let parsed = parse("ZZZ_L8X5M2A").expect("well-formed");
        assert_eq!(parsed.kind, None);
        assert_eq!(parsed.prefix.as_str(), "ZZZ");
        assert_eq!(parsed.timestamp_part, "L8X5");
        assert_eq!(parsed.random_part, "M2A");
    }

    #[test]
    fn remainder_of_exactly_suffix_len_has_empty_timestamp() {
        let parsed = parse("CLI_M2A").expect("well-formed");
        assert_eq!(parsed.timestamp_part, "");
        assert_eq!(parsed.timestamp_millis(), None);
        assert_eq!(parsed.random_part, "M2A");
    }

    #[test]
    fn is_well_formed_tracks_parse() {
        assert!(is_well_formed("CLI_L8X5M2A"));
        assert!(is_well_formed("ZZZ_L8X5M2A"));
        assert!(!is_well_formed("cl9ebqhxk00003b600wzo3q7a"));
    }
}
