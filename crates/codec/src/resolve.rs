use crate::kind::EntityKind;
use crate::parse::parse;

/// Resolver tuning. Explicit value, not ambient state: tests and multiple
/// logical environments can hold different configs in one process.
#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// Inputs longer than this, with no separator, look like internal keys.
    /// Store-assigned keys (cuid-style) are 25 chars; display identifiers
    /// top out well below this.
    pub internal_key_min_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            internal_key_min_len: 20,
        }
    }
}

/// Heuristic classification of an arbitrary identifier string.
///
/// Not authoritative: consumers use this to pick a store lookup path, the
/// resolver itself never touches the store. Both flags may be false for
/// unrecognized input; by construction they are never both true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdShape {
    pub looks_like_internal_key: bool,
    pub looks_like_display_id: bool,
    pub kind_hint: Option<EntityKind>,
}

/// Classify an input as internal-key-shaped, display-identifier-shaped, or
/// neither.
#[must_use]
pub fn classify(input: &str, config: &ResolverConfig) -> IdShape {
    let looks_like_internal_key =
        input.len() > config.internal_key_min_len && !input.contains('_');

    let parsed = parse(input);
    IdShape {
        looks_like_internal_key,
        looks_like_display_id: parsed.is_some(),
        kind_hint: parsed.and_then(|p| p.kind),
    }
}
