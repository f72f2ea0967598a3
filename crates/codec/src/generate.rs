use crate::kind::{EntityKind, Prefix};
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Characters eligible for the random suffix. Upper-case letters and digits
/// with the visually ambiguous ones (`0`, `O`, `1`, `I`, `L`) removed.
pub const ID_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Random suffix length. System-wide constant: parsing takes the last
/// `SUFFIX_LEN` characters as the suffix, so this must never vary for
/// identifiers that need to be parsed later.
pub const SUFFIX_LEN: usize = 3;

/// Mint a display identifier for a registered kind.
///
/// `PREFIX_` + base-36 upper-case millis-since-epoch + random suffix.
/// No shared mutable state; safe to call concurrently from many workers
/// with no coordination. Residual same-millisecond collisions are the
/// orchestrator's job to detect, never assumed away here.
#[must_use]
pub fn generate(kind: EntityKind) -> String {
    generate_for_prefix(kind.prefix())
}

/// Mint an identifier for an arbitrary prefix (derived prefixes included).
#[must_use]
pub fn generate_for_prefix(prefix: Prefix) -> String {
    generate_at(prefix, now_millis(), &mut rand::thread_rng())
}

/// Deterministic seam: mint at a fixed timestamp with a caller-supplied rng.
#[must_use]
pub fn generate_at<R: Rng>(prefix: Prefix, millis: u64, rng: &mut R) -> String {
    let mut out = String::with_capacity(3 + 1 + 9 + SUFFIX_LEN);
    out.push_str(prefix.as_str());
    out.push('_');
    out.push_str(&encode_base36_upper(millis));
    for _ in 0..SUFFIX_LEN {
        let idx = rng.gen_range(0..ID_ALPHABET.len());
        out.push(ID_ALPHABET[idx] as char);
    }
    out
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Base-36 upper-case encoding. Compact, and lexically increasing for a
/// fixed width, which keeps same-kind identifiers roughly time-sortable.
/// That is a convenience only; no ordering invariant is promised.
fn encode_base36_upper(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    if value == 0 {
        return "0".to_string();
    }

    let mut buf = [0u8; 13];
    let mut pos = buf.len();
    while value > 0 {
        pos -= 1;
        buf[pos] = DIGITS[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8_lossy(&buf[pos..]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn generated_ids_carry_the_kind_prefix() {
        for kind in EntityKind::ALL {
            let id = generate(kind);
            let expected = format!("{}_", kind.prefix());
            assert!(id.starts_with(&expected), "{id} missing prefix {expected}");
        }
    }

    #[test]
    fn suffix_draws_only_from_the_alphabet() {
        for _ in 0..1_000 {
            let id = generate(EntityKind::Client);
            let suffix = &id.as_bytes()[id.len() - SUFFIX_LEN..];
            for byte in suffix {
                assert!(ID_ALPHABET.contains(byte), "unexpected suffix byte in {id}");
            }
        }
    }

    #[test]
    fn generate_at_is_deterministic() {
        let prefix = EntityKind::Report.prefix();
        let a = generate_at(prefix, 1_700_000_000_000, &mut StepRng::new(7, 13));
        let b = generate_at(prefix, 1_700_000_000_000, &mut StepRng::new(7, 13));
        assert_eq!(a, b);
        assert!(a.starts_with("RPT_"));
    }

    #[test]
    fn base36_encoding_matches_known_values() {
        assert_eq!(encode_base36_upper(0), "0");
        assert_eq!(encode_base36_upper(35), "Z");
        assert_eq!(encode_base36_upper(36), "10");
        assert_eq!(encode_base36_upper(1_700_000_000_000), "LOYW3V28");
    }

    #[test]
    fn alphabet_excludes_ambiguous_characters() {
        for banned in b"0O1IL" {
            assert!(!ID_ALPHABET.contains(banned));
        }
    }
}
