use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use shortid_codec::EntityKind;
use std::collections::HashMap;

/// A display identifier value assigned to more than one record of a kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateViolation {
    pub kind: EntityKind,
    pub value: String,
    pub count: u64,
}

/// Group every assigned display identifier per collection and report values
/// occurring more than once. Detection only; repairing an already-assigned
/// duplicate is an operator decision.
///
/// Returns the violations plus the collections whose query failed.
pub async fn find_duplicates(
    store: &dyn RecordStore,
    kinds: &[EntityKind],
) -> (Vec<DuplicateViolation>, Vec<String>) {
    let mut violations = Vec::new();
    let mut errors = Vec::new();

    for &kind in kinds {
        let assigned = match store.assigned_display_ids(kind).await {
            Ok(assigned) => assigned,
            Err(err) => {
                log::error!("Duplicate check failed for {kind}: {err}");
                errors.push(format!("{kind}: {err}"));
                continue;
            }
        };

        let mut counts: HashMap<&str, u64> = HashMap::new();
        for (_, display_id) in &assigned {
            *counts.entry(display_id.as_str()).or_insert(0) += 1;
        }

        let mut kind_violations: Vec<DuplicateViolation> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(value, count)| DuplicateViolation {
                kind,
                value: value.to_string(),
                count,
            })
            .collect();
        kind_violations.sort_by(|a, b| a.value.cmp(&b.value));

        for violation in &kind_violations {
            log::error!(
                "Duplicate display id in {kind}: {} ({} occurrences)",
                violation.value,
                violation.count
            );
        }
        violations.extend(kind_violations);
    }

    (violations, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn reports_each_duplicated_value_with_its_count() {
        let store = MemoryStore::new();
        store.seed_assigned(EntityKind::Client, "a", "CLI_DUP111AAA");
        store.seed_assigned(EntityKind::Client, "b", "CLI_DUP111AAA");
        store.seed_assigned(EntityKind::Client, "c", "CLI_DUP111AAA");
        store.seed_assigned(EntityKind::Client, "d", "CLI_OKX222BBB");

        let (violations, errors) =
            find_duplicates(&store, &[EntityKind::Client, EntityKind::User]).await;

        assert!(errors.is_empty());
        assert_eq!(
            violations,
            vec![DuplicateViolation {
                kind: EntityKind::Client,
                value: "CLI_DUP111AAA".to_string(),
                count: 3,
            }]
        );
    }

    #[tokio::test]
    async fn unique_store_yields_no_violations() {
        let store = MemoryStore::new();
        store.seed_assigned(EntityKind::User, "u1", "USR_AAA111AAA");
        store.seed_assigned(EntityKind::User, "u2", "USR_BBB222BBB");

        let (violations, errors) = find_duplicates(&store, &[EntityKind::User]).await;
        assert!(violations.is_empty());
        assert!(errors.is_empty());
    }
}
