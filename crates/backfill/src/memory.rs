use crate::store::{InternalKey, RecordStore, StoreError};
use async_trait::async_trait;
use shortid_codec::EntityKind;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory record store for tests, demos, and simulated concurrency.
///
/// Records live in per-kind ordered maps keyed by internal key, so
/// pagination is deterministic. The whole map sits behind one mutex; the
/// conditional assignment is check-and-set under that lock, which gives the
/// same atomicity a real store's conditional update would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<EntityKind, BTreeMap<InternalKey, Option<String>>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record with no display identifier.
    pub fn seed_record(&self, kind: EntityKind, key: impl Into<String>) {
        let mut records = self.records.lock().expect("memory store poisoned");
        records
            .entry(kind)
            .or_default()
            .insert(InternalKey::new(key), None);
    }

    /// Insert a record that already carries a display identifier.
    pub fn seed_assigned(
        &self,
        kind: EntityKind,
        key: impl Into<String>,
        display_id: impl Into<String>,
    ) {
        let mut records = self.records.lock().expect("memory store poisoned");
        records
            .entry(kind)
            .or_default()
            .insert(InternalKey::new(key), Some(display_id.into()));
    }

    /// Current display identifier of a record, if the record exists.
    #[must_use]
    pub fn display_id_of(&self, kind: EntityKind, key: &str) -> Option<Option<String>> {
        let records = self.records.lock().expect("memory store poisoned");
        records
            .get(&kind)
            .and_then(|rows| rows.get(&InternalKey::new(key)))
            .cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn count_unassigned(&self, kind: EntityKind) -> Result<u64, StoreError> {
        let records = self.records.lock().expect("memory store poisoned");
        let count = records
            .get(&kind)
            .map(|rows| rows.values().filter(|v| v.is_none()).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn unassigned_page(
        &self,
        kind: EntityKind,
        page_size: usize,
        offset: usize,
    ) -> Result<Vec<InternalKey>, StoreError> {
        let records = self.records.lock().expect("memory store poisoned");
        let page = records
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, v)| v.is_none())
                    .skip(offset)
                    .take(page_size)
                    .map(|(k, _)| k.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(page)
    }

    async fn display_id_exists(
        &self,
        kind: EntityKind,
        candidate: &str,
    ) -> Result<bool, StoreError> {
        let records = self.records.lock().expect("memory store poisoned");
        let exists = records
            .get(&kind)
            .is_some_and(|rows| rows.values().any(|v| v.as_deref() == Some(candidate)));
        Ok(exists)
    }

    async fn assign_display_id_if_unset(
        &self,
        kind: EntityKind,
        key: &InternalKey,
        candidate: &str,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.lock().expect("memory store poisoned");
        let slot = records
            .get_mut(&kind)
            .and_then(|rows| rows.get_mut(key))
            .ok_or_else(|| StoreError::Backend(format!("no such record: {kind} {key}")))?;

        if slot.is_some() {
            return Ok(false);
        }
        *slot = Some(candidate.to_string());
        Ok(true)
    }

    async fn assigned_display_ids(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<(InternalKey, String)>, StoreError> {
        let records = self.records.lock().expect("memory store poisoned");
        let pairs = records
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .filter_map(|(k, v)| v.clone().map(|id| (k.clone(), id)))
                    .collect()
            })
            .unwrap_or_default();
        Ok(pairs)
    }
}
