use crate::store::{InternalKey, RecordStore, StoreError};
use async_trait::async_trait;
use shortid_codec::EntityKind;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type Records = BTreeMap<EntityKind, BTreeMap<String, Option<String>>>;

/// Record store backed by a JSON snapshot on disk.
///
/// Lets operators run a backfill against an exported dataset without a live
/// database. The snapshot is rewritten after every applied assignment via a
/// tmp file and atomic rename, so an interrupted run leaves either the old
/// or the new snapshot, never a torn one.
///
/// The in-process mutex makes the conditional update atomic for all tasks
/// sharing this instance, and is held across the snapshot write as well:
/// persistence happens in mutation order, one writer at a time, so a later
/// rename can never clobber an earlier assignment. Concurrent instances
/// should share one `JsonFileStore`, not open the same file twice.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Records>,
}

impl JsonFileStore {
    /// Open an existing snapshot.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
        let records: Records = serde_json::from_str(&data)
            .map_err(|e| StoreError::Backend(format!("{}: {e}", path.display())))?;

        log::info!(
            "Loaded record snapshot from {} ({} kinds)",
            path.display(),
            records.len()
        );
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Create an empty snapshot at `path`, overwriting nothing on disk until
    /// the first save.
    #[must_use]
    pub fn create(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            records: Mutex::new(Records::default()),
        }
    }

    /// Insert a record with no display identifier (dataset preparation).
    pub async fn seed_record(&self, kind: EntityKind, key: impl Into<String>) {
        let mut records = self.records.lock().await;
        records.entry(kind).or_default().insert(key.into(), None);
    }

    /// Persist the current snapshot.
    pub async fn save(&self) -> Result<(), StoreError> {
        let records = self.records.lock().await;
        let json = serde_json::to_string_pretty(&*records)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.write_atomic(&json).await
    }

    async fn write_atomic(&self, json: &str) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn count_unassigned(&self, kind: EntityKind) -> Result<u64, StoreError> {
        let records = self.records.lock().await;
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
        let records = self.records.lock().await;
        let page = records
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, v)| v.is_none())
                    .skip(offset)
                    .take(page_size)
                    .map(|(k, _)| InternalKey::new(k.clone()))
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
        let records = self.records.lock().await;
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
        // The lock stays held across the write: concurrent assigners persist
        // strictly in mutation order, so every saved snapshot contains all
        // earlier assignments.
        let mut records = self.records.lock().await;
        let slot = records
            .get_mut(&kind)
            .and_then(|rows| rows.get_mut(key.as_str()))
            .ok_or_else(|| StoreError::Backend(format!("no such record: {kind} {key}")))?;

        if slot.is_some() {
            return Ok(false);
        }
        *slot = Some(candidate.to_string());
        let json = serde_json::to_string_pretty(&*records)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if let Err(err) = self.write_atomic(&json).await {
            // Keep memory and disk in agreement; the record stays unassigned
            // and is retried on the next run.
            if let Some(slot) = records.get_mut(&kind).and_then(|rows| rows.get_mut(key.as_str())) {
                *slot = None;
            }
            return Err(err);
        }
        Ok(true)
    }

    async fn assigned_display_ids(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<(InternalKey, String)>, StoreError> {
        let records = self.records.lock().await;
        let pairs = records
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .filter_map(|(k, v)| v.clone().map(|id| (InternalKey::new(k.clone()), id)))
                    .collect()
            })
            .unwrap_or_default();
        Ok(pairs)
    }
}
