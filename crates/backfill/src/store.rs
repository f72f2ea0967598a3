use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shortid_codec::EntityKind;
use std::fmt;
use thiserror::Error;

/// Store-assigned primary identifier of a record. Opaque, immutable,
/// established at row creation, never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalKey(String);

impl InternalKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InternalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The store cannot be reached at all. Repeated occurrences abort the
    /// run.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A single operation failed. Folded into the per-record error counter.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// The narrow store interface the backfill needs. Any store with point
/// lookups, range scans with offset/limit, and conditional updates can
/// implement it; no multi-record transactions are required.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Number of records of this kind with no display identifier.
    async fn count_unassigned(&self, kind: EntityKind) -> std::result::Result<u64, StoreError>;

    /// One page of unassigned record keys, ordered by internal key. An empty
    /// page signals "no more".
    async fn unassigned_page(
        &self,
        kind: EntityKind,
        page_size: usize,
        offset: usize,
    ) -> std::result::Result<Vec<InternalKey>, StoreError>;

    /// Whether any record of this kind already carries the candidate value.
    async fn display_id_exists(
        &self,
        kind: EntityKind,
        candidate: &str,
    ) -> std::result::Result<bool, StoreError>;

    /// Set the display identifier only if it is currently unset. Must be a
    /// true conditional operation at the store level, not a read-then-write;
    /// this is the sole mechanism keeping concurrent runs from
    /// double-assigning a record. Returns `false` when the field was already
    /// set, which callers treat as benign.
    async fn assign_display_id_if_unset(
        &self,
        kind: EntityKind,
        key: &InternalKey,
        candidate: &str,
    ) -> std::result::Result<bool, StoreError>;

    /// All assigned (key, display id) pairs for a kind. Used only by the
    /// post-run duplicate check.
    async fn assigned_display_ids(
        &self,
        kind: EntityKind,
    ) -> std::result::Result<Vec<(InternalKey, String)>, StoreError>;
}
