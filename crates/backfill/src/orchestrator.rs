use crate::error::{BackfillError, Result};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::report::{BackfillReport, KindStats};
use crate::store::{InternalKey, RecordStore, StoreError};
use crate::validate::find_duplicates;
use shortid_codec::{generate, EntityKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Upper bound on collision-retry passes over one collection in a single
/// run. A record still colliding after this many passes is left unassigned
/// for the next run and called out in the log.
pub const MAX_COLLISION_PASSES: u32 = 10;

#[derive(Debug, Clone)]
pub struct BackfillConfig {
    /// Collections to process, in this order. Restart-resume works by kind,
    /// so higher-priority kinds belong first.
    pub kinds: Vec<EntityKind>,
    /// Records fetched per page.
    pub page_size: usize,
    /// Consecutive count/page-fetch failures that abort the run as
    /// store-unavailable. Per-record failures never count toward this.
    pub fatal_error_streak: u32,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            kinds: EntityKind::ALL.to_vec(),
            page_size: 100,
            fatal_error_streak: 5,
        }
    }
}

enum RecordOutcome {
    Assigned,
    /// Conditional write found the field already set. Benign: a concurrent
    /// run got there first.
    AlreadySet,
    Collision { candidate: String },
    Failed { key: InternalKey, err: StoreError },
}

/// Drives the backfill across all configured collections.
///
/// Stateless between runs; holds only the store handle and tuning. Safe to
/// run concurrently with live writes and with other runner instances; the
/// store's conditional update is the only correctness mechanism needed.
pub struct BackfillRunner {
    store: Arc<dyn RecordStore>,
    config: BackfillConfig,
}

impl BackfillRunner {
    pub fn new(store: Arc<dyn RecordStore>, config: BackfillConfig) -> Self {
        Self { store, config }
    }

    /// Process every configured collection sequentially (bounds peak store
    /// load), then validate uniqueness. The report is produced even when
    /// collections saw per-record errors; only systemic store failure
    /// returns `Err`.
    pub async fn run(&self, progress: &dyn ProgressSink) -> Result<BackfillReport> {
        let started = Instant::now();
        log::info!(
            "Starting display id backfill across {} collections",
            self.config.kinds.len()
        );

        let mut per_kind = BTreeMap::new();
        let mut totals = KindStats::default();
        for &kind in &self.config.kinds {
            let stats = self.backfill_kind(kind, progress).await?;
            log::info!(
                "Completed {kind}: {} processed, {} skipped, {} errors",
                stats.processed,
                stats.skipped,
                stats.errors
            );
            progress.collection_done(kind, &stats);
            totals.absorb(&stats);
            per_kind.insert(kind, stats);
        }

        let (duplicates, validation_errors) =
            find_duplicates(self.store.as_ref(), &self.config.kinds).await;
        let all_unique = duplicates.is_empty() && validation_errors.is_empty();

        if totals.skipped > 0 {
            log::warn!(
                "{} records were skipped on collisions; re-run to pick them up",
                totals.skipped
            );
        }

        Ok(BackfillReport {
            per_kind,
            totals,
            duration_seconds: started.elapsed().as_secs(),
            all_unique,
            duplicates,
            validation_errors,
        })
    }

    async fn backfill_kind(
        &self,
        kind: EntityKind,
        progress: &dyn ProgressSink,
    ) -> Result<KindStats> {
        let mut stats = KindStats::default();
        let mut fetch_streak: u32 = 0;

        let total = loop {
            match self.store.count_unassigned(kind).await {
                Ok(total) => {
                    fetch_streak = 0;
                    break total;
                }
                Err(err) => {
                    fetch_streak += 1;
                    log::warn!("Failed to count unassigned {kind} records: {err}");
                    if fetch_streak >= self.config.fatal_error_streak {
                        return Err(BackfillError::StoreUnavailable(err.to_string()));
                    }
                }
            }
        };

        stats.total = total;
        if total == 0 {
            log::info!("No records need display ids for {kind}");
            return Ok(stats);
        }
        log::info!("Found {total} {kind} records without display ids");

        // Records examined across passes, for progress reporting only.
        let mut examined: u64 = 0;

        for pass in 1..=MAX_COLLISION_PASSES {
            let mut offset = 0usize;
            let mut pass_skipped: u64 = 0;

            loop {
                let page = loop {
                    match self
                        .store
                        .unassigned_page(kind, self.config.page_size, offset)
                        .await
                    {
                        Ok(page) => {
                            fetch_streak = 0;
                            break page;
                        }
                        Err(err) => {
                            fetch_streak += 1;
                            log::warn!("Failed to fetch {kind} page at offset {offset}: {err}");
                            if fetch_streak >= self.config.fatal_error_streak {
                                return Err(BackfillError::StoreUnavailable(err.to_string()));
                            }
                        }
                    }
                };
                if page.is_empty() {
                    break;
                }

                // Assigned records leave the unassigned set on their own;
                // the offset only has to step past records this pass could
                // not assign, so they are not refetched in a tight loop.
                let mut left_unassigned = 0usize;
                for outcome in self.process_page(kind, page).await {
                    examined += 1;
                    match outcome {
                        RecordOutcome::Assigned | RecordOutcome::AlreadySet => {
                            stats.processed += 1;
                        }
                        RecordOutcome::Collision { candidate } => {
                            log::warn!("Display id conflict in {kind}: {candidate} already exists");
                            stats.skipped += 1;
                            pass_skipped += 1;
                            left_unassigned += 1;
                        }
                        RecordOutcome::Failed { key, err } => {
                            log::warn!("Failed to assign display id to {kind} record {key}: {err}");
                            stats.errors += 1;
                            left_unassigned += 1;
                        }
                    }
                }
                offset += left_unassigned;

                progress.page_done(&ProgressEvent::new(kind, examined, total));
            }

            // Collisions are retried within the run; errored records wait
            // for the next run, when they reappear as still unassigned.
            if pass_skipped == 0 {
                break;
            }
            if pass == MAX_COLLISION_PASSES {
                log::warn!(
                    "{kind}: records still colliding after {pass} passes; leaving them for the next run"
                );
            } else {
                log::info!("{kind}: retrying {pass_skipped} collided records (pass {})", pass + 1);
            }
        }

        Ok(stats)
    }

    /// Fan a page out into per-record tasks and join them all. No ordering
    /// guarantee within a page; a failing record never takes the page down.
    async fn process_page(&self, kind: EntityKind, page: Vec<InternalKey>) -> Vec<RecordOutcome> {
        let mut tasks = Vec::with_capacity(page.len());
        for key in page {
            let store = Arc::clone(&self.store);
            let task_key = key.clone();
            let handle = tokio::spawn(async move {
                let candidate = generate(kind);
                match store.display_id_exists(kind, &candidate).await {
                    Ok(true) => RecordOutcome::Collision { candidate },
                    Ok(false) => {
                        match store
                            .assign_display_id_if_unset(kind, &task_key, &candidate)
                            .await
                        {
                            Ok(true) => RecordOutcome::Assigned,
                            Ok(false) => RecordOutcome::AlreadySet,
                            Err(err) => RecordOutcome::Failed { key: task_key, err },
                        }
                    }
                    Err(err) => RecordOutcome::Failed { key: task_key, err },
                }
            });
            tasks.push((key, handle));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (key, handle) in tasks {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => outcomes.push(RecordOutcome::Failed {
                    key,
                    err: StoreError::Backend(format!("task panicked: {err}")),
                }),
            }
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::progress::NullSink;
    use async_trait::async_trait;

    struct DownStore;

    #[async_trait]
    impl RecordStore for DownStore {
        async fn count_unassigned(&self, _kind: EntityKind) -> std::result::Result<u64, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn unassigned_page(
            &self,
            _kind: EntityKind,
            _page_size: usize,
            _offset: usize,
        ) -> std::result::Result<Vec<InternalKey>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn display_id_exists(
            &self,
            _kind: EntityKind,
            _candidate: &str,
        ) -> std::result::Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn assign_display_id_if_unset(
            &self,
            _kind: EntityKind,
            _key: &InternalKey,
            _candidate: &str,
        ) -> std::result::Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn assigned_display_ids(
            &self,
            _kind: EntityKind,
        ) -> std::result::Result<Vec<(InternalKey, String)>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn empty_collections_report_no_work() {
        let store = Arc::new(MemoryStore::new());
        let runner = BackfillRunner::new(
            store,
            BackfillConfig {
                kinds: vec![EntityKind::User, EntityKind::Client],
                ..BackfillConfig::default()
            },
        );

        let report = runner.run(&NullSink).await.unwrap();
        assert_eq!(report.totals, KindStats::default());
        assert!(report.all_unique);
        assert_eq!(report.per_kind.len(), 2);
    }

    #[tokio::test]
    async fn unreachable_store_is_fatal_for_the_run() {
        let runner = BackfillRunner::new(
            Arc::new(DownStore),
            BackfillConfig {
                kinds: vec![EntityKind::Client],
                fatal_error_streak: 3,
                ..BackfillConfig::default()
            },
        );

        let err = runner.run(&NullSink).await.unwrap_err();
        assert!(matches!(err, BackfillError::StoreUnavailable(_)));
    }
}
