use crate::report::KindStats;
use serde::Serialize;
use shortid_codec::EntityKind;

/// Emitted after every completed page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub kind: EntityKind,
    /// Records examined so far in this collection, across passes.
    pub processed: u64,
    /// Unassigned count measured at the start of the collection.
    pub total: u64,
    pub percent: u8,
}

impl ProgressEvent {
    pub(crate) fn new(kind: EntityKind, processed: u64, total: u64) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((processed.saturating_mul(100)) / total).min(100) as u8
        };
        Self {
            kind,
            processed,
            total,
            percent,
        }
    }
}

/// Observer for a running backfill. Implementations must be cheap; events
/// are emitted from the orchestrator's hot loop.
pub trait ProgressSink: Send + Sync {
    fn page_done(&self, _event: &ProgressEvent) {}

    fn collection_done(&self, _kind: EntityKind, _stats: &KindStats) {}
}

/// Sink that drops everything.
pub struct NullSink;

impl ProgressSink for NullSink {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_clamped_and_rounds_down() {
        assert_eq!(ProgressEvent::new(EntityKind::User, 0, 3).percent, 0);
        assert_eq!(ProgressEvent::new(EntityKind::User, 2, 3).percent, 66);
        assert_eq!(ProgressEvent::new(EntityKind::User, 3, 3).percent, 100);
        // Passes can examine more rows than the initial count.
        assert_eq!(ProgressEvent::new(EntityKind::User, 5, 3).percent, 100);
        // Empty collections are complete by definition.
        assert_eq!(ProgressEvent::new(EntityKind::User, 0, 0).percent, 100);
    }
}
