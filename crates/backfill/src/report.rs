use crate::validate::DuplicateViolation;
use serde::{Deserialize, Serialize};
use shortid_codec::EntityKind;
use shortid_phase::{MigrationPhase, PhaseGate};
use std::collections::BTreeMap;

/// Per-collection counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
    /// Unassigned records counted at the start of the collection.
    pub total: u64,
    /// Records successfully carrying a display identifier after this run,
    /// including benign "already set by a concurrent run" outcomes.
    pub processed: u64,
    /// Candidates abandoned because the value already existed; retried on a
    /// later pass.
    pub skipped: u64,
    /// Per-record store failures. Never abort a page.
    pub errors: u64,
}

impl KindStats {
    pub(crate) fn absorb(&mut self, other: &KindStats) {
        self.total += other.total;
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.errors += other.errors;
    }
}

/// Final report for one backfill run. Printed in full by operator tooling
/// regardless of partial failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillReport {
    pub per_kind: BTreeMap<EntityKind, KindStats>,
    pub totals: KindStats,
    pub duration_seconds: u64,
    /// Verdict of the post-run duplicate check. A failed check is a
    /// correctness gate, not a repair step.
    pub all_unique: bool,
    pub duplicates: Vec<DuplicateViolation>,
    /// Collections whose validation query itself failed.
    pub validation_errors: Vec<String>,
}

impl BackfillReport {
    /// Whether this run left the store ready for a phase advance: every
    /// record it saw got an identifier, nothing was skipped or errored, and
    /// validation passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.totals.skipped == 0
            && self.totals.errors == 0
            && self.all_unique
            && self.validation_errors.is_empty()
    }
}

/// Adapter feeding a run's outcome into the phase tracker's precondition.
pub struct ReportGate<'a>(pub &'a BackfillReport);

impl PhaseGate for ReportGate<'_> {
    fn backfill_complete(&self, _next: MigrationPhase) -> bool {
        self.0.is_clean()
    }
}
