//! # Shortid Phase
//!
//! The migration phase tracker: a small forward-only state machine recording
//! which rollout stage the dual-identifier scheme is in and what each stage
//! guarantees about reads and writes.
//!
//! The tracker is an explicit value loaded once at process start and injected
//! wherever it is consulted. One phase governs the whole deployment at a
//! time, but nothing here is process-global, so tests (and staging/prod
//! fixtures in one test process) can hold different phases side by side.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rollout stages, in order. There is no rollback transition: a record found
/// violating a later phase's precondition is a validation failure to surface,
/// not a reason to regress the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationPhase {
    /// Display-id columns exist; nothing reads or requires them yet.
    SchemaReady,
    /// Backfill in flight; both identifier forms accepted on read.
    Backfilling,
    /// UI surfaces show display identifiers.
    UiCutover,
    /// New APIs prefer display identifiers; internal keys still accepted.
    ApiPreference,
    /// Display identifiers are primary; internal keys may be dropped.
    InternalKeyRetired,
}

impl MigrationPhase {
    pub const ALL: [MigrationPhase; 5] = [
        MigrationPhase::SchemaReady,
        MigrationPhase::Backfilling,
        MigrationPhase::UiCutover,
        MigrationPhase::ApiPreference,
        MigrationPhase::InternalKeyRetired,
    ];

    /// The phase after this one, or `None` at the terminal phase.
    #[must_use]
    pub fn next(self) -> Option<MigrationPhase> {
        match self {
            MigrationPhase::SchemaReady => Some(MigrationPhase::Backfilling),
            MigrationPhase::Backfilling => Some(MigrationPhase::UiCutover),
            MigrationPhase::UiCutover => Some(MigrationPhase::ApiPreference),
            MigrationPhase::ApiPreference => Some(MigrationPhase::InternalKeyRetired),
            MigrationPhase::InternalKeyRetired => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            MigrationPhase::SchemaReady => "schema-ready",
            MigrationPhase::Backfilling => "backfilling",
            MigrationPhase::UiCutover => "ui-cutover",
            MigrationPhase::ApiPreference => "api-preference",
            MigrationPhase::InternalKeyRetired => "internal-key-retired",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<MigrationPhase> {
        MigrationPhase::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl std::fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a phase guarantees about identifier handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRequirements {
    /// Both identifier forms must be accepted on read.
    pub dual_read: bool,
    /// Both identifier forms are written on create.
    pub dual_write: bool,
    /// The internal key may be removed from a record.
    pub internal_key_removable: bool,
}

/// Requirements table, pure and total over the phase enum.
#[must_use]
pub fn requirements_for(phase: MigrationPhase) -> PhaseRequirements {
    match phase {
        MigrationPhase::SchemaReady => PhaseRequirements {
            dual_read: false,
            dual_write: true,
            internal_key_removable: false,
        },
        MigrationPhase::Backfilling
        | MigrationPhase::UiCutover
        | MigrationPhase::ApiPreference => PhaseRequirements {
            dual_read: true,
            dual_write: true,
            internal_key_removable: false,
        },
        MigrationPhase::InternalKeyRetired => PhaseRequirements {
            dual_read: true,
            dual_write: false,
            internal_key_removable: true,
        },
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PhaseError {
    #[error("invalid phase transition from {from}: {reason}")]
    InvalidTransition {
        from: MigrationPhase,
        reason: String,
    },
}

/// Precondition for advancing: every record that the *next* phase requires a
/// display identifier for already has one. Checking that is the backfill
/// orchestrator's reporting, not recomputed here; callers adapt its report
/// to this trait.
pub trait PhaseGate {
    fn backfill_complete(&self, next: MigrationPhase) -> bool;
}

/// Holds the single current phase for a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTracker {
    current: MigrationPhase,
}

impl PhaseTracker {
    #[must_use]
    pub fn new(current: MigrationPhase) -> Self {
        Self { current }
    }

    #[must_use]
    pub fn current(&self) -> MigrationPhase {
        self.current
    }

    #[must_use]
    pub fn requirements(&self) -> PhaseRequirements {
        requirements_for(self.current)
    }

    /// Move to the next phase if the gate holds. On failure the phase is
    /// unchanged.
    pub fn advance(&mut self, gate: &dyn PhaseGate) -> Result<MigrationPhase, PhaseError> {
        let Some(next) = self.current.next() else {
            return Err(PhaseError::InvalidTransition {
                from: self.current,
                reason: "already at the terminal phase".to_string(),
            });
        };

        if requirements_for(next).dual_read && !gate.backfill_complete(next) {
            return Err(PhaseError::InvalidTransition {
                from: self.current,
                reason: format!("records still lack display identifiers required by {next}"),
            });
        }

        self.current = next;
        Ok(next)
    }
}
