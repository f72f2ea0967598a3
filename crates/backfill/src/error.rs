use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackfillError>;

/// Run-level failures. Per-record failures never surface here; they are
/// counted in the report and the run keeps going.
#[derive(Error, Debug)]
pub enum BackfillError {
    /// Repeated, systemic store failure. Fatal to the current run; already
    /// committed assignments are untouched and a fresh run is safe.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}
