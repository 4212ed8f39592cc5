//! The pipeline's error taxonomy.
//!
//! Every variant here is one of the failure classes named by the
//! specification. Only [`PipelineError::ValidatorMissing`] is ever
//! downgraded (logged and treated as "proceed without validation"); every
//! other variant propagates to the orchestrator and aborts the run.

use thiserror::Error;

/// A fatal or informational condition raised by the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The native biome-viability oracle could not be loaded. Not fatal:
    /// the orchestrator logs this and proceeds with placement-only results.
    #[error("validator unavailable: {0}")]
    ValidatorMissing(String),

    /// The validator loaded but a handle or batch call failed.
    #[error("validator call failed: {0}")]
    ValidatorInternal(String),

    /// The PRNG or oracle produced a result inconsistent with its own
    /// invariants. Should be unreachable; indicates a platform bug.
    #[error("PRNG/oracle parity violation: {0}")]
    PrngParity(String),

    /// A worker thread ran out of memory or otherwise exhausted a bounded
    /// resource during Stage C or group enumeration.
    #[error("resource exhausted during {stage}: {detail}")]
    ResourceExhaustion {
        /// The stage that was running when the resource was exhausted.
        stage: &'static str,
        /// Additional detail for diagnostics.
        detail: String,
    },

    /// A worker panicked; its panic payload (if a string) is preserved.
    #[error("worker panicked in {stage}: {message}")]
    WorkerPanic {
        /// The stage whose worker panicked.
        stage: &'static str,
        /// The panic payload, converted to a string where possible.
        message: String,
    },

    /// The run was cancelled by the caller before completion.
    #[error("interrupted")]
    Interrupted,
}

/// Shorthand result type used throughout the pipeline.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while validating user-supplied arguments, before any
/// pipeline work starts. Kept separate from [`PipelineError`] since these
/// map to a distinct exit code (1) per the CLI contract.
#[derive(Debug, Error)]
pub enum ArgError {
    /// `rangeBlocks` was not positive.
    #[error("rangeBlocks must be > 0, got {0}")]
    RangeNotPositive(i64),

    /// `excludeRadius` was outside `[0, rangeBlocks]`.
    #[error("excludeRadius must be within [0, {range}], got {got}")]
    ExcludeOutOfRange {
        /// The offending value.
        got: i64,
        /// The valid range's upper bound (`rangeBlocks`).
        range: i64,
    },

    /// `threads` was not at least 1.
    #[error("threads must be >= 1, got {0}")]
    ThreadsNotPositive(i64),

    /// The `type` argument was not one of `double|triple|quad`.
    #[error("invalid group type: {0}")]
    InvalidGroupKind(String),
}
