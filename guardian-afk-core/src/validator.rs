//! The biome-viability validator boundary.
//!
//! Modeled as the two-variant capability the design notes call for: `None`
//! (no native oracle; every placement is assumed viable) or `Batch` (an
//! implementation that can answer many chunks per call). Single-item
//! callers dispatch trivially to the batch path with `n=1`, exactly as
//! `guardian-afk-validator`'s dynamic loader does.

use crate::error::PipelineResult;

/// A biome-viability oracle for monument start chunks.
///
/// Absence of a validator is explicitly legal: every caller must be able to
/// treat "no validator configured" as "every candidate passes", yielding a
/// superset of results rather than a false negative. A call that *is*
/// wired up but fails at runtime (a handle error, a broken batch call) is
/// `ValidatorInternal` and is always fatal — there is no silent downgrade
/// once a validator was successfully loaded.
pub trait Validator: Send + Sync {
    /// Returns one viability flag per `(xs[i], zs[i])`, same length and
    /// order as the input slices.
    fn is_viable_batch(&self, xs: &[i32], zs: &[i32]) -> PipelineResult<Vec<bool>>;

    /// Convenience single-item form, built on [`Validator::is_viable_batch`].
    fn is_viable(&self, chunk_x: i32, chunk_z: i32) -> PipelineResult<bool> {
        Ok(self
            .is_viable_batch(&[chunk_x], &[chunk_z])?
            .first()
            .copied()
            .unwrap_or(false))
    }
}

/// The "no native oracle available" validator: every candidate passes.
///
/// Used whenever `guardian-afk-validator`'s dynamic loader reports
/// [`crate::error::PipelineError::ValidatorMissing`] — that failure is
/// downgraded to a warning and the pipeline substitutes this validator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullValidator;

impl Validator for NullValidator {
    fn is_viable_batch(&self, xs: &[i32], _zs: &[i32]) -> PipelineResult<Vec<bool>> {
        Ok(vec![true; xs.len()])
    }

    fn is_viable(&self, _chunk_x: i32, _chunk_z: i32) -> PipelineResult<bool> {
        Ok(true)
    }
}

/// Runs `candidates` through `validator` in batches of `batch_size`,
/// returning only the viable subset. Matches the amortized batch-call
/// contract `guardian-afk-validator` exposes over its FFI boundary. A
/// batch call failure propagates immediately as `ValidatorInternal`.
pub fn filter_viable(
    candidates: &[crate::types::MonumentCandidate],
    validator: &dyn Validator,
    batch_size: usize,
) -> PipelineResult<Vec<crate::types::MonumentCandidate>> {
    if batch_size == 0 {
        return Ok(Vec::new());
    }
    let mut kept = Vec::with_capacity(candidates.len());
    for chunk in candidates.chunks(batch_size) {
        let xs: Vec<i32> = chunk.iter().map(|c| c.chunk_x).collect();
        let zs: Vec<i32> = chunk.iter().map(|c| c.chunk_z).collect();
        let flags = validator.is_viable_batch(&xs, &zs)?;
        for (&candidate, &viable) in chunk.iter().zip(flags.iter()) {
            if viable {
                kept.push(candidate);
            }
        }
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MonumentCandidate;

    #[test]
    fn null_validator_accepts_everything() {
        let v = NullValidator;
        assert!(v.is_viable(0, 0).unwrap());
        assert_eq!(
            v.is_viable_batch(&[1, 2, 3], &[1, 2, 3]).unwrap(),
            vec![true; 3]
        );
    }

    struct EvenXValidator;
    impl Validator for EvenXValidator {
        fn is_viable_batch(&self, xs: &[i32], _zs: &[i32]) -> PipelineResult<Vec<bool>> {
            Ok(xs.iter().map(|x| x % 2 == 0).collect())
        }
    }

    struct FailingValidator;
    impl Validator for FailingValidator {
        fn is_viable_batch(&self, _xs: &[i32], _zs: &[i32]) -> PipelineResult<Vec<bool>> {
            Err(crate::error::PipelineError::ValidatorInternal(
                "batch call failed".into(),
            ))
        }
    }

    #[test]
    fn filter_viable_respects_batching_and_order() {
        let candidates: Vec<_> = (0..10)
            .map(|x| MonumentCandidate { chunk_x: x, chunk_z: 0 })
            .collect();
        let kept = filter_viable(&candidates, &EvenXValidator, 3).unwrap();
        assert_eq!(kept.len(), 5);
        assert!(kept.iter().all(|c| c.chunk_x % 2 == 0));
    }

    #[test]
    fn zero_batch_size_yields_nothing() {
        let candidates = vec![MonumentCandidate { chunk_x: 0, chunk_z: 0 }];
        assert!(filter_viable(&candidates, &NullValidator, 0).unwrap().is_empty());
    }

    #[test]
    fn validator_internal_error_propagates() {
        let candidates = vec![MonumentCandidate { chunk_x: 0, chunk_z: 0 }];
        assert!(filter_viable(&candidates, &FailingValidator, 10).is_err());
    }
}
