//! Deterministic monument placement: region seed formula + triangular draws.

use guardian_afk_utils::MonumentRandom;

use crate::config::{SEPARATION_CHUNKS, SPACING_CHUNKS};
use crate::types::MonumentCandidate;

const REGION_SEED_X_FACTOR: i64 = 341_873_128_712;
const REGION_SEED_Z_FACTOR: i64 = 132_897_987_541;
const REGION_SEED_OFFSET: i64 = 10_387_313;
/// The triangular draw's bound: spacing minus separation, the forbidden
/// band inside each region that keeps a monument away from the edge.
const TRIANGLE_BOUND: i32 = SPACING_CHUNKS - SEPARATION_CHUNKS;

/// Computes the region seed for `(rx, rz)` under `world_seed`.
#[must_use]
pub fn region_seed(rx: i32, rz: i32, world_seed: i64) -> i64 {
    i64::from(rx)
        .wrapping_mul(REGION_SEED_X_FACTOR)
        .wrapping_add(i64::from(rz).wrapping_mul(REGION_SEED_Z_FACTOR))
        .wrapping_add(world_seed)
        .wrapping_add(REGION_SEED_OFFSET)
}

/// Computes the single monument candidate for region `(rx, rz)`, without
/// filtering against any chunk bounds. Draw order is fixed: X then Z.
#[must_use]
pub fn candidate_for_region(rx: i32, rz: i32, world_seed: i64) -> MonumentCandidate {
    let mut rand = MonumentRandom::from_seed(region_seed(rx, rz, world_seed));
    let chunk_x = rx * SPACING_CHUNKS + rand.triangular(TRIANGLE_BOUND);
    let chunk_z = rz * SPACING_CHUNKS + rand.triangular(TRIANGLE_BOUND);
    MonumentCandidate { chunk_x, chunk_z }
}

/// Computes the region candidate and reports it only if its chunk
/// coordinates fall within `[min_chunk, max_chunk]` on both axes.
#[must_use]
pub fn candidate_for_region_in_bounds(
    rx: i32,
    rz: i32,
    world_seed: i64,
    min_chunk: i32,
    max_chunk: i32,
) -> Option<MonumentCandidate> {
    let candidate = candidate_for_region(rx, rz, world_seed);
    if (min_chunk..=max_chunk).contains(&candidate.chunk_x)
        && (min_chunk..=max_chunk).contains(&candidate.chunk_z)
    {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_seed_matches_formula() {
        assert_eq!(
            region_seed(1, 2, 99),
            1 * REGION_SEED_X_FACTOR + 2 * REGION_SEED_Z_FACTOR + 99 + REGION_SEED_OFFSET
        );
    }

    #[test]
    fn candidate_is_deterministic() {
        let a = candidate_for_region(0, 0, -141);
        let b = candidate_for_region(0, 0, -141);
        assert_eq!(a, b);
    }

    #[test]
    fn candidate_lands_within_its_region_band() {
        // triangular draw over [0,26] added to rx*32 keeps chunkX within
        // [rx*32, rx*32+26], always inside the region's own 32-chunk span.
        let c = candidate_for_region(5, -7, 12345);
        assert!((5 * SPACING_CHUNKS..5 * SPACING_CHUNKS + TRIANGLE_BOUND).contains(&c.chunk_x));
        assert!((-7 * SPACING_CHUNKS..-7 * SPACING_CHUNKS + TRIANGLE_BOUND).contains(&c.chunk_z));
    }

    #[test]
    fn bounds_filter_rejects_outside() {
        let c = candidate_for_region(0, 0, -141);
        assert!(candidate_for_region_in_bounds(0, 0, -141, c.chunk_x, c.chunk_x).is_some());
        assert!(
            candidate_for_region_in_bounds(0, 0, -141, c.chunk_x + 1, c.chunk_x + 100).is_none()
        );
    }
}
