//! The single immutable configuration value threaded through every stage.
//!
//! Nothing in the pipeline reads ambient/global state; every tunable named
//! by the specification lives here with the documented default, and is
//! passed down by reference from the orchestrator.

use serde::{Deserialize, Serialize};

/// Which monument group size the search is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    /// k = 2
    Double,
    /// k = 3
    Triple,
    /// k = 4
    Quad,
}

impl GroupKind {
    /// The group size `k` this kind searches for.
    #[must_use]
    pub const fn k(self) -> usize {
        match self {
            GroupKind::Double => 2,
            GroupKind::Triple => 3,
            GroupKind::Quad => 4,
        }
    }
}

impl std::str::FromStr for GroupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "double" => Ok(GroupKind::Double),
            "triple" => Ok(GroupKind::Triple),
            "quad" => Ok(GroupKind::Quad),
            other => Err(format!("unknown group type '{other}', expected double|triple|quad")),
        }
    }
}

/// The fully resolved pipeline configuration.
///
/// Constructed once (by the CLI, from defaults overlaid with environment
/// variables and an optional config file) and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// World seed to search.
    pub seed: i64,
    /// Which group size to search for.
    pub group_kind: GroupKind,
    /// Half-width in blocks of the square search region around the origin.
    pub range_blocks: i64,
    /// Chebyshev radius in blocks around the origin to exclude from results.
    pub exclude_radius_blocks: i64,
    /// Worker thread count for the scanner and enumerator pools.
    pub threads: usize,

    /// Block offset added to `chunk*16` when computing a monument center.
    /// `8` selects the center-of-chunk convention.
    pub center_offset: i32,
    /// Stage A (placement-only) pairwise isolation threshold, in blocks.
    pub pairwise_blocks_stage_a: i64,
    /// Stage B/C (post-validation) pairwise isolation threshold, in blocks.
    pub pairwise_blocks_stage_c: i64,
    /// Disables all pruning, for correctness testing against `keepAll` mode.
    pub keep_all: bool,

    /// Coarse-scan lattice step, in blocks.
    pub local_step: i64,
    /// Number of coarse-scan seeds retained for refinement.
    pub keep_top: usize,
    /// Refinement search radius around each retained seed, in blocks.
    pub refine_radius: i64,
    /// Refinement step sizes, applied coarsest-first.
    pub refine_steps: Vec<i64>,
    /// Whether the inner 24-block annulus hole is enforced.
    pub require_outside_24: bool,

    /// Anchor batch size for the group enumerator's worker shards.
    pub anchor_batch_size: usize,
    /// Batch size used when calling into the external validator.
    pub validator_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 0,
            group_kind: GroupKind::Double,
            range_blocks: 50_000,
            exclude_radius_blocks: 0,
            threads: 1,

            center_offset: 0,
            pairwise_blocks_stage_a: 256,
            pairwise_blocks_stage_c: 224,
            keep_all: false,

            local_step: 32,
            keep_top: 40,
            refine_radius: 24,
            refine_steps: vec![4, 2, 1],
            require_outside_24: true,

            anchor_batch_size: 25_000,
            validator_batch_size: 10_000,
        }
    }
}

/// The monument placement spacing/separation, in chunks: at most one
/// monument per 32x32-chunk region, never within the inner 5-chunk band.
pub const SPACING_CHUNKS: i32 = 32;
/// See [`SPACING_CHUNKS`].
pub const SEPARATION_CHUNKS: i32 = 5;
/// Chunk size in blocks.
pub const CHUNK_SIZE_BLOCKS: i32 = 16;
/// Fixed y coordinate of an AFK point (midpoint of the monument y-range).
pub const AFK_Y: i32 = 50;
/// Inclusive monument y-range.
pub const MONUMENT_Y_RANGE: (i32, i32) = (39, 61);
/// The monument's spawnable-block box offsets, applied identically on both
/// horizontal axes: `[center - MONUMENT_BOX_MIN, center + MONUMENT_BOX_MAX]`,
/// a 58-wide asymmetric span (not a symmetric radius) on each of x and z.
pub const MONUMENT_BOX_MIN: i32 = 29;
/// See [`MONUMENT_BOX_MIN`].
pub const MONUMENT_BOX_MAX: i32 = 28;
/// Inner/outer radius of the spawnable annulus, in blocks.
pub const ANNULUS_RADII: (i64, i64) = (24, 128);

/// Converts a block-space half-range or radius to whole chunks, rounding
/// up. Shared by the scanner's half-range (`rangeBlocks`) and exclusion
/// radius (`excludeRadius`) conversions so the two stay consistent at the
/// chunk boundary: `rangeBlocks == excludeRadius` must exclude every
/// candidate the scan can produce, even when neither value is a multiple of
/// the chunk size. Using floor for one and ceil for the other would leave a
/// one-chunk-wide ring that's in bounds but not excluded.
#[must_use]
pub fn blocks_to_chunks_ceil(blocks: i64) -> i32 {
    let chunks =
        (blocks.max(0) + i64::from(CHUNK_SIZE_BLOCKS) - 1) / i64::from(CHUNK_SIZE_BLOCKS);
    #[allow(clippy::cast_possible_truncation)]
    let chunks = chunks.min(i64::from(i32::MAX)) as i32;
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_kind_from_str() {
        assert_eq!("double".parse::<GroupKind>().unwrap(), GroupKind::Double);
        assert_eq!("triple".parse::<GroupKind>().unwrap(), GroupKind::Triple);
        assert_eq!("quad".parse::<GroupKind>().unwrap(), GroupKind::Quad);
        assert!("quintuple".parse::<GroupKind>().is_err());
    }

    #[test]
    fn group_kind_k_values() {
        assert_eq!(GroupKind::Double.k(), 2);
        assert_eq!(GroupKind::Triple.k(), 3);
        assert_eq!(GroupKind::Quad.k(), 4);
    }

    #[test]
    fn blocks_to_chunks_ceil_exact_multiple() {
        assert_eq!(blocks_to_chunks_ceil(0), 0);
        assert_eq!(blocks_to_chunks_ceil(16), 1);
        assert_eq!(blocks_to_chunks_ceil(5000 - 5000 % 16), 312);
    }

    #[test]
    fn blocks_to_chunks_ceil_rounds_up_non_multiples() {
        // 5000 / 16 = 312.5: both a half-range and an exclusion radius of
        // 5000 must resolve to the same chunk count, or the two would
        // disagree at the boundary (see orchestrator's range==exclude test).
        assert_eq!(blocks_to_chunks_ceil(5000), 313);
        assert_eq!(blocks_to_chunks_ceil(1), 1);
        assert_eq!(blocks_to_chunks_ceil(17), 2);
    }

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::default();
        assert_eq!(cfg.center_offset, 0);
        assert_eq!(cfg.pairwise_blocks_stage_a, 256);
        assert_eq!(cfg.pairwise_blocks_stage_c, 224);
        assert_eq!(cfg.local_step, 32);
        assert_eq!(cfg.keep_top, 40);
        assert_eq!(cfg.refine_radius, 24);
        assert_eq!(cfg.refine_steps, vec![4, 2, 1]);
        assert!(cfg.require_outside_24);
        assert_eq!(cfg.anchor_batch_size, 25_000);
        assert_eq!(cfg.validator_batch_size, 10_000);
    }
}
