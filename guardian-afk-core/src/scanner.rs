//! Parallel column-by-column scan over a region-coordinate rectangle.
//!
//! Mirrors the teacher's worker-pool-plus-bounded-channel shape (see
//! `chunk_generation_task.rs`): a `rayon::ThreadPool` sized to the caller's
//! thread count computes columns, a bounded `crossbeam_channel` caps
//! in-flight work, and a small reorder buffer on the consumer side restores
//! strict `regionX` order before columns reach Stage A.

use std::collections::BTreeMap;

use crossbeam::channel::bounded;
use guardian_afk_utils::region_floor_div;

use crate::config::{Config, SPACING_CHUNKS};
use crate::error::{PipelineError, PipelineResult};
use crate::oracle::candidate_for_region_in_bounds;
use crate::types::MonumentCandidate;

/// A dense per-`regionX` slice of the search rectangle: one optional
/// candidate per `regionZ`, indexed by `regionZ - min_region_z`.
///
/// This is the unit of parallel work and of the sliding 3-column window
/// used by Stage A; it is released once the window has moved past it.
#[derive(Debug, Clone)]
pub struct Column {
    /// The regionX this column covers.
    pub region_x: i32,
    /// The first regionZ represented by index 0.
    pub min_region_z: i32,
    /// One slot per regionZ in `[min_region_z, min_region_z + len)`.
    pub candidates: Vec<Option<MonumentCandidate>>,
}

impl Column {
    /// Candidate at the given `region_z`, if present and in range.
    #[must_use]
    pub fn get(&self, region_z: i32) -> Option<MonumentCandidate> {
        let idx = region_z - self.min_region_z;
        if idx < 0 || idx as usize >= self.candidates.len() {
            return None;
        }
        self.candidates[idx as usize]
    }
}

/// The chunk-coordinate rectangle resolved into region coordinates, plus
/// the exclusion radius expressed in chunks.
#[derive(Debug, Clone, Copy)]
pub struct ScanBounds {
    pub min_chunk: i32,
    pub max_chunk: i32,
    pub min_region_x: i32,
    pub max_region_x: i32,
    pub min_region_z: i32,
    pub max_region_z: i32,
    pub exclude_chunks: i32,
}

impl ScanBounds {
    /// Derives region bounds from a symmetric chunk-space search rectangle
    /// `[-half_chunks, half_chunks]` and a block-space exclusion radius.
    #[must_use]
    pub fn from_half_range(half_chunks: i32, exclude_blocks: i64) -> Self {
        let min_chunk = -half_chunks;
        let max_chunk = half_chunks;
        // Ceiling, matching `blocks_to_chunks_ceil`'s use for `half_chunks`
        // itself: an exclusion radius equal to the half-range must exclude
        // every chunk the scan can produce, even off the 16-block grid.
        let exclude_chunks = crate::config::blocks_to_chunks_ceil(exclude_blocks);
        Self {
            min_chunk,
            max_chunk,
            min_region_x: region_floor_div(min_chunk, SPACING_CHUNKS),
            max_region_x: region_floor_div(max_chunk, SPACING_CHUNKS),
            min_region_z: region_floor_div(min_chunk, SPACING_CHUNKS),
            max_region_z: region_floor_div(max_chunk, SPACING_CHUNKS),
            exclude_chunks,
        }
    }
}

fn excluded(candidate: MonumentCandidate, exclude_chunks: i32) -> bool {
    candidate.chunk_x.abs().max(candidate.chunk_z.abs()) <= exclude_chunks
}

fn compute_column(region_x: i32, bounds: &ScanBounds, world_seed: i64) -> Column {
    let len = (bounds.max_region_z - bounds.min_region_z + 1).max(0) as usize;
    let mut candidates = Vec::with_capacity(len);
    for region_z in bounds.min_region_z..=bounds.max_region_z {
        let candidate = candidate_for_region_in_bounds(
            region_x,
            region_z,
            world_seed,
            bounds.min_chunk,
            bounds.max_chunk,
        )
        .filter(|&c| !excluded(c, bounds.exclude_chunks));
        candidates.push(candidate);
    }
    Column {
        region_x,
        min_region_z: bounds.min_region_z,
        candidates,
    }
}

/// Scans `bounds` across `config.threads` workers, invoking `on_column` once
/// per `regionX` in strict ascending order.
///
/// Production runs unordered across the pool; a reorder buffer keyed by
/// `regionX` restores the order the sliding window (Stage A) requires
/// before handing each column to `on_column`. A worker panic is surfaced as
/// [`PipelineError::WorkerPanic`] and aborts the scan; no partial column is
/// ever delivered.
pub fn scan(
    bounds: &ScanBounds,
    world_seed: i64,
    config: &Config,
    mut on_column: impl FnMut(Column),
) -> PipelineResult<()> {
    let region_xs: Vec<i32> = (bounds.min_region_x..=bounds.max_region_x).collect();
    if region_xs.is_empty() {
        return Ok(());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| PipelineError::ResourceExhaustion {
            stage: "PlacementScanner",
            detail: e.to_string(),
        })?;

    let inflight_cap = (config.threads * 4).max(1);
    let (tx, rx) = bounded::<(i32, Column)>(inflight_cap);
    let bounds = *bounds;

    let produced = pool.scope(|scope| {
        for &region_x in &region_xs {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let column = compute_column(region_x, &bounds, world_seed);
                // The receiver may already be gone if an earlier panic aborted
                // the scan; a send failure here is not itself an error.
                let _ = tx.send((region_x, column));
            });
        }
        drop(tx);

        let mut pending: BTreeMap<i32, Column> = BTreeMap::new();
        let mut next_expected = region_xs[0];
        let mut delivered = 0usize;

        while let Ok((region_x, column)) = rx.recv() {
            pending.insert(region_x, column);
            while let Some(column) = pending.remove(&next_expected) {
                on_column(column);
                delivered += 1;
                next_expected += 1;
            }
        }
        delivered
    });

    if produced != region_xs.len() {
        return Err(PipelineError::WorkerPanic {
            stage: "PlacementScanner",
            message: format!(
                "expected {} columns, delivered {produced}",
                region_xs.len()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_bounds_are_symmetric_around_origin() {
        let bounds = ScanBounds::from_half_range(100, 0);
        assert!(bounds.min_region_x <= 0 && bounds.max_region_x >= 0);
        assert!(bounds.min_region_z <= 0 && bounds.max_region_z >= 0);
    }

    #[test]
    fn exclude_chunks_derived_from_blocks() {
        let bounds = ScanBounds::from_half_range(100, 160);
        assert_eq!(bounds.exclude_chunks, 10);
    }

    #[test]
    fn range_equal_to_exclude_radius_excludes_every_chunk_even_off_grid() {
        // 5000 is not a multiple of 16; both conversions must still land on
        // the same chunk count or a one-chunk ring would be in bounds but
        // not excluded.
        let half_chunks = crate::config::blocks_to_chunks_ceil(5000);
        let bounds = ScanBounds::from_half_range(half_chunks, 5000);
        assert_eq!(bounds.exclude_chunks, bounds.max_chunk);
        for chunk_x in bounds.min_chunk..=bounds.max_chunk {
            let c = MonumentCandidate {
                chunk_x,
                chunk_z: bounds.max_chunk,
            };
            assert!(excluded(c, bounds.exclude_chunks));
        }
    }

    #[test]
    fn excluded_uses_chebyshev_radius() {
        let c = MonumentCandidate {
            chunk_x: 5,
            chunk_z: -3,
        };
        assert!(excluded(c, 5));
        assert!(!excluded(c, 4));
    }

    #[test]
    fn scan_delivers_columns_in_region_x_order() {
        let bounds = ScanBounds::from_half_range(40, 0);
        let config = Config {
            threads: 4,
            ..Config::default()
        };
        let mut seen = Vec::new();
        scan(&bounds, -141, &config, |col| seen.push(col.region_x)).unwrap();
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        assert_eq!(seen, sorted);
        assert_eq!(seen.len(), (bounds.max_region_x - bounds.min_region_x + 1) as usize);
    }

    #[test]
    fn column_lookup_out_of_range_is_none() {
        let col = Column {
            region_x: 0,
            min_region_z: 0,
            candidates: vec![None, Some(MonumentCandidate { chunk_x: 1, chunk_z: 1 })],
        };
        assert_eq!(col.get(-1), None);
        assert_eq!(col.get(5), None);
        assert!(col.get(1).is_some());
    }
}
