//! Isolation pruning: Stage A (placement-only) and Stage C (post-validation).
//!
//! Both stages answer the same question — "does this candidate have at
//! least k-1 neighbors within a pairwise block threshold?" — but over
//! different inputs and thresholds, so the neighbor-counting core is
//! shared and each stage wraps it with its own candidate source.

use guardian_afk_utils::{PackedHashMap, pack_xz, remap_zero_key};

use crate::config::{CHUNK_SIZE_BLOCKS, Config};
use crate::scanner::Column;
use crate::types::MonumentCandidate;

fn block_distance_sq(a: (i32, i32), b: (i32, i32)) -> i64 {
    let dx = i64::from(a.0 - b.0) * i64::from(CHUNK_SIZE_BLOCKS);
    let dz = i64::from(a.1 - b.1) * i64::from(CHUNK_SIZE_BLOCKS);
    dx * dx + dz * dz
}

fn chunk_of(candidate: MonumentCandidate) -> (i32, i32) {
    (candidate.chunk_x, candidate.chunk_z)
}

/// Counts distinct neighbors of `target` within `threshold_blocks`,
/// stopping as soon as `needed` is reached (the short-circuit the
/// specification calls for: no need to finish counting once a candidate's
/// fate is decided).
fn count_neighbors_short_circuit<'a>(
    target: MonumentCandidate,
    threshold_blocks: i64,
    needed: usize,
    others: impl Iterator<Item = &'a MonumentCandidate>,
) -> usize {
    if needed == 0 {
        return needed;
    }
    let threshold_sq = threshold_blocks * threshold_blocks;
    let mut count = 0;
    for &other in others {
        if chunk_of(other) == chunk_of(target) {
            continue;
        }
        if block_distance_sq(chunk_of(target), chunk_of(other)) <= threshold_sq {
            count += 1;
            if count >= needed {
                break;
            }
        }
    }
    count
}

/// Stage A: a streaming three-column window over placement-only candidates.
///
/// `on_survivor` is invoked once per surviving candidate, in the order
/// columns are fed in (which the scanner already guarantees is strict
/// `regionX` order).
pub struct StageAWindow {
    needed: usize,
    threshold_blocks: i64,
    keep_all: bool,
    prev: Option<Column>,
    curr: Option<Column>,
}

impl StageAWindow {
    #[must_use]
    pub fn new(config: &Config, k: usize) -> Self {
        Self {
            needed: k.saturating_sub(1),
            threshold_blocks: config.pairwise_blocks_stage_a,
            keep_all: config.keep_all,
            prev: None,
            curr: None,
        }
    }

    /// Feeds the next column (`regionX` ascending), evaluating the
    /// previously-fed column once its full 3-wide window (prev, curr, next)
    /// is available.
    pub fn push(&mut self, next: Column, mut on_survivor: impl FnMut(MonumentCandidate)) {
        let evaluate = self.curr.take();
        if let Some(curr) = evaluate {
            self.evaluate_column(self.prev.as_ref(), &curr, Some(&next), &mut on_survivor);
            self.prev = Some(curr);
        }
        self.curr = Some(next);
    }

    /// Flushes the final column still held in the window (no `next`
    /// neighbor exists for it).
    pub fn finish(&mut self, mut on_survivor: impl FnMut(MonumentCandidate)) {
        if let Some(curr) = self.curr.take() {
            self.evaluate_column(self.prev.as_ref(), &curr, None, &mut on_survivor);
        }
    }

    fn evaluate_column(
        &self,
        prev: Option<&Column>,
        curr: &Column,
        next: Option<&Column>,
        on_survivor: &mut impl FnMut(MonumentCandidate),
    ) {
        for slot in &curr.candidates {
            let Some(candidate) = slot else { continue };
            if self.keep_all {
                on_survivor(*candidate);
                continue;
            }
            let window_candidates = [prev, Some(curr), next]
                .into_iter()
                .flatten()
                .flat_map(|col| col.candidates.iter().flatten());
            let count = count_neighbors_short_circuit(
                *candidate,
                self.threshold_blocks,
                self.needed,
                window_candidates,
            );
            if count >= self.needed {
                on_survivor(*candidate);
            }
        }
    }
}

/// Stage C: re-prunes a flat surviving-candidate set (post-validation)
/// using a region-keyed hash map to look up the 3x3 region neighborhood
/// per survivor, instead of a sliding column window.
pub fn stage_c_prune(
    survivors: &[MonumentCandidate],
    config: &Config,
    k: usize,
) -> Vec<MonumentCandidate> {
    let needed = k.saturating_sub(1);
    if config.keep_all || needed == 0 {
        return survivors.to_vec();
    }

    let mut by_region: PackedHashMap<MonumentCandidate> =
        PackedHashMap::with_capacity(survivors.len());
    for &candidate in survivors {
        let rx = guardian_afk_utils::region_floor_div(
            candidate.chunk_x,
            crate::config::SPACING_CHUNKS,
        );
        let rz = guardian_afk_utils::region_floor_div(
            candidate.chunk_z,
            crate::config::SPACING_CHUNKS,
        );
        let key = remap_zero_key(pack_xz(rx, rz) as u64);
        // At most one candidate exists per region by the oracle's own
        // invariant, so a collision here would indicate a placement bug.
        by_region.insert_if_absent(key, candidate);
    }

    let threshold_sq = config.pairwise_blocks_stage_c * config.pairwise_blocks_stage_c;
    let mut kept = Vec::new();
    for &candidate in survivors {
        let rx = guardian_afk_utils::region_floor_div(
            candidate.chunk_x,
            crate::config::SPACING_CHUNKS,
        );
        let rz = guardian_afk_utils::region_floor_div(
            candidate.chunk_z,
            crate::config::SPACING_CHUNKS,
        );
        let mut count = 0;
        'neighbors: for drx in -1..=1 {
            for drz in -1..=1 {
                let key = remap_zero_key(pack_xz(rx + drx, rz + drz) as u64);
                if let Some(&other) = by_region.get(key) {
                    if other != candidate
                        && block_distance_sq(chunk_of(candidate), chunk_of(other)) <= threshold_sq
                    {
                        count += 1;
                        if count >= needed {
                            break 'neighbors;
                        }
                    }
                }
            }
        }
        if count >= needed {
            kept.push(candidate);
        }
    }
    kept
}
