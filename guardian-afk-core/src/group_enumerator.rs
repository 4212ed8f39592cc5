//! Spatial-hash-indexed enumeration of k-subsets of nearby monuments.

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::config::Config;
use crate::types::{Group, MonumentCandidate};

const CELL_SIZE_BLOCKS: i64 = 256;

fn cell_of(x: i32, z: i32) -> (i32, i32) {
    #[allow(clippy::cast_possible_truncation)]
    let cx = (i64::from(x).div_euclid(CELL_SIZE_BLOCKS)) as i32;
    #[allow(clippy::cast_possible_truncation)]
    let cz = (i64::from(z).div_euclid(CELL_SIZE_BLOCKS)) as i32;
    (cx, cz)
}

fn distance_sq((ax, az): (i32, i32), (bx, bz): (i32, i32)) -> i64 {
    let dx = i64::from(ax) - i64::from(bx);
    let dz = i64::from(az) - i64::from(bz);
    dx * dx + dz * dz
}

/// A 256-block-celled spatial index over monument centers, used to answer
/// "everything within 224 blocks of this anchor" in roughly constant time.
struct SpatialHash {
    cells: FxHashMap<(i32, i32), Vec<usize>>,
    centers: Vec<(i32, i32)>,
}

impl SpatialHash {
    fn build(centers: Vec<(i32, i32)>) -> Self {
        let mut cells: FxHashMap<(i32, i32), Vec<usize>> = FxHashMap::default();
        for (idx, &(x, z)) in centers.iter().enumerate() {
            cells.entry(cell_of(x, z)).or_default().push(idx);
        }
        Self { cells, centers }
    }

    /// Indices of every center within `radius_blocks` of `center`, sorted
    /// deterministically by `(centerX, centerZ)`. Queries the 3x3 cell
    /// neighborhood around `center`'s own cell, which always covers a
    /// 256-block radius query since cells are 256 blocks wide.
    fn neighbors_within(&self, center: (i32, i32), radius_blocks: i64) -> Vec<usize> {
        let (cx, cz) = cell_of(center.0, center.1);
        let radius_sq = radius_blocks * radius_blocks;
        let mut found = Vec::new();
        for dcx in -1..=1 {
            for dcz in -1..=1 {
                if let Some(bucket) = self.cells.get(&(cx + dcx, cz + dcz)) {
                    for &idx in bucket {
                        if distance_sq(center, self.centers[idx]) <= radius_sq {
                            found.push(idx);
                        }
                    }
                }
            }
        }
        found.sort_unstable_by_key(|&idx| self.centers[idx]);
        found
    }
}

/// Enumerates k-subsets (within anchor batches) for the whole
/// `candidates` slice, applying the all-pairs-within-224 and
/// centroid-within-128-of-every-member pre-feasibility checks before
/// emitting a [`Group`]. Does not deduplicate; callers run emitted groups
/// through [`crate::dedup::GroupDeduper`].
#[must_use]
pub fn enumerate_groups(
    candidates: &[MonumentCandidate],
    config: &Config,
    k: usize,
) -> Vec<Group> {
    if candidates.is_empty() || k == 0 {
        return Vec::new();
    }

    let centers: Vec<(i32, i32)> = candidates.iter().map(|c| c.center(config)).collect();
    let index = SpatialHash::build(centers.clone());
    let pairwise_threshold = config.pairwise_blocks_stage_c;
    let batch_size = config.anchor_batch_size.max(1);

    let batch_starts: Vec<usize> = (0..centers.len()).step_by(batch_size).collect();

    // Anchors are sharded into batches across the worker pool; each batch
    // fills its own buffer and the buffers are concatenated afterwards, so
    // ordering within a batch (and across batches) is unaffected by which
    // worker ran it.
    batch_starts
        .par_iter()
        .map(|&batch_start| {
            let batch_end = (batch_start + batch_size).min(centers.len());
            let mut buf = Vec::new();
            for anchor_idx in batch_start..batch_end {
                let anchor = centers[anchor_idx];
                let mut neighbors = index.neighbors_within(anchor, pairwise_threshold);
                neighbors.retain(|&idx| idx != anchor_idx);
                subsets_of_size(&neighbors, k - 1, &mut |combo| {
                    let mut members: Vec<usize> = combo.to_vec();
                    members.push(anchor_idx);

                    if !all_pairs_within(&members, &centers, pairwise_threshold) {
                        return;
                    }
                    let Some(group) = build_group_if_feasible(&members, &centers) else {
                        return;
                    };
                    buf.push(group);
                });
            }
            buf
        })
        .flatten()
        .collect()
}

fn all_pairs_within(members: &[usize], centers: &[(i32, i32)], threshold_blocks: i64) -> bool {
    let threshold_sq = threshold_blocks * threshold_blocks;
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            if distance_sq(centers[members[i]], centers[members[j]]) > threshold_sq {
                return false;
            }
        }
    }
    true
}

/// Pre-feasibility check: the centroid must lie within 128 blocks of every
/// member. Necessary but not sufficient for a non-empty intersection of
/// the members' 128-radius disks; the optimizer performs the exact test.
fn build_group_if_feasible(members: &[usize], centers: &[(i32, i32)]) -> Option<Group> {
    let n = members.len() as i64;
    let sum_x: i64 = members.iter().map(|&i| i64::from(centers[i].0)).sum();
    let sum_z: i64 = members.iter().map(|&i| i64::from(centers[i].1)).sum();
    let centroid = (sum_x / n, sum_z / n);

    const FEASIBLE_RADIUS_SQ: i64 = 128 * 128;
    for &idx in members {
        let (mx, mz) = centers[idx];
        let dx = centroid.0 - i64::from(mx);
        let dz = centroid.1 - i64::from(mz);
        if dx * dx + dz * dz > FEASIBLE_RADIUS_SQ {
            return None;
        }
    }

    let member_centers: smallvec::SmallVec<[(i32, i32); 4]> =
        members.iter().map(|&i| centers[i]).collect();
    Some(Group::new(member_centers))
}

/// Calls `on_subset` once for every `size`-element subset of `items`, in
/// index order (no need for anything fancier — anchor neighborhoods are
/// small by construction since they're bounded to a 224-block radius).
fn subsets_of_size(items: &[usize], size: usize, on_subset: &mut dyn FnMut(&[usize])) {
    if size == 0 {
        on_subset(&[]);
        return;
    }
    if items.len() < size {
        return;
    }
    let mut combo = vec![0usize; size];
    fn recurse(
        items: &[usize],
        start: usize,
        size: usize,
        combo: &mut Vec<usize>,
        depth: usize,
        on_subset: &mut dyn FnMut(&[usize]),
    ) {
        if depth == size {
            on_subset(combo);
            return;
        }
        for i in start..items.len() {
            combo[depth] = items[i];
            recurse(items, i + 1, size, combo, depth + 1, on_subset);
        }
    }
    recurse(items, 0, size, &mut combo, 0, on_subset);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(chunk_x: i32, chunk_z: i32) -> MonumentCandidate {
        MonumentCandidate { chunk_x, chunk_z }
    }

    #[test]
    fn pair_within_threshold_is_enumerated() {
        // centers 0 and 160 blocks apart, well under the 224 threshold.
        let candidates = vec![candidate(0, 0), candidate(10, 0)];
        let config = Config::default();
        let groups = enumerate_groups(&candidates, &config, 2);
        assert_eq!(groups.len(), 2, "each monument anchors its own copy before dedup");
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn pair_beyond_threshold_is_not_enumerated() {
        let candidates = vec![candidate(0, 0), candidate(1000, 0)];
        let config = Config::default();
        let groups = enumerate_groups(&candidates, &config, 2);
        assert!(groups.is_empty());
    }

    #[test]
    fn triples_require_all_pairs_within_threshold() {
        // A and B close, B and C close, but A and C far: no valid triple.
        let candidates = vec![candidate(0, 0), candidate(13, 0), candidate(26, 0)];
        let config = Config::default();
        let groups = enumerate_groups(&candidates, &config, 3);
        assert!(groups.is_empty());
    }

    #[test]
    fn subsets_of_size_enumerates_all_combinations() {
        let items = vec![1, 2, 3, 4];
        let mut seen = Vec::new();
        subsets_of_size(&items, 2, &mut |s| seen.push(s.to_vec()));
        assert_eq!(seen.len(), 6);
    }
}
