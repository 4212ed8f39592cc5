//! Coarse-to-fine lattice search maximizing guardian spawn coverage for a
//! group, and the analytic column-reduction scorer it searches with.

use std::collections::BinaryHeap;

use guardian_afk_utils::isqrt;

use crate::config::{ANNULUS_RADII, Config, MONUMENT_BOX_MAX, MONUMENT_BOX_MIN, MONUMENT_Y_RANGE};
use crate::config::AFK_Y;
use crate::types::{AfkPoint, CoverageScore, Group};

/// Scores a single candidate point against one monument center, reducing
/// the 58x58x23 cube to a 58x58 horizontal-column sweep: for each column,
/// the valid vertical range collapses to a `|dy|` interval computed from
/// two integer square roots, rather than 23 per-block distance checks.
#[must_use]
pub fn score_against_monument(
    point: (i64, i64),
    monument_center: (i32, i32),
    require_outside_24: bool,
) -> i64 {
    let (inner_radius, outer_radius) = ANNULUS_RADII;
    let outer_sq = outer_radius * outer_radius;
    let inner_sq = inner_radius_sq_for(inner_radius, require_outside_24);

    let (cx, cz) = monument_center;
    let (y_min, y_max) = MONUMENT_Y_RANGE;

    let box_min = i64::from(MONUMENT_BOX_MIN);
    let box_max = i64::from(MONUMENT_BOX_MAX);

    let mut total = 0_i64;
    for bx in (i64::from(cx) - box_min)..=(i64::from(cx) + box_max) {
        let dx = bx - point.0;
        let dx_sq = dx * dx;
        if dx_sq > outer_sq {
            continue;
        }
        for bz in (i64::from(cz) - box_min)..=(i64::from(cz) + box_max) {
            let dz = bz - point.1;
            let d_h_sq = dx_sq + dz * dz;
            if d_h_sq > outer_sq {
                continue;
            }

            let max_abs_sq = outer_sq - d_h_sq;
            let max_abs_dy = isqrt(max_abs_sq);

            let min_abs_dy = if d_h_sq < inner_sq {
                let inner_remaining = inner_sq - d_h_sq;
                // ceil(sqrt(inner_remaining)): isqrt floors, so bump by one
                // unless inner_remaining is itself a perfect square.
                let floor_root = isqrt(inner_remaining);
                if floor_root * floor_root == inner_remaining {
                    floor_root
                } else {
                    floor_root + 1
                }
            } else {
                0
            };

            total += count_by_in_range(AFK_Y, min_abs_dy, max_abs_dy, y_min, y_max);
        }
    }
    total
}

fn inner_radius_sq_for(inner_radius: i64, require_outside_24: bool) -> i64 {
    if require_outside_24 {
        inner_radius * inner_radius
    } else {
        0
    }
}

/// Counts integer `by` in `[y_min, y_max]` with `min_abs_dy <= |by - afk_y| <= max_abs_dy`,
/// via `|outer ∩ range| - |inner_hole ∩ range|` as the specification prescribes.
fn count_by_in_range(afk_y: i32, min_abs_dy: i64, max_abs_dy: i64, y_min: i32, y_max: i32) -> i64 {
    let outer = count_outer(afk_y, max_abs_dy, y_min, y_max);
    let hole = if min_abs_dy > 0 {
        count_outer(afk_y, min_abs_dy - 1, y_min, y_max)
    } else {
        0
    };
    outer - hole
}

/// `|{ by in [y_min, y_max] : |by - afk_y| <= max_abs_dy }|`.
fn count_outer(afk_y: i32, max_abs_dy: i64, y_min: i32, y_max: i32) -> i64 {
    if max_abs_dy < 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    let max_abs_dy = max_abs_dy.min(i64::from(i32::MAX)) as i32;
    let lo = (afk_y - max_abs_dy).max(y_min);
    let hi = (afk_y + max_abs_dy).min(y_max);
    i64::from((hi - lo + 1).max(0))
}

/// Scores a candidate point against every monument in `group`, retaining
/// per-monument sub-scores.
#[must_use]
pub fn score_group(
    point: (i64, i64),
    group: &Group,
    require_outside_24: bool,
) -> CoverageScore {
    let mut per_monument = smallvec::SmallVec::new();
    let mut total = 0_i64;
    for &center in &group.centers {
        let score = score_against_monument(point, center, require_outside_24);
        per_monument.push(score);
        total += score;
    }
    CoverageScore { total, per_monument }
}

/// A feasible-rectangle-intersected-over-members bound; `None` if the
/// intersection is empty (the optimizer falls back to the centroid, per
/// the spec's preserved open question, and logs a warning when this fires).
fn feasible_rectangle(group: &Group) -> Option<(i64, i64, i64, i64)> {
    let (_, outer_radius) = ANNULUS_RADII;
    let mut min_x = i64::MIN;
    let mut max_x = i64::MAX;
    let mut min_z = i64::MIN;
    let mut max_z = i64::MAX;
    for &(cx, cz) in &group.centers {
        min_x = min_x.max(i64::from(cx) - outer_radius);
        max_x = max_x.min(i64::from(cx) + outer_radius);
        min_z = min_z.max(i64::from(cz) - outer_radius);
        max_z = max_z.min(i64::from(cz) + outer_radius);
    }
    if min_x > max_x || min_z > max_z {
        None
    } else {
        Some((min_x, max_x, min_z, max_z))
    }
}

fn within_all_centers(point: (i64, i64), group: &Group, radius: i64) -> bool {
    let radius_sq = radius * radius;
    group.centers.iter().all(|&(cx, cz)| {
        let dx = i64::from(cx) - point.0;
        let dz = i64::from(cz) - point.1;
        dx * dx + dz * dz <= radius_sq
    })
}

/// Pairwise circle-circle intersection points of the 128-radius disks
/// around every pair of members, rounded to the nearest integer lattice
/// point. Returns both intersection points where the circles actually
/// intersect (skips tangent/disjoint/coincident pairs).
fn circle_intersections(group: &Group, radius: i64) -> Vec<(i64, i64)> {
    let mut seeds = Vec::new();
    let centers = &group.centers;
    for i in 0..centers.len() {
        for j in (i + 1)..centers.len() {
            let (x1, z1) = (f64::from(centers[i].0), f64::from(centers[i].1));
            let (x2, z2) = (f64::from(centers[j].0), f64::from(centers[j].1));
            let dx = x2 - x1;
            let dz = z2 - z1;
            let d = (dx * dx + dz * dz).sqrt();
            let r = radius as f64;
            if d <= 0.0 || d > 2.0 * r {
                continue;
            }
            let a = d / 2.0;
            let h_sq = r * r - a * a;
            if h_sq < 0.0 {
                continue;
            }
            let h = h_sq.sqrt();
            let mid_x = x1 + (dx / d) * a;
            let mid_z = z1 + (dz / d) * a;
            let offset_x = -(dz / d) * h;
            let offset_z = (dx / d) * h;

            seeds.push(((mid_x + offset_x).round() as i64, (mid_z + offset_z).round() as i64));
            seeds.push(((mid_x - offset_x).round() as i64, (mid_z - offset_z).round() as i64));
        }
    }
    seeds
}

struct ScoredPoint {
    score: i64,
    point: (i64, i64),
}

impl PartialEq for ScoredPoint {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}
impl Eq for ScoredPoint {}
impl PartialOrd for ScoredPoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ScoredPoint {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed so a std BinaryHeap (max-heap) behaves as a min-heap by
        // score, letting us evict the worst of the top-N cheaply.
        other.score.cmp(&self.score)
    }
}

/// Finds the best-scoring AFK point for `group` via the coarse-to-fine
/// lattice search: a step-`local_step` scan over the feasible rectangle
/// (or its centroid fallback) keeping a bounded top-`keep_top` min-heap,
/// then a multi-scale refinement around each retained seed.
#[must_use]
pub fn optimize(group: &Group, config: &Config) -> AfkPoint {
    let centroid = group.centroid();
    let rectangle = feasible_rectangle(group);

    let (min_x, max_x, min_z, max_z) = rectangle.unwrap_or_else(|| {
        tracing::warn!(
            centroid_x = centroid.0,
            centroid_z = centroid.1,
            "feasible bounding rectangle empty, falling back to centroid"
        );
        (centroid.0, centroid.0, centroid.1, centroid.1)
    });

    let outer_radius = ANNULUS_RADII.1;
    let mut top: BinaryHeap<ScoredPoint> = BinaryHeap::with_capacity(config.keep_top + 1);
    let mut push_candidate = |point: (i64, i64), top: &mut BinaryHeap<ScoredPoint>| {
        if !within_all_centers(point, group, outer_radius) {
            return;
        }
        let score = score_group(point, group, config.require_outside_24).total;
        top.push(ScoredPoint { score, point });
        if top.len() > config.keep_top {
            top.pop();
        }
    };

    let step = config.local_step.max(1);
    let mut x = min_x - min_x.rem_euclid(step);
    while x <= max_x {
        let mut z = min_z - min_z.rem_euclid(step);
        while z <= max_z {
            push_candidate((x, z), &mut top);
            z += step;
        }
        x += step;
    }

    for seed in circle_intersections(group, outer_radius)
        .into_iter()
        .chain(std::iter::once(centroid))
    {
        if seed.0 >= min_x && seed.0 <= max_x && seed.1 >= min_z && seed.1 <= max_z {
            push_candidate(seed, &mut top);
        }
    }

    let seeds: Vec<(i64, i64)> = top.into_sorted_vec().into_iter().map(|p| p.point).collect();

    let mut best: Option<ScoredPoint> = None;
    for seed in seeds {
        for &refine_step in &config.refine_steps {
            let radius = config.refine_radius;
            let mut dx = -radius;
            while dx <= radius {
                let mut dz = -radius;
                while dz <= radius {
                    let point = (seed.0 + dx, seed.1 + dz);
                    if within_all_centers(point, group, outer_radius) {
                        let score = score_group(point, group, config.require_outside_24).total;
                        let improves = match &best {
                            None => true,
                            Some(b) => score > b.score,
                        };
                        if improves {
                            best = Some(ScoredPoint { score, point });
                        }
                    }
                    dz += refine_step;
                }
                dx += refine_step;
            }
        }
        // The coarse seed itself, unrefined, is also a valid candidate.
        if within_all_centers(seed, group, outer_radius) {
            let score = score_group(seed, group, config.require_outside_24).total;
            let improves = match &best {
                None => true,
                Some(b) => score > b.score,
            };
            if improves {
                best = Some(ScoredPoint { score, point: seed });
            }
        }
    }

    let chosen = best.unwrap_or_else(|| ScoredPoint {
        score: score_group(centroid, group, config.require_outside_24).total,
        point: centroid,
    });
    let coverage = score_group(chosen.point, group, config.require_outside_24);

    AfkPoint {
        group: group.clone(),
        x: chosen.point.0,
        y: AFK_Y,
        z: chosen.point.1,
        coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::SmallVec;

    #[test]
    fn score_is_zero_far_outside_annulus() {
        let score = score_against_monument((100_000, 100_000), (0, 0), true);
        assert_eq!(score, 0);
    }

    #[test]
    fn score_positive_directly_above_monument_center() {
        let score = score_against_monument((0, 0), (0, 0), true);
        assert!(score > 0);
    }

    #[test]
    fn inner_annulus_excludes_the_closest_columns() {
        let with_hole = score_against_monument((0, 0), (0, 0), true);
        let without_hole = score_against_monument((0, 0), (0, 0), false);
        assert!(without_hole >= with_hole);
    }

    #[test]
    fn count_outer_inclusive_boundaries() {
        assert_eq!(count_outer(50, 11, 39, 61), 23);
        assert_eq!(count_outer(50, 0, 39, 61), 1);
        assert_eq!(count_outer(50, -1, 39, 61), 0);
    }

    #[test]
    fn optimize_single_monument_picks_its_own_center() {
        let group = Group::new(SmallVec::from_slice(&[(0, 0)]));
        let config = Config::default();
        let afk = optimize(&group, &config);
        assert!(afk.coverage.total > 0);
        assert_eq!(afk.coverage.per_monument.len(), 1);
    }

    #[test]
    fn optimize_respects_128_distance_invariant() {
        let group = Group::new(SmallVec::from_slice(&[(0, 0), (100, 0)]));
        let config = Config::default();
        let afk = optimize(&group, &config);
        for &(cx, cz) in &afk.group.centers {
            let dx = i64::from(cx) - afk.x;
            let dz = i64::from(cz) - afk.z;
            assert!(dx * dx + dz * dz <= 128 * 128);
        }
    }

    #[test]
    fn total_equals_sum_of_per_monument() {
        let group = Group::new(SmallVec::from_slice(&[(0, 0), (50, 50)]));
        let config = Config::default();
        let afk = optimize(&group, &config);
        let sum: i64 = afk.coverage.per_monument.iter().sum();
        assert_eq!(sum, afk.coverage.total);
    }
}
