//! Sequences the pipeline end to end: scan, prune, validate, re-prune,
//! enumerate, optimize, dedup, sort.

use rayon::prelude::*;

use crate::config::{Config, blocks_to_chunks_ceil};
use crate::dedup::GroupDeduper;
use crate::error::PipelineResult;
use crate::group_enumerator::enumerate_groups;
use crate::pruner::{StageAWindow, stage_c_prune};
use crate::scanner::{ScanBounds, scan};
use crate::types::{AfkPoint, Group, MonumentCandidate};
use crate::validator::{Validator, filter_viable};

/// Runs the full pipeline for `config` against `validator`, returning the
/// sorted, deduplicated list of AFK points.
///
/// Ordering: coverage descending, then distance from origin ascending,
/// then `(x, z)` for stability — matching the orchestrator's documented
/// sort.
pub fn run(config: &Config, validator: &dyn Validator) -> PipelineResult<Vec<AfkPoint>> {
    let k = config.group_kind.k();

    let half_chunks = blocks_to_chunks_ceil(config.range_blocks);
    let bounds = ScanBounds::from_half_range(half_chunks, config.exclude_radius_blocks);

    let mut progress = crate::progress::StageProgress::start("PlacementScanner");
    let mut stage_a_survivors: Vec<MonumentCandidate> = Vec::new();
    let mut window = StageAWindow::new(config, k);
    let mut scanned = 0usize;

    scan(&bounds, config.seed, config, |column| {
        scanned += 1;
        progress.tick(scanned);
        window.push(column, |survivor| stage_a_survivors.push(survivor));
    })?;
    window.finish(|survivor| stage_a_survivors.push(survivor));
    progress.finish(scanned);

    tracing::info!(
        stage = "Pruner(A)",
        survivors = stage_a_survivors.len(),
        "stage A complete"
    );

    let validated = filter_viable(&stage_a_survivors, validator, config.validator_batch_size)?;

    let stage_c_survivors = stage_c_prune(&validated, config, k);
    tracing::info!(
        stage = "Pruner(C)",
        survivors = stage_c_survivors.len(),
        "stage C complete"
    );

    let groups = enumerate_groups(&stage_c_survivors, config, k);
    tracing::info!(
        stage = "GroupEnumerator",
        raw_groups = groups.len(),
        "enumeration complete"
    );

    let mut dedup = GroupDeduper::with_capacity(groups.len());
    let mut unique_count = 0usize;
    for group in groups {
        if dedup.insert(group) {
            unique_count += 1;
        }
    }
    tracing::info!(
        stage = "GroupDeduper",
        unique_groups = unique_count,
        "dedup complete"
    );

    let unique_groups: Vec<Group> = dedup.into_groups().collect();
    let mut afk_points: Vec<AfkPoint> = unique_groups
        .par_iter()
        .map(|group| crate::coverage::optimize(group, config))
        .collect();

    afk_points.sort_by(|a, b| {
        b.coverage
            .total
            .cmp(&a.coverage.total)
            .then_with(|| {
                a.distance_from_origin()
                    .partial_cmp(&b.distance_from_origin())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.x.cmp(&b.x))
            .then_with(|| a.z.cmp(&b.z))
    });

    tracing::info!(stage = "Orchestrator", results = afk_points.len(), "done");
    Ok(afk_points)
}
