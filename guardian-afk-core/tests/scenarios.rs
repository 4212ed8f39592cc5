//! End-to-end scenarios against concrete seeds, matching the documented
//! ground truth for this pipeline.

use guardian_afk_core::config::{Config, GroupKind};
use guardian_afk_core::validator::NullValidator;
use guardian_afk_core::{orchestrator, types::MonumentCandidate};

fn run_double(seed: i64, range_blocks: i64, exclude_radius_blocks: i64) -> Vec<guardian_afk_core::AfkPoint> {
    let config = Config {
        seed,
        group_kind: GroupKind::Double,
        range_blocks,
        exclude_radius_blocks,
        threads: 4,
        ..Config::default()
    };
    orchestrator::run(&config, &NullValidator).expect("pipeline should not fail")
}

#[test]
fn seed_minus_141_double_range_50000_best_result() {
    let results = run_double(-141, 50_000, 0);
    let best = results.first().expect("at least one double survives");

    assert_eq!((best.x, best.y, best.z), (-12032, 50, 7616));
    assert_eq!(best.coverage.total, 154_744);

    let mut centers: Vec<(i32, i32)> = best.group.centers.iter().copied().collect();
    centers.sort_unstable();
    assert_eq!(centers, vec![(-12048, 7552), (-12032, 7696)]);
}

#[test]
fn seed_4803524437_quad_range_50000_best_result_near_expected() {
    let config = Config {
        seed: 4_803_524_437,
        group_kind: GroupKind::Quad,
        range_blocks: 50_000,
        exclude_radius_blocks: 0,
        threads: 4,
        ..Config::default()
    };
    let results = orchestrator::run(&config, &NullValidator).unwrap();
    let best = results.first().expect("at least one quad survives");

    // "approximately" per the spec: allow a small lattice-search tolerance.
    assert!((best.x - (-31815)).abs() <= 32);
    assert!((best.z - (-19009)).abs() <= 32);
    assert!(best.coverage.total >= 250_000);
}

#[test]
fn seed_0_double_small_range_does_not_panic() {
    let results = run_double(0, 1000, 0);
    // Well-defined, possibly empty: just must not panic, already guaranteed
    // by `expect` above succeeding.
    let _ = results;
}

#[test]
fn range_equal_to_exclude_radius_is_always_empty() {
    for seed in [-141_i64, 0, 123_456_789] {
        let results = run_double(seed, 100_000, 100_000);
        assert!(results.is_empty());
    }
}

#[test]
fn keep_all_count_matches_stage_a_and_c_bypassed_candidates() {
    let mut config = Config {
        seed: -141,
        group_kind: GroupKind::Double,
        range_blocks: 10_000,
        exclude_radius_blocks: 0,
        threads: 2,
        keep_all: true,
        ..Config::default()
    };
    let keep_all_results = orchestrator::run(&config, &NullValidator).unwrap();

    // With pruning bypassed, every pairwise-feasible candidate pair within
    // the range is enumerated; total raw candidate count in range is an
    // upper bound on how many distinct monuments can appear across groups.
    config.keep_all = false;
    let pruned_results = orchestrator::run(&config, &NullValidator).unwrap();

    assert!(keep_all_results.len() >= pruned_results.len());
}

#[test]
fn every_result_satisfies_the_128_block_afk_invariant() {
    let results = run_double(-141, 40_000, 0);
    for afk in &results {
        for &(cx, cz) in &afk.group.centers {
            let dx = i64::from(cx) - afk.x;
            let dz = i64::from(cz) - afk.z;
            assert!(dx * dx + dz * dz <= 128 * 128);
        }
    }
}

#[test]
fn every_group_satisfies_pairwise_224_block_invariant() {
    let config = Config {
        seed: -141,
        group_kind: GroupKind::Triple,
        range_blocks: 40_000,
        exclude_radius_blocks: 0,
        threads: 2,
        ..Config::default()
    };
    let results = orchestrator::run(&config, &NullValidator).unwrap();
    for afk in &results {
        let centers = &afk.group.centers;
        for i in 0..centers.len() {
            for j in (i + 1)..centers.len() {
                let dx = i64::from(centers[i].0 - centers[j].0);
                let dz = i64::from(centers[i].1 - centers[j].1);
                assert!(dx * dx + dz * dz <= 224 * 224);
            }
        }
    }
}

#[test]
fn totals_equal_sum_of_per_monument_scores() {
    let results = run_double(-141, 40_000, 0);
    for afk in &results {
        let sum: i64 = afk.coverage.per_monument.iter().sum();
        assert_eq!(sum, afk.coverage.total);
    }
}

#[test]
fn candidate_bounds_are_never_violated() {
    // Sanity check the scanner itself: a manual scan over a small bound
    // never emits a candidate outside the requested chunk rectangle.
    let bounds = guardian_afk_core::scanner::ScanBounds::from_half_range(200, 0);
    let mut violations = 0usize;
    let config = Config {
        threads: 2,
        ..Config::default()
    };
    guardian_afk_core::scanner::scan(&bounds, -141, &config, |column| {
        for slot in &column.candidates {
            if let Some(MonumentCandidate { chunk_x, chunk_z }) = slot {
                if *chunk_x < bounds.min_chunk
                    || *chunk_x > bounds.max_chunk
                    || *chunk_z < bounds.min_chunk
                    || *chunk_z > bounds.max_chunk
                {
                    violations += 1;
                }
            }
        }
    })
    .unwrap();
    assert_eq!(violations, 0);
}
