//! Builds the single immutable [`Config`] the pipeline runs with: the
//! documented defaults, overlaid with `GAFK_*` environment variables,
//! overlaid with an optional `--config` RON/JSON5 file, with the five
//! positional CLI arguments always taking precedence since they are the
//! mandatory part of the contract.
//!
//! Mirrors the teacher's `load_or_create`-style config loading
//! (`steel::config`): read the file if present, parse with `serde_json5`,
//! nothing here reads ambient state once the returned [`Config`] exists.

use std::fs;
use std::path::Path;

use guardian_afk_core::config::Config;
use serde::Deserialize;

use crate::cli_args::ParsedArgs;

/// A sparse overlay of the tunables a `--config` file may override; every
/// field is optional so an overlay file only needs to mention what it
/// changes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigOverlay {
    center_offset: Option<i32>,
    pairwise_blocks_stage_a: Option<i64>,
    pairwise_blocks_stage_c: Option<i64>,
    keep_all: Option<bool>,
    local_step: Option<i64>,
    keep_top: Option<usize>,
    refine_radius: Option<i64>,
    refine_steps: Option<Vec<i64>>,
    require_outside_24: Option<bool>,
    anchor_batch_size: Option<usize>,
    validator_batch_size: Option<usize>,
}

impl ConfigOverlay {
    fn apply_onto(self, config: &mut Config) {
        if let Some(v) = self.center_offset {
            config.center_offset = v;
        }
        if let Some(v) = self.pairwise_blocks_stage_a {
            config.pairwise_blocks_stage_a = v;
        }
        if let Some(v) = self.pairwise_blocks_stage_c {
            config.pairwise_blocks_stage_c = v;
        }
        if let Some(v) = self.keep_all {
            config.keep_all = v;
        }
        if let Some(v) = self.local_step {
            config.local_step = v;
        }
        if let Some(v) = self.keep_top {
            config.keep_top = v;
        }
        if let Some(v) = self.refine_radius {
            config.refine_radius = v;
        }
        if let Some(v) = self.refine_steps {
            config.refine_steps = v;
        }
        if let Some(v) = self.require_outside_24 {
            config.require_outside_24 = v;
        }
        if let Some(v) = self.anchor_batch_size {
            config.anchor_batch_size = v;
        }
        if let Some(v) = self.validator_batch_size {
            config.validator_batch_size = v;
        }
    }
}

/// Parses a `GAFK_<NAME>` environment variable with `FromStr`, warning and
/// falling back to the existing value if present-but-unparsable rather
/// than aborting the whole run over one bad override.
fn env_override<T: std::str::FromStr>(name: &str, current: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(name, raw, "ignoring unparsable environment override");
            current
        }),
        Err(_) => current,
    }
}

fn apply_env(config: &mut Config) {
    config.center_offset = env_override("GAFK_CENTER_OFFSET", config.center_offset);
    config.pairwise_blocks_stage_a =
        env_override("GAFK_PAIRWISE_BLOCKS_STAGE_A", config.pairwise_blocks_stage_a);
    config.pairwise_blocks_stage_c =
        env_override("GAFK_PAIRWISE_BLOCKS_STAGE_C", config.pairwise_blocks_stage_c);
    config.keep_all = env_override("GAFK_KEEP_ALL", config.keep_all);
    config.local_step = env_override("GAFK_LOCAL_STEP", config.local_step);
    config.keep_top = env_override("GAFK_KEEP_TOP", config.keep_top);
    config.refine_radius = env_override("GAFK_REFINE_RADIUS", config.refine_radius);
    config.require_outside_24 =
        env_override("GAFK_REQUIRE_OUTSIDE_24", config.require_outside_24);
    config.anchor_batch_size = env_override("GAFK_ANCHOR_BATCH_SIZE", config.anchor_batch_size);
    config.validator_batch_size =
        env_override("GAFK_VALIDATOR_BATCH_SIZE", config.validator_batch_size);

    if let Ok(raw) = std::env::var("GAFK_REFINE_STEPS") {
        match raw
            .split(',')
            .map(|part| part.trim().parse::<i64>())
            .collect::<Result<Vec<i64>, _>>()
        {
            Ok(steps) if !steps.is_empty() => config.refine_steps = steps,
            _ => tracing::warn!(raw, "ignoring unparsable GAFK_REFINE_STEPS"),
        }
    }
}

/// Reads and parses a `--config` file, returning the sparse overlay.
///
/// # Errors
/// Returns the file-read or JSON5-parse error as a `String`, since this is
/// a user-facing startup failure rather than a pipeline [`PipelineError`].
fn load_overlay_file(path: &Path) -> Result<ConfigOverlay, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config file {}: {e}", path.display()))?;
    serde_json5::from_str(&text)
        .map_err(|e| format!("failed to parse config file {}: {e}", path.display()))
}

/// Builds the final [`Config`]: defaults, then `GAFK_*` env vars, then the
/// optional `--config` file, then the validated positional arguments.
///
/// # Errors
/// Propagates a `--config` file read/parse failure.
pub fn resolve(parsed: &ParsedArgs, config_path: Option<&Path>) -> Result<Config, String> {
    let mut config = Config::default();
    apply_env(&mut config);

    if let Some(path) = config_path {
        load_overlay_file(path)?.apply_onto(&mut config);
    }

    config.seed = parsed.seed;
    config.group_kind = parsed.group_kind;
    config.range_blocks = parsed.range_blocks;
    config.exclude_radius_blocks = parsed.exclude_radius;
    config.threads = parsed.threads;

    Ok(config)
}
