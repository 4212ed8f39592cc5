//! The five-positional CLI surface plus the ambient `--config`/`--output`/
//! validator flags, with validation kept separate from parsing so
//! [`crate::ArgError`] maps cleanly to exit code 1.

use std::path::PathBuf;

use clap::Parser;
use guardian_afk_core::config::GroupKind;
use guardian_afk_core::error::ArgError;

/// Finds AFK points maximizing guardian spawn coverage near ocean monuments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// World seed to search.
    pub seed: i64,

    /// Monument group size: double, triple, or quad.
    pub group_type: String,

    /// Half-width in blocks of the square search region around the origin.
    pub range_blocks: i64,

    /// Chebyshev radius in blocks around the origin to exclude from results.
    pub exclude_radius: i64,

    /// Worker thread count for the scanner and enumerator pools.
    pub threads: i64,

    /// Optional RON/JSON5 file overlaying tunables onto the documented
    /// defaults and any `GAFK_*` environment overrides.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output CSV path; stdout if omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Path to the native biome-viability oracle shared library. Absence
    /// is legal: the pipeline proceeds with placement-only results.
    #[arg(long)]
    pub validator_library: Option<PathBuf>,

    /// `versionOrdinal` passed to the validator's `create` entry point.
    #[arg(long, default_value_t = 0)]
    pub validator_version_ordinal: i32,
}

/// The positional arguments, parsed and validated against the CLI contract
/// (`rangeBlocks > 0`; `0 <= excludeRadius <= rangeBlocks`; `threads >= 1`).
pub struct ParsedArgs {
    pub seed: i64,
    pub group_kind: GroupKind,
    pub range_blocks: i64,
    pub exclude_radius: i64,
    pub threads: usize,
}

impl CliArgs {
    /// Validates the positional contract, independent of clap's own
    /// type-level parsing, so every rejection maps to one [`ArgError`]
    /// variant rather than a generic clap usage error.
    pub fn validate(&self) -> Result<ParsedArgs, ArgError> {
        if self.range_blocks <= 0 {
            return Err(ArgError::RangeNotPositive(self.range_blocks));
        }
        if self.exclude_radius < 0 || self.exclude_radius > self.range_blocks {
            return Err(ArgError::ExcludeOutOfRange {
                got: self.exclude_radius,
                range: self.range_blocks,
            });
        }
        if self.threads < 1 {
            return Err(ArgError::ThreadsNotPositive(self.threads));
        }
        let group_kind = self
            .group_type
            .parse::<GroupKind>()
            .map_err(ArgError::InvalidGroupKind)?;

        Ok(ParsedArgs {
            seed: self.seed,
            group_kind,
            range_blocks: self.range_blocks,
            exclude_radius: self.exclude_radius,
            #[allow(clippy::cast_sign_loss)]
            threads: self.threads as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(range: i64, exclude: i64, threads: i64, group: &str) -> CliArgs {
        CliArgs {
            seed: 0,
            group_type: group.to_string(),
            range_blocks: range,
            exclude_radius: exclude,
            threads,
            config: None,
            output: None,
            validator_library: None,
            validator_version_ordinal: 0,
        }
    }

    #[test]
    fn valid_args_pass() {
        assert!(args(50_000, 0, 4, "double").validate().is_ok());
    }

    #[test]
    fn non_positive_range_is_rejected() {
        assert!(matches!(
            args(0, 0, 1, "double").validate(),
            Err(ArgError::RangeNotPositive(0))
        ));
    }

    #[test]
    fn exclude_radius_above_range_is_rejected() {
        assert!(matches!(
            args(1000, 1001, 1, "double").validate(),
            Err(ArgError::ExcludeOutOfRange { .. })
        ));
    }

    #[test]
    fn exclude_radius_equal_to_range_is_allowed() {
        assert!(args(1000, 1000, 1, "double").validate().is_ok());
    }

    #[test]
    fn zero_threads_is_rejected() {
        assert!(matches!(
            args(1000, 0, 0, "double").validate(),
            Err(ArgError::ThreadsNotPositive(0))
        ));
    }

    #[test]
    fn unknown_group_type_is_rejected() {
        assert!(matches!(
            args(1000, 0, 1, "quintuple").validate(),
            Err(ArgError::InvalidGroupKind(_))
        ));
    }
}
