//! `guardian-afk`: finds AFK points maximizing guardian spawn coverage
//! across groups of ocean monuments, given a world seed and search range.
//!
//! Thin glue over `guardian-afk-core`: parse and validate the five
//! positional arguments, resolve the immutable [`Config`], load the
//! optional native validator, run the pipeline, write CSV.

mod cli_args;
mod config_loader;
mod csv_output;

use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;

use clap::Parser;
use guardian_afk_core::error::{ArgError, PipelineError};
use guardian_afk_core::validator::{NullValidator, Validator};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use cli_args::CliArgs;

/// Top-level CLI failure, wrapping both pre-pipeline argument errors and
/// the pipeline's own error taxonomy; kept distinct so each maps to its
/// own exit code.
#[derive(Debug, Error)]
enum CliError {
    #[error("invalid arguments: {0}")]
    Arg(#[from] ArgError),
    #[error("failed to resolve configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("failed to open output file {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write CSV output: {0}")]
    Csv(#[from] csv::Error),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .init();
}

fn run() -> Result<(), CliError> {
    let args = CliArgs::parse();
    let parsed = args.validate()?;

    let config = config_loader::resolve(&parsed, args.config.as_deref()).map_err(CliError::Config)?;

    let loaded_validator = if let Some(library_path) = &args.validator_library {
        guardian_afk_validator::load_or_warn(
            library_path,
            config.seed,
            args.validator_version_ordinal,
        )?
    } else {
        None
    };

    const NULL_VALIDATOR: NullValidator = NullValidator;
    let validator: &dyn Validator = match &loaded_validator {
        Some(dynamic) => dynamic,
        None => &NULL_VALIDATOR,
    };

    let results = guardian_afk_core::orchestrator::run(&config, validator)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Output {
                path: path.display().to_string(),
                source,
            })?;
            csv_output::write_csv(BufWriter::new(file), config.group_kind, &results)?;
            eprintln!(
                "wrote {} AFK point(s) to {}",
                results.len(),
                path.display()
            );
        }
        None => {
            csv_output::write_csv(io::stdout().lock(), config.group_kind, &results)?;
            eprintln!("wrote {} AFK point(s) to stdout", results.len());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ CliError::Arg(_)) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
        Err(err) => {
            tracing::error!(error = %err, "pipeline failed");
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}
