//! CLI entrypoint for the topicdrift dataset generator.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use topicdrift_core::config::{parse_seed, seed_from_env};
use topicdrift_core::{DriftParams, RegimeParams, ShiftParams, SimulationConfig};
use topicdrift_harness::export::{DEFAULT_MIN_TOPIC_DOCS, ExportOptions};
use topicdrift_harness::structured_log::validate_log_file;
use topicdrift_harness::{HarnessError, RunRequest, execute};

/// Synthetic document streams with controlled non-stationarity.
#[derive(Debug, Parser)]
#[command(name = "topicdrift")]
#[command(about = "Generate topic-labelled document streams with concept shift or drift")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Corpus directory with one subdirectory per topic.
    #[arg(long)]
    input: PathBuf,
    /// Dataset directory to create. Must not exist yet.
    #[arg(long)]
    output: PathBuf,
    /// Number of starting topics.
    #[arg(short = 'k', default_value_t = 5)]
    k: usize,
    /// Documents per window.
    #[arg(long, alias = "window_size", default_value_t = 100)]
    window_size: usize,
    /// Stop once fewer topics than this remain active.
    #[arg(long, alias = "min_topics", default_value_t = 3)]
    min_topics: usize,
    /// RNG seed (decimal or 0x...). Falls back to TOPICDRIFT_SEED, then OS entropy.
    #[arg(long)]
    seed: Option<String>,
    /// Stop after this many windows even if enough topics remain.
    #[arg(long)]
    max_windows: Option<usize>,
    /// Topics with fewer documents in a window are reported as sparse.
    #[arg(long, default_value_t = DEFAULT_MIN_TOPIC_DOCS)]
    min_topic_docs: usize,
    /// Run log path (default: <output>/run_log.jsonl).
    #[arg(long)]
    log: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Abrupt concept shift: whole topics appear and disappear between windows.
    Shift {
        #[command(flatten)]
        common: CommonArgs,
        /// Probability of a shift before each window.
        #[arg(long, alias = "shift_prob", default_value_t = 0.05)]
        shift_prob: f64,
    },
    /// Gradual concept drift: one topic fades out while another fades in.
    Drift {
        #[command(flatten)]
        common: CommonArgs,
        /// Probability of starting a drift before each window.
        #[arg(long, alias = "drift_prob", default_value_t = 0.05)]
        drift_prob: f64,
        /// Windows for the outgoing topic to fade out.
        #[arg(long, alias = "decrease_windows", default_value_t = 10)]
        decrease_windows: usize,
        /// Windows for the incoming topic to reach its share.
        #[arg(long, alias = "increase_windows", default_value_t = 15)]
        increase_windows: usize,
    },
    /// Validate a JSONL run log against the structured-log schema.
    ValidateLog {
        /// Run log path.
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Shift { common, shift_prob } => {
            generate(common, RegimeParams::Shift(ShiftParams { shift_prob }))?;
        }
        Command::Drift {
            common,
            drift_prob,
            decrease_windows,
            increase_windows,
        } => {
            generate(
                common,
                RegimeParams::Drift(DriftParams {
                    drift_prob,
                    decrease_windows,
                    increase_windows,
                }),
            )?;
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            if !errors.is_empty() {
                for err in &errors {
                    eprintln!("{err}");
                }
                return Err(format!(
                    "{}: {} violation(s) across {lines} line(s)",
                    log.display(),
                    errors.len()
                )
                .into());
            }
            eprintln!("{}: {lines} line(s) valid", log.display());
        }
    }

    Ok(())
}

fn generate(common: CommonArgs, regime: RegimeParams) -> Result<(), HarnessError> {
    let seed = match common.seed.as_deref() {
        Some(raw) => Some(parse_seed(raw).ok_or_else(|| HarnessError::InvalidSeed(raw.to_string()))?),
        None => seed_from_env(),
    };
    let policy = regime.policy();
    let request = RunRequest {
        input: common.input,
        output: common.output,
        config: SimulationConfig {
            k: common.k,
            window_size: common.window_size,
            min_topics: common.min_topics,
            regime,
            seed,
            max_windows: common.max_windows,
        },
        export: ExportOptions {
            min_topic_docs: common.min_topic_docs,
            ..ExportOptions::for_policy(policy)
        },
        log_path: common.log,
    };

    eprintln!(
        "Generating {} dataset from {}",
        policy.as_str(),
        request.input.display()
    );
    let summary = execute(&request)?;
    eprintln!(
        "Wrote {} windows ({} documents, {} under regime change) to {}",
        summary.windows,
        summary.documents,
        summary.regime_changing_windows,
        request.output.display()
    );
    if summary.sparse_topics > 0 {
        eprintln!(
            "Warning: {} window/topic pairs had fewer than {} documents (see {})",
            summary.sparse_topics,
            request.export.min_topic_docs,
            summary.log.display()
        );
    }
    eprintln!("Seed {} (run {})", summary.seed, summary.run_id);
    Ok(())
}
