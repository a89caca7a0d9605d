//! One generation run: corpus in; dataset, overview, run log and artifact
//! index out.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::json;
use topicdrift_core::{EngineEvent, EngineState, EventKind, SimulationConfig};

use crate::corpus::Corpus;
use crate::error::Result;
use crate::export::{ExportOptions, export_dataset, prepare_output_dir, topic_name, window_dir_name};
use crate::overview::write_overview;
use crate::structured_log::{ArtifactIndex, LogEmitter, LogLevel, Outcome};

pub const RUN_LOG_FILE: &str = "run_log.jsonl";
pub const ARTIFACT_INDEX_FILE: &str = "artifact_index.json";

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: SimulationConfig,
    pub export: ExportOptions,
    /// Defaults to `<output>/run_log.jsonl`.
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: String,
    pub seed: u64,
    pub windows: usize,
    pub documents: usize,
    pub regime_changing_windows: usize,
    pub sparse_topics: usize,
    pub overview: PathBuf,
    pub log: PathBuf,
    pub artifact_index: PathBuf,
}

/// Run the simulation to completion and write the dataset.
///
/// The corpus and parameters are checked before anything is written, so a
/// rejected run leaves no output directory behind.
pub fn execute(request: &RunRequest) -> Result<RunSummary> {
    let started = Instant::now();
    let mut config = request.config.clone();
    let seed = *config.seed.get_or_insert_with(rand::random);
    let policy = config.regime.policy();

    let corpus = Corpus::read_dir(&request.input)?;
    let topic_names = corpus.topic_names();
    let documents_available = corpus.document_count();
    let mut engine = EngineState::initialize(corpus, &config)?;

    prepare_output_dir(&request.output)?;
    let run_id = format!("{}-{seed:016x}", policy.as_str());
    let log_path = request
        .log_path
        .clone()
        .unwrap_or_else(|| request.output.join(RUN_LOG_FILE));
    let mut log = LogEmitter::to_file(&log_path, &run_id)?.with_policy(policy.as_str());

    let entry = log.entry(LogLevel::Info, "run_started").with_details(json!({
        "input": request.input.display().to_string(),
        "output": request.output.display().to_string(),
        "topics": topic_names.len(),
        "documents": documents_available,
        "seed": seed,
        "config": serde_json::to_value(&config)?,
    }));
    log.emit_entry(entry)?;

    let active = engine.ledger().active();
    let initial: Vec<_> = active
        .topics()
        .iter()
        .zip(active.masses())
        .map(|(t, m)| json!({ "topic": topic_name(&topic_names, *t), "mass": m }))
        .collect();
    let entry = log
        .entry(LogLevel::Info, "initial_topics")
        .with_window(0)
        .with_details(json!({ "active": initial }));
    log.emit_entry(entry)?;

    let mut windows = Vec::new();
    while !engine.is_done() {
        let window = engine.step()?;
        let entry = log
            .entry(LogLevel::Debug, "window_generated")
            .with_window(window.index)
            .with_details(json!({
                "documents": window.len(),
                "active_topics": window.active_topics,
                "regime_changing": window.regime_changing,
            }));
        log.emit_entry(entry)?;
        for event in engine.drain_events() {
            log_engine_event(&mut log, &event, &topic_names)?;
        }
        windows.push(window);
    }

    let summary = export_dataset(&windows, &topic_names, &request.output, &request.export)?;
    for window in &summary.windows {
        for (topic, documents) in &window.sparse {
            let entry = log
                .entry(LogLevel::Warn, "sparse_topic")
                .with_window(window.index)
                .with_topic(topic_name(&topic_names, *topic))
                .with_details(json!({
                    "documents": documents,
                    "threshold": request.export.min_topic_docs,
                    "dropped": request.export.drop_sparse,
                }));
            log.emit_entry(entry)?;
        }
    }

    let overview = write_overview(&request.output, policy, &summary, topic_names.len())?;
    let overview_name = file_label(&overview, &request.output);
    let entry = log
        .entry(LogLevel::Info, "overview_written")
        .with_artifacts(vec![overview_name.clone()]);
    log.emit_entry(entry)?;

    let regime_changing_windows = windows.iter().filter(|w| w.regime_changing).count();
    let ledger = engine.ledger();
    let entry = log
        .entry(LogLevel::Info, "run_completed")
        .with_outcome(Outcome::Pass)
        .with_duration_ms(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX))
        .with_artifacts(
            summary
                .windows
                .iter()
                .map(|w| window_dir_name(w.index))
                .collect(),
        )
        .with_details(json!({
            "windows": windows.len(),
            "documents": summary.documents_copied(),
            "regime_changing_windows": regime_changing_windows,
            "sparse_topics": summary.sparse_count(),
            "active": ledger.active_len(),
            "reserve": ledger.reserve().len(),
            "retired": ledger.retired().len(),
        }));
    log.emit_entry(entry)?;
    log.flush()?;
    drop(log);

    let mut index = ArtifactIndex::new(&run_id);
    index.add_file(overview_name, "overview", &overview)?;
    index.add_file(file_label(&log_path, &request.output), "run_log", &log_path)?;
    let index_path = request.output.join(ARTIFACT_INDEX_FILE);
    std::fs::write(&index_path, index.to_json()?)?;

    Ok(RunSummary {
        run_id,
        seed,
        windows: windows.len(),
        documents: summary.documents_copied(),
        regime_changing_windows,
        sparse_topics: summary.sparse_count(),
        overview,
        log: log_path,
        artifact_index: index_path,
    })
}

fn log_engine_event(log: &mut LogEmitter, event: &EngineEvent, topic_names: &[String]) -> Result<()> {
    let level = match event.kind {
        EventKind::DriftAborted { .. } => LogLevel::Warn,
        _ => LogLevel::Info,
    };
    let mut entry = log
        .entry(level, event.kind.name())
        .with_window(event.window)
        .with_details(serde_json::to_value(&event.kind)?);
    if let Some(topic) = event.kind.topic() {
        entry = entry.with_topic(topic_name(topic_names, topic));
    }
    log.emit_entry(entry)?;
    Ok(())
}

/// Path relative to `root` when inside it, else the full path.
fn file_label(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
