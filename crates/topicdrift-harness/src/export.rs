//! Copy sampled windows into an output dataset tree.
//!
//! ```text
//! <output>/window-01/<topic>/<document>
//! <output>/window-02/<topic>/<document>
//! ...
//! ```
//!
//! Window directories are numbered from 1. A topic that contributes fewer than
//! `min_topic_docs` documents to a window is reported as sparse; with
//! `drop_sparse` set its documents are left out of that window.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use topicdrift_core::{RegimePolicy, TopicId, Window};

use crate::error::{HarnessError, Result};

/// Sparse threshold used by both generators.
pub const DEFAULT_MIN_TOPIC_DOCS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub min_topic_docs: usize,
    pub drop_sparse: bool,
}

impl ExportOptions {
    /// Drift datasets drop sparse topics; shift datasets keep them and only warn.
    #[must_use]
    pub fn for_policy(policy: RegimePolicy) -> Self {
        Self {
            min_topic_docs: DEFAULT_MIN_TOPIC_DOCS,
            drop_sparse: policy == RegimePolicy::Drift,
        }
    }
}

/// What ended up on disk for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedWindow {
    pub index: usize,
    pub dir: PathBuf,
    pub regime_changing: bool,
    pub active_topics: usize,
    /// Documents copied per topic. Dropped topics are absent.
    pub copied: BTreeMap<TopicId, usize>,
    /// Topics under the threshold, with their sampled document count.
    pub sparse: Vec<(TopicId, usize)>,
}

impl ExportedWindow {
    #[must_use]
    pub fn documents(&self) -> usize {
        self.copied.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub windows: Vec<ExportedWindow>,
}

impl ExportSummary {
    #[must_use]
    pub fn documents_copied(&self) -> usize {
        self.windows.iter().map(ExportedWindow::documents).sum()
    }

    #[must_use]
    pub fn sparse_count(&self) -> usize {
        self.windows.iter().map(|w| w.sparse.len()).sum()
    }
}

/// Create a fresh output directory. An existing path is never reused.
pub fn prepare_output_dir(output: &Path) -> Result<()> {
    if output.exists() {
        return Err(HarnessError::OutputExists(output.to_path_buf()));
    }
    fs::create_dir_all(output)?;
    Ok(())
}

#[must_use]
pub fn window_dir_name(index: usize) -> String {
    format!("window-{:02}", index + 1)
}

/// Copy every window into `output`, which must already exist.
///
/// `topic_names` is indexed by [`TopicId`].
pub fn export_dataset(
    windows: &[Window<PathBuf>],
    topic_names: &[String],
    output: &Path,
    options: &ExportOptions,
) -> Result<ExportSummary> {
    let mut summary = ExportSummary::default();
    for window in windows {
        summary
            .windows
            .push(export_window(window, topic_names, output, options)?);
    }
    Ok(summary)
}

fn export_window(
    window: &Window<PathBuf>,
    topic_names: &[String],
    output: &Path,
    options: &ExportOptions,
) -> Result<ExportedWindow> {
    let dir = output.join(window_dir_name(window.index));
    fs::create_dir(&dir)?;

    let counts = window.topic_counts();
    let sparse: Vec<(TopicId, usize)> = counts
        .iter()
        .filter(|(_, n)| **n < options.min_topic_docs)
        .map(|(t, n)| (*t, *n))
        .collect();

    let mut copied = BTreeMap::new();
    for sample in &window.samples {
        if options.drop_sparse && sparse.iter().any(|(t, _)| *t == sample.topic) {
            continue;
        }
        let topic_dir = dir.join(topic_name(topic_names, sample.topic));
        if !topic_dir.exists() {
            fs::create_dir(&topic_dir)?;
        }
        let Some(file_name) = sample.document.file_name() else {
            continue;
        };
        fs::copy(&sample.document, topic_dir.join(file_name))?;
        *copied.entry(sample.topic).or_insert(0) += 1;
    }

    Ok(ExportedWindow {
        index: window.index,
        dir,
        regime_changing: window.regime_changing,
        active_topics: window.active_topics,
        copied,
        sparse,
    })
}

/// Display name for `topic`, falling back to its id.
pub(crate) fn topic_name(topic_names: &[String], topic: TopicId) -> String {
    topic_names
        .get(topic.index())
        .cloned()
        .unwrap_or_else(|| format!("topic-{}", topic.index()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_dirs_are_one_based_and_padded() {
        assert_eq!(window_dir_name(0), "window-01");
        assert_eq!(window_dir_name(9), "window-10");
        assert_eq!(window_dir_name(120), "window-121");
    }

    #[test]
    fn policy_defaults() {
        let drift = ExportOptions::for_policy(RegimePolicy::Drift);
        assert!(drift.drop_sparse);
        assert_eq!(drift.min_topic_docs, 10);
        assert!(!ExportOptions::for_policy(RegimePolicy::Shift).drop_sparse);
    }

    #[test]
    fn unknown_topic_name_falls_back_to_id() {
        let names = vec!["arts".to_string()];
        assert_eq!(topic_name(&names, TopicId(0)), "arts");
        assert_eq!(topic_name(&names, TopicId(4)), "topic-4");
    }
}
