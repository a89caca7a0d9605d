//! Per-window composition summary written next to the dataset.
//!
//! One row per exported window:
//!
//! ```text
//! Window,Num Topics,Num Docs,Regime Change,Topic 1,...,Topic N
//! 1,5,100,False,0.210,0.0,...
//! ```
//!
//! Topic columns follow corpus enumeration order and hold the fraction of the
//! window's copied documents from that topic (`0.0` when absent).

use std::fs;
use std::path::{Path, PathBuf};

use topicdrift_core::{RegimePolicy, TopicId};

use crate::error::Result;
use crate::export::{ExportSummary, ExportedWindow};

#[must_use]
pub fn overview_file_name(policy: RegimePolicy) -> &'static str {
    match policy {
        RegimePolicy::Shift => "shift_overview.csv",
        RegimePolicy::Drift => "drift_overview.csv",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewRow {
    /// One-based, matching the window directory number.
    pub window: usize,
    pub num_topics: usize,
    pub num_docs: usize,
    pub regime_changing: bool,
    pub fractions: Vec<Option<f64>>,
}

impl OverviewRow {
    #[must_use]
    pub fn from_window(window: &ExportedWindow, topic_count: usize) -> Self {
        let num_docs = window.documents();
        let fractions = (0..topic_count)
            .map(|t| {
                window
                    .copied
                    .get(&TopicId(t))
                    .filter(|_| num_docs > 0)
                    .map(|n| *n as f64 / num_docs as f64)
            })
            .collect();
        Self {
            window: window.index + 1,
            num_topics: window.copied.len(),
            num_docs,
            regime_changing: window.regime_changing,
            fractions,
        }
    }

    fn to_csv_line(&self) -> String {
        let mut fields = vec![
            self.window.to_string(),
            self.num_topics.to_string(),
            self.num_docs.to_string(),
            if self.regime_changing { "True" } else { "False" }.to_string(),
        ];
        fields.extend(self.fractions.iter().map(|f| match f {
            Some(v) => format!("{v:.3}"),
            None => "0.0".to_string(),
        }));
        fields.join(",")
    }
}

#[must_use]
pub fn header(topic_count: usize) -> String {
    let mut fields = vec![
        "Window".to_string(),
        "Num Topics".to_string(),
        "Num Docs".to_string(),
        "Regime Change".to_string(),
    ];
    fields.extend((1..=topic_count).map(|i| format!("Topic {i}")));
    fields.join(",")
}

#[must_use]
pub fn render_csv(summary: &ExportSummary, topic_count: usize) -> String {
    let mut out = header(topic_count);
    out.push('\n');
    for window in &summary.windows {
        out.push_str(&OverviewRow::from_window(window, topic_count).to_csv_line());
        out.push('\n');
    }
    out
}

/// Write the overview CSV into `output` and return its path.
pub fn write_overview(
    output: &Path,
    policy: RegimePolicy,
    summary: &ExportSummary,
    topic_count: usize,
) -> Result<PathBuf> {
    let path = output.join(overview_file_name(policy));
    fs::write(&path, render_csv(summary, topic_count))?;
    Ok(path)
}
