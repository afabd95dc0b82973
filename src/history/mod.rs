//! Persisted run history.
//!
//! The history file holds a JSON array of run records, most recent first.
//! Every save rewrites the whole file through a sibling temp file and a
//! rename. A missing or unreadable file loads as an empty history.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::checker::RunRecord;

/// JSON run history backed by a single file.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
    max_runs: usize,
}

impl RunLog {
    /// `max_runs == 0` keeps every run.
    pub fn new(path: impl Into<PathBuf>, max_runs: usize) -> Self {
        Self {
            path: path.into(),
            max_runs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored history. Never fails; unreadable or corrupt storage
    /// yields an empty history.
    pub fn load(&self) -> Vec<RunRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No readable history, starting fresh");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<RunRecord>>(&content) {
            Ok(history) => history,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "History file is not valid, starting fresh");
                Vec::new()
            }
        }
    }

    /// Rewrite the stored history with `history`.
    pub fn save(&self, history: &[RunRecord]) -> Result<()> {
        let kept = if self.max_runs > 0 && history.len() > self.max_runs {
            &history[..self.max_runs]
        } else {
            history
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create history directory: {}", parent.display()))?;
        }

        let body = to_pretty_json(&kept).context("failed to serialize run history")?;

        let tmp = self.tmp_path();
        std::fs::write(&tmp, body)
            .with_context(|| format!("failed to write history file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace history file: {}", self.path.display()))?;

        info!(path = %self.path.display(), runs = kept.len(), "Appended log entry");
        Ok(())
    }

    /// Load, prepend `record`, save.
    pub fn record(&self, record: &RunRecord) -> Result<Vec<RunRecord>> {
        let history = append(record.clone(), self.load());
        self.save(&history)?;
        Ok(history)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Prepend `record` to `history` (most recent first).
pub fn append(record: RunRecord, mut history: Vec<RunRecord>) -> Vec<RunRecord> {
    history.insert(0, record);
    history
}

/// Four-space indented JSON.
fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}
