//! Batch manifest - the dataset description driving a batch
//!
//! ```json
//! {
//!   "log_root": "bh_logs",
//!   "output_root": "bids",
//!   "subjects": ["002", "003"],
//!   "tasks": [{
//!     "task_id": "conditioning",
//!     "start_marker_label": "fMRI_T0",
//!     "end_marker_label": "END",
//!     "labels_of_interest": ["VAS", "PAIN", "FIXATION"]
//!   }],
//!   "log_format": {"preamble_lines": 4},
//!   "naming": {"default": {"template": "sub-{subject}/{subject}_{task}.log", "run_number": "01"}},
//!   "quirks": []
//! }
//! ```
//!
//! Relative roots are resolved against the manifest's directory.

use super::naming::{events_path, FileNameTable};
use crate::config::{LogFormat, NegativeOnsetPolicy, RunConfig};
use crate::quirks::QuirkEntry;
use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Marker configuration shared by every subject of one task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskSpec {
    /// Task identifier.
    pub task_id: String,
    /// Label of the time-zero row.
    pub start_marker_label: String,
    /// Label of the closing row.
    pub end_marker_label: String,
    /// Trial types to report.
    #[serde(default)]
    pub labels_of_interest: Vec<String>,
    /// Scanner trigger label.
    #[serde(default = "default_trigger_label")]
    pub trigger_label: String,
}

fn default_trigger_label() -> String {
    "TRIGGER".to_string()
}

/// Everything a batch needs, as read from a JSON manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchManifest {
    /// Directory holding the marker logs.
    pub log_root: PathBuf,
    /// BIDS dataset root receiving the events tables.
    pub output_root: PathBuf,
    /// Subjects to process.
    pub subjects: Vec<String>,
    /// Tasks to process for every subject.
    pub tasks: Vec<TaskSpec>,
    /// Log file naming.
    #[serde(default)]
    pub naming: FileNameTable,
    /// Dataset-specific corrections.
    #[serde(default)]
    pub quirks: Vec<QuirkEntry>,
    /// Log layout.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Handling of events before the start marker.
    #[serde(default)]
    pub negative_onsets: NegativeOnsetPolicy,
}

/// One subject × task unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Extraction parameters.
    pub config: RunConfig,
    /// Source marker log.
    pub log_path: PathBuf,
    /// Destination events table.
    pub output_path: PathBuf,
}

impl BatchManifest {
    /// Read a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read and
    /// [`crate::Error::Manifest`] if it is not a valid manifest.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut manifest = Self::from_json(&std::fs::read_to_string(path)?)?;
        if let Some(base) = path.parent() {
            manifest.log_root = base.join(&manifest.log_root);
            manifest.output_root = base.join(&manifest.output_root);
        }
        Ok(manifest)
    }

    /// Parse a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Manifest`] if the JSON does not describe a
    /// manifest.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Every subject × task pair, subjects outermost.
    #[must_use]
    pub fn runs(&self) -> Vec<RunPlan> {
        self.subjects
            .iter()
            .flat_map(|subject| self.tasks.iter().map(move |task| self.plan(subject, task)))
            .collect()
    }

    fn plan(&self, subject: &str, task: &TaskSpec) -> RunPlan {
        let rule = self.naming.rule_for(subject, &task.task_id);
        let config = RunConfig {
            start_marker_label: task.start_marker_label.clone(),
            end_marker_label: task.end_marker_label.clone(),
            labels_of_interest: task.labels_of_interest.clone(),
            trigger_label: task.trigger_label.clone(),
            subject_id: subject.to_string(),
            task_id: task.task_id.clone(),
            run_number: rule.run_number.clone(),
            negative_onsets: self.negative_onsets,
        };

        RunPlan {
            log_path: self.log_root.join(rule.render(subject, &task.task_id)),
            output_path: events_path(&self.output_root, subject, &task.task_id, &rule.run_number),
            config,
        }
    }
}
