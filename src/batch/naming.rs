//! Source file naming and output path convention
//!
//! Log file names follow one template for the whole dataset, except for a few
//! recordings that were saved under a different name or run suffix. Those are
//! listed in an exception table keyed by `(subject, task)` instead of being
//! special-cased in code.

use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name template and run number for a group of recordings.
///
/// The template may use `{subject}`, `{task}` and `{run}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingRule {
    /// Log file name template, relative to the log root.
    pub template: String,
    /// Zero-padded run number.
    pub run_number: String,
}

impl NamingRule {
    /// Create a rule.
    #[must_use]
    pub fn new(template: impl Into<String>, run_number: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            run_number: run_number.into(),
        }
    }

    /// Render the template for one subject / task.
    #[must_use]
    pub fn render(&self, subject_id: &str, task_id: &str) -> String {
        self.template
            .replace("{subject}", subject_id)
            .replace("{task}", task_id)
            .replace("{run}", &self.run_number)
    }
}

impl Default for NamingRule {
    fn default() -> Self {
        Self::new("sub-{subject}/{subject}_{task}.log", "01")
    }
}

/// Naming rule for one `(subject, task)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingException {
    /// Subject identifier.
    pub subject_id: String,
    /// Task identifier.
    pub task_id: String,
    /// Rule replacing the default.
    #[serde(flatten)]
    pub rule: NamingRule,
}

#[derive(Debug, Default, Deserialize)]
struct NamingConfig {
    #[serde(default)]
    default: NamingRule,
    #[serde(default)]
    exceptions: Vec<NamingException>,
}

/// Default naming rule plus per-recording exceptions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "NamingConfig")]
pub struct FileNameTable {
    default: NamingRule,
    exceptions: FxHashMap<(String, String), NamingRule>,
}

impl TryFrom<NamingConfig> for FileNameTable {
    type Error = Error;

    fn try_from(config: NamingConfig) -> Result<Self> {
        Self::new(config.default, config.exceptions)
    }
}

impl FileNameTable {
    /// Build a table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a `(subject, task)` pair is listed
    /// twice.
    pub fn new(
        default: NamingRule,
        exceptions: impl IntoIterator<Item = NamingException>,
    ) -> Result<Self> {
        let mut map = FxHashMap::default();
        for exception in exceptions {
            let key = (exception.subject_id, exception.task_id);
            if map.contains_key(&key) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate naming exception for subject {} task {}",
                    key.0, key.1
                )));
            }
            map.insert(key, exception.rule);
        }
        Ok(Self {
            default,
            exceptions: map,
        })
    }

    /// Rule for one recording.
    #[must_use]
    pub fn rule_for(&self, subject_id: &str, task_id: &str) -> &NamingRule {
        self.exceptions
            .get(&(subject_id.to_string(), task_id.to_string()))
            .unwrap_or(&self.default)
    }
}

/// `<root>/sub-<subject>/func/sub-<subject>_task-<task>_run-<run>_events.tsv`
#[must_use]
pub fn events_path(output_root: &Path, subject_id: &str, task_id: &str, run_number: &str) -> PathBuf {
    output_root
        .join(format!("sub-{subject_id}"))
        .join("func")
        .join(format!(
            "sub-{subject_id}_task-{task_id}_run-{run_number}_events.tsv"
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_placeholders() {
        let rule = NamingRule::new("{subject}-D2_{run}_{task}.log", "05");
        assert_eq!(rule.render("002", "conditioning"), "002-D2_05_conditioning.log");
    }

    #[test]
    fn test_exception_overrides_default() {
        let table = FileNameTable::new(
            NamingRule::default(),
            [NamingException {
                subject_id: "011".to_string(),
                task_id: "conditioning".to_string(),
                rule: NamingRule::new("{subject}_{task}_{run}.log", "02"),
            }],
        )
        .unwrap();

        assert_eq!(table.rule_for("011", "conditioning").run_number, "02");
        assert_eq!(table.rule_for("011", "extinction").run_number, "01");
        assert_eq!(table.rule_for("012", "conditioning").run_number, "01");
    }

    #[test]
    fn test_duplicate_exception_rejected() {
        let exception = NamingException {
            subject_id: "011".to_string(),
            task_id: "conditioning".to_string(),
            rule: NamingRule::default(),
        };
        let result = FileNameTable::new(NamingRule::default(), [exception.clone(), exception]);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_events_path_convention() {
        let path = events_path(Path::new("/bids"), "002", "conditioning", "01");
        assert_eq!(
            path,
            Path::new("/bids/sub-002/func/sub-002_task-conditioning_run-01_events.tsv")
        );
    }

    #[test]
    fn test_deserialize_table() {
        let json = r#"{
            "default": {"template": "{subject}_{task}.log", "run_number": "01"},
            "exceptions": [
                {"subject_id": "011", "task_id": "conditioning",
                 "template": "{subject}_{task}_b.log", "run_number": "02"}
            ]
        }"#;
        let table: FileNameTable = serde_json::from_str(json).unwrap();
        assert_eq!(
            table.rule_for("011", "conditioning").render("011", "conditioning"),
            "011_conditioning_b.log"
        );
    }
}
