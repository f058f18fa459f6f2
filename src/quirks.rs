//! Dataset-specific corrections
//!
//! Known defects of individual recordings are described as data, not code:
//! each [`QuirkEntry`] names a subject (optionally a task) and a
//! [`Correction`]. The [`QuirkRegistry`] is built once, never mutated, and
//! shared by reference across concurrently processed runs.
//!
//! ## Example
//!
//! ```rust
//! use bids_events::quirks::{Correction, QuirkEntry, QuirkRegistry};
//!
//! let registry = QuirkRegistry::new([
//!     QuirkEntry::new("007", Correction::OverrideSubjectId),
//!     QuirkEntry::new("013", Correction::TrimRows { first: 280, last: 336 }).for_task("extinction"),
//! ])?;
//!
//! assert!(registry.overrides_subject_id("007", "conditioning"));
//! assert!(!registry.overrides_subject_id("013", "extinction"));
//! # Ok::<(), bids_events::Error>(())
//! ```

use crate::config::RunConfig;
use crate::events::EventTable;
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A single correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correction {
    /// The log's `Subject` column is wrong; use the driver-supplied identifier.
    OverrideSubjectId,
    /// Remove a zero-based inclusive row range of the final events table.
    TrimRows {
        /// First row removed.
        first: usize,
        /// Last row removed (clamped to the table length).
        last: usize,
    },
}

/// A correction bound to a subject, or to one task of a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuirkEntry {
    /// Subject the correction applies to.
    pub subject_id: String,
    /// Restrict to one task; `None` applies to every task of the subject.
    #[serde(default)]
    pub task_id: Option<String>,
    /// What to correct.
    pub correction: Correction,
    /// Free-text provenance, e.g. why the recording is defective.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl QuirkEntry {
    /// Create a subject-wide entry.
    #[must_use]
    pub fn new(subject_id: impl Into<String>, correction: Correction) -> Self {
        Self {
            subject_id: subject_id.into(),
            task_id: None,
            correction,
            note: None,
        }
    }

    /// Restrict the entry to one task.
    #[must_use]
    pub fn for_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Attach a note.
    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

type QuirkKey = (String, Option<String>);

/// Read-only lookup of corrections by subject / task.
#[derive(Debug, Default, Clone)]
pub struct QuirkRegistry {
    entries: FxHashMap<QuirkKey, Vec<Correction>>,
}

impl QuirkRegistry {
    /// Build a registry from entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a row range is inverted, a key
    /// carries the same kind of correction twice, or a subject-wide row trim
    /// and a task row trim of the same subject would both apply to one run.
    pub fn new(entries: impl IntoIterator<Item = QuirkEntry>) -> Result<Self> {
        let mut map: FxHashMap<QuirkKey, Vec<Correction>> = FxHashMap::default();

        for entry in entries {
            if let Correction::TrimRows { first, last } = entry.correction {
                if first > last {
                    return Err(Error::InvalidConfig(format!(
                        "quirk for subject {}: row range {first}..={last} is inverted",
                        entry.subject_id
                    )));
                }
                let stacked = map.iter().any(|((subject, task), corrections)| {
                    *subject == entry.subject_id
                        && task.is_none() != entry.task_id.is_none()
                        && corrections
                            .iter()
                            .any(|c| matches!(c, Correction::TrimRows { .. }))
                });
                if stacked {
                    return Err(Error::InvalidConfig(format!(
                        "subject {} has both a subject-wide and a task row trim",
                        entry.subject_id
                    )));
                }
            }

            let corrections = map
                .entry((entry.subject_id.clone(), entry.task_id.clone()))
                .or_default();
            let duplicate = corrections
                .iter()
                .any(|c| std::mem::discriminant(c) == std::mem::discriminant(&entry.correction));
            if duplicate {
                return Err(Error::InvalidConfig(format!(
                    "duplicate {:?} quirk for subject {} task {:?}",
                    entry.correction, entry.subject_id, entry.task_id
                )));
            }
            corrections.push(entry.correction);
        }

        Ok(Self { entries: map })
    }

    /// Number of registered corrections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Corrections for a run: subject-wide entries first, then task entries.
    pub fn corrections_for<'a>(
        &'a self,
        subject_id: &str,
        task_id: &str,
    ) -> impl Iterator<Item = &'a Correction> + 'a {
        let subject_wide = self.entries.get(&(subject_id.to_string(), None));
        let task_specific = self
            .entries
            .get(&(subject_id.to_string(), Some(task_id.to_string())));
        subject_wide.into_iter().chain(task_specific).flatten()
    }

    /// Whether the run's subject column must come from the driver.
    #[must_use]
    pub fn overrides_subject_id(&self, subject_id: &str, task_id: &str) -> bool {
        self.corrections_for(subject_id, task_id)
            .any(|c| matches!(c, Correction::OverrideSubjectId))
    }

    /// Apply the run's corrections in place.
    ///
    /// Returns the number of rows removed.
    pub fn apply(&self, config: &RunConfig, table: &mut EventTable) -> usize {
        let subject = config.subject_id.as_str();
        let task = config.task_id.as_str();

        if self.overrides_subject_id(subject, task) {
            tracing::debug!(subject, task, "overriding logged subject id");
            for event in table.events_mut() {
                event.set_subject_id(subject);
            }
        } else if let Some(logged) = table
            .events()
            .iter()
            .map(|e| e.subject_id())
            .find(|logged| !same_subject(logged, subject))
        {
            tracing::warn!(subject, task, logged, "log subject differs from configured subject");
        }

        let mut removed = 0;
        for correction in self.corrections_for(subject, task) {
            if let Correction::TrimRows { first, last } = *correction {
                let n = table.remove_rows(first..=last);
                tracing::debug!(subject, task, first, last, removed = n, "trimmed rows");
                removed += n;
            }
        }
        removed
    }
}

/// Subject ids compare equal ignoring surrounding whitespace and leading zeros.
fn same_subject(a: &str, b: &str) -> bool {
    let canonical = |s: &str| {
        let s = s.trim();
        let stripped = s.trim_start_matches('0');
        if stripped.is_empty() && !s.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    };
    canonical(a) == canonical(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventRecord;

    fn table(subject: &str, rows: usize) -> EventTable {
        EventTable::new(
            (0..rows)
                .map(|i| EventRecord::new(subject, i64::try_from(i).unwrap(), "PAIN", 0.0, 0.0))
                .collect(),
        )
    }

    #[test]
    fn test_same_subject_ignores_leading_zeros() {
        assert!(same_subject("002", "2"));
        assert!(same_subject(" 17", "017"));
        assert!(same_subject("000", "0"));
        assert!(!same_subject("12", "21"));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = QuirkRegistry::new([QuirkEntry::new(
            "013",
            Correction::TrimRows { first: 10, last: 2 },
        )]);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let result = QuirkRegistry::new([
            QuirkEntry::new("013", Correction::TrimRows { first: 1, last: 2 }),
            QuirkEntry::new("013", Correction::TrimRows { first: 5, last: 6 }),
        ]);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_task_scoped_entry() {
        let registry = QuirkRegistry::new([QuirkEntry::new(
            "013",
            Correction::TrimRows { first: 0, last: 0 },
        )
        .for_task("extinction")])
        .unwrap();

        assert_eq!(registry.corrections_for("013", "extinction").count(), 1);
        assert_eq!(registry.corrections_for("013", "conditioning").count(), 0);
    }

    #[test]
    fn test_apply_override_and_trim() {
        let registry = QuirkRegistry::new([
            QuirkEntry::new("007", Correction::OverrideSubjectId),
            QuirkEntry::new("007", Correction::TrimRows { first: 2, last: 3 }),
        ])
        .unwrap();
        let config = RunConfig::builder("007", "conditioning", "01").build();
        let mut events = table("70", 5);

        let removed = registry.apply(&config, &mut events);

        assert_eq!(removed, 2);
        assert_eq!(events.len(), 3);
        assert!(events.events().iter().all(|e| e.subject_id() == "007"));
    }

    #[test]
    fn test_deserialize_entry() {
        let json = r#"{"subject_id": "013", "task_id": "extinction",
                       "correction": {"kind": "trim_rows", "first": 280, "last": 336}}"#;
        let entry: QuirkEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.correction, Correction::TrimRows { first: 280, last: 336 });
        assert_eq!(entry.task_id.as_deref(), Some("extinction"));
    }

    #[test]
    fn test_subject_and_task_trims_rejected() {
        let subject_first = QuirkRegistry::new([
            QuirkEntry::new("013", Correction::TrimRows { first: 2, last: 3 }),
            QuirkEntry::new("013", Correction::TrimRows { first: 2, last: 3 }).for_task("t"),
        ]);
        assert!(matches!(subject_first, Err(Error::InvalidConfig(_))));

        let task_first = QuirkRegistry::new([
            QuirkEntry::new("013", Correction::TrimRows { first: 2, last: 3 }).for_task("t"),
            QuirkEntry::new("013", Correction::TrimRows { first: 4, last: 5 }),
        ]);
        assert!(matches!(task_first, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_trims_for_different_tasks_allowed() {
        let registry = QuirkRegistry::new([
            QuirkEntry::new("013", Correction::TrimRows { first: 2, last: 3 }).for_task("t"),
            QuirkEntry::new("013", Correction::TrimRows { first: 0, last: 0 }).for_task("u"),
            QuirkEntry::new("014", Correction::TrimRows { first: 2, last: 3 }),
        ])
        .unwrap();
        let config = RunConfig::builder("013", "t", "01").build();
        let mut events = table("013", 6);

        assert_eq!(registry.apply(&config, &mut events), 2);
        let trials: Vec<i64> = events.events().iter().map(EventRecord::trial_index).collect();
        assert_eq!(trials, [0, 1, 4, 5]);
    }
}
