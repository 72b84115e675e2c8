use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::task::MetadataFormat;

/// Configuration from `.tickmark/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickmarkConfig {
    #[serde(default)]
    pub status: StatusCycleConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
}

/// The user's status model: rotation order, stored marks, and which states
/// automatic advancement skips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCycleConfig {
    #[serde(default = "default_cycle")]
    pub cycle: Vec<String>,
    #[serde(default)]
    pub exclude_from_cycle: Vec<String>,
    /// Marks that count as "completed"
    #[serde(default = "default_completed_marks")]
    pub completed_marks: Vec<String>,
    #[serde(default = "default_marks")]
    pub marks: IndexMap<String, String>,
}

impl Default for StatusCycleConfig {
    fn default() -> Self {
        StatusCycleConfig {
            cycle: default_cycle(),
            exclude_from_cycle: Vec::new(),
            completed_marks: default_completed_marks(),
            marks: default_marks(),
        }
    }
}

impl StatusCycleConfig {
    /// Build a config from `(state, mark)` pairs, cycling in the given order.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        StatusCycleConfig {
            cycle: pairs.iter().map(|(s, _)| s.to_string()).collect(),
            marks: pairs
                .iter()
                .map(|(s, m)| (s.to_string(), m.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    /// Cycle order with excluded states filtered out
    pub fn remaining_cycle(&self) -> Vec<&str> {
        self.cycle
            .iter()
            .filter(|s| !self.exclude_from_cycle.contains(s))
            .map(|s| s.as_str())
            .collect()
    }

    pub fn mark_for(&self, state: &str) -> Option<&str> {
        self.marks.get(state).map(|m| m.as_str())
    }

    pub fn is_completed_mark(&self, mark: &str) -> bool {
        self.completed_marks.iter().any(|m| m == mark)
    }

    /// A state is the terminal "done" state when its mark counts as completed.
    pub fn is_done_state(&self, state: &str) -> bool {
        self.mark_for(state)
            .is_some_and(|m| self.is_completed_mark(m))
    }
}

/// Default: the five built-in statuses
fn default_cycle() -> Vec<String> {
    ["Not Started", "In Progress", "Completed", "Abandoned", "Planned"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_marks() -> IndexMap<String, String> {
    [
        ("Not Started", " "),
        ("In Progress", "/"),
        ("Completed", "x"),
        ("Abandoned", "-"),
        ("Planned", "?"),
    ]
    .iter()
    .map(|(s, m)| (s.to_string(), m.to_string()))
    .collect()
}

fn default_completed_marks() -> Vec<String> {
    vec!["x".to_string(), "X".to_string()]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub metadata_format: MetadataFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Trailing debounce window for repeated clicks on one task
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        TriggerConfig {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl TriggerConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    200
}

/// Where and how to copy a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateConfig {
    /// Defaults to the task's own document
    #[serde(default)]
    pub target_file: Option<String>,
    /// Heading text to insert under
    #[serde(default)]
    pub target_section: Option<String>,
    /// Keep completion and scheduled dates on the copy
    #[serde(default)]
    pub preserve_metadata: bool,
}
