use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which kind of backing document a task lives in.
///
/// The two formats go through separate pipelines: linear text is spliced
/// line-by-line here, node-graph documents are handed to a canvas updater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sourceType", rename_all = "lowercase")]
pub enum TaskSource {
    Text,
    Canvas {
        /// ID of the text node holding the task
        node_id: String,
        /// IDs of nodes connected below this one
        #[serde(default)]
        children: Vec<String>,
    },
}

impl TaskSource {
    pub fn is_canvas(&self) -> bool {
        matches!(self, TaskSource::Canvas { .. })
    }
}

/// Preferred metadata syntax when a line carries both forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFormat {
    /// Emoji markers: `📅 2025-01-10`, `✅ 2025-01-12`
    #[default]
    Tasks,
    /// Inline fields: `[due:: 2025-01-10]`
    Dataview,
}

/// Structured metadata pulled out of a task line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    #[serde(flatten)]
    pub source: TaskSource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
}

impl TaskMetadata {
    pub fn new(source: TaskSource) -> Self {
        TaskMetadata {
            source,
            tags: Vec::new(),
            project: None,
            due_date: None,
            start_date: None,
            scheduled_date: None,
            completed_date: None,
            created_date: None,
            recurrence: None,
        }
    }
}

/// A single checkbox task, captured transiently for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Vault-relative path of the backing document
    pub file_path: String,
    /// Best-known 0-indexed line at capture time. May be stale.
    pub line: Option<usize>,
    /// Human-readable text with metadata stripped
    pub content: String,
    /// Exact backing-document text of the task
    pub original_markdown: String,
    /// The mark inside `[ ]`
    pub status: String,
    pub completed: bool,
    pub metadata: TaskMetadata,
}

impl Task {
    /// A text-document task with no parsed metadata.
    pub fn new_text(file_path: &str, line: usize, original_markdown: &str, status: &str) -> Self {
        Task {
            file_path: file_path.to_string(),
            line: Some(line),
            content: String::new(),
            original_markdown: original_markdown.to_string(),
            status: status.to_string(),
            completed: matches!(status, "x" | "X"),
            metadata: TaskMetadata::new(TaskSource::Text),
        }
    }

    pub fn is_canvas(&self) -> bool {
        self.metadata.source.is_canvas()
    }

    /// Linear-text form of the task: the stored markdown, or one
    /// synthesized from the content when the source kept none.
    pub fn markdown(&self) -> String {
        if !self.original_markdown.is_empty() {
            return self.original_markdown.clone();
        }
        let mark = if self.completed { "x" } else { " " };
        format!("- [{}] {}", mark, self.content)
    }
}
