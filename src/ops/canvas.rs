use serde::Serialize;

use crate::io::store::is_canvas_path;
use crate::model::config::DuplicateConfig;
use crate::model::task::Task;

/// Result reported by a canvas updater, relayed as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanvasOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CanvasOutcome {
    pub fn ok() -> Self {
        CanvasOutcome {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        CanvasOutcome {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Node-graph aware updater that owns every write into canvas documents.
pub trait CanvasTaskUpdater {
    /// `target_node_id` is always `None` for now; nodes are picked by the
    /// updater itself.
    fn duplicate(
        &self,
        task: &Task,
        target: &str,
        target_node_id: Option<&str>,
        target_section: Option<&str>,
        preserve_metadata: bool,
    ) -> CanvasOutcome;
}

/// Updater for builds that cannot edit canvas documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedCanvas;

impl CanvasTaskUpdater for UnsupportedCanvas {
    fn duplicate(
        &self,
        _task: &Task,
        _target: &str,
        _target_node_id: Option<&str>,
        _target_section: Option<&str>,
        _preserve_metadata: bool,
    ) -> CanvasOutcome {
        CanvasOutcome::failed("canvas documents are not supported by this build")
    }
}

/// Which pipeline a duplication goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateRoute<'a> {
    /// Text task into a text document
    Text { target: &'a str },
    /// Canvas task flattened into a text document
    CanvasToText { target: &'a str },
    /// Anything landing in a canvas document
    Canvas { target: &'a str },
}

impl DuplicateRoute<'_> {
    pub fn target(&self) -> &str {
        match self {
            DuplicateRoute::Text { target }
            | DuplicateRoute::CanvasToText { target }
            | DuplicateRoute::Canvas { target } => target,
        }
    }
}

/// Pick the pipeline before anything is read or written. The target
/// defaults to the task's own document.
pub fn route_duplicate<'a>(task: &'a Task, config: &'a DuplicateConfig) -> DuplicateRoute<'a> {
    let target = config.target_file.as_deref().unwrap_or(&task.file_path);
    let from_canvas = task.is_canvas() || is_canvas_path(&task.file_path);

    if is_canvas_path(target) {
        DuplicateRoute::Canvas { target }
    } else if from_canvas {
        DuplicateRoute::CanvasToText { target }
    } else {
        DuplicateRoute::Text { target }
    }
}
