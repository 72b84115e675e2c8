use chrono::NaiveDate;
use serde::Serialize;

use crate::io::store::{DocumentKind, DocumentStore, StoreError, same_document};
use crate::model::config::DuplicateConfig;
use crate::model::task::Task;
use crate::ops::canvas::{CanvasTaskUpdater, DuplicateRoute, route_duplicate};
use crate::ops::locate::locate_task_line;
use crate::ops::mutate::mutate_lines;
use crate::parse::checkbox::{set_mark, strip_completion_date, strip_scheduled_date};
use crate::parse::split_lines;
use crate::util::today;

#[derive(Debug, thiserror::Error)]
pub enum DuplicateError {
    #[error("Source file not found: {0}")]
    SourceNotFound(String),
    #[error("Failed to create target file: {0}")]
    TargetCreate(String),
    #[error("Task line not found in source file")]
    TaskLineNotFound,
    #[error("Unsupported target document: {0}")]
    UnsupportedTarget(String),
    #[error("{0}")]
    Canvas(String),
    #[error("Failed to duplicate task: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a duplication, in the shape presentation layers display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DuplicateResult {
    pub fn ok(message: impl Into<String>) -> Self {
        DuplicateResult {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        DuplicateResult {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// How heading text is compared against the configured section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMatch {
    CaseSensitive,
    CaseInsensitive,
}

/// Build the copy of a task line: unchecked, optionally without its
/// completion and scheduled dates, tagged with the date it was made.
pub fn duplicate_line(original: &str, preserve_metadata: bool, today: NaiveDate) -> String {
    // CRLF documents split on '\n' leave the '\r' on each line
    let (body, ending) = match original.strip_suffix('\r') {
        Some(body) => (body, "\r"),
        None => (original, ""),
    };
    let reset = set_mark(body, " ").unwrap_or_else(|| body.to_string());
    let mut line = if preserve_metadata {
        reset
    } else {
        strip_scheduled_date(&strip_completion_date(&reset))
            .trim_end()
            .to_string()
    };
    line.push_str(&format!(" (duplicated {})", today.format("%Y-%m-%d")));
    line.push_str(ending);
    line
}

/// Index just past the last content line. A trailing newline shows up as
/// a final empty element, which stays last.
fn content_end(lines: &[String]) -> usize {
    match lines.last() {
        Some(last) if last.is_empty() => lines.len() - 1,
        _ => lines.len(),
    }
}

fn find_heading(lines: &[String], section: &str, matching: SectionMatch) -> Option<usize> {
    let needle = match matching {
        SectionMatch::CaseSensitive => section.to_string(),
        SectionMatch::CaseInsensitive => section.to_lowercase(),
    };
    lines.iter().position(|line| {
        if !line.trim_start().starts_with('#') {
            return false;
        }
        match matching {
            SectionMatch::CaseSensitive => line.contains(&needle),
            SectionMatch::CaseInsensitive => line.to_lowercase().contains(&needle),
        }
    })
}

/// Insert `duplicate` into a target document's lines.
///
/// Under the first heading mentioning `section` when there is one. A
/// missing section is created at the end as a `##` heading after a blank
/// line. Without a section the copy goes at the end.
pub fn insert_into_target(
    lines: &mut Vec<String>,
    duplicate: String,
    section: Option<&str>,
    matching: SectionMatch,
) {
    let end = content_end(lines);
    let Some(section) = section else {
        lines.insert(end, duplicate);
        return;
    };

    if let Some(idx) = find_heading(lines, section, matching) {
        lines.insert(idx + 1, duplicate);
        return;
    }

    let mut block = Vec::with_capacity(3);
    if end > 0 {
        block.push(String::new());
    }
    block.push(format!("## {section}"));
    block.push(duplicate);
    lines.splice(end..end, block);
}

fn location_text(route: &DuplicateRoute<'_>, task: &Task) -> String {
    if route.target() == task.file_path {
        "in same file".to_string()
    } else {
        format!("to {}", route.target())
    }
}

fn section_text(config: &DuplicateConfig) -> String {
    config
        .target_section
        .as_deref()
        .map(|s| format!(" (section: {s})"))
        .unwrap_or_default()
}

/// Human-readable summary of a duplicate configuration. Touches nothing.
pub fn describe_duplicate(config: &DuplicateConfig) -> String {
    match &config.target_file {
        Some(target) => format!("Duplicate task to {}{}", target, section_text(config)),
        None => "Duplicate task in same file".to_string(),
    }
}

/// Duplicate `task` as configured, dated today.
pub fn duplicate_task<S: DocumentStore>(
    store: &S,
    canvas: &dyn CanvasTaskUpdater,
    task: &Task,
    config: &DuplicateConfig,
) -> DuplicateResult {
    duplicate_task_on(store, canvas, task, config, today())
}

pub fn duplicate_task_on<S: DocumentStore>(
    store: &S,
    canvas: &dyn CanvasTaskUpdater,
    task: &Task,
    config: &DuplicateConfig,
    today: NaiveDate,
) -> DuplicateResult {
    match try_duplicate(store, canvas, task, config, today) {
        Ok(message) => DuplicateResult::ok(message),
        Err(e) => DuplicateResult::err(e.to_string()),
    }
}

fn try_duplicate<S: DocumentStore>(
    store: &S,
    canvas: &dyn CanvasTaskUpdater,
    task: &Task,
    config: &DuplicateConfig,
    today: NaiveDate,
) -> Result<String, DuplicateError> {
    let route = route_duplicate(task, config);
    let section = config.target_section.as_deref();

    match route {
        DuplicateRoute::Canvas { target } => {
            let outcome = canvas.duplicate(task, target, None, section, config.preserve_metadata);
            if !outcome.success {
                return Err(DuplicateError::Canvas(
                    outcome
                        .error
                        .unwrap_or_else(|| "Failed to duplicate Canvas task".to_string()),
                ));
            }
        }
        DuplicateRoute::CanvasToText { target } => {
            let line = duplicate_line(&task.markdown(), config.preserve_metadata, today);
            ensure_target(store, target)?;
            mutate_lines(store, target, |_, lines| {
                insert_into_target(lines, line, section, SectionMatch::CaseInsensitive);
                Ok::<_, DuplicateError>(())
            })?;
            return Ok(format!(
                "Task duplicated from Canvas {}{}",
                location_text(&route, task),
                section_text(config)
            ));
        }
        DuplicateRoute::Text { target } if same_document(target, &task.file_path) => {
            if !store.exists(&task.file_path) {
                return Err(DuplicateError::SourceNotFound(task.file_path.clone()));
            }
            mutate_lines(store, &task.file_path, |_, lines| {
                let idx = locate_task_line(lines, task).ok_or(DuplicateError::TaskLineNotFound)?;
                let line = duplicate_line(&lines[idx], config.preserve_metadata, today);
                lines.insert(idx + 1, line);
                Ok::<_, DuplicateError>(())
            })?;
        }
        DuplicateRoute::Text { target } => {
            if !store.exists(&task.file_path) {
                return Err(DuplicateError::SourceNotFound(task.file_path.clone()));
            }
            let source = split_lines(&store.read(&task.file_path)?);
            let idx = locate_task_line(&source, task).ok_or(DuplicateError::TaskLineNotFound)?;
            let line = duplicate_line(&source[idx], config.preserve_metadata, today);

            ensure_target(store, target)?;
            mutate_lines(store, target, |_, lines| {
                insert_into_target(lines, line, section, SectionMatch::CaseSensitive);
                Ok::<_, DuplicateError>(())
            })?;
        }
    }

    Ok(format!(
        "Task duplicated {}{}",
        location_text(&route, task),
        section_text(config)
    ))
}

/// Make sure a text target exists, creating it empty if needed.
fn ensure_target<S: DocumentStore>(store: &S, target: &str) -> Result<(), DuplicateError> {
    if DocumentKind::of(target) != Some(DocumentKind::Markdown) {
        return Err(DuplicateError::UnsupportedTarget(target.to_string()));
    }
    if store.exists(target) {
        return Ok(());
    }
    store
        .create(target, "")
        .map_err(|_| DuplicateError::TargetCreate(target.to_string()))
}
