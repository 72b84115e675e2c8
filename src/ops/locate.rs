use crate::model::location::{LocationHint, TaskElement, TaskLocation};
use crate::model::task::Task;
use crate::parse::split_lines;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("no section or container information for the task")]
    NoHint,
    #[error("container {start}..{end} lies outside the document ({len} characters)")]
    ContainerOutOfBounds { start: usize, end: usize, len: usize },
    #[error("line {index} is outside the document ({len} lines)")]
    OutOfBounds { index: usize, len: usize },
}

/// Map a rendered task to a line of `content`.
///
/// With section info the line is `line_start + relative_line`. Inside a
/// callout container it is the number of lines before the container plus
/// `relative_line`. Anything else, or an index past the end, fails.
pub fn resolve_location(
    element: &TaskElement,
    hint: Option<&LocationHint>,
    content: &str,
) -> Result<TaskLocation, LocateError> {
    let base = match hint {
        Some(LocationHint::Section { line_start }) => *line_start,
        Some(LocationHint::Container { start, end }) => lines_before(content, *start, *end)?,
        None => return Err(LocateError::NoHint),
    };

    let lines = split_lines(content);
    // an offset that overflows is past any document
    let line_index = base.checked_add(element.relative_line).unwrap_or(usize::MAX);
    let line_text = lines.get(line_index).ok_or(LocateError::OutOfBounds {
        index: line_index,
        len: lines.len(),
    })?;

    Ok(TaskLocation {
        line_index,
        line_text: line_text.clone(),
    })
}

/// Count newline-terminated lines before character offset `start`.
fn lines_before(content: &str, start: usize, end: usize) -> Result<usize, LocateError> {
    let len = content.chars().count();
    if start > end || end > len {
        return Err(LocateError::ContainerOutOfBounds { start, end, len });
    }
    Ok(content.chars().take(start).filter(|&c| c == '\n').count())
}

/// Find the task's line in a fresh snapshot when `task.line` may be stale.
///
/// `task.line` wins if the text there still matches; otherwise the closest
/// line equal to the task's markdown. Without markdown to compare against,
/// an in-bounds `task.line` is trusted.
pub fn locate_task_line(lines: &[String], task: &Task) -> Option<usize> {
    let original = task.original_markdown.trim_end();
    let hinted = task.line.filter(|&i| i < lines.len());

    if original.is_empty() {
        return hinted;
    }
    if let Some(i) = hinted
        && lines[i].trim_end() == original
    {
        return Some(i);
    }

    let anchor = hinted.unwrap_or(0);
    lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.trim_end() == original)
        .min_by_key(|(i, _)| i.abs_diff(anchor))
        .map(|(i, _)| i)
}
