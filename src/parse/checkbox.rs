use std::sync::LazyLock;

use regex::Regex;

/// A checkbox at line start: indentation, optional callout `>` markers,
/// a list bullet (`-`, `*`, `+`, `1.`, `1)`), then `[<mark>]`.
static CHECKBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:[ \t]*>)*[ \t]*(?:[-*+]|\d+[.)])[ \t]*\[)([^\]])(\])").expect("checkbox regex")
});

/// `✅ 2025-01-12` or `[completion:: 2025-01-12]`, with the whitespace before it
static COMPLETION_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:✅\s*\d{4}-\d{2}-\d{2}|\[completion::\s*\d{4}-\d{2}-\d{2}\])")
        .expect("completion date regex")
});

/// `⏳ 2025-01-10` and the legacy `⏰ 2025-01-10`
static SCHEDULED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*[⏳⏰]\x{FE0F}?\s*\d{4}-\d{2}-\d{2}").expect("scheduled date regex")
});

/// Split a task line into (prefix up to and including `[`, mark, text after `]`).
pub fn split_checkbox(line: &str) -> Option<(&str, &str, &str)> {
    let caps = CHECKBOX.captures(line)?;
    let prefix = caps.get(1)?;
    let mark = caps.get(2)?;
    let close = caps.get(3)?;
    Some((prefix.as_str(), mark.as_str(), &line[close.end()..]))
}

pub fn is_task_line(line: &str) -> bool {
    CHECKBOX.is_match(line)
}

/// The mark inside the checkbox, if the line is a task
pub fn checkbox_mark(line: &str) -> Option<&str> {
    split_checkbox(line).map(|(_, mark, _)| mark)
}

/// Replace the checkbox mark, leaving the rest of the line untouched.
/// Returns `None` when the line has no checkbox.
pub fn set_mark(line: &str, mark: &str) -> Option<String> {
    let (prefix, _, rest) = split_checkbox(line)?;
    Some(format!("{}{}]{}", prefix, mark, rest))
}

pub fn strip_completion_date(line: &str) -> String {
    COMPLETION_DATE.replace_all(line, "").into_owned()
}

pub fn strip_scheduled_date(line: &str) -> String {
    SCHEDULED_DATE.replace_all(line, "").into_owned()
}
