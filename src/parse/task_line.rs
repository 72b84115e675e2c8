use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::model::task::{MetadataFormat, Task, TaskMetadata, TaskSource};
use crate::parse::checkbox::split_checkbox;

/// Turns a single document line into a structured task.
pub trait TaskLineParser {
    fn parse(&self, path: &str, line: &str, line_index: usize) -> Option<Task>;
}

/// Line parser understanding emoji and dataview metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownTaskParser {
    pub format: MetadataFormat,
}

impl MarkdownTaskParser {
    pub fn new(format: MetadataFormat) -> Self {
        MarkdownTaskParser { format }
    }
}

impl TaskLineParser for MarkdownTaskParser {
    fn parse(&self, path: &str, line: &str, line_index: usize) -> Option<Task> {
        parse_task_line(path, line, line_index, self.format)
    }
}

#[derive(Debug, Clone, Copy)]
enum DateField {
    Due,
    Start,
    Scheduled,
    Completed,
    Created,
}

struct DatePattern {
    field: DateField,
    emoji: Regex,
    dataview: Regex,
}

static DATE_PATTERNS: LazyLock<Vec<DatePattern>> = LazyLock::new(|| {
    [
        (DateField::Due, "📅", "due"),
        (DateField::Start, "🛫", "start"),
        (DateField::Scheduled, "[⏳⏰]", "scheduled"),
        (DateField::Completed, "✅", "completion"),
        (DateField::Created, "➕", "created"),
    ]
    .into_iter()
    .map(|(field, emoji, key)| DatePattern {
        field,
        emoji: Regex::new(&format!(r"{}\x{{FE0F}}?\s*(\d{{4}}-\d{{2}}-\d{{2}})", emoji))
            .expect("emoji date regex"),
        dataview: Regex::new(&format!(r"\[{}::\s*(\d{{4}}-\d{{2}}-\d{{2}})\s*\]", key))
            .expect("dataview date regex"),
    })
    .collect()
});

static EMOJI_RECURRENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"🔁\x{FE0F}?\s*([^📅🛫⏳⏰✅➕🔁#\[]+)").expect("recurrence regex")
});

static DATAVIEW_RECURRENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[repeat::\s*([^\]]+)\]").expect("repeat regex"));

static DATAVIEW_PROJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[project::\s*([^\]]+)\]").expect("project regex"));

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#([^\s#\[\]]+)").expect("tag regex"));

/// Parse one task line. Returns `None` for lines without a checkbox.
pub fn parse_task_line(
    path: &str,
    line: &str,
    line_index: usize,
    format: MetadataFormat,
) -> Option<Task> {
    let (_, mark, rest) = split_checkbox(line)?;
    let mut remaining = rest.to_string();
    let mut meta = TaskMetadata::new(TaskSource::Text);

    for pattern in DATE_PATTERNS.iter() {
        let (first, second) = match format {
            MetadataFormat::Dataview => (&pattern.dataview, &pattern.emoji),
            MetadataFormat::Tasks => (&pattern.emoji, &pattern.dataview),
        };
        for re in [first, second] {
            if let Some((date, rest)) = take_date(re, &remaining) {
                *date_slot(&mut meta, pattern.field) = Some(date);
                remaining = rest;
                break;
            }
        }
    }

    let recurrence_order = match format {
        MetadataFormat::Dataview => [&*DATAVIEW_RECURRENCE, &*EMOJI_RECURRENCE],
        MetadataFormat::Tasks => [&*EMOJI_RECURRENCE, &*DATAVIEW_RECURRENCE],
    };
    for re in recurrence_order {
        if let Some((value, rest)) = take_capture(re, &remaining) {
            meta.recurrence = Some(value);
            remaining = rest;
            break;
        }
    }

    if let Some((project, rest)) = take_capture(&DATAVIEW_PROJECT, &remaining) {
        meta.project = Some(project);
        remaining = rest;
    }

    for caps in TAG.captures_iter(&remaining) {
        let tag = caps[1].to_string();
        if meta.project.is_none()
            && let Some(project) = tag.strip_prefix("project/")
            && !project.is_empty()
        {
            meta.project = Some(project.to_string());
        }
        if !meta.tags.contains(&tag) {
            meta.tags.push(tag);
        }
    }
    let remaining = TAG.replace_all(&remaining, "");

    let content = remaining.split_whitespace().collect::<Vec<_>>().join(" ");

    Some(Task {
        file_path: path.to_string(),
        line: Some(line_index),
        content,
        original_markdown: line.to_string(),
        status: mark.to_string(),
        completed: matches!(mark, "x" | "X"),
        metadata: meta,
    })
}

fn date_slot(meta: &mut TaskMetadata, field: DateField) -> &mut Option<NaiveDate> {
    match field {
        DateField::Due => &mut meta.due_date,
        DateField::Start => &mut meta.start_date,
        DateField::Scheduled => &mut meta.scheduled_date,
        DateField::Completed => &mut meta.completed_date,
        DateField::Created => &mut meta.created_date,
    }
}

/// Find the first valid date match, returning it and the text without it.
fn take_date(re: &Regex, text: &str) -> Option<(NaiveDate, String)> {
    let caps = re.captures(text)?;
    let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
    let whole = caps.get(0)?;
    Some((date, cut(text, whole.start(), whole.end())))
}

fn take_capture(re: &Regex, text: &str) -> Option<(String, String)> {
    let caps = re.captures(text)?;
    let value = caps[1].trim().to_string();
    if value.is_empty() {
        return None;
    }
    let whole = caps.get(0)?;
    Some((value, cut(text, whole.start(), whole.end())))
}

fn cut(text: &str, start: usize, end: usize) -> String {
    format!("{}{}", &text[..start], &text[end..])
}
