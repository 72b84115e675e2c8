pub mod checkbox;
pub mod task_line;

pub use checkbox::{checkbox_mark, is_task_line, set_mark, split_checkbox};
pub use task_line::{MarkdownTaskParser, TaskLineParser, parse_task_line};

/// Split a document into lines so that `join_lines` restores it exactly,
/// including a trailing newline (which shows up as a final empty line).
pub fn split_lines(content: &str) -> Vec<String> {
    content.split('\n').map(|l| l.to_string()).collect()
}

pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_join_preserves_trailing_newline() {
        for doc in ["", "a", "a\n", "a\n\nb\n", "\n"] {
            assert_eq!(join_lines(&split_lines(doc)), doc);
        }
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
    }
}
