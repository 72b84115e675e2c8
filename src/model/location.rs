use std::cell::RefCell;
use std::rc::Rc;

/// What the renderer knows about where a block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationHint {
    /// The block containing the task starts at this document line
    Section { line_start: usize },
    /// The task sits inside an embedded callout spanning `[start, end)`
    /// character offsets of the document
    Container { start: usize, end: usize },
}

/// Rendering context handed over with a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub source_path: String,
    pub hint: Option<LocationHint>,
}

impl RenderContext {
    pub fn section(source_path: &str, line_start: usize) -> Self {
        RenderContext {
            source_path: source_path.to_string(),
            hint: Some(LocationHint::Section { line_start }),
        }
    }

    pub fn container(source_path: &str, start: usize, end: usize) -> Self {
        RenderContext {
            source_path: source_path.to_string(),
            hint: Some(LocationHint::Container { start, end }),
        }
    }
}

/// Visible state of a rendered checkbox
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkState {
    pub mark: String,
    pub checked: bool,
}

/// Shared handle to the visible mark. Cloning shares the same state, so
/// the view and the engine see one value.
#[derive(Debug, Clone, Default)]
pub struct MarkHandle(Rc<RefCell<MarkState>>);

impl MarkHandle {
    pub fn new(mark: &str) -> Self {
        MarkHandle(Rc::new(RefCell::new(MarkState {
            mark: mark.to_string(),
            checked: false,
        })))
    }

    pub fn mark(&self) -> String {
        self.0.borrow().mark.clone()
    }

    pub fn checked(&self) -> bool {
        self.0.borrow().checked
    }

    pub fn set(&self, mark: &str, checked: bool) {
        let mut state = self.0.borrow_mut();
        state.mark = mark.to_string();
        state.checked = checked;
    }
}

/// A rendered task list item.
#[derive(Debug, Clone)]
pub struct TaskElement {
    /// Line offset of the item relative to its block (`data-line`)
    pub relative_line: usize,
    pub mark: MarkHandle,
}

impl TaskElement {
    pub fn new(relative_line: usize, mark: &str) -> Self {
        TaskElement {
            relative_line,
            mark: MarkHandle::new(mark),
        }
    }
}

/// A resolved position inside one document snapshot. Never reuse it
/// against a different read of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLocation {
    pub line_index: usize,
    pub line_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_handle_clones_share_state() {
        let element = TaskElement::new(2, " ");
        let view = element.mark.clone();
        element.mark.set("x", true);
        assert_eq!(view.mark(), "x");
        assert!(view.checked());
    }
}
