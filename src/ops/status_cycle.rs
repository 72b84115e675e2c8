use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::io::store::{DocumentKind, DocumentStore, StoreError, resolve_document};
use crate::model::config::StatusCycleConfig;
use crate::model::location::{LocationHint, RenderContext, TaskElement};
use crate::model::task::Task;
use crate::ops::locate::{LocateError, resolve_location};
use crate::ops::mutate::mutate_lines;
use crate::parse::checkbox::{checkbox_mark, is_task_line, set_mark, strip_completion_date};
use crate::parse::task_line::{MarkdownTaskParser, TaskLineParser};
use crate::util::debounce::Debouncer;

/// An external recurrence-aware toggler.
///
/// Given a task line being marked done, it returns the replacement text,
/// which may hold several `\n`-separated lines (the completed instance plus
/// the next occurrence).
pub trait RecurrenceApi {
    fn toggle_done(&self, line: &str, path: &str) -> Result<String, String>;
}

/// Observer for tasks that reach a completed mark through cycling.
pub trait CompletionListener {
    fn task_completed(&self, task: &Task);
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("line {0} is not a task")]
    NotATask(usize),
    #[error("recurrence toggle failed: {0}")]
    Delegate(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One step of the rotation, computed from the current mark alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub current_state: String,
    pub next_state: String,
    pub next_mark: String,
    /// The next state is the done state
    pub entering_done: bool,
    /// The current state is the done state and the next one is not
    pub leaving_done: bool,
}

/// Work out where `current_mark` goes next.
///
/// Excluded states are skipped. A mark that belongs to no remaining state
/// is treated as the first one, so it advances to the second. A next state
/// without a configured mark falls back to `" "`. Returns `None` when every
/// state is excluded.
pub fn next_transition(config: &StatusCycleConfig, current_mark: &str) -> Option<Transition> {
    let remaining = config.remaining_cycle();
    let first = *remaining.first()?;

    let current_idx = remaining
        .iter()
        .position(|s| config.mark_for(s) == Some(current_mark))
        .unwrap_or(0);
    let current_state = remaining.get(current_idx).copied().unwrap_or(first);
    let next_state = remaining[(current_idx + 1) % remaining.len()];
    let next_mark = config.mark_for(next_state).unwrap_or(" ");

    let entering_done = config.is_done_state(next_state);
    Some(Transition {
        current_state: current_state.to_string(),
        next_state: next_state.to_string(),
        next_mark: next_mark.to_string(),
        entering_done,
        leaving_done: config.is_done_state(current_state) && !entering_done,
    })
}

/// Rewrite a line for `transition` without outside help: drop the
/// completion date when leaving done, then swap the mark.
pub fn apply_transition(line: &str, transition: &Transition) -> Option<String> {
    if transition.leaving_done {
        set_mark(&strip_completion_date(line), &transition.next_mark)
    } else {
        set_mark(line, &transition.next_mark)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleOutcome {
    pub path: String,
    pub line_index: usize,
    pub previous_mark: String,
    pub next_state: String,
    pub next_mark: String,
    /// The recurrence API produced the replacement
    pub delegated: bool,
    /// Lines written in place of the original one
    pub lines: Vec<String>,
}

/// Advances a task's status and writes it back to its document.
pub struct StatusCycler {
    config: StatusCycleConfig,
    parser: Box<dyn TaskLineParser>,
    recurrence: Option<Box<dyn RecurrenceApi>>,
    listener: Option<Box<dyn CompletionListener>>,
    diagnostics: Option<PathBuf>,
}

impl StatusCycler {
    pub fn new(config: StatusCycleConfig) -> Self {
        StatusCycler {
            config,
            parser: Box::new(MarkdownTaskParser::default()),
            recurrence: None,
            listener: None,
            diagnostics: None,
        }
    }

    pub fn with_parser(mut self, parser: impl TaskLineParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn with_recurrence(mut self, api: impl RecurrenceApi + 'static) -> Self {
        self.recurrence = Some(Box::new(api));
        self
    }

    pub fn with_listener(mut self, listener: impl CompletionListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Record swallowed failures in the recovery log under `state_dir`
    pub fn with_diagnostics(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.diagnostics = Some(state_dir.into());
        self
    }

    pub fn config(&self) -> &StatusCycleConfig {
        &self.config
    }

    /// Click handler: cycle, and on any failure leave the document and the
    /// visible mark alone. Failures go to the recovery log when one is set.
    pub fn cycle_status<S: DocumentStore>(
        &self,
        store: &S,
        element: &TaskElement,
        ctx: &RenderContext,
    ) -> Option<CycleOutcome> {
        match self.try_cycle_status(store, element, ctx) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.report(element, ctx, &e);
                None
            }
        }
    }

    /// Cycle the task rendered as `element` to its next status.
    ///
    /// `Ok(None)` means the rotation is empty and nothing happened. The
    /// visible mark is updated inside the document update, before the new
    /// text is committed.
    pub fn try_cycle_status<S: DocumentStore>(
        &self,
        store: &S,
        element: &TaskElement,
        ctx: &RenderContext,
    ) -> Result<Option<CycleOutcome>, CycleError> {
        let previous_mark = element.mark.mark();
        let Some(transition) = next_transition(&self.config, &previous_mark) else {
            return Ok(None);
        };

        let path = ctx.source_path.as_str();
        if resolve_document(store, path)? != DocumentKind::Markdown {
            return Err(StoreError::Unsupported(path.to_string()).into());
        }

        let delegate = if transition.entering_done {
            self.recurrence.as_deref()
        } else {
            None
        };

        let outcome = mutate_lines(store, path, |content, lines| {
            let loc = resolve_location(element, ctx.hint.as_ref(), content)?;

            let replacement: Vec<String> = match delegate {
                Some(api) => {
                    if !is_task_line(&loc.line_text) {
                        return Err(CycleError::NotATask(loc.line_index));
                    }
                    let text = api
                        .toggle_done(&loc.line_text, path)
                        .map_err(CycleError::Delegate)?;
                    text.split('\n').map(str::to_string).collect()
                }
                None => vec![
                    apply_transition(&loc.line_text, &transition)
                        .ok_or(CycleError::NotATask(loc.line_index))?,
                ],
            };

            lines.splice(loc.line_index..=loc.line_index, replacement.iter().cloned());

            let checked = delegate.is_some() || self.config.is_completed_mark(&transition.next_mark);
            element.mark.set(&transition.next_mark, checked);

            Ok::<_, CycleError>(CycleOutcome {
                path: path.to_string(),
                line_index: loc.line_index,
                previous_mark: previous_mark.clone(),
                next_state: transition.next_state.clone(),
                next_mark: transition.next_mark.clone(),
                delegated: delegate.is_some(),
                lines: replacement,
            })
        })?;

        if self.config.is_completed_mark(&outcome.next_mark) {
            self.notify_completed(&outcome);
        }
        Ok(Some(outcome))
    }

    fn notify_completed(&self, outcome: &CycleOutcome) {
        let Some(listener) = &self.listener else {
            return;
        };
        let picked = outcome
            .lines
            .iter()
            .enumerate()
            .find(|(_, l)| checkbox_mark(l).is_some_and(|m| self.config.is_completed_mark(m)))
            .or_else(|| outcome.lines.iter().enumerate().next());
        if let Some((offset, line)) = picked
            && let Some(task) = self
                .parser
                .parse(&outcome.path, line, outcome.line_index + offset)
        {
            listener.task_completed(&task);
        }
    }

    fn report(&self, element: &TaskElement, ctx: &RenderContext, err: &CycleError) {
        let Some(state_dir) = &self.diagnostics else {
            return;
        };
        let category = match err {
            CycleError::Delegate(_) => RecoveryCategory::Delegate,
            CycleError::Locate(_)
            | CycleError::NotATask(_)
            | CycleError::Store(
                StoreError::NotFound(_) | StoreError::Unsupported(_) | StoreError::InvalidPath(_),
            ) => RecoveryCategory::Unresolved,
            // write failures are logged by the store itself
            CycleError::Store(_) => return,
        };
        let hint = match ctx.hint {
            Some(LocationHint::Section { line_start }) => format!("section at line {line_start}"),
            Some(LocationHint::Container { start, end }) => format!("container {start}..{end}"),
            None => "none".to_string(),
        };
        log_recovery(
            state_dir,
            RecoveryEntry::new(category, "status cycle skipped")
                .field("Source", ctx.source_path.as_str())
                .field("Hint", hint)
                .field("Relative line", element.relative_line.to_string())
                .field("Error", err.to_string()),
        );
    }
}

type PendingKey = (String, Option<LocationHint>, usize);

/// Coalesces rapid clicks on the same task into one cycle.
///
/// Only the last trigger inside the window runs; the mark it advances from
/// is whatever the element shows when the window closes.
pub struct DebouncedCycler {
    cycler: StatusCycler,
    pending: Debouncer<PendingKey, (TaskElement, RenderContext)>,
}

impl DebouncedCycler {
    pub fn new(cycler: StatusCycler, window: Duration) -> Self {
        DebouncedCycler {
            cycler,
            pending: Debouncer::new(window),
        }
    }

    pub fn trigger(&mut self, element: TaskElement, ctx: RenderContext, now: Instant) {
        let key = (ctx.source_path.clone(), ctx.hint, element.relative_line);
        self.pending.trigger(key, (element, ctx), now);
    }

    /// Run every trigger whose window has closed.
    pub fn flush<S: DocumentStore>(&mut self, store: &S, now: Instant) -> Vec<CycleOutcome> {
        self.pending
            .poll(now)
            .into_iter()
            .filter_map(|(element, ctx)| self.cycler.cycle_status(store, &element, &ctx))
            .collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.next_deadline()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
