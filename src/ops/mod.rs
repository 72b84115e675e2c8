pub mod canvas;
pub mod duplicate;
pub mod locate;
pub mod mutate;
pub mod status_cycle;

pub use canvas::{CanvasOutcome, CanvasTaskUpdater, DuplicateRoute, UnsupportedCanvas, route_duplicate};
pub use duplicate::{
    DuplicateError, DuplicateResult, describe_duplicate, duplicate_line, duplicate_task,
    duplicate_task_on,
};
pub use locate::{LocateError, locate_task_line, resolve_location};
pub use mutate::mutate_lines;
pub use status_cycle::{
    CompletionListener, CycleError, CycleOutcome, DebouncedCycler, RecurrenceApi, StatusCycler,
    Transition, apply_transition, next_transition,
};
