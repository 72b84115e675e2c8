use serde::Serialize;

use crate::ops::status_cycle::{CycleOutcome, Transition};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CycleJson {
    pub changed: bool,
    #[serde(flatten)]
    pub outcome: Option<CycleOutcome>,
}

#[derive(Serialize)]
pub struct NextJson {
    pub mark: String,
    pub state: String,
    pub next_state: String,
    pub next_mark: String,
    pub entering_done: bool,
    pub leaving_done: bool,
}

impl NextJson {
    pub fn new(mark: &str, t: &Transition) -> Self {
        NextJson {
            mark: mark.to_string(),
            state: t.current_state.clone(),
            next_state: t.next_state.clone(),
            next_mark: t.next_mark.clone(),
            entering_done: t.entering_done,
            leaving_done: t.leaving_done,
        }
    }
}

#[derive(Serialize)]
pub struct DescribeJson {
    pub description: String,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn format_cycle(outcome: Option<&CycleOutcome>) -> String {
    match outcome {
        None => "no change".to_string(),
        Some(o) => {
            let mut out = format!(
                "line {}: [{}] → [{}] {}",
                o.line_index, o.previous_mark, o.next_mark, o.next_state
            );
            if o.delegated {
                out.push_str(" (recurrence)");
            }
            out
        }
    }
}

pub fn format_next(mark: &str, t: &Transition) -> String {
    format!(
        "[{}] {} → [{}] {}",
        mark, t.current_state, t.next_mark, t.next_state
    )
}
