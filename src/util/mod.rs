pub mod debounce;

pub use debounce::Debouncer;

use chrono::{Local, NaiveDate};

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
