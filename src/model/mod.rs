pub mod config;
pub mod location;
pub mod task;

pub use config::*;
pub use location::*;
pub use task::*;
