//! Event Bus (C7). See §4.7.

pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::{EventKind, JobEvent};
