//! Snapshot Store (C1). See §4.1.

pub mod store;
pub mod types;

pub use store::SnapshotStore;
pub use types::{Coordinates, ResolvedLocation, Snapshot, SnapshotRequest, WeatherSnapshot};
