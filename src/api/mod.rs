//! Ingress layer (C10 + §6 external interfaces).

pub mod routes;
pub mod sse;
pub mod state;

pub use routes::create_triad_router;
pub use state::AppState;
