//! Model Adapter Layer (C3). See §4.3.

pub mod adapter;
pub mod provider;
pub mod types;

use std::sync::Arc;

pub use adapter::ModelAdapter;
pub use provider::HttpModelProvider;
pub use types::{ModelConstraints, ModelRequest, ModelResponse, ModelUsage, ReasoningEffort, Role};

/// The three role handles, wired once at startup (Design Notes: "the
/// Orchestrator holds three handles ... wired at startup. No virtual
/// fallback chain").
#[derive(Clone)]
pub struct RoleHandles {
    pub strategist: Arc<dyn ModelAdapter>,
    pub planner: Arc<dyn ModelAdapter>,
    pub validator: Arc<dyn ModelAdapter>,
}

impl RoleHandles {
    pub fn for_role(&self, role: Role) -> &Arc<dyn ModelAdapter> {
        match role {
            Role::Strategist => &self.strategist,
            Role::Planner => &self.planner,
            Role::Validator => &self.validator,
        }
    }
}
