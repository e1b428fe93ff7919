//! Handler routing: the name → handler registry and its workflow graph

pub mod registry;
pub mod workflow;

pub use registry::HandlerRegistry;
pub use workflow::{Workflow, WorkflowEdge};
