//! USSD-style dialog engine
//!
//! Drives multi-turn menu and input sessions over a stateless
//! request/response gateway. Each exchange carries a subscriber id, a session
//! id and one line of input; the engine replies with one screen of text and a
//! flag telling the gateway whether to keep the session open.
//!
//! The pieces:
//! - A registry of named handlers (screens), built once at startup
//! - A dispatcher that resolves the active handler from session state and
//!   follows forwards between handlers within a turn
//! - Generic screens: free-text input, single-choice menu, paginated list,
//!   and a terminal quit screen
//! - A per-session audit trail of the screens visited and the choices made

pub mod aggregate;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod routing;
pub mod store;
pub mod value_objects;

// Re-export main types
pub use aggregate::SessionState;

pub use config::EngineConfig;

pub use dispatcher::Dispatcher;

pub use error::{DialogError, DialogResult, ValidationError};

pub use handlers::{
    Handler, HandlerKind, HandlerOutcome, Prompt, Transition, TransitionTrigger, first_missing,
    Input, InputBuilder, List, ListBuilder, ItemSource, Menu, MenuBuilder, Quit, QuitBuilder,
};

pub use routing::{HandlerRegistry, Workflow, WorkflowEdge};

pub use store::{FileSessionStore, InMemorySessionStore, SessionStore};

pub use value_objects::{
    DialogRequest, DialogResponse, GatewayReply, GatewayRequest,
    ListItem, MenuOption, StepRecord,
};
