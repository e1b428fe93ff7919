//! Dialog handlers (screens)
//!
//! A handler receives the request for one turn and either answers with a
//! screen, keeping the session on itself, or forwards the request to another
//! handler. Handlers are shared by every session and keep no state of their
//! own: anything that must survive a turn goes into the session.

pub mod input;
pub mod list;
pub mod menu;
mod options;
pub mod quit;

pub use input::{Input, InputBuilder, Validator};
pub use list::{ItemSource, List, ListBuilder};
pub use menu::{Menu, MenuBuilder};
pub use quit::{Quit, QuitBuilder};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{DialogError, DialogResult};
use crate::value_objects::{DialogRequest, DialogResponse};

/// What a handler decided for the current turn
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// Reply to the subscriber; this handler also receives the next turn
    Respond(DialogResponse),
    /// Pass the (input-cleared) request on to the named handler
    Forward(DialogRequest, String),
}

impl From<DialogResponse> for HandlerOutcome {
    fn from(response: DialogResponse) -> Self {
        HandlerOutcome::Respond(response)
    }
}

impl From<(DialogRequest, String)> for HandlerOutcome {
    fn from((request, handler): (DialogRequest, String)) -> Self {
        HandlerOutcome::Forward(request, handler)
    }
}

/// The generic screen behaviors, plus anything hand-written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerKind {
    Input,
    Menu,
    List,
    Quit,
    Custom,
}

impl HandlerKind {
    /// Attributes a declaration of this kind must provide
    pub fn required_attributes(&self) -> &'static [&'static str] {
        match self {
            HandlerKind::Input => &["prompt", "session_key", "next_handler"],
            HandlerKind::Menu => &["prompt", "options"],
            HandlerKind::List => &[
                "prompt",
                "items_per_page",
                "session_key",
                "next_handler",
                "items",
            ],
            HandlerKind::Quit => &["message"],
            HandlerKind::Custom => &[],
        }
    }
}

/// How a transition is triggered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionTrigger {
    /// The subscriber picked the option with this label
    Option(String),
    /// A value was captured under this session key
    Captured(String),
    /// Anything else a custom handler wants to describe
    Other(String),
}

/// An outgoing edge declared by a handler
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub target: String,
    pub trigger: TransitionTrigger,
}

impl Transition {
    pub fn new(target: impl Into<String>, trigger: TransitionTrigger) -> Self {
        Self {
            target: target.into(),
            trigger,
        }
    }
}

/// A named unit of dialog logic
pub trait Handler: Send + Sync {
    /// Name the handler is registered under
    fn name(&self) -> &str;

    fn kind(&self) -> HandlerKind {
        HandlerKind::Custom
    }

    /// Process one turn
    fn handle(&self, req: DialogRequest) -> DialogResult<HandlerOutcome>;

    /// Handlers this one can forward to
    fn transitions(&self) -> Vec<Transition> {
        Vec::new()
    }

    /// A required attribute this instance lacks, if any.
    ///
    /// Checked on registration. Custom handlers declaring their own
    /// requirements usually answer with [`first_missing`].
    fn missing_attribute(&self) -> Option<&'static str> {
        None
    }
}

/// Screen heading, fixed or computed from the request
#[derive(Clone)]
pub enum Prompt {
    Text(String),
    Dynamic(Arc<dyn Fn(&DialogRequest) -> String + Send + Sync>),
}

impl Prompt {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&DialogRequest) -> String + Send + Sync + 'static,
    {
        Prompt::Dynamic(Arc::new(f))
    }

    pub fn render(&self, req: &DialogRequest) -> String {
        match self {
            Prompt::Text(text) => text.clone(),
            Prompt::Dynamic(f) => f(req),
        }
    }
}

impl fmt::Debug for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Prompt::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Text(text)
    }
}

/// Unwrap a declared attribute or fail naming it
pub(crate) fn require<T>(handler: &str, attribute: &str, value: Option<T>) -> DialogResult<T> {
    value.ok_or_else(|| DialogError::missing_attribute(handler, attribute))
}

pub(crate) fn require_name(name: &str) -> DialogResult<()> {
    if name.trim().is_empty() {
        return Err(DialogError::missing_attribute("<unnamed>", "name"));
    }
    Ok(())
}

/// Check a declaration against the attributes its kind requires.
///
/// `provided` answers whether the declaration sets an attribute; a name it
/// does not know counts as missing.
pub(crate) fn check_declaration<F>(handler: &str, kind: HandlerKind, provided: F) -> DialogResult<()>
where
    F: Fn(&str) -> bool,
{
    require_name(handler)?;
    match first_missing(kind.required_attributes(), provided) {
        Some(attribute) => Err(DialogError::missing_attribute(handler, attribute)),
        None => Ok(()),
    }
}

/// The first of `required` that `provided` rejects
pub fn first_missing<F>(required: &[&'static str], provided: F) -> Option<&'static str>
where
    F: Fn(&str) -> bool,
{
    required.iter().copied().find(|attribute| !provided(attribute))
}

/// Heading followed by one line per entry
pub(crate) fn compose_screen(heading: &str, lines: &[String]) -> String {
    let heading = heading.trim_end_matches('\n');
    let mut text = String::from(heading);
    for line in lines {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(line);
    }
    text
}
