//! Terminal screen

use super::{Handler, HandlerKind, HandlerOutcome, Prompt};
use crate::error::DialogResult;
use crate::value_objects::{DialogRequest, DialogResponse};

/// Shows a final message and ends the session
#[derive(Debug, Clone)]
pub struct Quit {
    name: String,
    message: Prompt,
}

impl Quit {
    pub fn builder(name: impl Into<String>) -> QuitBuilder {
        QuitBuilder {
            name: name.into(),
            message: None,
        }
    }
}

impl Handler for Quit {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Quit
    }

    fn handle(&self, mut req: DialogRequest) -> DialogResult<HandlerOutcome> {
        let message = self.message.render(&req);
        req.session.page = None;
        req.session.record_instant_step(&self.name, &message, "");
        Ok(DialogResponse::stop(message, req.session).into())
    }
}

/// Declaration of a [`Quit`] screen
pub struct QuitBuilder {
    name: String,
    message: Option<Prompt>,
}

impl QuitBuilder {
    pub fn message(mut self, message: impl Into<Prompt>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn message_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&DialogRequest) -> String + Send + Sync + 'static,
    {
        self.message = Some(Prompt::dynamic(f));
        self
    }

    fn provides(&self, attribute: &str) -> bool {
        attribute == "message" && self.message.is_some()
    }

    pub fn build(self) -> DialogResult<Quit> {
        super::check_declaration(&self.name, HandlerKind::Quit, |a| self.provides(a))?;
        let message = super::require(&self.name, "message", self.message)?;
        Ok(Quit {
            name: self.name,
            message,
        })
    }
}
