//! Free-text input screen

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{Handler, HandlerKind, HandlerOutcome, Prompt, Transition, TransitionTrigger};
use crate::error::{DialogResult, ValidationError};
use crate::value_objects::{DialogRequest, DialogResponse};

/// Input check run before a value is captured
pub type Validator = Arc<dyn Fn(&str) -> Result<(), ValidationError> + Send + Sync>;

/// Asks for a line of text, validates it and stores it under `session_key`
#[derive(Clone)]
pub struct Input {
    name: String,
    prompt: Prompt,
    session_key: String,
    next_handler: String,
    validator: Option<Validator>,
}

impl Input {
    pub fn builder(name: impl Into<String>) -> InputBuilder {
        InputBuilder {
            name: name.into(),
            prompt: None,
            session_key: None,
            next_handler: None,
            validator: None,
        }
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn next_handler(&self) -> &str {
        &self.next_handler
    }

    pub fn prompt(&self, req: &DialogRequest) -> String {
        self.prompt.render(req)
    }

    pub fn validate(&self, input: &str) -> Result<(), ValidationError> {
        match &self.validator {
            Some(validator) => validator(input),
            None => Ok(()),
        }
    }
}

impl Handler for Input {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Input
    }

    fn handle(&self, mut req: DialogRequest) -> DialogResult<HandlerOutcome> {
        let prompt = self.prompt(&req);

        if req.is_empty_input() {
            req.session.begin_step(&self.name, &prompt);
            return Ok(DialogResponse::proceed(prompt, req.session).into());
        }

        if let Err(err) = self.validate(&req.input) {
            debug!(handler = %self.name, reason = %err, "input rejected");
            req.session.begin_step(&self.name, &prompt);
            return Ok(DialogResponse::proceed(err.message, req.session).into());
        }

        let value = req.input.clone();
        req.session.set(self.session_key.clone(), value.clone());
        req.session.complete_step(&self.name, &prompt, &value);
        Ok(req.into_forward(self.next_handler.clone()).into())
    }

    fn transitions(&self) -> Vec<Transition> {
        vec![Transition::new(
            self.next_handler.clone(),
            TransitionTrigger::Captured(self.session_key.clone()),
        )]
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("name", &self.name)
            .field("prompt", &self.prompt)
            .field("session_key", &self.session_key)
            .field("next_handler", &self.next_handler)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// Declaration of an [`Input`] screen
pub struct InputBuilder {
    name: String,
    prompt: Option<Prompt>,
    session_key: Option<String>,
    next_handler: Option<String>,
    validator: Option<Validator>,
}

impl InputBuilder {
    pub fn prompt(mut self, prompt: impl Into<Prompt>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Prompt computed from the request on every render
    pub fn prompt_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&DialogRequest) -> String + Send + Sync + 'static,
    {
        self.prompt = Some(Prompt::dynamic(f));
        self
    }

    pub fn session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = Some(key.into());
        self
    }

    pub fn next_handler(mut self, handler: impl Into<String>) -> Self {
        self.next_handler = Some(handler.into());
        self
    }

    pub fn validate_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(f));
        self
    }

    fn provides(&self, attribute: &str) -> bool {
        match attribute {
            "prompt" => self.prompt.is_some(),
            "session_key" => self.session_key.is_some(),
            "next_handler" => self.next_handler.is_some(),
            _ => false,
        }
    }

    pub fn build(self) -> DialogResult<Input> {
        super::check_declaration(&self.name, HandlerKind::Input, |a| self.provides(a))?;
        let prompt = super::require(&self.name, "prompt", self.prompt)?;
        let session_key = super::require(&self.name, "session_key", self.session_key)?;
        let next_handler = super::require(&self.name, "next_handler", self.next_handler)?;

        Ok(Input {
            name: self.name,
            prompt,
            session_key,
            next_handler,
            validator: self.validator,
        })
    }
}
