//! Single-choice menu screen

use tracing::debug;

use super::options::{RenderedOption, render_options};
use super::{Handler, HandlerKind, HandlerOutcome, Prompt, Transition, TransitionTrigger};
use crate::error::DialogResult;
use crate::value_objects::{DialogRequest, DialogResponse, MenuOption};

const DEFAULT_ERROR_PROMPT: &str = "Please enter a valid choice.";

/// Shows a prompt and a fixed list of options, each leading to another handler
#[derive(Debug, Clone)]
pub struct Menu {
    name: String,
    prompt: Prompt,
    error_prompt: Prompt,
    options: Vec<MenuOption>,
}

impl Menu {
    pub fn builder(name: impl Into<String>) -> MenuBuilder {
        MenuBuilder {
            name: name.into(),
            prompt: None,
            error_prompt: None,
            options: Vec::new(),
        }
    }

    pub fn options(&self) -> &[MenuOption] {
        &self.options
    }

    fn rendered(&self) -> Vec<RenderedOption<'_>> {
        render_options(&self.options, 1)
    }

    fn screen(&self, heading: &str, rendered: &[RenderedOption<'_>]) -> String {
        let lines: Vec<String> = rendered.iter().map(|r| r.line.clone()).collect();
        super::compose_screen(heading, &lines)
    }

    /// The menu as first displayed
    pub fn render(&self, req: &DialogRequest) -> String {
        self.screen(&self.prompt.render(req), &self.rendered())
    }
}

impl Handler for Menu {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Menu
    }

    fn handle(&self, mut req: DialogRequest) -> DialogResult<HandlerOutcome> {
        let rendered = self.rendered();
        let text = self.screen(&self.prompt.render(&req), &rendered);

        if req.is_empty_input() {
            req.session.begin_step(&self.name, &text);
            return Ok(DialogResponse::proceed(text, req.session).into());
        }

        let choice = req.trimmed_input();
        match rendered.iter().find(|r| r.accepts(choice)) {
            Some(selected) => {
                let target = selected.option.target.clone();
                let selection = req.input.clone();
                req.session.complete_step(&self.name, &text, &selection);
                Ok(req.into_forward(target).into())
            }
            None => {
                debug!(handler = %self.name, input = %req.input, "no matching menu option");
                req.session.begin_step(&self.name, &text);
                let error_text = self.screen(&self.error_prompt.render(&req), &rendered);
                Ok(DialogResponse::proceed(error_text, req.session).into())
            }
        }
    }

    fn transitions(&self) -> Vec<Transition> {
        self.options
            .iter()
            .map(|option| {
                Transition::new(
                    option.target.clone(),
                    TransitionTrigger::Option(option.label.clone()),
                )
            })
            .collect()
    }
}

/// Declaration of a [`Menu`] screen
pub struct MenuBuilder {
    name: String,
    prompt: Option<Prompt>,
    error_prompt: Option<Prompt>,
    options: Vec<MenuOption>,
}

impl MenuBuilder {
    pub fn prompt(mut self, prompt: impl Into<Prompt>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn error_prompt(mut self, prompt: impl Into<Prompt>) -> Self {
        self.error_prompt = Some(prompt.into());
        self
    }

    pub fn option(mut self, option: MenuOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = MenuOption>) -> Self {
        self.options.extend(options);
        self
    }

    fn provides(&self, attribute: &str) -> bool {
        match attribute {
            "prompt" => self.prompt.is_some(),
            "options" => !self.options.is_empty(),
            _ => false,
        }
    }

    pub fn build(self) -> DialogResult<Menu> {
        super::check_declaration(&self.name, HandlerKind::Menu, |a| self.provides(a))?;
        let prompt = super::require(&self.name, "prompt", self.prompt)?;
        let options = super::require(
            &self.name,
            "options",
            Some(self.options).filter(|options| !options.is_empty()),
        )?;

        Ok(Menu {
            name: self.name,
            prompt,
            error_prompt: self
                .error_prompt
                .unwrap_or_else(|| Prompt::from(DEFAULT_ERROR_PROMPT)),
            options,
        })
    }
}
