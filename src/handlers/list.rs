//! Paginated list selection screen
//!
//! Items are numbered by their position in the full list, so the numbers a
//! subscriber sees on page two continue from page one. When more items
//! follow, one extra "More" entry advances the page. Trailing menu options
//! continue the numbering after that.
//!
//! ```text
//! Choose a language      Choose a language
//! 1. Python              3. Java
//! 2. Ruby                4. Haskell
//! 3. More                5. Home
//! 4. Home                * Back
//! * Back
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::options::render_options;
use super::{Handler, HandlerKind, HandlerOutcome, Prompt, Transition, TransitionTrigger};
use crate::error::{DialogError, DialogResult};
use crate::value_objects::{DialogRequest, DialogResponse, ListItem, MenuOption};

const DEFAULT_ERROR_PROMPT: &str = "Please enter a valid choice.";
const DEFAULT_EMPTY_PROMPT: &str = "No items available.";
const DEFAULT_MORE_LABEL: &str = "More";

/// Where a list gets its items from
#[derive(Clone)]
pub enum ItemSource {
    Fixed(Vec<ListItem>),
    /// Evaluated on every render
    Supplier(Arc<dyn Fn(&DialogRequest) -> Vec<ListItem> + Send + Sync>),
}

impl ItemSource {
    pub fn items(&self, req: &DialogRequest) -> Vec<ListItem> {
        match self {
            ItemSource::Fixed(items) => items.clone(),
            ItemSource::Supplier(f) => f(req),
        }
    }
}

impl fmt::Debug for ItemSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemSource::Fixed(items) => f.debug_tuple("Fixed").field(items).finish(),
            ItemSource::Supplier(_) => f.write_str("Supplier(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry<'a> {
    Item(usize),
    More,
    Option(&'a MenuOption),
}

/// One rendered page: display lines and the input that selects each entry
struct Page<'a> {
    lines: Vec<String>,
    entries: Vec<(String, Entry<'a>)>,
}

impl<'a> Page<'a> {
    fn resolve(&self, input: &str) -> Option<Entry<'a>> {
        self.entries
            .iter()
            .find(|(key, _)| key == input)
            .map(|(_, entry)| *entry)
    }
}

/// Lets the subscriber pick one item from a paginated list
#[derive(Debug, Clone)]
pub struct List {
    name: String,
    prompt: Prompt,
    error_prompt: Prompt,
    empty_prompt: Prompt,
    more_label: String,
    items_per_page: usize,
    session_key: String,
    next_handler: String,
    items: ItemSource,
    options: Vec<MenuOption>,
}

impl List {
    pub fn builder(name: impl Into<String>) -> ListBuilder {
        ListBuilder {
            name: name.into(),
            prompt: None,
            error_prompt: None,
            empty_prompt: None,
            more_label: None,
            items_per_page: None,
            session_key: None,
            next_handler: None,
            items: None,
            options: Vec::new(),
        }
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// Number of pages needed for `total` items
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.items_per_page)
    }

    fn page<'a>(&'a self, items: &[ListItem], page: usize) -> Page<'a> {
        let start = page * self.items_per_page;
        let end = (start + self.items_per_page).min(items.len());
        let mut lines = Vec::new();
        let mut entries = Vec::new();

        for (index, item) in items.iter().enumerate().take(end).skip(start) {
            let number = index + 1;
            lines.push(format!("{}. {}", number, item.label));
            entries.push((number.to_string(), Entry::Item(index)));
        }

        let mut next_number = end + 1;
        if end < items.len() {
            lines.push(format!("{}. {}", next_number, self.more_label));
            entries.push((next_number.to_string(), Entry::More));
            next_number += 1;
        }

        for rendered in render_options(&self.options, next_number) {
            lines.push(rendered.line);
            for key in rendered.keys {
                entries.push((key, Entry::Option(rendered.option)));
            }
        }

        Page { lines, entries }
    }

    fn screen(&self, heading: &str, page: &Page<'_>) -> String {
        super::compose_screen(heading, &page.lines)
    }

    /// The text shown for `page` of the current items
    pub fn render(&self, req: &DialogRequest, page: usize) -> String {
        let items = self.items.items(req);
        if items.is_empty() {
            return self.empty_prompt.render(req);
        }
        self.screen(&self.prompt.render(req), &self.page(&items, page))
    }
}

impl Handler for List {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::List
    }

    fn handle(&self, mut req: DialogRequest) -> DialogResult<HandlerOutcome> {
        let items = self.items.items(&req);

        if items.is_empty() {
            let text = self.empty_prompt.render(&req);
            req.session.page = None;
            req.session.begin_step(&self.name, &text);
            return Ok(DialogResponse::proceed(text, req.session).into());
        }

        let last_page = self.page_count(items.len()) - 1;
        let current = req.session.page.unwrap_or(0).min(last_page);
        let page = self.page(&items, current);
        let text = self.screen(&self.prompt.render(&req), &page);

        if req.is_empty_input() {
            req.session.page = Some(current);
            req.session.begin_step(&self.name, &text);
            return Ok(DialogResponse::proceed(text, req.session).into());
        }

        match page.resolve(req.trimmed_input()) {
            Some(Entry::Item(index)) => {
                let selection = req.input.clone();
                req.session
                    .set(self.session_key.clone(), items[index].value.clone());
                req.session.page = None;
                req.session.complete_step(&self.name, &text, &selection);
                Ok(req.into_forward(self.next_handler.clone()).into())
            }
            Some(Entry::More) => {
                let next = current + 1;
                let text = self.screen(&self.prompt.render(&req), &self.page(&items, next));
                req.session.page = Some(next);
                req.session.refresh_step(&self.name, &text);
                Ok(DialogResponse::proceed(text, req.session).into())
            }
            Some(Entry::Option(option)) => {
                let selection = req.input.clone();
                req.session.page = None;
                req.session.complete_step(&self.name, &text, &selection);
                Ok(req.into_forward(option.target.clone()).into())
            }
            None => {
                debug!(handler = %self.name, input = %req.input, page = current, "no matching list entry");
                req.session.page = Some(current);
                req.session.begin_step(&self.name, &text);
                let error_text = self.screen(&self.error_prompt.render(&req), &page);
                Ok(DialogResponse::proceed(error_text, req.session).into())
            }
        }
    }

    fn transitions(&self) -> Vec<Transition> {
        let mut transitions = vec![Transition::new(
            self.next_handler.clone(),
            TransitionTrigger::Captured(self.session_key.clone()),
        )];
        transitions.extend(self.options.iter().map(|option| {
            Transition::new(
                option.target.clone(),
                TransitionTrigger::Option(option.label.clone()),
            )
        }));
        transitions
    }
}

/// Declaration of a [`List`] screen
pub struct ListBuilder {
    name: String,
    prompt: Option<Prompt>,
    error_prompt: Option<Prompt>,
    empty_prompt: Option<Prompt>,
    more_label: Option<String>,
    items_per_page: Option<usize>,
    session_key: Option<String>,
    next_handler: Option<String>,
    items: Option<ItemSource>,
    options: Vec<MenuOption>,
}

impl ListBuilder {
    pub fn prompt(mut self, prompt: impl Into<Prompt>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn error_prompt(mut self, prompt: impl Into<Prompt>) -> Self {
        self.error_prompt = Some(prompt.into());
        self
    }

    pub fn empty_prompt(mut self, prompt: impl Into<Prompt>) -> Self {
        self.empty_prompt = Some(prompt.into());
        self
    }

    pub fn more_label(mut self, label: impl Into<String>) -> Self {
        self.more_label = Some(label.into());
        self
    }

    pub fn items_per_page(mut self, count: usize) -> Self {
        self.items_per_page = Some(count);
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

    pub fn items(mut self, items: impl IntoIterator<Item = ListItem>) -> Self {
        self.items = Some(ItemSource::Fixed(items.into_iter().collect()));
        self
    }

    /// Items computed from the request on every render
    pub fn items_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&DialogRequest) -> Vec<ListItem> + Send + Sync + 'static,
    {
        self.items = Some(ItemSource::Supplier(Arc::new(f)));
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
            "items_per_page" => self.items_per_page.is_some(),
            "session_key" => self.session_key.is_some(),
            "next_handler" => self.next_handler.is_some(),
            "items" => self.items.is_some(),
            _ => false,
        }
    }

    pub fn build(self) -> DialogResult<List> {
        super::check_declaration(&self.name, HandlerKind::List, |a| self.provides(a))?;
        let prompt = super::require(&self.name, "prompt", self.prompt)?;
        let items_per_page = super::require(&self.name, "items_per_page", self.items_per_page)?;
        let session_key = super::require(&self.name, "session_key", self.session_key)?;
        let next_handler = super::require(&self.name, "next_handler", self.next_handler)?;
        let items = super::require(&self.name, "items", self.items)?;

        if items_per_page == 0 {
            return Err(DialogError::config(format!(
                "list '{}' must show at least one item per page",
                self.name
            )));
        }

        Ok(List {
            name: self.name,
            prompt,
            error_prompt: self
                .error_prompt
                .unwrap_or_else(|| Prompt::from(DEFAULT_ERROR_PROMPT)),
            empty_prompt: self
                .empty_prompt
                .unwrap_or_else(|| Prompt::from(DEFAULT_EMPTY_PROMPT)),
            more_label: self
                .more_label
                .unwrap_or_else(|| DEFAULT_MORE_LABEL.to_string()),
            items_per_page,
            session_key,
            next_handler,
            items,
            options: self.options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SessionState;

    fn letters(count: usize) -> List {
        List::builder("select_letter")
            .prompt("Pick")
            .items_per_page(2)
            .session_key("letter")
            .next_handler("done")
            .items((0..count).map(|i| {
                let label = ((b'A' + i as u8) as char).to_string();
                ListItem::new(label.clone(), label)
            }))
            .option(MenuOption::new("Home", "home"))
            .option(MenuOption::new("Back", "back").with_symbol("*"))
            .build()
            .unwrap()
    }

    fn request() -> DialogRequest {
        let session = SessionState::new("1", "12345", "en", "select_letter");
        DialogRequest::new("12345", "1", "", session)
    }

    #[test]
    fn test_page_count() {
        let list = letters(5);
        assert_eq!(list.page_count(5), 3);
        assert_eq!(list.page_count(4), 2);
        assert_eq!(list.page_count(1), 1);
    }

    #[test]
    fn test_middle_page_of_three() {
        let list = letters(6);
        assert_eq!(
            list.render(&request(), 1),
            "Pick\n3. C\n4. D\n5. More\n6. Home\n* Back"
        );
    }

    #[test]
    fn test_last_page_of_three() {
        let list = letters(5);
        assert_eq!(list.render(&request(), 2), "Pick\n5. E\n6. Home\n* Back");
    }

    #[test]
    fn test_zero_items_per_page_is_rejected() {
        let err = List::builder("select_letter")
            .prompt("Pick")
            .items_per_page(0)
            .session_key("letter")
            .next_handler("done")
            .items(Vec::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, DialogError::Config(_)));
    }

    #[test]
    fn test_missing_items() {
        let err = List::builder("select_letter")
            .prompt("Pick")
            .items_per_page(2)
            .session_key("letter")
            .next_handler("done")
            .build()
            .unwrap_err();
        assert_eq!(err, DialogError::missing_attribute("select_letter", "items"));
    }
}
