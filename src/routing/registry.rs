//! Handler registry - maps screen names to handler instances

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{DialogError, DialogResult};
use crate::handlers::Handler;

/// Table of every handler a dialog can reach.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register a handler under its own name
    pub fn register<H>(&mut self, handler: H) -> DialogResult<()>
    where
        H: Handler + 'static,
    {
        self.register_arc(Arc::new(handler))
    }

    /// Register a shared handler under its own name.
    ///
    /// Fails if the name is taken; a handler never silently replaces another.
    /// Also fails if the handler reports a missing required attribute.
    pub fn register_arc(&mut self, handler: Arc<dyn Handler>) -> DialogResult<()> {
        let name = handler.name().to_string();
        if let Some(attribute) = handler.missing_attribute() {
            error!(handler = %name, attribute, "handler is missing a required attribute");
            return Err(DialogError::missing_attribute(name, attribute));
        }
        if self.handlers.contains_key(&name) {
            error!(handler = %name, "duplicate handler registration");
            return Err(DialogError::DuplicateHandler { name });
        }
        debug!(handler = %name, kind = ?handler.kind(), "handler registered");
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Register several handlers, stopping at the first failure
    pub fn register_all<I>(&mut self, handlers: I) -> DialogResult<()>
    where
        I: IntoIterator<Item = Arc<dyn Handler>>,
    {
        for handler in handlers {
            self.register_arc(handler)?;
        }
        Ok(())
    }

    /// Look up a handler by name
    pub fn resolve(&self, name: &str) -> DialogResult<Arc<dyn Handler>> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| DialogError::unknown_handler(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Check that every declared transition points at a registered handler
    pub fn validate(&self) -> DialogResult<()> {
        for (name, handler) in &self.handlers {
            for transition in handler.transitions() {
                if !self.handlers.contains_key(&transition.target) {
                    error!(from = %name, to = %transition.target, "transition to unregistered handler");
                    return Err(DialogError::DanglingTarget {
                        from: name.clone(),
                        to: transition.target,
                    });
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{HandlerOutcome, Input, Quit};
    use crate::value_objects::{DialogRequest, DialogResponse};

    struct Echo;

    impl Handler for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn handle(&self, req: DialogRequest) -> DialogResult<HandlerOutcome> {
            let text = req.input.clone();
            Ok(DialogResponse::proceed(text, req.session).into())
        }
    }

    fn quit() -> Quit {
        Quit::builder("quit").message("Goodbye!").build().unwrap()
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = HandlerRegistry::new();
        registry.register(Echo).unwrap();
        registry.register(quit()).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("echo").unwrap().name(), "echo");
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["echo", "quit"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = HandlerRegistry::new();
        registry.register(Echo).unwrap();
        let err = registry.register(Echo).unwrap_err();
        assert_eq!(
            err,
            DialogError::DuplicateHandler {
                name: "echo".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    /// Greets with a configurable text that must be set before use
    struct Greeter {
        greeting: Option<String>,
    }

    impl Handler for Greeter {
        fn name(&self) -> &str {
            "greeter"
        }

        fn handle(&self, req: DialogRequest) -> DialogResult<HandlerOutcome> {
            let text = self.greeting.clone().unwrap_or_default();
            Ok(DialogResponse::proceed(text, req.session).into())
        }

        fn missing_attribute(&self) -> Option<&'static str> {
            crate::handlers::first_missing(&["greeting"], |attribute| match attribute {
                "greeting" => self.greeting.is_some(),
                _ => false,
            })
        }
    }

    #[test]
    fn test_incomplete_custom_handler_is_refused() {
        let mut registry = HandlerRegistry::new();
        let err = registry.register(Greeter { greeting: None }).unwrap_err();
        assert_eq!(err, DialogError::missing_attribute("greeter", "greeting"));
        assert!(registry.is_empty());

        registry
            .register(Greeter {
                greeting: Some("Hello".to_string()),
            })
            .unwrap();
        assert!(registry.contains("greeter"));
    }

    #[test]
    fn test_unknown_handler() {
        let registry = HandlerRegistry::new();
        let err = registry.resolve("missing").err().unwrap();
        assert_eq!(err, DialogError::unknown_handler("missing"));
    }

    #[test]
    fn test_validate_reports_dangling_target() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(
                Input::builder("enter_name")
                    .prompt("Enter name:")
                    .session_key("name")
                    .next_handler("enter_email")
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let err = registry.validate().unwrap_err();
        assert_eq!(
            err,
            DialogError::DanglingTarget {
                from: "enter_name".to_string(),
                to: "enter_email".to_string()
            }
        );
    }
}
