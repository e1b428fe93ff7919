//! Tests for requests, sessions and the handler registry

use std::sync::Arc;

use serde_json::json;
use ussd_dialog::{
    DialogError, DialogRequest, DialogResponse, DialogResult, Handler, HandlerKind,
    HandlerOutcome, HandlerRegistry, Input, List, ListItem, Menu, MenuOption, Quit, SessionState,
    TransitionTrigger,
};

/// A hand-written screen, greeting the subscriber by a stored name
struct Greeting;

impl Handler for Greeting {
    fn name(&self) -> &str {
        "greeting"
    }

    fn handle(&self, mut req: DialogRequest) -> DialogResult<HandlerOutcome> {
        let name = req.session.get_str("name").unwrap_or("stranger").to_string();
        if req.is_empty_input() {
            let text = format!("Hello {}! Press 1 to continue", name);
            req.session.begin_step(self.name(), &text);
            return Ok(DialogResponse::proceed(text, req.session).into());
        }
        let selection = req.input.clone();
        req.session.complete_step(self.name(), "Hello", &selection);
        Ok(req.into_forward("quit").into())
    }
}

fn session() -> SessionState {
    SessionState::new("314159", "12345", "en", "enter_name")
}

#[test]
fn test_create_request() {
    let req = DialogRequest::new("12345", "314159", "foo", session());
    assert_eq!(req.subscriber_id, "12345");
    assert_eq!(req.session_id, "314159");
    assert_eq!(req.input, "foo");
    assert_eq!(req.locale, "en");
    assert!(!req.is_empty_input());
}

#[test]
fn test_forward_carries_session_without_input() {
    let mut state = session();
    state.set("name", "mike");
    let req = DialogRequest::new("12345", "314159", "foo", state);

    let (forwarded, handler) = req.forward("enter_age");
    assert_eq!(handler, "enter_age");
    assert_eq!(forwarded.input, "");
    assert_eq!(forwarded.session.get_str("name"), Some("mike"));
    assert_eq!(forwarded.session_id, "314159");
    assert_eq!(forwarded.subscriber_id, "12345");
}

#[test]
fn test_create_response() {
    let res = DialogResponse::proceed("message", session());
    assert_eq!(res.to_string(), "message");
    assert!(res.continue_session);

    let res = DialogResponse::stop("bye", session());
    assert!(!res.continue_session);
    assert!(!res.to_reply().continue_session);
}

#[test]
fn test_session_values() {
    let mut state = session();
    state.set("name", "mike");
    state.set("age", 42);
    state.set("tags", json!(["a", "b"]));

    assert_eq!(state.get_str("name"), Some("mike"));
    assert_eq!(state.get_as::<u32>("age"), Some(42));
    assert_eq!(state.get_as::<Vec<String>>("tags"), Some(vec!["a".to_string(), "b".to_string()]));
    assert_eq!(state.get_as::<u32>("name"), None);

    assert_eq!(state.remove("age"), Some(json!(42)));
    assert!(!state.contains("age"));
}

#[test]
fn test_custom_handler() {
    let handler = Greeting;
    assert_eq!(handler.kind(), HandlerKind::Custom);

    let mut state = session();
    state.set("name", "mike");
    let outcome = handler
        .handle(DialogRequest::new("12345", "314159", "", state))
        .unwrap();

    let response = match outcome {
        HandlerOutcome::Respond(response) => response,
        other => panic!("expected a response, got {:?}", other),
    };
    assert_eq!(response.text, "Hello mike! Press 1 to continue");

    let outcome = handler
        .handle(DialogRequest::new("12345", "314159", "1", response.session))
        .unwrap();
    match outcome {
        HandlerOutcome::Forward(req, next) => {
            assert_eq!(next, "quit");
            assert_eq!(req.session.last_step().unwrap().selection.as_deref(), Some("1"));
        }
        other => panic!("expected a forward, got {:?}", other),
    }
}

#[test]
fn test_missing_attributes_name_the_handler() {
    let err = Input::builder("enter_name")
        .prompt("Enter name:")
        .next_handler("quit")
        .build()
        .unwrap_err();
    assert_eq!(err, DialogError::missing_attribute("enter_name", "session_key"));

    let err = Menu::builder("main_menu").prompt("Main").build().unwrap_err();
    assert_eq!(err, DialogError::missing_attribute("main_menu", "options"));

    let err = List::builder("pick")
        .prompt("Pick")
        .items_per_page(3)
        .session_key("choice")
        .next_handler("quit")
        .build()
        .unwrap_err();
    assert_eq!(err, DialogError::missing_attribute("pick", "items"));

    let err = Quit::builder("quit").build().unwrap_err();
    assert_eq!(err, DialogError::missing_attribute("quit", "message"));
    assert!(err.is_configuration_error());
}

#[test]
fn test_required_attributes_per_kind() {
    assert_eq!(
        HandlerKind::Input.required_attributes(),
        &["prompt", "session_key", "next_handler"]
    );
    assert_eq!(HandlerKind::Menu.required_attributes(), &["prompt", "options"]);
    assert_eq!(HandlerKind::Quit.required_attributes(), &["message"]);
    assert!(HandlerKind::Custom.required_attributes().is_empty());
}

fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register(
            Input::builder("enter_name")
                .prompt("Enter name:")
                .session_key("name")
                .next_handler("main_menu")
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .register(
            Menu::builder("main_menu")
                .prompt("Main menu")
                .option(MenuOption::new("Languages", "select_language"))
                .option(MenuOption::new("Greeting", "greeting"))
                .option(MenuOption::new("Exit", "quit").with_symbol("0"))
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .register(
            List::builder("select_language")
                .prompt("Choose a language")
                .items_per_page(2)
                .session_key("language")
                .next_handler("quit")
                .items([ListItem::new("Python", "py"), ListItem::new("Rust", "rs")])
                .option(MenuOption::new("Home", "main_menu"))
                .build()
                .unwrap(),
        )
        .unwrap();
    registry.register(Greeting).unwrap();
    registry
        .register(Quit::builder("quit").message("Goodbye!").build().unwrap())
        .unwrap();
    registry
}

#[test]
fn test_registry_resolves_by_name() {
    let registry = registry();
    assert_eq!(registry.len(), 5);
    assert_eq!(registry.resolve("main_menu").unwrap().kind(), HandlerKind::Menu);
    assert_eq!(
        registry.resolve("missing").err().unwrap(),
        DialogError::unknown_handler("missing")
    );
    assert_eq!(
        registry.names().collect::<Vec<_>>(),
        vec!["enter_name", "greeting", "main_menu", "quit", "select_language"]
    );
    registry.validate().unwrap();
}

#[test]
fn test_registry_rejects_duplicates() {
    let mut registry = registry();
    let err = registry
        .register_arc(Arc::new(Quit::builder("quit").message("Bye").build().unwrap()))
        .unwrap_err();
    assert_eq!(err, DialogError::DuplicateHandler { name: "quit".to_string() });
    assert_eq!(registry.len(), 5);
}

#[test]
fn test_registry_reports_dangling_targets() {
    let mut registry = HandlerRegistry::new();
    registry
        .register(
            Menu::builder("main_menu")
                .prompt("Main menu")
                .option(MenuOption::new("Balance", "check_balance"))
                .build()
                .unwrap(),
        )
        .unwrap();
    assert_eq!(
        registry.validate().unwrap_err(),
        DialogError::DanglingTarget {
            from: "main_menu".to_string(),
            to: "check_balance".to_string(),
        }
    );
}

#[test]
fn test_workflow_graph() {
    let workflow = registry().workflow("enter_name").unwrap();

    // Greeting declares no transitions, so quit is reached through the list
    // and the menu only
    assert_eq!(workflow.nodes.len(), 5);
    assert_eq!(workflow.nodes.get("enter_name"), Some(&HandlerKind::Input));
    assert_eq!(workflow.nodes.get("greeting"), Some(&HandlerKind::Custom));

    let from_name: Vec<_> = workflow.edges_from("enter_name").collect();
    assert_eq!(from_name.len(), 1);
    assert_eq!(from_name[0].to, "main_menu");
    assert_eq!(from_name[0].trigger, TransitionTrigger::Captured("name".to_string()));

    let targets: Vec<_> = workflow
        .edges_from("main_menu")
        .map(|edge| edge.to.as_str())
        .collect();
    assert_eq!(targets, vec!["select_language", "greeting", "quit"]);

    assert!(workflow.edges_from("quit").next().is_none());
}

#[test]
fn test_session_serializes_to_json() {
    let mut state = session();
    state.set("name", "mike");
    state.begin_step("enter_name", "Enter name:");

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["active_handler"], "enter_name");
    assert_eq!(json["values"]["name"], "mike");
    assert_eq!(json["steps"][0]["name"], "enter_name");

    let restored: SessionState = serde_json::from_value(json).unwrap();
    assert_eq!(restored, state);
}
