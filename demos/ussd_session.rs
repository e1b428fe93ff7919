//! USSD Session Example
//!
//! Plays a scripted subscriber through a small dialog:
//! - Free-text input with validation
//! - A menu with a symbol option
//! - A hand-written handler that forwards without a screen
//! - A paginated list fed from session state
//! - A closing screen
//!
//! Run with `RUST_LOG=ussd_dialog=debug` to see the engine's turn logs.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ussd_dialog::{
    DialogRequest, DialogResult, Dispatcher, EngineConfig, GatewayRequest, Handler,
    HandlerOutcome, HandlerRegistry, InMemorySessionStore, Input, List, ListItem, Menu,
    MenuOption, Prompt, Quit, Transition, TransitionTrigger, ValidationError,
};

const CONFIG: &str = r#"
start_handler = "enter_name"
max_forwards = 5
failure_message = "Sorry, something went wrong."
session_ttl_secs = 180
"#;

/// Remembers the chosen language and moves straight on to the framework list
struct ChooseLanguage {
    name: &'static str,
    language: &'static str,
}

impl Handler for ChooseLanguage {
    fn name(&self) -> &str {
        self.name
    }

    fn handle(&self, mut req: DialogRequest) -> DialogResult<HandlerOutcome> {
        req.session.set("language", self.language);
        Ok(req.into_forward("select_framework").into())
    }

    fn transitions(&self) -> Vec<Transition> {
        vec![Transition::new(
            "select_framework",
            TransitionTrigger::Other(format!("language = {}", self.language)),
        )]
    }
}

fn frameworks(language: Option<&str>) -> Vec<ListItem> {
    let names: &[&str] = match language {
        Some("python") => &["Flask", "Django", "CherryPy", "Pyramid", "FastAPI"],
        Some("rust") => &["Axum", "Actix", "Rocket"],
        _ => &[],
    };
    names
        .iter()
        .map(|name| ListItem::new(*name, name.to_lowercase()))
        .collect()
}

fn build_registry() -> anyhow::Result<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();

    registry.register(
        Input::builder("enter_name")
            .prompt("Welcome! Enter your name:")
            .session_key("name")
            .next_handler("main_menu")
            .validate_with(|input| {
                if input.chars().all(char::is_alphabetic) {
                    Ok(())
                } else {
                    Err(ValidationError::new("Letters only please. Enter your name:"))
                }
            })
            .build()?,
    )?;

    registry.register(
        Menu::builder("main_menu")
            .prompt(Prompt::dynamic(|req| {
                format!(
                    "Hi {}, pick a language\n",
                    req.session.get_str("name").unwrap_or("there")
                )
            }))
            .option(MenuOption::new("Python", "pick_python"))
            .option(MenuOption::new("Rust", "pick_rust"))
            .option(MenuOption::new("Exit", "goodbye").with_symbol("0"))
            .build()?,
    )?;

    registry.register(ChooseLanguage {
        name: "pick_python",
        language: "python",
    })?;
    registry.register(ChooseLanguage {
        name: "pick_rust",
        language: "rust",
    })?;

    registry.register(
        List::builder("select_framework")
            .prompt("Choose a framework")
            .items_per_page(2)
            .session_key("framework")
            .next_handler("goodbye")
            .items_with(|req| frameworks(req.session.get_str("language")))
            .option(MenuOption::new("Back", "main_menu").with_symbol("*"))
            .build()?,
    )?;

    registry.register(
        Quit::builder("goodbye")
            .message_with(|req| match req.session.get_str("framework") {
                Some(framework) => format!("Enjoy {}!", framework),
                None => "Goodbye!".to_string(),
            })
            .build()?,
    )?;

    Ok(registry)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ussd_dialog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_toml_str(CONFIG)?;
    let registry = Arc::new(build_registry()?);
    let store = Arc::new(InMemorySessionStore::from_config(&config));
    let dispatcher = Dispatcher::new(registry.clone(), store, config)?;

    println!("=== Dialog graph ===");
    let workflow = registry.workflow(&dispatcher.config().start_handler)?;
    for edge in &workflow.edges {
        println!("  {} -> {} ({:?})", edge.from, edge.to, edge.trigger);
    }

    println!("\n=== Scripted session ===");
    let script = ["*384#", "m1ke", "Mike", "2", "3", "3", "*384#"];
    let session_id = "demo-session";

    for text in script {
        let request = GatewayRequest::new("254700000000", session_id, text);
        let reply = dispatcher.handle(request).await;

        println!("> {}", text);
        for line in reply.text.lines() {
            println!("  {}", line);
        }
        if !reply.continue_session {
            println!("  [session closed]");
        }
    }

    Ok(())
}
