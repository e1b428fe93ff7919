//! Session aggregate - the persisted state of one conversation
//!
//! A session tracks:
//! - Which handler receives the next turn
//! - The page of the List screen currently being browsed
//! - The audit trail of screens visited
//! - Values captured by handlers, keyed by each handler's session key

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::value_objects::StepRecord;

/// Persisted state of one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique per conversation, even when the gateway reuses a session id
    pub conversation_id: Uuid,

    pub session_id: String,

    pub subscriber_id: String,

    pub locale: String,

    /// Handler that processes the next inbound input
    pub active_handler: String,

    /// Offset of the page shown by the active List handler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,

    /// Append-only audit trail
    #[serde(default)]
    pub steps: Vec<StepRecord>,

    /// Handler-defined values
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,

    pub started_at: DateTime<Utc>,

    /// Set once a turn ended the conversation
    #[serde(default)]
    pub completed: bool,
}

impl SessionState {
    /// Create the state of a brand-new session
    pub fn new(
        session_id: impl Into<String>,
        subscriber_id: impl Into<String>,
        locale: impl Into<String>,
        start_handler: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: Uuid::new_v4(),
            session_id: session_id.into(),
            subscriber_id: subscriber_id.into(),
            locale: locale.into(),
            active_handler: start_handler.into(),
            page: None,
            steps: Vec::new(),
            values: BTreeMap::new(),
            started_at: Utc::now(),
            completed: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Deserialize a stored value, `None` if absent or of another shape
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|value| value.as_str())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The most recent step, open or not
    pub fn last_step(&self) -> Option<&StepRecord> {
        self.steps.last()
    }

    /// The step currently awaiting completion
    pub fn open_step(&self) -> Option<&StepRecord> {
        self.steps.last().filter(|step| step.is_open())
    }

    pub fn open_step_count(&self) -> usize {
        self.steps.iter().filter(|step| step.is_open()).count()
    }

    /// Record that `name` is now displayed.
    ///
    /// A repeated call for the handler that already owns the open step keeps
    /// that step. An open step left behind by another handler is closed first.
    pub fn begin_step(&mut self, name: &str, screen_text: &str) {
        if self.open_step().is_some_and(|step| step.name == name) {
            return;
        }
        self.close_dangling();
        self.steps.push(StepRecord::open(name, screen_text));
    }

    /// Replace the text of the open step owned by `name`
    pub fn refresh_step(&mut self, name: &str, screen_text: &str) {
        match self.steps.last_mut() {
            Some(step) if step.is_open() && step.name == name => {
                step.screen_text = screen_text.to_string();
            }
            _ => self.begin_step(name, screen_text),
        }
    }

    /// Close the open step owned by `name` with the input that completed it.
    ///
    /// When `name` has no open step (it was entered with input already
    /// present) a zero-length step is recorded instead.
    pub fn complete_step(&mut self, name: &str, screen_text: &str, selection: &str) {
        let now = Utc::now();
        match self.steps.last_mut() {
            Some(step) if step.is_open() && step.name == name => {
                step.end = Some(now);
                step.selection = Some(selection.to_string());
            }
            _ => self.record_instant_step(name, screen_text, selection),
        }
    }

    /// Record a step that opens and closes at the same instant
    pub fn record_instant_step(&mut self, name: &str, screen_text: &str, selection: &str) {
        self.close_dangling();
        let mut step = StepRecord::open(name, screen_text);
        step.end = Some(step.start);
        step.selection = Some(selection.to_string());
        self.steps.push(step);
    }

    fn close_dangling(&mut self) {
        let now = Utc::now();
        for step in self.steps.iter_mut().filter(|step| step.is_open()) {
            step.end = Some(now);
        }
    }
}
