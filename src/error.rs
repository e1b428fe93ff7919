//! Error types for the dialog engine.

use thiserror::Error;

/// Result alias used across the engine.
pub type DialogResult<T> = Result<T, DialogError>;

/// Failures that abort a turn or prevent the engine from starting.
///
/// None of these are shown to the subscriber verbatim: the dispatcher logs
/// them and replies with the configured failure message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// A session or a transition referenced a handler that was never registered.
    #[error("Unknown handler '{name}'")]
    UnknownHandler { name: String },

    /// Two handlers were registered under the same name.
    #[error("Handler '{name}' is already registered")]
    DuplicateHandler { name: String },

    /// A handler declaration omitted a required attribute.
    #[error("Handler '{handler}' is missing required attribute '{attribute}'")]
    MissingAttribute { handler: String, attribute: String },

    /// A handler declares a transition to a handler that is not registered.
    #[error("Handler '{from}' transitions to unregistered handler '{to}'")]
    DanglingTarget { from: String, to: String },

    /// Handlers kept forwarding without producing a response.
    #[error("Session '{session_id}' exceeded {limit} forwards (last handler '{last_handler}')")]
    ForwardLimitExceeded {
        session_id: String,
        limit: usize,
        last_handler: String,
    },

    /// Session storage failed.
    #[error("Session store error: {0}")]
    Store(String),

    /// Engine configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DialogError {
    /// Creates an UnknownHandler error
    pub fn unknown_handler(name: impl Into<String>) -> Self {
        Self::UnknownHandler { name: name.into() }
    }

    /// Creates a MissingAttribute error
    pub fn missing_attribute(handler: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            handler: handler.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates a Store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error stems from how handlers were declared or wired
    /// rather than from a runtime collaborator.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownHandler { .. }
                | Self::DuplicateHandler { .. }
                | Self::MissingAttribute { .. }
                | Self::DanglingTarget { .. }
                | Self::ForwardLimitExceeded { .. }
                | Self::Config(_)
        )
    }
}

/// Rejected user input. Carries the message shown when the screen is repeated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_names_the_attribute() {
        let err = DialogError::missing_attribute("enter_color", "session_key");
        assert_eq!(
            err.to_string(),
            "Handler 'enter_color' is missing required attribute 'session_key'"
        );
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_store_error_is_not_configuration() {
        assert!(!DialogError::store("disk full").is_configuration_error());
    }

    #[test]
    fn test_validation_error_displays_message() {
        let err = ValidationError::new("Please enter a valid color:");
        assert_eq!(err.to_string(), "Please enter a valid color:");
    }
}
