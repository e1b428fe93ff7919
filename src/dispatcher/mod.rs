//! Session runner
//!
//! One gateway request is one turn:
//! 1. load the session (or start a new one at the configured start handler)
//! 2. hand the request to the active handler
//! 3. follow forwards until some handler responds
//! 4. remember the responding handler and save the session, or remove it
//!    when it finished and finished sessions are not retained
//!
//! Turns for the same session id are serialized; different sessions run
//! concurrently.

mod locks;

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span};

use crate::aggregate::SessionState;
use crate::config::EngineConfig;
use crate::error::{DialogError, DialogResult};
use crate::handlers::HandlerOutcome;
use crate::routing::HandlerRegistry;
use crate::store::SessionStore;
use crate::value_objects::{DialogRequest, DialogResponse, GatewayReply, GatewayRequest};

use locks::SessionLocks;

/// Drives dialog sessions over a stateless request/response gateway
pub struct Dispatcher<S>
where
    S: SessionStore,
{
    registry: Arc<HandlerRegistry>,
    store: Arc<S>,
    config: EngineConfig,
    locks: SessionLocks,
}

impl<S> Dispatcher<S>
where
    S: SessionStore,
{
    /// Create a dispatcher, refusing handler sets that cannot serve traffic
    pub fn new(
        registry: Arc<HandlerRegistry>,
        store: Arc<S>,
        config: EngineConfig,
    ) -> DialogResult<Self> {
        config.validate()?;
        if !registry.contains(&config.start_handler) {
            error!(start_handler = %config.start_handler, "start handler is not registered");
            return Err(DialogError::unknown_handler(&config.start_handler));
        }
        registry.validate()?;

        info!(
            start_handler = %config.start_handler,
            handlers = registry.len(),
            "dialog dispatcher ready"
        );

        Ok(Self {
            registry,
            store,
            config,
            locks: SessionLocks::default(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Process one gateway exchange.
    ///
    /// Failures are logged and answered with the configured failure message,
    /// closing the session on the gateway side.
    pub async fn handle(&self, request: GatewayRequest) -> GatewayReply {
        let session_id = request.session_id.clone();
        match self.dispatch(request).await {
            Ok(response) => response.to_reply(),
            Err(err) => {
                error!(session_id = %session_id, error = %err, "turn failed");
                GatewayReply {
                    text: self.config.failure_message.clone(),
                    continue_session: false,
                }
            }
        }
    }

    /// Process one gateway exchange, returning the handler's response
    pub async fn dispatch(&self, request: GatewayRequest) -> DialogResult<DialogResponse> {
        let span = info_span!(
            "dialog_turn",
            subscriber_id = %request.subscriber_id,
            session_id = %request.session_id,
        );

        async move {
            let _turn = self.locks.acquire(&request.session_id).await;
            self.run_turn(request).await
        }
        .instrument(span)
        .await
    }

    async fn run_turn(&self, request: GatewayRequest) -> DialogResult<DialogResponse> {
        debug!(text = %request.text, "gateway request");

        let GatewayRequest {
            subscriber_id,
            session_id,
            text,
            locale,
            extra,
        } = request;

        let (session, input) = match self.store.load(&session_id).await? {
            Some(state) if !state.completed => (state, text),
            previous => {
                if previous.is_some() {
                    debug!("previous conversation finished, starting over");
                }
                let locale = locale
                    .clone()
                    .unwrap_or_else(|| self.config.default_locale.clone());
                let mut state = SessionState::new(
                    session_id.clone(),
                    subscriber_id.clone(),
                    locale,
                    self.config.start_handler.clone(),
                );
                for (key, value) in extra {
                    state.set(key, value);
                }
                info!(
                    conversation_id = %state.conversation_id,
                    start_handler = %state.active_handler,
                    "session started"
                );
                // The opening request never carries an answer
                (state, String::new())
            }
        };

        let locale = locale.unwrap_or_else(|| session.locale.clone());
        let dialog_request =
            DialogRequest::new(subscriber_id, session_id.clone(), input, session).with_locale(locale);

        let mut response = self.run_handlers(dialog_request)?;

        if !response.continue_session {
            response.session.completed = true;
            response.session.page = None;
            info!(
                conversation_id = %response.session.conversation_id,
                steps = response.session.steps.len(),
                "session ended"
            );
        }

        if response.session.completed && !self.config.retain_completed {
            self.store.remove(&session_id).await?;
        } else {
            self.store.save(&session_id, &response.session).await?;
        }

        debug!(
            text = %response.text,
            continue_session = response.continue_session,
            "gateway response"
        );
        Ok(response)
    }

    /// Invoke the active handler and follow forwards until a response.
    ///
    /// Bounded by `max_forwards` so a forwarding cycle fails the turn
    /// instead of spinning.
    fn run_handlers(&self, mut request: DialogRequest) -> DialogResult<DialogResponse> {
        let mut handler_name = request.session.active_handler.clone();
        let mut forwards = 0;

        loop {
            let handler = self.registry.resolve(&handler_name).inspect_err(|_| {
                error!(handler = %handler_name, "session references unknown handler");
            })?;

            match handler.handle(request)? {
                HandlerOutcome::Respond(mut response) => {
                    response.session.active_handler = handler_name;
                    return Ok(response);
                }
                HandlerOutcome::Forward(mut forwarded, next) => {
                    forwards += 1;
                    if forwards > self.config.max_forwards {
                        error!(from = %handler_name, to = %next, "forward limit exceeded");
                        return Err(DialogError::ForwardLimitExceeded {
                            session_id: forwarded.session_id,
                            limit: self.config.max_forwards,
                            last_handler: next,
                        });
                    }
                    debug!(from = %handler_name, to = %next, "forwarding");
                    forwarded.input.clear();
                    forwarded.session.active_handler = next.clone();
                    request = forwarded;
                    handler_name = next;
                }
            }
        }
    }
}
