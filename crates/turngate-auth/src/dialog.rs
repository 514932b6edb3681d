// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-connection sign-in state machine.
//!
//! One [`SignInDialog`] drives the multi-turn prompt -> verify ->
//! exchange -> complete sequence for a single named connection. Progress
//! is checkpointed in persisted state between turns; each turn the
//! machine reloads that state, consumes the inbound activity, and either
//! stays pending or resolves.
//!
//! The prompt kind (interactive card vs. silent SSO) is a variant fixed
//! at construction, not a runtime type: both kinds run through the same
//! transition function.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use turngate_core::activity::{INVOKE_TOKEN_EXCHANGE, INVOKE_VERIFY_STATE};
use turngate_core::{
    Activity, ActivityKind, AuthToken, CardFactory, Clock, InvokeResponse, KeyValueStore,
    OutboundActivity, PromptKind, TokenClient, TokenExchangeResource, TurnContext, TurngateError,
};

use crate::continuity::MessageContinuity;
use crate::dedup::ExchangeDeduplicator;
use crate::flow::FlowKind;
use crate::state::{AuthStateStore, DialogState, FlowKey};
use crate::tokens::TurnTokens;

/// Conceptual machine states, used in transition logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInState {
    /// No flow in progress.
    Idle,
    /// Prompt delivered, dialog state persisted.
    PromptSent,
    /// Waiting for the platform's continuation invoke.
    AwaitingVerification,
    /// Running the provider exchange for this turn.
    Exchanging,
    /// Flow resolved, with or without a token.
    Complete,
    /// Dialog expired before a continuation arrived.
    TimedOut,
}

impl std::fmt::Display for SignInState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignInState::Idle => write!(f, "idle"),
            SignInState::PromptSent => write!(f, "prompt-sent"),
            SignInState::AwaitingVerification => write!(f, "awaiting-verification"),
            SignInState::Exchanging => write!(f, "exchanging"),
            SignInState::Complete => write!(f, "complete"),
            SignInState::TimedOut => write!(f, "timed-out"),
        }
    }
}

/// Outcome of driving a dialog for one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogTurn {
    /// Waiting on the platform to deliver a continuation.
    Pending,
    /// Sign-in finished with a token.
    Complete(AuthToken),
    /// The prompt resolved without a token. `attempts` counts declines
    /// so far, for the caller's bounded retry policy.
    Declined { attempts: u8 },
    /// The dialog expired before a continuation arrived; all flow state
    /// has been cleared.
    TimedOut,
}

/// Immutable settings of one named connection.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Connection name users and handlers refer to.
    pub name: String,
    /// Prompt kind, selected once here.
    pub prompt: PromptKind,
    /// OAuth scopes requested for this connection.
    pub scopes: Vec<String>,
    /// Dialog expiry window.
    pub timeout: Duration,
    /// Automatic re-prompt attempts after a decline.
    pub max_retries: u8,
    /// End the dialog when a non-auth message arrives mid-flow.
    pub end_on_invalid_message: bool,
    /// Application resource URI for silent SSO exchange.
    pub token_exchange_uri: Option<String>,
    /// Use this connection when callers do not name one.
    pub is_default: bool,
}

/// Platform default expiry for sign-in prompts.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(900);

impl ConnectionSettings {
    /// Settings with platform defaults: interactive card prompt, 15
    /// minute expiry, one automatic retry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: PromptKind::Card,
            scopes: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: 1,
            end_on_invalid_message: false,
            token_exchange_uri: None,
            is_default: false,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptKind) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u8) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn end_on_invalid_message(mut self, end: bool) -> Self {
        self.end_on_invalid_message = end;
        self
    }

    pub fn with_token_exchange_uri(mut self, uri: impl Into<String>) -> Self {
        self.token_exchange_uri = Some(uri.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// The sign-in state machine for one named connection.
pub struct SignInDialog {
    settings: ConnectionSettings,
    states: AuthStateStore,
    continuity: MessageContinuity,
    dedup: ExchangeDeduplicator,
    tokens: Arc<dyn TokenClient>,
    cards: Arc<dyn CardFactory>,
    clock: Arc<dyn Clock>,
}

impl SignInDialog {
    pub fn new(
        settings: ConnectionSettings,
        store: Arc<dyn KeyValueStore>,
        tokens: Arc<dyn TokenClient>,
        cards: Arc<dyn CardFactory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let states = AuthStateStore::new(Arc::clone(&store));
        Self {
            continuity: MessageContinuity::new(states.clone()),
            dedup: ExchangeDeduplicator::new(store, Arc::clone(&clock)),
            states,
            settings,
            tokens,
            cards,
            clock,
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// The flow key for an inbound activity under this connection.
    pub fn flow_key(&self, activity: &Activity) -> FlowKey {
        FlowKey::from_activity(activity, &self.settings.name)
    }

    /// Whether a prompt is currently awaiting platform continuation.
    pub async fn dialog_active(&self, key: &FlowKey) -> Result<bool, TurngateError> {
        Ok(self.states.load_dialog(key).await?.is_some())
    }

    /// Zero-interaction sign-in probe. Never emits a prompt and never
    /// mutates flow state.
    pub async fn check_signed_in(&self, key: &FlowKey) -> Result<Option<AuthToken>, TurngateError> {
        let response = self
            .tokens
            .get_token_silently(
                &self.settings.name,
                &key.user_id,
                &key.channel_id,
                &self.settings.scopes,
            )
            .await?;
        Ok(response.map(|r| AuthToken::from_response(&self.settings.name, r)))
    }

    /// Clears all persisted flow state for the key.
    pub async fn abandon(&self, key: &FlowKey) -> Result<(), TurngateError> {
        self.states.clear_all(key).await
    }

    /// Provider-side sign-out plus local state cleanup.
    pub async fn sign_out(&self, key: &FlowKey) -> Result<(), TurngateError> {
        self.tokens
            .sign_out(&self.settings.name, &key.user_id, &key.channel_id)
            .await?;
        self.states.clear_all(key).await
    }

    /// Drives the dialog for one turn.
    ///
    /// With no persisted dialog state this begins a new flow; with one,
    /// it consumes the continuation (or detects lazy expiry). Storage and
    /// token-service failures propagate with state left in place so the
    /// next turn can resume.
    pub async fn run(
        &self,
        ctx: &mut TurnContext,
        turn_tokens: &mut TurnTokens,
        flow: FlowKind,
    ) -> Result<DialogTurn, TurngateError> {
        let key = self.flow_key(ctx.activity());
        match self.states.load_dialog(&key).await? {
            None => match flow {
                // A continuation with no active dialog is a late arrival:
                // some other path already resolved or expired the flow.
                FlowKind::SsoContinuation => self.expire(ctx, &key, "no active dialog").await,
                _ => self.begin(ctx, turn_tokens, &key, flow).await,
            },
            Some(dialog) if self.clock.now() > dialog.expires_at => {
                self.expire(ctx, &key, "dialog expired").await
            }
            Some(dialog) => self.resume(ctx, turn_tokens, &key, &dialog).await,
        }
    }

    /// Re-sends the prompt after a decline, reusing the preserved auth
    /// state (captured message and attempt counter).
    pub(crate) async fn restart(
        &self,
        ctx: &mut TurnContext,
        turn_tokens: &mut TurnTokens,
    ) -> Result<DialogTurn, TurngateError> {
        let key = self.flow_key(ctx.activity());
        // The retry prompt always goes out as a card message; the turn's
        // invoke response, if any, was spent on the decline.
        self.begin(ctx, turn_tokens, &key, FlowKind::ConversationalFlow)
            .await
    }

    /// Idle -> PromptSent (or straight to Complete on a silent hit).
    async fn begin(
        &self,
        ctx: &mut TurnContext,
        turn_tokens: &mut TurnTokens,
        key: &FlowKey,
        flow: FlowKind,
    ) -> Result<DialogTurn, TurngateError> {
        // Preserve the triggering message before any detour.
        if let Some(text) = ctx.activity().trimmed_text() {
            let text = text.to_string();
            self.continuity.capture(key, &text).await?;
        }

        // An existing session means no prompt at all.
        if let Some(token) = self.check_signed_in(key).await? {
            debug!(connection = %self.settings.name, "silent token available, skipping prompt");
            return self.complete(ctx, turn_tokens, key, token).await;
        }

        let link = self
            .tokens
            .get_sign_in_link(&self.settings.name, &key.user_id, &self.settings.scopes)
            .await?;

        match flow {
            FlowKind::ExtensionFlow => {
                // Extension invokes answer with a sign-in action instead
                // of a card in the conversation.
                ctx.send_invoke_response(InvokeResponse::ok_with_body(sign_in_action(&link)))
                    .await?;
            }
            _ => {
                let card = match self.settings.prompt {
                    PromptKind::Sso => self.cards.oauth_card(
                        &link,
                        &self.settings.name,
                        self.exchange_resource().as_ref(),
                    ),
                    PromptKind::Card => self.cards.sign_in_card(&link),
                };
                ctx.send_activity(OutboundActivity::card(card)).await?;
            }
        }

        let expires_at = self.clock.now()
            + chrono::Duration::from_std(self.settings.timeout)
                .map_err(|e| TurngateError::Config(format!("timeout out of range: {e}")))?;
        self.states
            .save_dialog(
                key,
                &DialogState {
                    prompt: self.settings.prompt,
                    expires_at,
                    scopes: self.settings.scopes.clone(),
                },
            )
            .await?;

        info!(
            connection = %self.settings.name,
            user = %key.user_id,
            flow = %flow,
            from = %SignInState::Idle,
            to = %SignInState::PromptSent,
            "sign-in prompt sent"
        );
        Ok(DialogTurn::Pending)
    }

    /// PromptSent/AwaitingVerification: consume a continuation activity.
    async fn resume(
        &self,
        ctx: &mut TurnContext,
        turn_tokens: &mut TurnTokens,
        key: &FlowKey,
        dialog: &DialogState,
    ) -> Result<DialogTurn, TurngateError> {
        let invoke_name = ctx.activity().invoke_name().map(str::to_owned);
        match invoke_name.as_deref() {
            Some(INVOKE_VERIFY_STATE) => self.handle_verify(ctx, turn_tokens, key).await,
            Some(INVOKE_TOKEN_EXCHANGE) => self.handle_exchange(ctx, turn_tokens, key, dialog).await,
            Some(other) => {
                // Unrelated invoke mid-dialog: acknowledge so the platform
                // is not left hanging, keep waiting for the continuation.
                warn!(name = other, connection = %self.settings.name, "unrelated invoke during sign-in dialog");
                ctx.send_invoke_response(InvokeResponse::ok()).await?;
                Ok(DialogTurn::Pending)
            }
            None => {
                if ctx.activity().kind == ActivityKind::Message
                    && self.settings.end_on_invalid_message
                {
                    debug!(connection = %self.settings.name, "non-auth message ends the dialog");
                    self.decline(key).await
                } else {
                    Ok(DialogTurn::Pending)
                }
            }
        }
    }

    /// AwaitingVerification -> Exchanging via the magic code.
    async fn handle_verify(
        &self,
        ctx: &mut TurnContext,
        turn_tokens: &mut TurnTokens,
        key: &FlowKey,
    ) -> Result<DialogTurn, TurngateError> {
        let code = ctx
            .activity()
            .value
            .as_ref()
            .and_then(|v| v.get("state"))
            .and_then(|s| s.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        let Some(code) = code else {
            warn!(connection = %self.settings.name, "verification invoke without a magic code");
            ctx.send_invoke_response(InvokeResponse::status(400)).await?;
            return Ok(DialogTurn::Pending);
        };

        debug!(
            connection = %self.settings.name,
            from = %SignInState::AwaitingVerification,
            to = %SignInState::Exchanging,
            "redeeming magic code"
        );
        match self
            .tokens
            .get_user_token(&self.settings.name, &key.user_id, &key.channel_id, &code)
            .await?
        {
            Some(response) => {
                ctx.send_invoke_response(InvokeResponse::ok()).await?;
                let token = AuthToken::from_response(&self.settings.name, response);
                self.complete(ctx, turn_tokens, key, token).await
            }
            None => {
                // Wrong or expired code: the prompt is spent.
                ctx.send_invoke_response(InvokeResponse::ok()).await?;
                self.decline(key).await
            }
        }
    }

    /// AwaitingVerification -> Exchanging via silent SSO token exchange.
    async fn handle_exchange(
        &self,
        ctx: &mut TurnContext,
        turn_tokens: &mut TurnTokens,
        key: &FlowKey,
        dialog: &DialogState,
    ) -> Result<DialogTurn, TurngateError> {
        let activity = ctx.activity();
        let Some(activity_id) = activity.id.clone() else {
            return Err(TurngateError::InvalidActivity(
                "token-exchange invoke without an activity id".into(),
            ));
        };
        let assertion = activity
            .value
            .as_ref()
            .and_then(|v| v.get("token"))
            .and_then(|t| t.as_str())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);

        let Some(assertion) = assertion else {
            warn!(connection = %self.settings.name, "token-exchange invoke without an exchangeable token");
            ctx.send_invoke_response(InvokeResponse::status(400)).await?;
            return Ok(DialogTurn::Pending);
        };

        // At-least-once delivery: only the first claimant runs the
        // exchange. Duplicates are acknowledged and otherwise ignored.
        if !self
            .dedup
            .should_process(&key.channel_id, &key.conversation_id, &activity_id)
            .await?
        {
            ctx.send_invoke_response(InvokeResponse::ok()).await?;
            return Ok(DialogTurn::Pending);
        }

        debug!(
            connection = %self.settings.name,
            from = %SignInState::AwaitingVerification,
            to = %SignInState::Exchanging,
            "running on-behalf-of exchange"
        );
        match self
            .tokens
            .exchange_on_behalf_of(
                &self.settings.name,
                &key.user_id,
                &key.channel_id,
                &assertion,
                &dialog.scopes,
            )
            .await?
        {
            Some(response) => {
                ctx.send_invoke_response(InvokeResponse::ok()).await?;
                let token = AuthToken::from_response(&self.settings.name, response);
                self.complete(ctx, turn_tokens, key, token).await
            }
            None => {
                // Protocol signal, not an error: the platform falls back
                // to interactive verification and the flow stays alive.
                debug!(connection = %self.settings.name, "silent exchange failed, signalling 412");
                ctx.send_invoke_response(InvokeResponse::precondition_failed(
                    "the token could not be exchanged silently",
                ))
                .await?;
                Ok(DialogTurn::Pending)
            }
        }
    }

    /// Exchanging -> Complete(token): propagate the token, restore the
    /// interrupted message, clear all flow state.
    async fn complete(
        &self,
        ctx: &mut TurnContext,
        turn_tokens: &mut TurnTokens,
        key: &FlowKey,
        token: AuthToken,
    ) -> Result<DialogTurn, TurngateError> {
        if let Some(original) = self.continuity.restore(key).await? {
            ctx.set_text(original);
        }
        self.states.clear_all(key).await?;
        turn_tokens.set(token.clone());
        info!(
            connection = %self.settings.name,
            user = %key.user_id,
            to = %SignInState::Complete,
            "sign-in complete"
        );
        Ok(DialogTurn::Complete(token))
    }

    /// Ends the current prompt without a token, preserving the captured
    /// message and bumping the persisted attempt counter so the caller
    /// can apply its bounded retry policy.
    async fn decline(&self, key: &FlowKey) -> Result<DialogTurn, TurngateError> {
        self.states.clear_dialog(key).await?;
        let mut auth = self.states.load_auth(key).await?.unwrap_or_default();
        auth.attempts = auth.attempts.saturating_add(1);
        self.states.save_auth(key, &auth).await?;
        info!(
            connection = %self.settings.name,
            attempts = auth.attempts,
            to = %SignInState::Complete,
            "sign-in resolved without a token"
        );
        Ok(DialogTurn::Declined {
            attempts: auth.attempts,
        })
    }

    /// Lazy expiry: clear all flow state and acknowledge the activity if
    /// the protocol demands a response.
    async fn expire(
        &self,
        ctx: &mut TurnContext,
        key: &FlowKey,
        reason: &str,
    ) -> Result<DialogTurn, TurngateError> {
        self.states.clear_all(key).await?;
        if ctx.activity().is_invoke() && !ctx.invoke_responded() {
            ctx.send_invoke_response(InvokeResponse::ok()).await?;
        }
        info!(
            connection = %self.settings.name,
            user = %key.user_id,
            reason,
            to = %SignInState::TimedOut,
            "sign-in dialog timed out"
        );
        Ok(DialogTurn::TimedOut)
    }

    fn exchange_resource(&self) -> Option<TokenExchangeResource> {
        self.settings
            .token_exchange_uri
            .as_ref()
            .map(|uri| TokenExchangeResource {
                id: self.settings.name.clone(),
                uri: uri.clone(),
            })
    }
}

/// Invoke-response body directing an extension surface to start sign-in.
fn sign_in_action(link: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "auth",
        "suggestedActions": {
            "actions": [
                { "type": "openUrl", "title": "Sign in", "value": link }
            ]
        }
    })
}
