// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of named connections and the top-level sign-in entry point.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use turngate_config::TurngateConfig;
use turngate_core::{
    AuthToken, CardFactory, Clock, KeyValueStore, TokenClient, TurnContext, TurngateError,
};

use crate::dialog::{ConnectionSettings, DialogTurn, SignInDialog};
use crate::flow::{FlowKind, classify};
use crate::tokens::TurnTokens;

/// Why a sign-in flow ended without a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInFailure {
    /// The prompt resolved without a token and the retry cap is spent.
    CompletedWithoutToken {
        /// Declined attempts, including automatic retries.
        attempts: u8,
    },
    /// The dialog expired before a continuation arrived.
    TimedOut,
}

impl std::fmt::Display for SignInFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignInFailure::CompletedWithoutToken { attempts } => {
                write!(f, "completed without a token after {attempts} attempts")
            }
            SignInFailure::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Result of a [`AuthRegistry::sign_in`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SignInOutcome {
    /// A prompt is out; the flow continues on a later turn.
    Pending,
    /// A token is available in the turn's transient state.
    Complete(AuthToken),
    /// The flow ended without a token.
    Failed(SignInFailure),
}

/// Async callback invoked when a sign-in flow completes with a token.
pub type SignInSuccessHandler =
    Arc<dyn for<'a> Fn(&'a TurnContext, &'a AuthToken) -> BoxFuture<'a, ()> + Send + Sync>;

/// Async callback invoked when a sign-in flow ends without a token.
pub type SignInFailureHandler =
    Arc<dyn for<'a> Fn(&'a TurnContext, SignInFailure) -> BoxFuture<'a, ()> + Send + Sync>;

/// Named connections, each owning an independent sign-in state machine.
///
/// Connections are fully independent: a user can hold a token for one
/// provider while stuck mid-flow for another.
#[derive(Default)]
pub struct AuthRegistry {
    dialogs: Vec<SignInDialog>,
    on_success: Option<SignInSuccessHandler>,
    on_failure: Option<SignInFailureHandler>,
}

impl std::fmt::Debug for AuthRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRegistry")
            .field("dialogs", &self.dialogs.len())
            .field("on_success", &self.on_success.as_ref().map(|_| "<handler>"))
            .field("on_failure", &self.on_failure.as_ref().map(|_| "<handler>"))
            .finish()
    }
}

impl AuthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from configuration, one dialog per
    /// `[[connection]]` entry.
    pub fn from_config(
        config: &TurngateConfig,
        store: Arc<dyn KeyValueStore>,
        tokens: Arc<dyn TokenClient>,
        cards: Arc<dyn CardFactory>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TurngateError> {
        if config.connections.is_empty() {
            return Err(TurngateError::Config(
                "no [[connection]] entries configured".into(),
            ));
        }
        let mut registry = Self::new();
        for conn in &config.connections {
            let mut settings = ConnectionSettings::new(&conn.name)
                .with_prompt(conn.prompt)
                .with_scopes(conn.scopes.iter().cloned())
                .with_timeout(std::time::Duration::from_secs(conn.timeout_secs))
                .with_max_retries(conn.max_retries)
                .end_on_invalid_message(conn.end_on_invalid_message);
            if let Some(uri) = &conn.token_exchange_uri {
                settings = settings.with_token_exchange_uri(uri);
            }
            if conn.default {
                settings = settings.as_default();
            }
            registry = registry.with_connection(SignInDialog::new(
                settings,
                Arc::clone(&store),
                Arc::clone(&tokens),
                Arc::clone(&cards),
                Arc::clone(&clock),
            ));
        }
        Ok(registry)
    }

    /// Adds a connection's dialog to the registry.
    pub fn with_connection(mut self, dialog: SignInDialog) -> Self {
        self.dialogs.push(dialog);
        self
    }

    /// Registers the success callback.
    pub fn on_sign_in_success<F>(mut self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a TurnContext, &'a AuthToken) -> BoxFuture<'a, ()> + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(handler));
        self
    }

    /// Registers the failure callback.
    pub fn on_sign_in_failure<F>(mut self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a TurnContext, SignInFailure) -> BoxFuture<'a, ()> + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(handler));
        self
    }

    /// Looks up a connection's dialog by name.
    pub fn get(&self, name: &str) -> Result<&SignInDialog, TurngateError> {
        self.dialogs
            .iter()
            .find(|d| d.settings().name == name)
            .ok_or_else(|| TurngateError::UnknownConnection { name: name.into() })
    }

    /// The default connection: the flagged one, else the first registered.
    pub fn default_connection(&self) -> Option<&SignInDialog> {
        self.dialogs
            .iter()
            .find(|d| d.settings().is_default)
            .or_else(|| self.dialogs.first())
    }

    /// Names of all registered connections, in registration order.
    pub fn connection_names(&self) -> impl Iterator<Item = &str> {
        self.dialogs.iter().map(|d| d.settings().name.as_str())
    }

    fn resolve(&self, connection: Option<&str>) -> Result<&SignInDialog, TurngateError> {
        match connection {
            Some(name) => self.get(name),
            None => self
                .default_connection()
                .ok_or_else(|| TurngateError::Config("no connections registered".into())),
        }
    }

    /// Drives the sign-in flow for this turn.
    ///
    /// Classifies the activity, runs the connection's dialog, applies the
    /// bounded automatic retry after a decline, and fires the registered
    /// success/failure callbacks on terminal outcomes. Activities that
    /// cannot take part in any flow fail with
    /// [`TurngateError::InvalidActivity`].
    pub async fn sign_in(
        &self,
        ctx: &mut TurnContext,
        turn_tokens: &mut TurnTokens,
        connection: Option<&str>,
    ) -> Result<SignInOutcome, TurngateError> {
        let dialog = self.resolve(connection)?;
        let name = dialog.settings().name.clone();

        // A token resolved earlier in this same turn short-circuits.
        if let Some(token) = turn_tokens.get(&name) {
            return Ok(SignInOutcome::Complete(token.clone()));
        }

        let key = dialog.flow_key(ctx.activity());
        let active = dialog.dialog_active(&key).await?;
        let flow = classify(ctx.activity(), active);
        debug!(connection = %name, flow = %flow, active, "turn classified");
        if flow == FlowKind::None {
            return Err(TurngateError::InvalidActivity(format!(
                "activity of type `{}` cannot start or continue sign-in",
                ctx.activity().kind
            )));
        }

        let mut outcome = dialog.run(ctx, turn_tokens, flow).await?;

        // Bounded automatic retry: re-prompt after a decline while the
        // persisted attempt counter is within the cap. The counter, not
        // recursion, guarantees termination.
        if let DialogTurn::Declined { attempts } = outcome
            && attempts <= dialog.settings().max_retries
        {
            info!(connection = %name, attempts, "re-prompting after decline");
            outcome = dialog.restart(ctx, turn_tokens).await?;
        }

        match outcome {
            DialogTurn::Pending => Ok(SignInOutcome::Pending),
            DialogTurn::Complete(token) => {
                if let Some(handler) = &self.on_success {
                    handler(ctx, &token).await;
                }
                Ok(SignInOutcome::Complete(token))
            }
            DialogTurn::Declined { attempts } => {
                dialog.abandon(&key).await?;
                let failure = SignInFailure::CompletedWithoutToken { attempts };
                if let Some(handler) = &self.on_failure {
                    handler(ctx, failure).await;
                }
                Ok(SignInOutcome::Failed(failure))
            }
            DialogTurn::TimedOut => {
                let failure = SignInFailure::TimedOut;
                if let Some(handler) = &self.on_failure {
                    handler(ctx, failure).await;
                }
                Ok(SignInOutcome::Failed(failure))
            }
        }
    }

    /// Zero-interaction check against the identity provider. No prompt,
    /// no state mutation.
    pub async fn is_signed_in(
        &self,
        ctx: &TurnContext,
        connection: Option<&str>,
    ) -> Result<bool, TurngateError> {
        let dialog = self.resolve(connection)?;
        let key = dialog.flow_key(ctx.activity());
        Ok(dialog.check_signed_in(&key).await?.is_some())
    }

    /// Signs the user out of a connection: provider-side token removal,
    /// local flow state cleanup, and the turn's transient token dropped.
    pub async fn sign_out(
        &self,
        ctx: &TurnContext,
        turn_tokens: &mut TurnTokens,
        connection: Option<&str>,
    ) -> Result<(), TurngateError> {
        let dialog = self.resolve(connection)?;
        let key = dialog.flow_key(ctx.activity());
        dialog.sign_out(&key).await?;
        turn_tokens.remove(&dialog.settings().name);
        info!(connection = %dialog.settings().name, user = %key.user_id, "signed out");
        Ok(())
    }
}
