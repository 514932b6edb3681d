// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn-scoped OAuth/SSO sign-in orchestration.
//!
//! Coordinates a multi-step, platform-driven authentication handshake
//! across discrete, stateless turns: each inbound activity is classified
//! into a flow, the per-connection sign-in dialog consumes it against
//! persisted state, and on completion the resolved token is propagated
//! to the rest of the turn while the user's interrupted message is
//! restored.
//!
//! The hosting application calls [`AuthRegistry::sign_in`] once per turn
//! that requires a token:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use turngate_auth::{AuthRegistry, BasicCardFactory, ConnectionSettings, SignInDialog,
//!     SignInOutcome, TurnTokens};
//! use turngate_core::{Activity, PromptKind, SystemClock, TurnContext};
//! use turngate_storage::MemoryStore;
//!
//! # async fn example(
//! #     transport: Arc<dyn turngate_core::TurnTransport>,
//! #     tokens: Arc<dyn turngate_core::TokenClient>,
//! # ) -> Result<(), turngate_core::TurngateError> {
//! let store = Arc::new(MemoryStore::new());
//! let registry = AuthRegistry::new().with_connection(SignInDialog::new(
//!     ConnectionSettings::new("graph").with_prompt(PromptKind::Sso)
//!         .with_token_exchange_uri("api://example/bot"),
//!     store,
//!     tokens,
//!     Arc::new(BasicCardFactory::default()),
//!     Arc::new(SystemClock),
//! ));
//!
//! let mut ctx = TurnContext::new(Activity::message("c", "v", "u", "book a meeting"), transport);
//! let mut turn_tokens = TurnTokens::new();
//! match registry.sign_in(&mut ctx, &mut turn_tokens, Some("graph")).await? {
//!     SignInOutcome::Pending => { /* prompt is out, wait for the next turn */ }
//!     SignInOutcome::Complete(token) => { /* run business logic with token */ }
//!     SignInOutcome::Failed(failure) => { /* report to the user */ }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cards;
pub mod continuity;
pub mod dedup;
pub mod dialog;
pub mod flow;
pub mod registry;
pub mod state;
pub mod tokens;

pub use cards::BasicCardFactory;
pub use continuity::MessageContinuity;
pub use dedup::ExchangeDeduplicator;
pub use dialog::{ConnectionSettings, DialogTurn, SignInDialog, SignInState};
pub use flow::{FlowKind, classify};
pub use registry::{
    AuthRegistry, SignInFailure, SignInFailureHandler, SignInOutcome, SignInSuccessHandler,
};
pub use state::{AuthStateStore, ConversationAuthState, DialogState, FlowKey};
pub use tokens::TurnTokens;
