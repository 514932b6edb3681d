// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Turngate sign-in orchestration workspace.
//!
//! This crate provides the activity model, the per-turn context, error
//! types, and the boundary traits through which the sign-in core talks
//! to its external collaborators: the messaging transport, the identity
//! provider's token service, the persisted key-value store, and the card
//! factory.

pub mod activity;
pub mod clock;
pub mod context;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use activity::{Activity, ActivityKind, InvokeResponse, OutboundActivity};
pub use clock::{Clock, SystemClock};
pub use context::TurnContext;
pub use error::TurngateError;
pub use types::{AuthToken, PromptKind, TokenExchangeResource, TokenResponse};

// Re-export all boundary traits at crate root.
pub use traits::{CardFactory, KeyValueStore, StoreKey, TokenClient, TurnTransport, WriteOutcome};
