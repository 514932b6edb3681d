// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boundary trait definitions for Turngate's external collaborators.
//!
//! The transport, token service, persisted store, and card factory are
//! all consumed through these traits; the sign-in core never talks to a
//! concrete implementation.

pub mod cards;
pub mod store;
pub mod token_client;
pub mod transport;

pub use cards::CardFactory;
pub use store::{KeyValueStore, StoreKey, WriteOutcome};
pub use token_client::TokenClient;
pub use transport::TurnTransport;
