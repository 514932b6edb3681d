// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport trait for delivering outbound activity.

use async_trait::async_trait;

use crate::activity::{InvokeResponse, OutboundActivity};
use crate::error::TurngateError;

/// The outbound side of a turn.
///
/// Implementations wrap whatever adapter delivered the inbound activity.
/// Sends are fire-and-forget from the sign-in core's perspective;
/// failures propagate as turn-level [`TurngateError::Transport`] errors.
#[async_trait]
pub trait TurnTransport: Send + Sync {
    /// Sends an activity into the conversation.
    async fn send_activity(&self, activity: OutboundActivity) -> Result<(), TurngateError>;

    /// Sends the synchronous response to an invoke activity.
    ///
    /// Callers go through `TurnContext`, which enforces the
    /// one-response-per-invoke protocol rule before delegating here.
    async fn send_invoke_response(&self, response: InvokeResponse) -> Result<(), TurngateError>;
}
