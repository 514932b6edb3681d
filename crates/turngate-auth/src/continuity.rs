// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Preservation of the user's message across the sign-in detour.
//!
//! The message that triggered sign-in is captured when the prompt goes
//! out and restored into the turn once a token arrives, so downstream
//! handlers process the user's real request as if no interruption
//! happened.

use tracing::debug;

use turngate_core::TurngateError;

use crate::state::{AuthStateStore, ConversationAuthState, FlowKey};

/// Capture/restore of the pending user message.
#[derive(Clone)]
pub struct MessageContinuity {
    states: AuthStateStore,
}

impl MessageContinuity {
    pub fn new(states: AuthStateStore) -> Self {
        Self { states }
    }

    /// Captures the message that triggered sign-in.
    ///
    /// First message wins: when state already exists for the key the call
    /// is a no-op, so a user retyping mid-flow cannot overwrite the
    /// request that started the detour.
    pub async fn capture(&self, key: &FlowKey, text: &str) -> Result<(), TurngateError> {
        if self.states.load_auth(key).await?.is_some() {
            debug!(user = %key.user_id, connection = %key.connection, "message already captured");
            return Ok(());
        }
        self.states
            .save_auth(
                key,
                &ConversationAuthState {
                    pending_message: Some(text.to_string()),
                    attempts: 0,
                },
            )
            .await
    }

    /// Returns the captured message and clears it (single consumption).
    pub async fn restore(&self, key: &FlowKey) -> Result<Option<String>, TurngateError> {
        let Some(mut state) = self.states.load_auth(key).await? else {
            return Ok(None);
        };
        let taken = state.pending_message.take();
        if taken.is_some() {
            self.states.save_auth(key, &state).await?;
            debug!(user = %key.user_id, connection = %key.connection, "captured message restored");
        }
        Ok(taken)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use turngate_storage::MemoryStore;

    fn continuity() -> MessageContinuity {
        MessageContinuity::new(AuthStateStore::new(Arc::new(MemoryStore::new())))
    }

    fn key() -> FlowKey {
        FlowKey {
            channel_id: "c".into(),
            conversation_id: "v".into(),
            user_id: "u".into(),
            connection: "graph".into(),
        }
    }

    #[tokio::test]
    async fn capture_then_restore_returns_text_exactly_once() {
        let continuity = continuity();
        let key = key();

        continuity.capture(&key, "hello").await.expect("capture");
        assert_eq!(
            continuity.restore(&key).await.expect("restore"),
            Some("hello".to_string())
        );
        // Second restore finds nothing.
        assert_eq!(continuity.restore(&key).await.expect("restore"), None);
    }

    #[tokio::test]
    async fn first_captured_message_wins() {
        let continuity = continuity();
        let key = key();

        continuity
            .capture(&key, "book a meeting")
            .await
            .expect("capture");
        continuity
            .capture(&key, "are you still there?")
            .await
            .expect("capture");
        assert_eq!(
            continuity.restore(&key).await.expect("restore"),
            Some("book a meeting".to_string())
        );
    }

    #[tokio::test]
    async fn restore_without_capture_is_empty() {
        let continuity = continuity();
        assert_eq!(continuity.restore(&key()).await.expect("restore"), None);
    }
}
