// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn context wrapping the inbound activity and the transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::activity::{Activity, ActivityKind, InvokeResponse, OutboundActivity};
use crate::error::TurngateError;
use crate::traits::TurnTransport;

/// One turn: the inbound activity plus the bounded window of outbound
/// activity in response to it.
///
/// The context enforces the invoke protocol rule that exactly one invoke
/// response may be sent per invoke turn; a second attempt fails with
/// [`TurngateError::InvokeAlreadyAcknowledged`].
pub struct TurnContext {
    activity: Activity,
    transport: Arc<dyn TurnTransport>,
    invoke_responded: AtomicBool,
}

impl TurnContext {
    /// Wrap an inbound activity and its transport into a turn.
    pub fn new(activity: Activity, transport: Arc<dyn TurnTransport>) -> Self {
        Self {
            activity,
            transport,
            invoke_responded: AtomicBool::new(false),
        }
    }

    /// The inbound activity of this turn.
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Replaces the turn's message text.
    ///
    /// Used when a captured pre-sign-in message is restored so downstream
    /// handlers see the user's original request instead of an auth
    /// artifact.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        debug!(len = text.len(), "turn text replaced");
        self.activity.text = Some(text);
    }

    /// Sends an activity into the conversation.
    pub async fn send_activity(&self, activity: OutboundActivity) -> Result<(), TurngateError> {
        self.transport.send_activity(activity).await
    }

    /// Sends the synchronous response to this turn's invoke activity.
    pub async fn send_invoke_response(
        &self,
        response: InvokeResponse,
    ) -> Result<(), TurngateError> {
        if self.activity.kind != ActivityKind::Invoke {
            return Err(TurngateError::InvalidActivity(
                "invoke response on a non-invoke turn".into(),
            ));
        }
        if self.invoke_responded.swap(true, Ordering::SeqCst) {
            return Err(TurngateError::InvokeAlreadyAcknowledged);
        }
        debug!(status = response.status, "sending invoke response");
        self.transport.send_invoke_response(response).await
    }

    /// Whether this turn's invoke has already been answered.
    pub fn invoke_responded(&self) -> bool {
        self.invoke_responded.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NullTransport;

    #[async_trait]
    impl TurnTransport for NullTransport {
        async fn send_activity(&self, _activity: OutboundActivity) -> Result<(), TurngateError> {
            Ok(())
        }

        async fn send_invoke_response(
            &self,
            _response: InvokeResponse,
        ) -> Result<(), TurngateError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn second_invoke_response_is_rejected() {
        let activity = Activity::invoke("c", "v", "u", "signin/verifyState", serde_json::json!({}));
        let ctx = TurnContext::new(activity, Arc::new(NullTransport));

        ctx.send_invoke_response(InvokeResponse::ok())
            .await
            .expect("first response should send");
        let err = ctx
            .send_invoke_response(InvokeResponse::ok())
            .await
            .expect_err("second response must fail");
        assert!(matches!(err, TurngateError::InvokeAlreadyAcknowledged));
    }

    #[tokio::test]
    async fn invoke_response_on_message_turn_is_invalid() {
        let ctx = TurnContext::new(Activity::message("c", "v", "u", "hi"), Arc::new(NullTransport));
        let err = ctx
            .send_invoke_response(InvokeResponse::ok())
            .await
            .expect_err("must fail");
        assert!(matches!(err, TurngateError::InvalidActivity(_)));
        assert!(!ctx.invoke_responded());
    }

    #[test]
    fn set_text_replaces_activity_text() {
        let mut ctx = TurnContext::new(
            Activity::message("c", "v", "u", "please sign in"),
            Arc::new(NullTransport),
        );
        ctx.set_text("book a meeting");
        assert_eq!(ctx.activity().text.as_deref(), Some("book a meeting"));
    }
}
