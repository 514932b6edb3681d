// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound and outbound activity model.
//!
//! An [`Activity`] is the single inbound event of a turn. The model is
//! deliberately narrow: only the fields the sign-in flows inspect are
//! typed, everything else rides along in the opaque `value` payload.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Invoke name for the interactive verification continuation (magic code).
pub const INVOKE_VERIFY_STATE: &str = "signin/verifyState";

/// Invoke name for the silent SSO token-exchange continuation.
pub const INVOKE_TOKEN_EXCHANGE: &str = "signin/tokenExchange";

/// Invoke name for an extension search query.
pub const INVOKE_EXTENSION_QUERY: &str = "extension/query";

/// Invoke name for an extension task module fetch.
pub const INVOKE_EXTENSION_FETCH_TASK: &str = "extension/fetchTask";

/// Invoke name for an extension link unfurl query.
pub const INVOKE_EXTENSION_QUERY_LINK: &str = "extension/queryLink";

/// Invoke name for an anonymous extension link unfurl query.
pub const INVOKE_EXTENSION_ANON_QUERY_LINK: &str = "extension/anonymousQueryLink";

/// The type of an activity on the wire.
///
/// Unrecognized wire values map to [`ActivityKind::Unknown`] rather than
/// failing deserialization; platforms add activity types faster than
/// this library models them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "camelCase")]
pub enum ActivityKind {
    /// An ordinary user message.
    #[default]
    Message,
    /// A structured request requiring exactly one synchronous response.
    Invoke,
    /// A platform event.
    Event,
    /// A roster or conversation metadata update.
    ConversationUpdate,
    /// Anything this library does not model.
    Unknown,
}

impl From<String> for ActivityKind {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(ActivityKind::Unknown)
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        kind.to_string()
    }
}

/// One inbound activity, the trigger of a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Activity type discriminator.
    #[serde(rename = "type")]
    pub kind: ActivityKind,

    /// Platform-assigned activity id. Present on invokes; used as the
    /// deduplication key component for token-exchange deliveries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Invoke operation name (`signin/verifyState`, `extension/query`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Channel the activity arrived on.
    pub channel_id: String,

    /// Conversation the activity belongs to.
    pub conversation_id: String,

    /// Sender of the activity.
    pub user_id: String,

    /// Message text, when the activity carries any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Opaque invoke payload; shape depends on `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    /// Id of the activity this one replies to, when the platform supplies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

impl Activity {
    /// Build a message activity.
    pub fn message(
        channel_id: impl Into<String>,
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActivityKind::Message,
            id: None,
            name: None,
            channel_id: channel_id.into(),
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            text: Some(text.into()),
            value: None,
            reply_to_id: None,
        }
    }

    /// Build an invoke activity.
    pub fn invoke(
        channel_id: impl Into<String>,
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            kind: ActivityKind::Invoke,
            id: None,
            name: Some(name.into()),
            channel_id: channel_id.into(),
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            text: None,
            value: Some(value),
            reply_to_id: None,
        }
    }

    /// Attach a platform activity id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether this activity is an invoke.
    pub fn is_invoke(&self) -> bool {
        self.kind == ActivityKind::Invoke
    }

    /// The invoke name, when this activity is an invoke.
    pub fn invoke_name(&self) -> Option<&str> {
        match self.kind {
            ActivityKind::Invoke => self.name.as_deref(),
            _ => None,
        }
    }

    /// Message text with surrounding whitespace trimmed; `None` when empty.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// One outbound activity produced during a turn.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundActivity {
    /// Activity type discriminator.
    #[serde(rename = "type")]
    pub kind: ActivityKind,

    /// Message text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Renderable card payloads, opaque to this library.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<serde_json::Value>,
}

impl OutboundActivity {
    /// Build a plain text message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            kind: ActivityKind::Message,
            text: Some(text.into()),
            attachments: Vec::new(),
        }
    }

    /// Build a message carrying a single card attachment.
    pub fn card(attachment: serde_json::Value) -> Self {
        Self {
            kind: ActivityKind::Message,
            text: None,
            attachments: vec![attachment],
        }
    }
}

/// The synchronous response to an invoke activity.
///
/// Protocol contract: exactly one per invoke turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResponse {
    /// HTTP-style status code carried back to the platform.
    pub status: u16,

    /// Optional structured body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl InvokeResponse {
    /// A bare 200 acknowledgement.
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }

    /// A 200 response with a structured body.
    pub fn ok_with_body(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    /// A response with an arbitrary status and no body.
    pub fn status(status: u16) -> Self {
        Self { status, body: None }
    }

    /// The 412 protocol signal telling the platform that silent token
    /// exchange failed and interactive verification should take over.
    pub fn precondition_failed(detail: impl Into<String>) -> Self {
        Self {
            status: 412,
            body: Some(serde_json::json!({ "failureDetail": detail.into() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_deserializes_from_wire_json() {
        let json = r#"{
            "type": "invoke",
            "id": "act-1",
            "name": "signin/tokenExchange",
            "channelId": "msteams",
            "conversationId": "conv-1",
            "userId": "user-1",
            "value": { "token": "assertion" }
        }"#;

        let activity: Activity = serde_json::from_str(json).expect("wire JSON should parse");
        assert_eq!(activity.kind, ActivityKind::Invoke);
        assert_eq!(activity.invoke_name(), Some(INVOKE_TOKEN_EXCHANGE));
        assert_eq!(activity.channel_id, "msteams");
        assert!(activity.value.is_some());
    }

    #[test]
    fn unknown_activity_type_maps_to_unknown() {
        let json = r#"{
            "type": "typing",
            "channelId": "c",
            "conversationId": "v",
            "userId": "u"
        }"#;

        let activity: Activity = serde_json::from_str(json).expect("should parse");
        assert_eq!(activity.kind, ActivityKind::Unknown);
    }

    #[test]
    fn trimmed_text_filters_whitespace_only_messages() {
        let mut activity = Activity::message("c", "v", "u", "  hello  ");
        assert_eq!(activity.trimmed_text(), Some("hello"));

        activity.text = Some("   ".into());
        assert_eq!(activity.trimmed_text(), None);

        activity.text = None;
        assert_eq!(activity.trimmed_text(), None);
    }

    #[test]
    fn precondition_failed_carries_detail_body() {
        let resp = InvokeResponse::precondition_failed("silent exchange failed");
        assert_eq!(resp.status, 412);
        let body = resp.body.expect("body present");
        assert_eq!(body["failureDetail"], "silent exchange failed");
    }
}
