// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow selection for inbound turns.
//!
//! Classifies an activity into the sign-in flow it can initiate or
//! continue. Pure function over the activity shape plus the
//! dialog-active flag; no side effects, no I/O.

use turngate_core::activity::{
    INVOKE_EXTENSION_ANON_QUERY_LINK, INVOKE_EXTENSION_FETCH_TASK, INVOKE_EXTENSION_QUERY,
    INVOKE_EXTENSION_QUERY_LINK, INVOKE_TOKEN_EXCHANGE, INVOKE_VERIFY_STATE,
};
use turngate_core::{Activity, ActivityKind};

/// Extension operations that can carry a sign-in detour.
const EXTENSION_INVOKES: &[&str] = &[
    INVOKE_EXTENSION_QUERY,
    INVOKE_EXTENSION_FETCH_TASK,
    INVOKE_EXTENSION_QUERY_LINK,
    INVOKE_EXTENSION_ANON_QUERY_LINK,
];

/// The sign-in flow an activity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// A verification or token-exchange continuation invoke.
    SsoContinuation,
    /// An extension operation that may require sign-in before running.
    ExtensionFlow,
    /// An ordinary user message.
    ConversationalFlow,
    /// Not eligible to initiate or continue authentication.
    None,
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowKind::SsoContinuation => write!(f, "sso-continuation"),
            FlowKind::ExtensionFlow => write!(f, "extension"),
            FlowKind::ConversationalFlow => write!(f, "conversational"),
            FlowKind::None => write!(f, "none"),
        }
    }
}

/// Classify an inbound activity.
///
/// Priority order: sign-in continuation invokes, extension invokes,
/// non-empty messages, everything else. `dialog_active` matters for the
/// misrouting edge case: while a sign-in dialog is awaiting continuation,
/// any invoke belongs to the continuation path even if its name overlaps
/// with an invoke-based business feature, so it must not be swallowed by
/// ordinary routing.
pub fn classify(activity: &Activity, dialog_active: bool) -> FlowKind {
    match activity.kind {
        ActivityKind::Invoke => match activity.invoke_name() {
            Some(INVOKE_VERIFY_STATE) | Some(INVOKE_TOKEN_EXCHANGE) => FlowKind::SsoContinuation,
            Some(name) if EXTENSION_INVOKES.contains(&name) => FlowKind::ExtensionFlow,
            _ if dialog_active => FlowKind::SsoContinuation,
            _ => FlowKind::None,
        },
        ActivityKind::Message if activity.trimmed_text().is_some() => FlowKind::ConversationalFlow,
        _ => FlowKind::None,
    }
}
