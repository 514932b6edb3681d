// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Card factory trait for sign-in UI payloads.

use crate::types::TokenExchangeResource;

/// Builder of renderable sign-in payloads.
///
/// The payloads are opaque to the sign-in core; it only forwards them as
/// activity attachments. Implementations decide the concrete card schema
/// their platform renders.
pub trait CardFactory: Send + Sync {
    /// A plain sign-in card pointing at the browser sign-in link.
    fn sign_in_card(&self, link: &str) -> serde_json::Value;

    /// An OAuth card. When `resource` is present the platform will first
    /// attempt silent token exchange against it before falling back to
    /// the interactive link.
    fn oauth_card(
        &self,
        link: &str,
        connection: &str,
        resource: Option<&TokenExchangeResource>,
    ) -> serde_json::Value;
}
