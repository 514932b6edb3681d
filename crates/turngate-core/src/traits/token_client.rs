// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity-provider token client trait.

use async_trait::async_trait;

use crate::error::TurngateError;
use crate::types::TokenResponse;

/// Black-box client for the identity provider's token surface.
///
/// `Ok(None)` from the lookup and exchange operations means "no usable
/// token" (not yet signed in, consent declined, assertion not silently
/// exchangeable) and is a flow-control outcome, never an error. `Err` is
/// reserved for transport and service failures.
#[async_trait]
pub trait TokenClient: Send + Sync {
    /// Issues a browser sign-in link for the given connection and user.
    async fn get_sign_in_link(
        &self,
        connection: &str,
        user_id: &str,
        scopes: &[String],
    ) -> Result<String, TurngateError>;

    /// Looks up a cached token without any user interaction.
    async fn get_token_silently(
        &self,
        connection: &str,
        user_id: &str,
        channel_id: &str,
        scopes: &[String],
    ) -> Result<Option<TokenResponse>, TurngateError>;

    /// Redeems the magic code a user received after out-of-band sign-in.
    async fn get_user_token(
        &self,
        connection: &str,
        user_id: &str,
        channel_id: &str,
        magic_code: &str,
    ) -> Result<Option<TokenResponse>, TurngateError>;

    /// Silently exchanges a platform-issued assertion for an access token.
    async fn exchange_on_behalf_of(
        &self,
        connection: &str,
        user_id: &str,
        channel_id: &str,
        assertion: &str,
        scopes: &[String],
    ) -> Result<Option<TokenResponse>, TurngateError>;

    /// Clears the provider-side token for the user.
    async fn sign_out(
        &self,
        connection: &str,
        user_id: &str,
        channel_id: &str,
    ) -> Result<(), TurngateError>;
}
