// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the token service REST API.

use serde::{Deserialize, Serialize};

/// Response of the sign-in link endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInLinkResponse {
    /// Browser URL the user completes sign-in at.
    pub sign_in_link: String,
}

/// Request body of the on-behalf-of exchange endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest<'a> {
    pub user_id: &'a str,
    pub channel_id: &'a str,
    pub assertion: &'a str,
    pub scopes: &'a [String],
}

/// Error body the token service returns on failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Detail of a token service error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub type_: String,
    pub message: String,
}
