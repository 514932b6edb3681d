// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a hosted token service.
//!
//! Provides [`RestTokenClient`] which handles request construction,
//! authentication, no-token status mapping, and transient error retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use turngate_config::ServiceConfig;
use turngate_core::{TokenClient, TokenResponse, TurngateError};

use crate::types::{ApiErrorResponse, ExchangeRequest, SignInLinkResponse};

/// HTTP client for the token service.
///
/// Maps the service's status contract onto the [`TokenClient`] outcomes:
/// 404 means "no token" on lookup endpoints and "not exchangeable" on
/// the exchange endpoint, both `Ok(None)`. Transient errors (429, 500,
/// 503) retry once after a short delay.
#[derive(Debug, Clone)]
pub struct RestTokenClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl RestTokenClient {
    /// Creates a client from service configuration.
    ///
    /// Requires `service.base_url`; `service.api_token`, when present, is
    /// sent as a bearer credential on every request.
    pub fn new(config: &ServiceConfig) -> Result<Self, TurngateError> {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                TurngateError::Config("service.base_url is required for the REST token client".into())
            })?;

        let mut headers = HeaderMap::new();
        if let Some(api_token) = config.api_token.as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {api_token}"))
                .map_err(|e| TurngateError::Config(format!("invalid api_token header value: {e}")))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TurngateError::TokenService {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Sends a request, retrying once on transient statuses, and maps
    /// 404 to `Ok(None)`.
    async fn send_with_retry(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<Option<reqwest::Response>, TurngateError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(operation, attempt, "retrying token service request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = build().send().await.map_err(|e| TurngateError::TokenService {
                message: format!("{operation}: HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            let status = response.status();
            debug!(operation, status = %status, attempt, "token service response");

            if status.is_success() {
                return Ok(Some(response));
            }
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(operation, status = %status, body = %body, "transient error, will retry");
                last_error = Some(TurngateError::TokenService {
                    message: format!("{operation}: service returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "{operation}: token service error ({}): {}",
                    api_err.error.type_, api_err.error.message
                )
            } else {
                format!("{operation}: service returned {status}: {body}")
            };
            return Err(TurngateError::TokenService {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| TurngateError::TokenService {
            message: format!("{operation}: retries exhausted"),
            source: None,
        }))
    }

    async fn parse_token(
        response: Option<reqwest::Response>,
        operation: &str,
    ) -> Result<Option<TokenResponse>, TurngateError> {
        match response {
            Some(response) => {
                let token =
                    response
                        .json::<TokenResponse>()
                        .await
                        .map_err(|e| TurngateError::TokenService {
                            message: format!("{operation}: malformed token response: {e}"),
                            source: Some(Box::new(e)),
                        })?;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    fn token_url(&self, connection: &str) -> String {
        format!("{}/v1/connections/{connection}/token", self.base_url)
    }
}

#[async_trait]
impl TokenClient for RestTokenClient {
    async fn get_sign_in_link(
        &self,
        connection: &str,
        user_id: &str,
        scopes: &[String],
    ) -> Result<String, TurngateError> {
        let url = format!("{}/v1/connections/{connection}/signin/link", self.base_url);
        let scopes = scopes.join(",");
        let response = self
            .send_with_retry(
                || {
                    self.client
                        .get(&url)
                        .query(&[("userId", user_id), ("scopes", scopes.as_str())])
                },
                "get_sign_in_link",
            )
            .await?
            .ok_or_else(|| TurngateError::TokenService {
                message: format!("get_sign_in_link: connection `{connection}` not found"),
                source: None,
            })?;

        let link = response.json::<SignInLinkResponse>().await.map_err(|e| {
            TurngateError::TokenService {
                message: format!("get_sign_in_link: malformed response: {e}"),
                source: Some(Box::new(e)),
            }
        })?;
        Ok(link.sign_in_link)
    }

    async fn get_token_silently(
        &self,
        connection: &str,
        user_id: &str,
        channel_id: &str,
        scopes: &[String],
    ) -> Result<Option<TokenResponse>, TurngateError> {
        let url = self.token_url(connection);
        let scopes = scopes.join(",");
        let response = self
            .send_with_retry(
                || {
                    self.client.get(&url).query(&[
                        ("userId", user_id),
                        ("channelId", channel_id),
                        ("scopes", scopes.as_str()),
                    ])
                },
                "get_token_silently",
            )
            .await?;
        Self::parse_token(response, "get_token_silently").await
    }

    async fn get_user_token(
        &self,
        connection: &str,
        user_id: &str,
        channel_id: &str,
        magic_code: &str,
    ) -> Result<Option<TokenResponse>, TurngateError> {
        let url = self.token_url(connection);
        let response = self
            .send_with_retry(
                || {
                    self.client.get(&url).query(&[
                        ("userId", user_id),
                        ("channelId", channel_id),
                        ("code", magic_code),
                    ])
                },
                "get_user_token",
            )
            .await?;
        Self::parse_token(response, "get_user_token").await
    }

    async fn exchange_on_behalf_of(
        &self,
        connection: &str,
        user_id: &str,
        channel_id: &str,
        assertion: &str,
        scopes: &[String],
    ) -> Result<Option<TokenResponse>, TurngateError> {
        let url = format!("{}/exchange", self.token_url(connection));
        let body = ExchangeRequest {
            user_id,
            channel_id,
            assertion,
            scopes,
        };
        let response = self
            .send_with_retry(|| self.client.post(&url).json(&body), "exchange_on_behalf_of")
            .await?;
        Self::parse_token(response, "exchange_on_behalf_of").await
    }

    async fn sign_out(
        &self,
        connection: &str,
        user_id: &str,
        channel_id: &str,
    ) -> Result<(), TurngateError> {
        let url = self.token_url(connection);
        // 404 on sign-out means there was nothing to clear.
        self.send_with_retry(
            || {
                self.client
                    .delete(&url)
                    .query(&[("userId", user_id), ("channelId", channel_id)])
            },
            "sign_out",
        )
        .await?;
        Ok(())
    }
}

/// Whether the status indicates a transient failure worth one retry.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::SERVICE_UNAVAILABLE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> ServiceConfig {
        ServiceConfig {
            base_url: Some(base_url.to_string()),
            api_token: Some("svc-token".to_string()),
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn client_requires_a_base_url() {
        let err = RestTokenClient::new(&ServiceConfig::default())
            .expect_err("missing base_url must fail");
        assert!(matches!(err, TurngateError::Config(_)));
    }

    #[tokio::test]
    async fn get_token_silently_parses_token_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/connections/graph/token"))
            .and(query_param("userId", "user-1"))
            .and(query_param("channelId", "msteams"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "tok-1" })),
            )
            .mount(&server)
            .await;

        let client = RestTokenClient::new(&config(&server.uri())).expect("client");
        let token = client
            .get_token_silently("graph", "user-1", "msteams", &[])
            .await
            .expect("request")
            .expect("token present");
        assert_eq!(token.token, "tok-1");
    }

    #[tokio::test]
    async fn not_found_maps_to_no_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/connections/graph/token"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = RestTokenClient::new(&config(&server.uri())).expect("client");
        let token = client
            .get_user_token("graph", "user-1", "msteams", "123456")
            .await
            .expect("request");
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn exchange_posts_assertion_and_parses_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/connections/graph/token/exchange"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "tok-x" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = RestTokenClient::new(&config(&server.uri())).expect("client");
        let token = client
            .exchange_on_behalf_of("graph", "user-1", "msteams", "assertion", &[])
            .await
            .expect("request")
            .expect("token present");
        assert_eq!(token.token, "tok-x");
    }

    #[tokio::test]
    async fn transient_error_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/connections/graph/token"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/connections/graph/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "tok-2" })),
            )
            .mount(&server)
            .await;

        let client = RestTokenClient::new(&config(&server.uri())).expect("client");
        let token = client
            .get_token_silently("graph", "user-1", "msteams", &[])
            .await
            .expect("request")
            .expect("token present after retry");
        assert_eq!(token.token, "tok-2");
    }

    #[tokio::test]
    async fn non_transient_error_surfaces_service_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/connections/graph/signin/link"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": { "type": "forbidden", "message": "bad credentials" }
            })))
            .mount(&server)
            .await;

        let client = RestTokenClient::new(&config(&server.uri())).expect("client");
        let err = client
            .get_sign_in_link("graph", "user-1", &[])
            .await
            .expect_err("403 must fail");
        let message = format!("{err}");
        assert!(
            message.contains("bad credentials"),
            "expected service detail in error, got: {message}"
        );
    }

    #[tokio::test]
    async fn sign_in_link_round_trips() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/connections/github/signin/link"))
            .and(query_param("scopes", "repo,gist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "signInLink": "https://signin.example.test/github"
            })))
            .mount(&server)
            .await;

        let client = RestTokenClient::new(&config(&server.uri())).expect("client");
        let link = client
            .get_sign_in_link("github", "user-1", &["repo".into(), "gist".into()])
            .await
            .expect("request");
        assert_eq!(link, "https://signin.example.test/github");
    }
}
