//! OAuth 2.0 out-of-band flow for Google APIs.
//!
//! # Flow Overview
//!
//! 1. Build the authorization URL with the out-of-band redirect URI
//! 2. The user opens it, grants access and copies the verification code
//! 3. Exchange the code for access and refresh tokens
//! 4. Later, exchange the refresh token for fresh access tokens
//!
//! The token endpoint answers grant problems (revoked refresh token, reused
//! code) with a 4xx JSON body carrying an `error` field. Those answers become
//! tokens with an error marker rather than `Err`, so the caller can persist
//! or inspect them like any other token.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::token::Token;

use super::config::GoogleConfig;

/// OAuth client for Google APIs.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: GoogleConfig,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client sharing `http_client`.
    pub fn new(config: GoogleConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Builds the Google OAuth authorization URL.
    pub fn auth_url(&self) -> String {
        build_auth_url(&self.config)
    }

    /// Exchanges a verification code for tokens.
    pub async fn exchange_code(&self, code: &str) -> ProviderResult<Token> {
        let params = [
            ("client_id", self.config.credentials.client_id.as_str()),
            ("client_secret", self.config.credentials.client_secret.as_str()),
            ("code", code.trim()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let token = self.post_token_request(&params, "token exchange").await?;
        if !token.has_error() {
            info!("successfully obtained tokens");
        }
        Ok(token)
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> ProviderResult<Token> {
        let params = [
            ("client_id", self.config.credentials.client_id.as_str()),
            ("client_secret", self.config.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let token = self.post_token_request(&params, "token refresh").await?;
        if !token.has_error() {
            info!("successfully refreshed access token");
        }
        Ok(token)
    }

    async fn post_token_request(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> ProviderResult<Token> {
        debug!(endpoint = %self.config.token_endpoint, "{} request", what);

        let response = self
            .http_client
            .post(&self.config.token_endpoint)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("{} request failed: {}", what, e)).with_source(e)
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        parse_token_response(status, &body, Utc::now())
    }
}

/// Builds the authorization URL for `config`.
pub(crate) fn build_auth_url(config: &GoogleConfig) -> String {
    let scope = config.scopes.join(" ");

    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
        access_type=offline&prompt={}",
        config.auth_endpoint,
        urlencoding::encode(&config.credentials.client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(&scope),
        urlencoding::encode(&config.prompt),
    )
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Error body from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Turns a token endpoint answer into a [`Token`].
fn parse_token_response(status: u16, body: &str, now: DateTime<Utc>) -> ProviderResult<Token> {
    if (200..300).contains(&status) {
        let response: TokenResponse = serde_json::from_str(body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
        })?;

        let mut token = Token::new(response.access_token);
        if let Some(refresh_token) = response.refresh_token {
            token = token.with_refresh_token(refresh_token);
        }
        if let Some(expires_in) = response.expires_in {
            token = token.with_expires_in(now, expires_in);
        }
        if let Some(scope) = response.scope {
            token = token.with_scope(scope);
        }
        return Ok(token);
    }

    if (400..500).contains(&status)
        && let Ok(error) = serde_json::from_str::<TokenErrorResponse>(body)
    {
        let marker = match error.error_description {
            Some(description) if !description.is_empty() => {
                format!("{}: {}", error.error, description)
            }
            _ => error.error,
        };
        warn!(status, error = %marker, "token endpoint rejected the grant");
        return Ok(Token::failed(marker));
    }

    if status >= 500 {
        return Err(ProviderError::server(format!(
            "token endpoint error ({}): {}",
            status, body
        )));
    }

    Err(ProviderError::invalid_response(format!(
        "unexpected token endpoint response ({}): {}",
        status, body
    )))
}
