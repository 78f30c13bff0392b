//! Remote verification via the UAA `/check_token` endpoint
//!
//! Introspection is authoritative: it sees revocations that local verification
//! cannot. Results can be retained in a [`ResultCache`] to spare the authorization
//! server; a retained result is only returned while its own `exp` is in the future.

use crate::claims::Claims;
use crate::config::RemoteVerifyOptions;
use crate::endpoint::check_token_endpoint;
use crate::error::{Result, TokenError};
use crate::result_cache::ResultCache;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

/// OAuth error body, either flat or nested under `error`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: OAuthError },
    Flat(OAuthError),
}

#[derive(Debug, Deserialize)]
struct OAuthError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl ErrorBody {
    fn into_inner(self) -> OAuthError {
        match self {
            Self::Nested { error } | Self::Flat(error) => error,
        }
    }
}

/// Verifies tokens by calling the issuer's `/check_token` endpoint
#[derive(Debug, Clone)]
pub struct RemoteVerifier {
    http_client: reqwest::Client,
    cache: ResultCache,
}

impl RemoteVerifier {
    /// Create a verifier with its own empty result cache
    pub fn new(http_client: reqwest::Client) -> Self {
        Self::with_cache(http_client, ResultCache::new())
    }

    /// Create a verifier over an existing result cache
    pub fn with_cache(http_client: reqwest::Client, cache: ResultCache) -> Self {
        Self { http_client, cache }
    }

    /// The result cache
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Ask `issuer` whether `token` is valid, authenticating as `client_id`
    ///
    /// With `options.use_cache` a retained, unexpired result is returned without a
    /// network call, and a fresh result is retained for `options.ttl` when that is
    /// non-zero. With `use_cache` off the cache is neither read nor written.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InvalidIssuerUrl`] if `issuer` is not a URL
    /// - [`TokenError::RemoteVerification`] if the server rejects the token or client
    /// - [`TokenError::HttpStatus`] for other non-success responses (e.g. 404)
    /// - [`TokenError::Transport`] if no response was received
    /// - [`TokenError::InvalidResponse`] if a success body is not a claim set
    pub async fn remote_verify(
        &self,
        token: &str,
        issuer: &str,
        client_id: &str,
        client_secret: &str,
        options: &RemoteVerifyOptions,
    ) -> Result<Claims> {
        if options.reads_cache()
            && let Some(cached) = self.cache.get(token).await
        {
            if !cached.is_expired_at(Utc::now()) {
                debug!(issuer = %issuer, "Using cached introspection result");
                return Ok(cached);
            }
            debug!(issuer = %issuer, "Cached introspection result has expired");
        }

        let endpoint = check_token_endpoint(issuer)?;
        let claims = self
            .check_token(&endpoint, token, client_id, client_secret)
            .await
            .map_err(|e| {
                warn!(endpoint = %endpoint, error = %e, "Remote verification failed");
                e
            })?;

        if options.writes_cache() {
            self.cache.insert(token, claims.clone(), options.ttl).await;
        }

        Ok(claims)
    }

    async fn check_token(
        &self,
        endpoint: &str,
        token: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Claims> {
        debug!(endpoint = %endpoint, client_id = %client_id, "Calling check_token");

        let response = self
            .http_client
            .post(endpoint)
            .basic_auth(client_id, Some(client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("token", token)])
            .send()
            .await
            .map_err(TokenError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status, body));
        }

        response
            .json::<Claims>()
            .await
            .map_err(|e| TokenError::InvalidResponse(e.to_string()))
    }
}

fn rejection(status: StatusCode, body: String) -> TokenError {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => {
            let OAuthError {
                error,
                error_description,
            } = parsed.into_inner();
            TokenError::RemoteVerification {
                status,
                error,
                error_description,
            }
        }
        Err(_) => TokenError::HttpStatus { status, body },
    }
}
