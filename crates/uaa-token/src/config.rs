//! Verifier configuration

use crate::error::{Result, TokenError};
use crate::jwt::{VerificationPolicy, default_algorithms};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by local and remote verification
///
/// The HTTP timeouts apply to both `/token_key` fetches and `/check_token` calls;
/// the verifiers add no timeout of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Total time allowed for one HTTP request (default: 10 seconds)
    pub request_timeout: Duration,
    /// Time allowed to establish a connection (default: 5 seconds)
    pub connect_timeout: Duration,
    /// Clock skew tolerated on `exp`/`nbf` (default: none)
    pub leeway: Duration,
    /// Algorithms accepted in token headers
    pub allowed_algorithms: Vec<Algorithm>,
    /// User agent sent to the authorization server
    pub user_agent: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            leeway: Duration::ZERO,
            allowed_algorithms: default_algorithms(),
            user_agent: format!("uaa-token/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl VerifierConfig {
    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set clock skew tolerance
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Restrict the accepted algorithms
    ///
    /// Never include an HMAC algorithm unless your UAA signs with a shared secret.
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.allowed_algorithms = algorithms;
        self
    }

    /// Build the HTTP client used for all authorization server calls
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::HttpClient`] if the TLS backend cannot be initialised.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(TokenError::HttpClient)
    }

    pub(crate) fn policy(&self) -> VerificationPolicy {
        VerificationPolicy {
            allowed_algorithms: self.allowed_algorithms.clone(),
            leeway: self.leeway,
        }
    }
}

/// Per-call options for remote verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteVerifyOptions {
    /// How long a successful result is retained; zero disables caching
    pub ttl: Duration,
    /// Whether the result cache is consulted and populated at all
    pub use_cache: bool,
}

impl Default for RemoteVerifyOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::ZERO,
            use_cache: true,
        }
    }
}

impl RemoteVerifyOptions {
    /// Retain successful results for `ttl`
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable the result cache for this call
    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub(crate) fn reads_cache(&self) -> bool {
        self.use_cache
    }

    pub(crate) fn writes_cache(&self) -> bool {
        self.use_cache && !self.ttl.is_zero()
    }
}
