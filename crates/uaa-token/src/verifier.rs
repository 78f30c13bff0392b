//! One handle for both verification modes

use crate::claims::Claims;
use crate::config::{RemoteVerifyOptions, VerifierConfig};
use crate::error::Result;
use crate::key_cache::{KeyCache, KeyResolver};
use crate::local::LocalVerifier;
use crate::remote::RemoteVerifier;
use crate::result_cache::ResultCache;

/// Local and remote token verification sharing one HTTP client
///
/// The two modes keep separate caches: clearing keys leaves introspection results
/// alone and vice versa. Cloning is cheap and clones share both caches.
///
/// # Example
///
/// ```rust,no_run
/// use uaa_token::{RemoteVerifyOptions, TokenVerifier};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let verifier = TokenVerifier::new()?;
/// let trusted = ["https://uaa.example.com/oauth/token"];
///
/// let claims = verifier.verify("eyJhbGciOi...", &trusted).await?;
/// println!("Hello {:?}", claims.user_name);
///
/// let options = RemoteVerifyOptions::default().with_ttl(Duration::from_secs(5));
/// let claims = verifier
///     .remote_verify("dfbe8dbc...", trusted[0], "client", "secret", &options)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    local: LocalVerifier,
    remote: RemoteVerifier,
}

impl TokenVerifier {
    /// Create a verifier with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(&VerifierConfig::default())
    }

    /// Create a verifier from `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_config(config: &VerifierConfig) -> Result<Self> {
        Ok(Self::with_parts(
            config,
            config.http_client()?,
            KeyCache::new(),
            ResultCache::new(),
        ))
    }

    /// Create a verifier over caller-supplied client and caches
    pub fn with_parts(
        config: &VerifierConfig,
        http_client: reqwest::Client,
        keys: KeyCache,
        results: ResultCache,
    ) -> Self {
        Self {
            local: LocalVerifier::new(
                KeyResolver::with_cache(http_client.clone(), keys),
                config.policy(),
            ),
            remote: RemoteVerifier::with_cache(http_client, results),
        }
    }

    /// Verify a JWT locally; see [`LocalVerifier::verify`]
    ///
    /// # Errors
    ///
    /// See [`LocalVerifier::verify`].
    pub async fn verify<S: AsRef<str>>(&self, token: &str, trusted_issuers: &[S]) -> Result<Claims> {
        self.local.verify(token, trusted_issuers).await
    }

    /// Verify any token through `/check_token`; see [`RemoteVerifier::remote_verify`]
    ///
    /// # Errors
    ///
    /// See [`RemoteVerifier::remote_verify`].
    pub async fn remote_verify(
        &self,
        token: &str,
        issuer: &str,
        client_id: &str,
        client_secret: &str,
        options: &RemoteVerifyOptions,
    ) -> Result<Claims> {
        self.remote
            .remote_verify(token, issuer, client_id, client_secret, options)
            .await
    }

    /// Forget every cached signing key
    pub fn clear_key_cache(&self) {
        self.local.resolver().cache().clear();
    }

    /// Signing key cache
    pub fn key_cache(&self) -> &KeyCache {
        self.local.resolver().cache()
    }

    /// Introspection result cache
    pub fn result_cache(&self) -> &ResultCache {
        self.remote.cache()
    }
}
