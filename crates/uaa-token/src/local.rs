//! Local verification against a cached issuer signing key

use crate::claims::Claims;
use crate::endpoint::key_endpoint;
use crate::error::{Result, TokenError};
use crate::jwt::{VerificationPolicy, decode_unverified, verify_signature};
use crate::key_cache::KeyResolver;
use tracing::{debug, warn};

/// Verifies JWTs from a set of trusted UAA issuers
///
/// After the first key fetch per issuer this needs no network, but it cannot see
/// revocations; use [`RemoteVerifier`](crate::RemoteVerifier) for that.
#[derive(Debug, Clone)]
pub struct LocalVerifier {
    resolver: KeyResolver,
    policy: VerificationPolicy,
}

impl LocalVerifier {
    /// Create a verifier over `resolver`
    pub fn new(resolver: KeyResolver, policy: VerificationPolicy) -> Self {
        Self { resolver, policy }
    }

    /// The key resolver (and its cache)
    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Verify `token` was signed by one of `trusted_issuers` and has not expired
    ///
    /// The issuer is read from the unverified payload and checked first, so tokens
    /// from unknown issuers are rejected without any network call.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InvalidToken`] if `token` is empty or not a decodable JWT
    /// - [`TokenError::UntrustedIssuer`] if `iss` is missing or not trusted
    /// - [`TokenError::InvalidIssuerUrl`] if the trusted issuer is not a URL
    /// - [`TokenError::KeyFetch`] if the issuer's key cannot be fetched
    /// - [`TokenError::Signature`] if the signature, algorithm or time claims fail
    pub async fn verify<S: AsRef<str>>(&self, token: &str, trusted_issuers: &[S]) -> Result<Claims> {
        let Some(prelim) = decode_unverified(token) else {
            debug!("Token is not a decodable JWT");
            return Err(TokenError::InvalidToken);
        };

        let issuer = match prelim.iss {
            Some(iss) if trusted_issuers.iter().any(|t| t.as_ref() == iss) => iss,
            other => {
                debug!(issuer = ?other, "Token issuer is not trusted");
                return Err(TokenError::UntrustedIssuer { issuer: other });
            }
        };

        let key_url = key_endpoint(&issuer)?;
        let key = self.resolver.resolve_key(&key_url).await?;

        let claims = verify_signature(token, &key, &self.policy).map_err(|e| {
            warn!(issuer = %issuer, error = %e, "Token verification failed");
            e
        })?;

        debug!(issuer = %issuer, subject = ?claims.sub, "Token verified locally");
        Ok(claims)
    }
}
