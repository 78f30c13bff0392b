//! JWT decoding at two trust levels
//!
//! - [`decode_unverified`] reads the payload without checking anything. Its output
//!   only picks which issuer's key to fetch.
//! - [`verify_signature`] checks the signature against a resolved key and validates
//!   `exp`/`nbf`. Only its output may be trusted.

use crate::claims::{Claims, UnverifiedClaims};
use crate::error::{Result, SignatureFailure, TokenError};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use std::collections::HashSet;
use std::time::Duration;

/// Key material published by a UAA `/token_key` endpoint
///
/// Either a PEM encoded public key (RSA/EC) or, for servers configured with a
/// symmetric signing key, the shared secret itself.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    value: String,
}

impl SigningKey {
    /// Wrap key material as returned in the `value` field
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Raw key material
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the material is PEM encoded
    pub fn is_pem(&self) -> bool {
        self.value.trim_start().starts_with("-----BEGIN")
    }

    /// Build a decoding key suitable for `alg`
    fn decoding_key(&self, alg: Algorithm) -> Result<DecodingKey> {
        let pem = self.value.as_bytes();
        let key = match alg {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem)?,
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem)?,
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem)?,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                // A public key is public; accepting it as an HMAC secret would let
                // anyone mint tokens.
                if self.is_pem() {
                    return Err(TokenError::Signature {
                        kind: SignatureFailure::Algorithm,
                        detail: format!("{alg:?} cannot be verified with a public key"),
                    });
                }
                DecodingKey::from_secret(pem)
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(TokenError::Signature {
                    kind: SignatureFailure::Algorithm,
                    detail: format!("unsupported algorithm {other:?}"),
                });
            }
        };
        Ok(key)
    }
}

// Key material stays out of logs even when it is a public key
impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("pem", &self.is_pem())
            .field("len", &self.value.len())
            .finish()
    }
}

/// Rules applied by [`verify_signature`]
#[derive(Debug, Clone)]
pub struct VerificationPolicy {
    /// Algorithms a token header may name
    pub allowed_algorithms: Vec<Algorithm>,
    /// Clock skew tolerated on `exp`/`nbf`
    pub leeway: Duration,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            allowed_algorithms: default_algorithms(),
            leeway: Duration::ZERO,
        }
    }
}

/// RSA, RSA-PSS, ECDSA and HMAC: everything UAA can be configured to sign with
pub fn default_algorithms() -> Vec<Algorithm> {
    vec![
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::PS256,
        Algorithm::PS384,
        Algorithm::PS512,
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
    ]
}

/// Decode a token's claims without verifying anything
///
/// Returns `None` for empty input, anything that is not three dot-separated
/// segments, or a payload that is not a JSON object. The header is not read here;
/// [`verify_signature`] checks it against the allow-list.
pub fn decode_unverified(token: &str) -> Option<UnverifiedClaims> {
    let mut parts = token.split('.');
    let (Some(_), Some(payload), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Verify signature and time claims, returning the trusted claim set
///
/// Audience is not checked: UAA audiences are per-client and left to the caller.
pub fn verify_signature(
    token: &str,
    key: &SigningKey,
    policy: &VerificationPolicy,
) -> Result<Claims> {
    let header = decode_header(token)?;

    if !policy.allowed_algorithms.contains(&header.alg) {
        return Err(TokenError::Signature {
            kind: SignatureFailure::Algorithm,
            detail: format!("algorithm {:?} not allowed", header.alg),
        });
    }

    let decoding_key = key.decoding_key(header.alg)?;

    let mut validation = Validation::new(header.alg);
    validation.leeway = policy.leeway.as_secs();
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    let data = decode::<Claims>(token, &decoding_key, &validation)?;
    Ok(data.claims)
}
