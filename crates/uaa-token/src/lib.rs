//! # uaa-token - Fast bearer token verification for UAA
//!
//! Verifies access tokens issued by a UAA authorization server in two modes:
//!
//! - **Local** ([`TokenVerifier::verify`]): the token's issuer must be in a trusted
//!   set; the issuer's signing key is fetched once from `<issuer>/token_key`, cached,
//!   and used to check the signature and expiry. No network after the first call per
//!   issuer, but revocation is invisible.
//! - **Remote** ([`TokenVerifier::remote_verify`]): the token is sent to the issuer's
//!   `/check_token` endpoint with client credentials. Works for opaque tokens and
//!   sees revocation. Results can be retained for a caller-chosen TTL.
//!
//! ## Architecture
//!
//! - [`jwt`] - unverified decode and trusted signature verification
//! - [`endpoint`] - `/token_key` and `/check_token` URL derivation
//! - [`key_cache`] - permanent per-URL signing key cache and HTTP resolver
//! - [`result_cache`] - per-entry TTL cache of introspection results
//! - [`local`] / [`remote`] - the two verifiers
//! - [`verifier`] - [`TokenVerifier`], holding both
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use uaa_token::{TokenError, TokenVerifier};
//!
//! # async fn example(bearer: &str) -> Result<(), TokenError> {
//! let verifier = TokenVerifier::new()?;
//! let trusted = ["https://uaa.example.com/oauth/token"];
//!
//! match verifier.verify(bearer, &trusted).await {
//!     Ok(claims) => println!("Hello {}", claims.user_name.unwrap_or_default()),
//!     Err(e) if e.is_expired() => println!("Token expired"),
//!     Err(e) => println!("Rejected: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod claims;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod jwt;
pub mod key_cache;
pub mod local;
pub mod remote;
pub mod result_cache;
pub mod verifier;

#[doc(inline)]
pub use claims::{Claims, UnverifiedClaims};
#[doc(inline)]
pub use config::{RemoteVerifyOptions, VerifierConfig};
#[doc(inline)]
pub use error::{IssuerUrlError, KeyFetchError, Result, SignatureFailure, TokenError};
#[doc(inline)]
pub use jwt::{SigningKey, VerificationPolicy, decode_unverified, verify_signature};
#[doc(inline)]
pub use key_cache::{KeyCache, KeyResolver};
#[doc(inline)]
pub use local::LocalVerifier;
#[doc(inline)]
pub use remote::RemoteVerifier;
#[doc(inline)]
pub use result_cache::{ResultCache, ResultCacheStats};
#[doc(inline)]
pub use verifier::TokenVerifier;

// Re-exported so callers can configure algorithms without depending on jsonwebtoken
pub use jsonwebtoken::Algorithm;
