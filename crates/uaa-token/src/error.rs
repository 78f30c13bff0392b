//! Error types for token verification
//!
//! Every failure is surfaced to the caller; nothing is retried or swallowed here.
//! Retries, backoff and response mapping belong to the consuming middleware.

use reqwest::StatusCode;
use std::fmt;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TokenError>;

/// Token verification error
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TokenError {
    /// Token is empty or cannot be decoded as a JWT
    #[error("Not a valid token")]
    InvalidToken,

    /// Token decodes, but its `iss` claim is absent or not in the trusted set
    #[error("Not a trusted issuer: {}", .issuer.as_deref().unwrap_or("<missing iss>"))]
    UntrustedIssuer {
        /// The unverified issuer claimed by the token
        issuer: Option<String>,
    },

    /// Issuer URI cannot be parsed into an absolute URL
    #[error("Invalid issuer URL '{issuer}': {source}")]
    InvalidIssuerUrl {
        /// The offending issuer
        issuer: String,
        /// Why it was rejected
        #[source]
        source: IssuerUrlError,
    },

    /// Signing key could not be retrieved from the key endpoint
    #[error("Error reading key from {url}: {source}")]
    KeyFetch {
        /// Key endpoint URL
        url: String,
        /// Underlying failure
        #[source]
        source: KeyFetchError,
    },

    /// Cryptographic or claim verification failed
    #[error("{kind}: {detail}")]
    Signature {
        /// Which check failed
        kind: SignatureFailure,
        /// Message from the JWT library
        detail: String,
    },

    /// Authorization server rejected the token or the client credentials
    #[error("Remote verification failed ({status}): {error}{}", describe(.error_description))]
    RemoteVerification {
        /// HTTP status of the rejection
        status: StatusCode,
        /// OAuth error code (`invalid_token`, `unauthorized`, ...)
        error: String,
        /// Human readable description, if any
        error_description: Option<String>,
    },

    /// Non-success response without a structured OAuth error body
    #[error("HTTP {status} from authorization server")]
    HttpStatus {
        /// Response status
        status: StatusCode,
        /// Raw response body (possibly empty)
        body: String,
    },

    /// Connection, DNS, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Success status but the body is not a claim set
    #[error("Invalid response from authorization server: {0}")]
    InvalidResponse(String),

    /// HTTP client could not be built from configuration
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" - {d}"))
        .unwrap_or_default()
}

impl TokenError {
    /// True when local verification failed because the token has expired
    pub fn is_expired(&self) -> bool {
        matches!(
            self,
            Self::Signature {
                kind: SignatureFailure::Expired,
                ..
            }
        )
    }

    /// True when the signature did not match the resolved key
    pub fn is_invalid_signature(&self) -> bool {
        matches!(
            self,
            Self::Signature {
                kind: SignatureFailure::InvalidSignature,
                ..
            }
        )
    }

    /// OAuth error code reported by the authorization server
    pub fn remote_error_code(&self) -> Option<&str> {
        match self {
            Self::RemoteVerification { error, .. } => Some(error),
            _ => None,
        }
    }

    /// HTTP status attached to the failure, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RemoteVerification { status, .. } | Self::HttpStatus { status, .. } => {
                Some(*status)
            }
            Self::KeyFetch {
                source: KeyFetchError::Status(status),
                ..
            } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// Reasons an issuer URI cannot be used to derive endpoints
#[derive(Debug, thiserror::Error)]
pub enum IssuerUrlError {
    /// Not a URL at all
    #[error(transparent)]
    Parse(#[from] url::ParseError),

    /// Parsed, but relative to nothing (`mailto:`, `urn:`, ...)
    #[error("issuer must be an absolute URL with a host")]
    NoHost,
}

/// Reasons a `/token_key` fetch fails
#[derive(Debug, thiserror::Error)]
pub enum KeyFetchError {
    /// No response was received
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("unexpected status {0}")]
    Status(StatusCode),

    /// Body is not JSON or carries no `value`
    #[error("invalid key response: {0}")]
    InvalidResponse(String),
}

/// Distinguishes the ways trusted verification of a JWT can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFailure {
    /// Signature does not match the resolved key
    InvalidSignature,
    /// `exp` is in the past
    Expired,
    /// `nbf` is in the future
    NotYetValid,
    /// Header algorithm is not allowed, or does not fit the key
    Algorithm,
    /// Key material cannot be used for this algorithm
    Key,
    /// A required claim is missing
    MissingClaim,
    /// Token structure failed strict decoding
    Malformed,
}

impl fmt::Display for SignatureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidSignature => "invalid signature",
            Self::Expired => "jwt expired",
            Self::NotYetValid => "jwt not active",
            Self::Algorithm => "invalid algorithm",
            Self::Key => "invalid key",
            Self::MissingClaim => "missing required claim",
            Self::Malformed => "jwt malformed",
        };
        f.write_str(s)
    }
}

impl From<&jsonwebtoken::errors::Error> for SignatureFailure {
    fn from(err: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::Algorithm,
            ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidRsaKey(_)
            | ErrorKind::InvalidKeyFormat => Self::Key,
            ErrorKind::MissingRequiredClaim(_) => Self::MissingClaim,
            _ => Self::Malformed,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Signature {
            kind: SignatureFailure::from(&err),
            detail: err.to_string(),
        }
    }
}
