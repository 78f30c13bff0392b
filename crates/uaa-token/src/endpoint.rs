//! UAA endpoint derivation from an issuer URI
//!
//! UAA issuers look like `https://<host>[/<context>]/oauth/token`. The signing key
//! lives next to the token endpoint's context path, while `/check_token` is always
//! served from the host root.

use crate::error::{IssuerUrlError, Result, TokenError};
use url::Url;

const TOKEN_PATH: &str = "/oauth/token";

fn parse_issuer(issuer: &str) -> Result<Url> {
    let invalid = |source: IssuerUrlError| TokenError::InvalidIssuerUrl {
        issuer: issuer.to_string(),
        source,
    };

    let url = Url::parse(issuer).map_err(|e| invalid(e.into()))?;
    if url.cannot_be_a_base() || !url.has_host() {
        return Err(invalid(IssuerUrlError::NoHost));
    }

    Ok(url)
}

/// Signing key endpoint for an issuer
///
/// `http://localhost:8080/uaa/oauth/token` → `http://localhost:8080/uaa/token_key`
pub fn key_endpoint(issuer: &str) -> Result<String> {
    let mut url = parse_issuer(issuer)?;

    let path = url.path();
    let context = path.strip_suffix(TOKEN_PATH).unwrap_or(path);
    let context = context.trim_end_matches('/').to_string();

    url.set_path(&format!("{context}/token_key"));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.into())
}

/// Introspection endpoint for an issuer; the issuer's path is discarded
///
/// `https://uaa.example.com/oauth/token` → `https://uaa.example.com/check_token`
pub fn check_token_endpoint(issuer: &str) -> Result<String> {
    let mut url = parse_issuer(issuer)?;
    url.set_path("/check_token");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.into())
}
