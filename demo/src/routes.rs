//! Routes guarded by local and remote verification

use crate::config::RemoteCredentials;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::get,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, warn};
use uaa_token::{RemoteVerifyOptions, TokenVerifier};

/// Shared handler state
#[derive(Debug)]
pub struct DemoState {
    pub verifier: TokenVerifier,
    pub trusted_issuers: Vec<String>,
    pub remote: Option<RemoteCredentials>,
}

pub fn router(state: Arc<DemoState>) -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/fast", get(fast))
        .route("/remote", get(remote))
        .with_state(state)
}

/// Extract Bearer token from Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authentication_required() -> Response {
    (StatusCode::UNAUTHORIZED, "Authentication Required").into_response()
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Unauthorized").into_response()
}

async fn hello() -> &'static str {
    "Howdy my unsecured friend!"
}

async fn fast(State(state): State<Arc<DemoState>>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        info!("No bearer token on /fast");
        return authentication_required();
    };

    match state.verifier.verify(token, &state.trusted_issuers).await {
        Ok(claims) => format!(
            "Hello {}, my fast-token authenticated chum!",
            claims.user_name.unwrap_or_default()
        )
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Local verification rejected request");
            forbidden()
        }
    }
}

async fn remote(State(state): State<Arc<DemoState>>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        info!("No bearer token on /remote");
        return authentication_required();
    };
    let Some(creds) = state.remote.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Remote verification is not configured",
        )
            .into_response();
    };

    let options = RemoteVerifyOptions::default().with_ttl(creds.ttl);
    let result = state
        .verifier
        .remote_verify(
            token,
            &creds.issuer,
            &creds.client_id,
            creds.client_secret.expose_secret(),
            &options,
        )
        .await;

    match result {
        Ok(claims) => format!(
            "Hello {}, my remote authenticated chum!",
            claims.user_name.unwrap_or_default()
        )
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Remote verification rejected request");
            forbidden()
        }
    }
}
