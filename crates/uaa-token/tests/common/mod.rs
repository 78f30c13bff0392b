//! Common test utilities for integration tests
//!
//! A wiremock-backed UAA exposing `/uaa/token_key` and `/check_token`, plus helpers
//! for minting RS256 tokens with the fixture keys.

#![allow(dead_code)]

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

pub const SIGNER_PRIVATE: &str = include_str!("../fixtures/signer.key.pem");
pub const SIGNER_PUBLIC: &str = include_str!("../fixtures/signer.pub.pem");
pub const OTHER_PUBLIC: &str = include_str!("../fixtures/other_signer.pub.pem");

/// `Basic base64(uaaClient:secret)`
pub const VALID_BASIC_AUTH: &str = "Basic dWFhQ2xpZW50OnNlY3JldA==";

/// Mock UAA server
pub struct MockUaa {
    pub server: MockServer,
    /// Issuer with a `/uaa` context path, as a UAA deployed in a servlet container
    pub issuer: String,
    pub key_path: &'static str,
}

impl MockUaa {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let issuer = format!("{}/uaa/oauth/token", server.uri());

        Self {
            server,
            issuer,
            key_path: "/uaa/token_key",
        }
    }

    /// Serve `key` from `/uaa/token_key`, expecting exactly `times` fetches
    pub async fn mock_token_key(&self, key: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path(self.key_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "alg": "SHA256withRSA",
                "kty": "RSA",
                "use": "sig",
                "value": key,
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Serve `body` from `/uaa/token_key` without counting fetches
    pub async fn serve_token_key(&self, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(self.key_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer `/uaa/token_key` with `status`
    pub async fn mock_token_key_status(&self, status: u16, times: u64) {
        Mock::given(method("GET"))
            .and(path(self.key_path))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"msg": "nope"})))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// `/check_token` accepting `uaaClient:secret` and returning `claims`
    pub async fn mock_check_token(&self, token: &str, claims: serde_json::Value, times: u64) {
        Mock::given(method("POST"))
            .and(path("/check_token"))
            .and(header("authorization", VALID_BASIC_AUTH))
            .and(body_string_contains(format!("token={token}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(claims))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// `/check_token` rejecting the token
    pub async fn mock_check_token_invalid(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path("/check_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_token",
                "error_description": format!(
                    "The token expired, was revoked, or the token ID is incorrect: {token}"
                ),
            })))
            .mount(&self.server)
            .await;
    }

    /// `/check_token` rejecting the client credentials
    pub async fn mock_check_token_bad_credentials(&self) {
        Mock::given(method("POST"))
            .and(path("/check_token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "unauthorized",
                "error_description": "Bad credentials",
            })))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received on `path`
    pub async fn request_count(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}

/// Get current Unix timestamp
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs() as i64
}

/// UAA style access token claims
pub fn uaa_claims(iss: &str, exp_offset_secs: i64) -> serde_json::Value {
    let now = current_timestamp();
    json!({
        "jti": "0991563f5ca24b39b01c03f5e10f164b",
        "sub": "31fbcde5-765e-408e-a28c-0a234945c91a",
        "scope": ["openid"],
        "client_id": "test",
        "cid": "test",
        "azp": "test",
        "grant_type": "authorization_code",
        "user_id": "31fbcde5-765e-408e-a28c-0a234945c91a",
        "origin": "uaa",
        "user_name": "tester",
        "email": "tester@demo.local",
        "rev_sig": "8a0d35ce",
        "iat": now,
        "exp": now + exp_offset_secs,
        "iss": iss,
        "zid": "uaa",
        "aud": ["test", "openid"],
    })
}

/// Sign `claims` with the fixture RSA key
pub fn sign_rs256(claims: &serde_json::Value) -> String {
    let key = EncodingKey::from_rsa_pem(SIGNER_PRIVATE.as_bytes()).expect("Invalid RSA key");
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("legacy-token-key".to_string());
    header.typ = Some("JWT".to_string());
    encode(&header, claims, &key).expect("Failed to encode test JWT")
}

/// Introspection body for an opaque token, valid for an hour
pub fn opaque_token_claims(issuer: &str) -> serde_json::Value {
    json!({
        "user_id": "0bc9fe45-6c9e-4ae8-bde4-bde5a7d12345",
        "user_name": "testuser",
        "email": "test_user@example.com",
        "client_id": "uaaClient",
        "exp": current_timestamp() + 3600,
        "scope": ["openid"],
        "jti": "dfbe8dbc2d814438897c6cbb6e2363f5",
        "aud": ["openid", "uaaClient"],
        "sub": "0bc9fe45-6c9e-4ae8-bde4-cde3a7d12932",
        "iss": issuer,
        "iat": current_timestamp(),
        "cid": "uaaClient",
        "grant_type": "authorization_code",
        "azp": "uaaClient",
        "zid": "a8a2ffc4-b04e-4ec1-bfed-bde5a7d12345",
        "rev_sig": "91a62430",
        "nonce": "cb296893856f20c0b1bf56b0a9ca8914",
        "origin": "example-uaa",
        "revocable": true
    })
}
