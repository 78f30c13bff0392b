//! uaa-token demo server
//!
//! - `GET /hello`: no authentication
//! - `GET /fast`: bearer token verified locally against the trusted issuers
//! - `GET /remote`: bearer token verified by the first issuer's `/check_token`
//!
//! ```text
//! TRUSTED_ISSUERS=https://uaa.example.com/oauth/token \
//! UAA_CLIENT_ID=token_check_user UAA_CLIENT_SECRET=... \
//!     uaa-token-demo --port 9001
//! ```

mod config;
mod routes;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uaa_token::TokenVerifier;

use crate::config::Args;
use crate::routes::{DemoState, router};

fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let remote = args.remote_credentials();
    if remote.is_none() {
        info!("No client credentials given; /remote will answer 503");
    }

    let state = Arc::new(DemoState {
        verifier: TokenVerifier::new().context("failed to build token verifier")?,
        trusted_issuers: args.trusted_issuers.clone(),
        remote,
    });

    let addr = args.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, issuers = ?state.trusted_issuers, "Started");
    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}
