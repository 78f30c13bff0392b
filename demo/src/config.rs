//! Command line and environment settings

use clap::Parser;
use secrecy::SecretString;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// uaa-token-demo - routes guarded by local and remote UAA token verification
#[derive(Parser, Debug)]
#[command(name = "uaa-token-demo", version, about)]
pub struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 9001)]
    pub port: u16,

    /// Trusted token issuers; the first one also serves `/remote`
    #[arg(
        long = "trusted-issuer",
        env = "TRUSTED_ISSUERS",
        value_delimiter = ',',
        required = true
    )]
    pub trusted_issuers: Vec<String>,

    /// Client id used to call `/check_token`
    #[arg(long, env = "UAA_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret used to call `/check_token`
    #[arg(
        long,
        env = "UAA_CLIENT_SECRET",
        hide_env_values = true,
        value_parser = parse_secret
    )]
    pub client_secret: Option<SecretString>,

    /// Seconds to retain a successful `/check_token` result
    #[arg(long, env = "REMOTE_TTL_SECS", default_value_t = 5)]
    pub remote_ttl_secs: u64,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

fn parse_secret(value: &str) -> Result<SecretString, String> {
    Ok(SecretString::new(value.to_string()))
}

/// Client credentials for `/check_token`
#[derive(Debug)]
pub struct RemoteCredentials {
    pub issuer: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub ttl: Duration,
}

impl Args {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Credentials for the remote route, if both id and secret were given
    pub fn remote_credentials(&self) -> Option<RemoteCredentials> {
        let issuer = self.trusted_issuers.first()?;
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Some(RemoteCredentials {
                issuer: issuer.clone(),
                client_id: id.clone(),
                client_secret: secret.clone(),
                ttl: Duration::from_secs(self.remote_ttl_secs),
            }),
            _ => None,
        }
    }
}
