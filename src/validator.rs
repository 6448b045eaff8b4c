//! Environment validation against the Puppet server.
//!
//! A single mutually authenticated HTTPS request decides whether the
//! configured environment still exists. Only the status code matters:
//! - 2xx: the environment exists
//! - 404: the environment is gone
//! - anything else, or no response at all: unknown
//!
//! An unknown outcome must never cause the environment to be reset. There are
//! no retries; cron runs us again soon enough.

use crate::error::{CronError, Result};
use crate::identity::Identity;
use std::sync::Arc;
use std::time::Duration;

/// Endpoint that answers 404 when the `environment` query names an unknown
/// environment.
pub const ENVIRONMENT_CHECK_PATH: &str = "/puppet/v3/file_metadatas/plugins";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of an environment check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The server knows the environment.
    Valid,
    /// The server answered 404.
    Invalid,
    /// The check could not be completed; keep the current value.
    Indeterminate(String),
}

impl Validation {
    /// Map an HTTP status code to an outcome.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Validation::Invalid,
            200..=299 => Validation::Valid,
            other => Validation::Indeterminate(format!("unexpected status {}", other)),
        }
    }
}

/// mTLS client for the environment check.
pub struct Validator {
    agent: ureq::Agent,
}

impl Validator {
    /// Build a client that presents the node certificate and trusts only the
    /// node's CA bundle.
    ///
    /// Fails with `IdentityLoad` if the certificate and key can't be used
    /// together.
    pub fn new(identity: &Identity, timeout: Duration) -> Result<Self> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let tls = rustls::ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| CronError::IdentityLoad(format!("failed to configure TLS: {}", e)))?
            .with_root_certificates(identity.roots.clone())
            .with_client_auth_cert(identity.cert_chain.clone(), identity.key.clone_key())
            .map_err(|e| {
                CronError::IdentityLoad(format!("client certificate and key are unusable: {}", e))
            })?;

        let agent = ureq::AgentBuilder::new()
            .tls_config(Arc::new(tls))
            .timeout(timeout)
            .redirects(0)
            .build();

        Ok(Self { agent })
    }

    /// Ask `server:port` whether `environment` exists.
    pub fn check(&self, server: &str, port: &str, environment: &str) -> Validation {
        let url = check_url(server, port);

        let response = self
            .agent
            .get(&url)
            .query("environment", environment)
            .set("Accept", "application/json")
            .call();

        match response {
            Ok(response) => Validation::from_status(response.status()),
            Err(ureq::Error::Status(code, _)) => Validation::from_status(code),
            Err(ureq::Error::Transport(transport)) => {
                Validation::Indeterminate(format!("request to {} failed: {}", url, transport))
            }
        }
    }
}

fn check_url(server: &str, port: &str) -> String {
    if server.contains(':') && !server.starts_with('[') {
        format!("https://[{}]:{}{}", server, port, ENVIRONMENT_CHECK_PATH)
    } else {
        format!("https://{}:{}{}", server, port, ENVIRONMENT_CHECK_PATH)
    }
}
