//! The environment check as seen by the orchestrator.

use crate::error::Result;
use crate::identity::{self, IdentityPaths};
use crate::puppet::{CERTNAME, ConfigPort, MASTERPORT, SERVER, SSLDIR};
use crate::validator::{Validation, Validator};
use std::path::Path;
use std::time::Duration;

/// Decides whether an environment still exists.
///
/// `Err` is reserved for fatal problems (config access, identity). Network
/// trouble is reported as [`Validation::Indeterminate`].
pub trait EnvironmentCheck {
    fn check(&self, config: &dyn ConfigPort, environment: &str) -> Result<Validation>;
}

/// Checks against the Puppet server named in the agent configuration, using
/// the node's own certificate.
#[derive(Debug, Clone)]
pub struct RemoteCheck {
    timeout: Duration,
}

impl RemoteCheck {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl EnvironmentCheck for RemoteCheck {
    fn check(&self, config: &dyn ConfigPort, environment: &str) -> Result<Validation> {
        let server = SERVER.read(config)?;
        let port = MASTERPORT.read(config)?;
        let certname = CERTNAME.read(config)?;
        let ssldir = SSLDIR.read(config)?;

        let identity = identity::load(&IdentityPaths::from_ssldir(Path::new(&ssldir), &certname))?;
        let validator = Validator::new(&identity, self.timeout)?;

        tracing::info!("Checking if environment '{}' exists on '{}'", environment, server);
        Ok(validator.check(&server, &port, environment))
    }
}
