//! Access to the agent's own configuration (`puppet.conf`).
//!
//! The launcher never parses `puppet.conf` itself. Values are read and written
//! through a [`ConfigPort`], addressed by `(section, key)`. The production port
//! shells out to `puppet config print` / `puppet config set`.

mod command;
#[cfg(test)]
pub mod memory;

pub use command::PuppetConfig;

use crate::error::Result;

/// Read/write access to agent configuration values.
///
/// Calls are synchronous and authoritative. An empty string from `get` means
/// the value is unset.
pub trait ConfigPort {
    /// Read `key` from `section`.
    fn get(&self, section: &str, key: &str) -> Result<String>;

    /// Write `value` to `key` in `section`.
    fn set(&self, section: &str, key: &str, value: &str) -> Result<()>;
}

/// A configuration value the launcher needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub section: &'static str,
    pub key: &'static str,
}

impl Setting {
    /// Read this setting through `port`.
    pub fn read(&self, port: &dyn ConfigPort) -> Result<String> {
        port.get(self.section, self.key)
    }

    /// Write this setting through `port`.
    pub fn write(&self, port: &dyn ConfigPort, value: &str) -> Result<()> {
        port.set(self.section, self.key, value)
    }
}

/// Node certificate name.
pub const CERTNAME: Setting = Setting {
    section: "agent",
    key: "certname",
};

/// Directory holding the node's certificates and keys.
pub const SSLDIR: Setting = Setting {
    section: "main",
    key: "ssldir",
};

/// Puppet server host name.
pub const SERVER: Setting = Setting {
    section: "agent",
    key: "server",
};

/// Puppet server port.
pub const MASTERPORT: Setting = Setting {
    section: "agent",
    key: "masterport",
};

/// Environment the agent requests from the server.
pub const ENVIRONMENT: Setting = Setting {
    section: "agent",
    key: "environment",
};
