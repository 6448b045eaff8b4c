//! Node identity: client certificate, private key and CA bundle.
//!
//! Files follow Puppet's ssldir layout:
//! - `certs/<certname>.pem` - client certificate
//! - `private_keys/<certname>.pem` - client private key
//! - `certs/ca.pem` - CA bundle used to verify the server
//!
//! Identity is loaded fresh for every run and never cached.

use crate::error::{CronError, Result};
use rustls::RootCertStore;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Locations of the identity files for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub ca: PathBuf,
}

impl IdentityPaths {
    /// Paths for `certname` under `ssldir`.
    pub fn from_ssldir(ssldir: &Path, certname: &str) -> Self {
        let pem = format!("{}.pem", certname);
        Self {
            cert: ssldir.join("certs").join(&pem),
            key: ssldir.join("private_keys").join(&pem),
            ca: ssldir.join("certs").join("ca.pem"),
        }
    }
}

/// Parsed identity material, ready to build a TLS client.
#[derive(Debug)]
pub struct Identity {
    pub cert_chain: Vec<CertificateDer<'static>>,
    pub key: PrivateKeyDer<'static>,
    pub roots: RootCertStore,
}

/// Load and parse the identity files.
///
/// # Returns
///
/// * `Ok(Identity)` - All three files were read and contain usable PEM data
/// * `Err(CronError::IdentityLoad)` - A file is missing, unreadable or empty
pub fn load(paths: &IdentityPaths) -> Result<Identity> {
    let cert_chain = read_certs(&paths.cert, "client certificate")?;

    let key = rustls_pemfile::private_key(&mut open(&paths.key, "client key")?)
        .map_err(|e| parse_error(&paths.key, "client key", e))?
        .ok_or_else(|| {
            CronError::IdentityLoad(format!(
                "no private key found in '{}'",
                paths.key.display()
            ))
        })?;

    let mut roots = RootCertStore::empty();
    for cert in read_certs(&paths.ca, "CA bundle")? {
        roots.add(cert).map_err(|e| {
            CronError::IdentityLoad(format!(
                "invalid CA certificate in '{}': {}",
                paths.ca.display(),
                e
            ))
        })?;
    }

    Ok(Identity {
        cert_chain,
        key,
        roots,
    })
}

fn open(path: &Path, what: &str) -> Result<BufReader<File>> {
    File::open(path).map(BufReader::new).map_err(|e| {
        CronError::IdentityLoad(format!(
            "failed to open {} '{}': {}",
            what,
            path.display(),
            e
        ))
    })
}

fn read_certs(path: &Path, what: &str) -> Result<Vec<CertificateDer<'static>>> {
    let certs = rustls_pemfile::certs(&mut open(path, what)?)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| parse_error(path, what, e))?;

    if certs.is_empty() {
        return Err(CronError::IdentityLoad(format!(
            "no certificates found in {} '{}'",
            what,
            path.display()
        )));
    }

    Ok(certs)
}

fn parse_error(path: &Path, what: &str, e: std::io::Error) -> CronError {
    CronError::IdentityLoad(format!(
        "failed to parse {} '{}': {}",
        what,
        path.display(),
        e
    ))
}
