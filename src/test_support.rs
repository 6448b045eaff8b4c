use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair, KeyUsagePurpose,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig, ServerConnection, StreamOwned};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub(crate) const CERTNAME: &str = "node01.example.com";

/// A throwaway Puppet CA with one server and one agent certificate.
pub(crate) struct TestPki {
    ca_pem: String,
    ca_der: CertificateDer<'static>,
    server_cert: CertificateDer<'static>,
    server_key: Vec<u8>,
    client_cert_pem: String,
    client_key_pem: String,
}

impl TestPki {
    pub(crate) fn new() -> Self {
        let ca_key = KeyPair::generate().unwrap();
        let mut ca_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        ca_params
            .distinguished_name
            .push(DnType::CommonName, "Puppet CA: test");
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        ca_params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];
        let ca = ca_params.self_signed(&ca_key).unwrap();

        let server_key = KeyPair::generate().unwrap();
        let server = leaf(
            &["localhost", "127.0.0.1"],
            "puppet",
            ExtendedKeyUsagePurpose::ServerAuth,
            &server_key,
            &ca,
            &ca_key,
        );

        let client_key = KeyPair::generate().unwrap();
        let client = leaf(
            &[CERTNAME],
            CERTNAME,
            ExtendedKeyUsagePurpose::ClientAuth,
            &client_key,
            &ca,
            &ca_key,
        );

        Self {
            ca_pem: ca.pem(),
            ca_der: ca.der().clone(),
            server_cert: server.der().clone(),
            server_key: server_key.serialize_der(),
            client_cert_pem: client.pem(),
            client_key_pem: client_key.serialize_pem(),
        }
    }

    /// Lay out the agent's identity the way Puppet does under `ssldir`.
    pub(crate) fn write_ssldir(&self, ssldir: &Path) {
        std::fs::create_dir_all(ssldir.join("certs")).unwrap();
        std::fs::create_dir_all(ssldir.join("private_keys")).unwrap();
        std::fs::write(ssldir.join("certs/ca.pem"), &self.ca_pem).unwrap();
        std::fs::write(
            ssldir.join(format!("certs/{CERTNAME}.pem")),
            &self.client_cert_pem,
        )
        .unwrap();
        self.write_client_key(ssldir);
    }

    /// Write only the agent's private key. Used to pair one PKI's key with
    /// another's certificate.
    pub(crate) fn write_client_key(&self, ssldir: &Path) {
        std::fs::create_dir_all(ssldir.join("private_keys")).unwrap();
        std::fs::write(
            ssldir.join(format!("private_keys/{CERTNAME}.pem")),
            &self.client_key_pem,
        )
        .unwrap();
    }

    /// TLS config for a server that requires a client certificate from this CA.
    fn server_config(&self) -> Arc<ServerConfig> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());

        let mut roots = RootCertStore::empty();
        roots.add(self.ca_der.clone()).unwrap();
        let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
            .build()
            .unwrap();

        let key = PrivateKeyDer::from(PrivatePkcs8KeyDer::from(self.server_key.clone()));
        let config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_client_cert_verifier(verifier)
            .with_single_cert(vec![self.server_cert.clone()], key)
            .unwrap();

        Arc::new(config)
    }
}

fn leaf(
    names: &[&str],
    common_name: &str,
    usage: ExtendedKeyUsagePurpose,
    key: &KeyPair,
    ca: &Certificate,
    ca_key: &KeyPair,
) -> Certificate {
    let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    let mut params = CertificateParams::new(names).unwrap();
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    params.extended_key_usages = vec![usage];
    params.signed_by(key, ca, ca_key).unwrap()
}

/// One-shot HTTPS server answering a single request with a fixed status.
pub(crate) struct TestServer {
    port: u16,
    handle: JoinHandle<Option<String>>,
}

impl TestServer {
    pub(crate) const HOST: &'static str = "localhost";

    /// Start serving; `status` is the status line tail, e.g. `"404 Not Found"`.
    pub(crate) fn start(pki: &TestPki, status: &'static str) -> Self {
        let config = pki.server_config();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || serve_once(listener, config, status));

        Self { port, handle }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the server to finish and return the raw request head it read.
    ///
    /// `None` if no client completed a TLS handshake within the deadline.
    pub(crate) fn request(self) -> Option<String> {
        self.handle.join().unwrap()
    }
}

fn serve_once(
    listener: TcpListener,
    config: Arc<ServerConfig>,
    status: &'static str,
) -> Option<String> {
    let tcp = accept_with_deadline(&listener, Duration::from_secs(10))?;
    tcp.set_read_timeout(Some(Duration::from_secs(10))).ok()?;

    let conn = ServerConnection::new(config).ok()?;
    let mut tls = StreamOwned::new(conn, tcp);

    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = tls.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        request.extend_from_slice(&buf[..n]);
    }

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{{}}"
    );
    tls.write_all(response.as_bytes()).ok()?;
    tls.conn.send_close_notify();
    tls.flush().ok()?;

    Some(String::from_utf8_lossy(&request).into_owned())
}

fn accept_with_deadline(listener: &TcpListener, timeout: Duration) -> Option<TcpStream> {
    listener.set_nonblocking(true).ok()?;
    let deadline = Instant::now() + timeout;

    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false).ok()?;
                return Some(stream);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return None;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(_) => return None,
        }
    }
}

/// A local port with nothing listening on it.
pub(crate) fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
