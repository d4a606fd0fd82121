// Shared test helpers for certificate generation, local TLS servers and
// configuration.

#![allow(dead_code)] // Not every test file uses every helper

use std::collections::HashMap;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use ssl_expiry_checker::config::*;

#[path = "../src/test_helpers.rs"]
mod certificates;

use certificates::TestCertificateSpec;
pub use certificates::{utc, GeneratedCertificate};
use ssl_expiry_checker::{CertificateFetcher, FetchError, RawCertificate};

/// Generates a self-signed certificate. An empty `sans` slice leaves out the
/// SAN extension.
pub fn generate_certificate(
    common_name: Option<&str>,
    sans: &[&str],
    not_after: (i32, u8, u8),
) -> GeneratedCertificate {
    certificates::generate_certificate(&TestCertificateSpec {
        common_name,
        sans,
        not_after,
    })
}

/// Serves `cert` over TLS on an ephemeral 127.0.0.1 port until the test ends.
pub async fn spawn_tls_server(cert: &GeneratedCertificate) -> u16 {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_no_client_auth()
        .with_single_cert(
            vec![CertificateDer::from(cert.der.clone())],
            PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(cert.key_der.clone())),
        )
        .expect("server certificate");
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    let _ = tls.shutdown().await;
                }
            });
        }
    });

    port
}

/// Accepts TCP connections on an ephemeral port and never answers.
pub async fn spawn_silent_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    port
}

/// Answers every connection with plain text and closes it.
pub async fn spawn_plaintext_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let _ = stream
                .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n")
                .await;
            let _ = stream.shutdown().await;
        }
    });

    port
}

/// Serves canned PEM text per host; unknown hosts fail to connect.
#[derive(Default)]
pub struct FakeFetcher {
    certificates: HashMap<String, String>,
}

impl FakeFetcher {
    pub fn with(mut self, host: &str, pem: &str) -> Self {
        self.certificates.insert(host.to_string(), pem.to_string());
        self
    }
}

impl CertificateFetcher for FakeFetcher {
    async fn fetch(&self, host: &str) -> Result<RawCertificate, FetchError> {
        match self.certificates.get(host) {
            Some(pem) => Ok(RawCertificate::from_pem(pem.clone())),
            None => Err(FetchError::ConnectTimeout {
                host: host.to_string(),
                port: TLS_PORT,
                secs: TCP_CONNECT_TIMEOUT_SECS,
            }),
        }
    }
}

/// A complete static-list configuration posting to `webhook_url`.
pub fn settings(domains: &str, threshold: i64, webhook_url: &str) -> HashMap<&'static str, String> {
    HashMap::from([
        (ENV_EXPIRY_THRESHOLD, threshold.to_string()),
        (ENV_DOMAINS, domains.to_string()),
        (ENV_EMAIL_SUBJECT, "Certificates expiring".to_string()),
        (ENV_EMAIL_TO, "ops@example.com".to_string()),
        (ENV_EMAIL_SENDER, "noreply@example.com".to_string()),
        (ENV_WEBHOOK_URL, webhook_url.to_string()),
        (ENV_WEBHOOK_USER, "hook".to_string()),
        (ENV_WEBHOOK_PASS, "secret".to_string()),
    ])
}

pub fn load_config(settings: &HashMap<&'static str, String>) -> Config {
    Config::from_lookup(|key| settings.get(key).cloned()).expect("valid configuration")
}
