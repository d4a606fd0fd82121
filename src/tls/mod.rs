//! TLS certificate retrieval and extraction.
//!
//! This module connects to hosts on port 443 and captures the leaf certificate
//! they present, PEM-encoded:
//! - `TlsFetcher` performs one TCP connect and TLS handshake per host
//! - `fetch_certificates` walks the host list sequentially, skips hosts that
//!   fail, and drops byte-identical certificates
//!
//! Uses `tokio-rustls` for the TLS connection, `pem` for encoding and
//! `x509-parser` (in `extract`) for decoding.

pub(crate) mod extract;
mod verifier;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use rustls::crypto::ring::default_provider;
use rustls::pki_types::ServerName;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_rustls::rustls::ClientConfig;
use tokio_rustls::TlsConnector;

use crate::config::{TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS, TLS_PORT};
use crate::error_handling::{FetchError, InitializationError};

use verifier::AcceptAnyServerCert;

/// A PEM-encoded certificate exactly as retrieved from one handshake.
///
/// Equality is byte equality of the PEM text, which is what deduplication uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawCertificate(String);

impl RawCertificate {
    /// Wraps PEM text without checking it; evaluation reports malformed input.
    pub fn from_pem(pem: impl Into<String>) -> Self {
        Self(pem.into())
    }

    /// PEM-encodes a DER certificate (LF line endings, 64-column body).
    pub fn from_der(der: &[u8]) -> Self {
        let block = pem::Pem::new("CERTIFICATE", der.to_vec());
        let config = pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF);
        Self(pem::encode_config(&block, config))
    }

    pub fn as_pem(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Source of leaf certificates, one host at a time.
#[allow(async_fn_in_trait)]
pub trait CertificateFetcher {
    /// Retrieves the leaf certificate presented by `host`.
    async fn fetch(&self, host: &str) -> Result<RawCertificate, FetchError>;
}

/// Fetches certificates over real TLS connections.
#[derive(Debug, Clone)]
pub struct TlsFetcher {
    config: Arc<ClientConfig>,
    port: u16,
    connect_timeout: Duration,
    handshake_timeout: Duration,
}

impl TlsFetcher {
    /// Creates a fetcher for port 443 with the default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::TlsConfigError` if the crypto provider
    /// cannot support the default protocol versions.
    pub fn new() -> Result<Self, InitializationError> {
        Self::with_port(TLS_PORT)
    }

    /// Creates a fetcher that connects to `port` instead of 443.
    pub fn with_port(port: u16) -> Result<Self, InitializationError> {
        let provider = Arc::new(default_provider());
        let config = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert::new(provider)))
            .with_no_client_auth();

        Ok(Self {
            config: Arc::new(config),
            port,
            connect_timeout: Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
            handshake_timeout: Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        })
    }

    /// Overrides the connect and handshake timeouts.
    pub fn with_timeouts(mut self, connect: Duration, handshake: Duration) -> Self {
        self.connect_timeout = connect;
        self.handshake_timeout = handshake;
        self
    }
}

impl CertificateFetcher for TlsFetcher {
    async fn fetch(&self, host: &str) -> Result<RawCertificate, FetchError> {
        let port = self.port;
        debug!("Attempting to get certificate for {host}:{port}");

        let server_name =
            ServerName::try_from(host.to_string()).map_err(|e| FetchError::InvalidHostname {
                host: host.to_string(),
                message: e.to_string(),
            })?;

        let sock = match tokio::time::timeout(self.connect_timeout, TcpStream::connect((host, port)))
            .await
        {
            Ok(Ok(sock)) => sock,
            Ok(Err(source)) => {
                return Err(FetchError::Connect {
                    host: host.to_string(),
                    port,
                    source,
                })
            }
            Err(_) => {
                return Err(FetchError::ConnectTimeout {
                    host: host.to_string(),
                    port,
                    secs: self.connect_timeout.as_secs(),
                })
            }
        };

        let connector = TlsConnector::from(Arc::clone(&self.config));
        let mut tls_stream = match tokio::time::timeout(
            self.handshake_timeout,
            connector.connect(server_name, sock),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(FetchError::Handshake {
                    host: host.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(FetchError::HandshakeTimeout {
                    host: host.to_string(),
                    secs: self.handshake_timeout.as_secs(),
                })
            }
        };

        let leaf = tls_stream
            .get_ref()
            .1
            .peer_certificates()
            .and_then(|certs| certs.first())
            .map(|cert| RawCertificate::from_der(cert.as_ref()));

        // close_notify; the certificate is already in hand
        if let Err(e) = tls_stream.shutdown().await {
            debug!("TLS shutdown for {host} failed: {e}");
        }

        leaf.ok_or_else(|| FetchError::NoCertificate {
            host: host.to_string(),
        })
    }
}

/// A host whose certificate could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedHost {
    pub host: String,
    pub reason: String,
}

/// Result of the fetch stage.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Unique certificates in first-seen order
    pub certificates: Vec<RawCertificate>,
    /// Number of successful handshakes, duplicates included
    pub fetched: usize,
    pub skipped: Vec<SkippedHost>,
}

/// Retrieves the leaf certificate of every host, one after another.
///
/// A failing host is logged and skipped. A certificate is kept only if it is
/// byte-identical to none already collected, so hosts sharing a certificate
/// contribute it once, in the position of the first of them.
pub async fn fetch_certificates<F>(fetcher: &F, hosts: &[String]) -> FetchOutcome
where
    F: CertificateFetcher,
{
    let mut outcome = FetchOutcome::default();

    for host in hosts {
        match fetcher.fetch(host).await {
            Ok(cert) => {
                outcome.fetched += 1;
                if outcome.certificates.contains(&cert) {
                    debug!("Certificate for {host} already collected");
                } else {
                    outcome.certificates.push(cert);
                }
            }
            Err(e) => {
                error!("Error getting certificate for {host}: {e}");
                outcome.skipped.push(SkippedHost {
                    host: host.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Fetched {} certificate(s) from {} host(s): {} unique, {} host(s) skipped",
        outcome.fetched,
        hosts.len(),
        outcome.certificates.len(),
        outcome.skipped.len()
    );
    outcome
}
