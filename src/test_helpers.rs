//! Shared test helpers for certificate generation.
//!
//! Certificates are self-signed with `rcgen` so tests control the subject,
//! the SAN extension and the validity period exactly. The integration tests
//! include this file too (`tests/helpers.rs`).

use chrono::{DateTime, NaiveDate, Utc};
use rcgen::{date_time_ymd, CertificateParams, DistinguishedName, DnType, KeyPair};

/// What to put into a generated certificate.
#[derive(Debug, Clone)]
pub struct TestCertificateSpec<'a> {
    pub common_name: Option<&'a str>,
    /// An empty slice produces a certificate without a SAN extension
    pub sans: &'a [&'a str],
    /// Not-after date (year, month, day) at midnight UTC
    pub not_after: (i32, u8, u8),
}

impl Default for TestCertificateSpec<'_> {
    fn default() -> Self {
        Self {
            common_name: Some("example.com"),
            sans: &["example.com"],
            not_after: (2031, 1, 15),
        }
    }
}

/// A generated certificate with its PKCS#8 private key.
#[allow(dead_code)] // key_der is only needed by the local TLS servers in tests/
pub struct GeneratedCertificate {
    pub pem: String,
    pub der: Vec<u8>,
    pub key_der: Vec<u8>,
}

/// Generates a self-signed certificate matching `spec`.
pub fn generate_certificate(spec: &TestCertificateSpec<'_>) -> GeneratedCertificate {
    let sans: Vec<String> = spec.sans.iter().map(|san| san.to_string()).collect();
    let mut params = CertificateParams::new(sans).expect("valid SAN list");

    params.distinguished_name = DistinguishedName::new();
    if let Some(cn) = spec.common_name {
        params.distinguished_name.push(DnType::CommonName, cn);
    }
    params.not_before = date_time_ymd(2020, 1, 1);
    let (year, month, day) = spec.not_after;
    params.not_after = date_time_ymd(year, month, day);

    let key = KeyPair::generate().expect("key generation");
    let cert = params.self_signed(&key).expect("self-signed certificate");

    GeneratedCertificate {
        pem: cert.pem(),
        der: cert.der().to_vec(),
        key_der: key.serialize_der(),
    }
}

/// Midnight UTC of the given date.
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date")
        .and_utc()
}
