//! Certificate extraction utilities.

use chrono::{DateTime, Utc};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::FromDer;

use crate::error_handling::CertificateError;

/// Decodes the first PEM block of `raw` and returns its DER contents.
pub(crate) fn decode_pem(raw: &[u8]) -> Result<Vec<u8>, CertificateError> {
    let (_, pem) = parse_x509_pem(raw)
        .map_err(|e| CertificateError::Malformed(format!("invalid PEM: {e}")))?;
    if pem.label != "CERTIFICATE" {
        return Err(CertificateError::Malformed(format!(
            "unexpected PEM label '{}'",
            pem.label
        )));
    }
    Ok(pem.contents)
}

/// Parses a DER-encoded X.509 certificate.
pub(crate) fn parse_der(der: &[u8]) -> Result<X509Certificate<'_>, CertificateError> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| CertificateError::Malformed(format!("invalid X.509 structure: {e}")))?;
    Ok(cert)
}

/// Returns the first Common Name of the subject, if there is one.
pub(crate) fn extract_common_name(cert: &X509Certificate<'_>) -> Option<String> {
    cert.subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(|cn| cn.to_string())
}

/// Extracts the DNS names of the Subject Alternative Name extension.
///
/// Returns `Ok(None)` when the certificate has no SAN extension at all, which
/// is different from an extension that holds no DNS names (`Ok(Some(vec![]))`).
/// IP addresses, emails and other name types are ignored.
pub(crate) fn extract_certificate_sans(
    cert: &X509Certificate<'_>,
) -> Result<Option<Vec<String>>, CertificateError> {
    let extension = cert
        .subject_alternative_name()
        .map_err(|e| CertificateError::Malformed(format!("invalid SAN extension: {e}")))?;

    Ok(extension.map(|san| {
        san.value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns_name) => Some(dns_name.to_string()),
                _ => None,
            })
            .collect()
    }))
}

/// Not-after time of the certificate in UTC.
///
/// A certificate without a validity field fails in `parse_der`; `None` is left
/// for timestamps outside what `chrono` can represent.
pub(crate) fn extract_not_after(cert: &X509Certificate<'_>) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(cert.validity().not_after.timestamp(), 0)
}
