//! Certificate expiry evaluation.
//!
//! Turns a `RawCertificate` into an `EvaluatedCertificate`: common name,
//! SAN DNS names, not-after time and the number of whole days left.

use chrono::{DateTime, Utc};
use log::debug;

use crate::config::{ZeroDayPolicy, SECONDS_PER_DAY, UNKNOWN_COMMON_NAME, ZERO_DAY_SENTINEL_DAYS};
use crate::error_handling::CertificateError;
use crate::tls::extract::{
    decode_pem, extract_certificate_sans, extract_common_name, extract_not_after, parse_der,
};
use crate::tls::RawCertificate;

/// Facts extracted from one certificate, relative to a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatedCertificate {
    /// First subject CN, `None` if the subject has none
    pub common_name: Option<String>,
    /// DNS entries of the SAN extension, in certificate order
    pub domains: Vec<String>,
    pub not_after: DateTime<Utc>,
    /// Whole days left, negative once expired
    pub days_until_expiry: i64,
}

impl EvaluatedCertificate {
    /// Common name for display, `Unknown` when absent.
    pub fn display_name(&self) -> &str {
        self.common_name.as_deref().unwrap_or(UNKNOWN_COMMON_NAME)
    }
}

/// Whole days from `now` until `not_after`, rounded towards negative infinity.
///
/// Twelve hours left gives 0, twelve hours past expiry gives -1.
pub fn days_until_expiry(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining = not_after - now;
    // num_seconds truncates towards zero; floor it so any time past expiry is negative
    let seconds = remaining.num_seconds() - i64::from(remaining.subsec_nanos() < 0);
    seconds.div_euclid(SECONDS_PER_DAY)
}

/// Applies the zero-day rule to a floored day count.
///
/// Under `ZeroDayPolicy::Sentinel` a count of exactly 0 (less than one full day
/// left, not yet expired) becomes `ZERO_DAY_SENTINEL_DAYS`. Every other count,
/// and every count under `ZeroDayPolicy::Exact`, is returned unchanged.
pub fn apply_zero_day_policy(days: i64, policy: ZeroDayPolicy) -> i64 {
    match policy {
        ZeroDayPolicy::Sentinel if days == 0 => ZERO_DAY_SENTINEL_DAYS,
        _ => days,
    }
}

/// Parses a PEM certificate and computes its remaining validity.
///
/// # Errors
///
/// - `CertificateError::Malformed` if the PEM or X.509 structure does not decode
/// - `CertificateError::MissingSubjectAltName` if there is no SAN extension
/// - `CertificateError::MissingExpiry` if the not-after time is unusable
pub fn evaluate(
    raw: &RawCertificate,
    now: DateTime<Utc>,
    policy: ZeroDayPolicy,
) -> Result<EvaluatedCertificate, CertificateError> {
    let der = decode_pem(raw.as_bytes())?;
    let cert = parse_der(&der)?;

    let common_name = extract_common_name(&cert);
    let label = || {
        common_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_COMMON_NAME.to_string())
    };

    let domains = extract_certificate_sans(&cert)?
        .ok_or_else(|| CertificateError::MissingSubjectAltName {
            common_name: label(),
        })?;
    let not_after = extract_not_after(&cert).ok_or_else(|| CertificateError::MissingExpiry {
        common_name: label(),
    })?;

    let days = apply_zero_day_policy(days_until_expiry(not_after, now), policy);
    debug!(
        "Certificate {} ({} SAN(s)) expires {} ({} days)",
        label(),
        domains.len(),
        not_after,
        days
    );

    Ok(EvaluatedCertificate {
        common_name,
        domains,
        not_after,
        days_until_expiry: days,
    })
}
