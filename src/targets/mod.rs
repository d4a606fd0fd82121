//! Target hostname sources.
//!
//! A run checks either a static, comma-separated list of hostnames or the
//! non-wildcard domains of the public certificates recorded in the
//! certificate inventory database.

mod database;

use log::{info, warn};

use crate::config::{TargetSource, DOMAIN_DELIMITER};
use crate::error_handling::SourceUnavailableError;

pub use database::{load_database_targets, query_targets, TARGET_DOMAINS_QUERY};

/// Splits a delimiter-separated hostname list.
///
/// Entries are trimmed and blank entries dropped. Order and duplicates are
/// kept; identical certificates are collapsed later, not hostnames.
pub fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(DOMAIN_DELIMITER)
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect()
}

/// Produces the ordered hostname list for one run.
///
/// # Errors
///
/// Returns `SourceUnavailableError` if the database cannot be reached or queried.
pub async fn load_targets(source: &TargetSource) -> Result<Vec<String>, SourceUnavailableError> {
    let targets = match source {
        TargetSource::Static(raw) => parse_domain_list(raw),
        TargetSource::Database(db) => load_database_targets(db).await?,
    };

    if targets.is_empty() {
        warn!("No target hostnames to check");
    } else {
        info!("Loaded {} target hostname(s)", targets.len());
    }
    Ok(targets)
}
