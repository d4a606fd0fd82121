//! Target hostnames from the certificate inventory database.
//!
//! One connection is opened per run, used for a single query, and closed.

use log::{debug, warn};
use sqlx::{AnyConnection, Connection, Row};
use url::Url;

use crate::config::{DatabaseConfig, DB_SCHEME};
use crate::error_handling::SourceUnavailableError;

/// One representative hostname per public certificate: the smallest
/// non-wildcard domain, grouped by certificate name.
pub const TARGET_DOMAINS_QUERY: &str = "SELECT MIN(d.name) AS hostname \
     FROM certificate c \
     JOIN domain d ON d.certificate_id = c.id \
     WHERE c.is_public = 1 AND d.name NOT LIKE '*%' \
     GROUP BY c.name \
     ORDER BY c.name";

/// Builds the connection URL; credentials are percent-encoded.
pub(crate) fn connection_url(db: &DatabaseConfig) -> Result<Url, SourceUnavailableError> {
    let invalid = |what: &str| SourceUnavailableError::InvalidConnection(what.to_string());

    let mut url = Url::parse(&format!("{DB_SCHEME}://localhost"))
        .map_err(|e| SourceUnavailableError::InvalidConnection(e.to_string()))?;
    url.set_host(Some(&db.host))
        .map_err(|e| SourceUnavailableError::InvalidConnection(format!("host: {e}")))?;
    url.set_port(Some(db.port)).map_err(|_| invalid("port"))?;
    url.set_username(&db.user).map_err(|_| invalid("user"))?;
    url.set_password(Some(&db.password))
        .map_err(|_| invalid("password"))?;
    url.set_path(&db.name);
    Ok(url)
}

/// Connects, runs `TARGET_DOMAINS_QUERY`, and closes the connection.
///
/// # Errors
///
/// Returns `SourceUnavailableError` if connecting or querying fails.
pub async fn load_database_targets(
    db: &DatabaseConfig,
) -> Result<Vec<String>, SourceUnavailableError> {
    sqlx::any::install_default_drivers();

    let url = connection_url(db)?;
    debug!("Connecting to target database {}:{}/{}", db.host, db.port, db.name);
    let mut conn = AnyConnection::connect(url.as_str())
        .await
        .map_err(SourceUnavailableError::Connect)?;

    let result = query_targets(&mut conn).await;

    if let Err(e) = conn.close().await {
        warn!("Failed to close target database connection: {e}");
    }
    result
}

/// Runs `TARGET_DOMAINS_QUERY` on an open connection.
pub async fn query_targets(
    conn: &mut AnyConnection,
) -> Result<Vec<String>, SourceUnavailableError> {
    let rows = sqlx::query(TARGET_DOMAINS_QUERY)
        .fetch_all(&mut *conn)
        .await
        .map_err(SourceUnavailableError::Query)?;

    rows.iter()
        .map(|row| {
            row.try_get::<String, _>("hostname")
                .map_err(SourceUnavailableError::Query)
        })
        .collect()
}
