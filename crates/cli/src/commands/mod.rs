//! CLI subcommands and their shared plumbing.

pub mod migrate;
pub mod quote;
pub mod zones;

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use bloom_core::delivery::{NewZone, ResolveError, ZoneError, ZoneFile};
use bloom_core::{DeliveryZoneId, StoreId};
use bloom_storefront::config::{ConfigError, get_database_url};
use bloom_storefront::db::{self, RepositoryError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Database URL missing from the environment.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Zone file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Zone file is not valid YAML for a zone file.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// One or more zones in a file failed validation.
    #[error("{0} zone(s) failed validation, nothing was written")]
    InvalidZones(usize),

    /// Stored zone could not be repaired.
    #[error("Zone {0}: {1}")]
    Zone(DeliveryZoneId, ZoneError),

    /// Zone does not exist.
    #[error("Zone not found: {0}")]
    ZoneNotFound(DeliveryZoneId),

    /// Store does not exist.
    #[error("Store not found: {0}")]
    StoreNotFound(StoreId),

    /// Quote could not be computed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Connect to the storefront database.
///
/// Reads `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`), loading `.env` first.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url: SecretString = get_database_url("STOREFRONT_DATABASE_URL")?;

    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&database_url).await?)
}

/// Read and parse a YAML zone file.
pub fn read_zone_file(path: &Path) -> Result<ZoneFile, CommandError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&contents).map_err(|source| CommandError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate every zone of a file, logging each failure.
pub fn validate_zone_file(file: &ZoneFile) -> Result<Vec<NewZone>, CommandError> {
    file.validate().map_err(|errors| {
        for (position, name, error) in &errors {
            tracing::error!(position, zone = %name, %error, "Invalid zone");
        }
        CommandError::InvalidZones(errors.len())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_zone_file_missing() {
        let err = read_zone_file(Path::new("/nonexistent/zones.yaml")).unwrap_err();
        assert!(matches!(err, CommandError::Io { .. }));
    }

    #[test]
    fn test_validate_zone_file_counts_failures() {
        let file: ZoneFile = serde_yaml::from_str(
            r"
store:
  id: 1
  name: Voronezh
  location: { latitude: 51.67, longitude: 39.2 }
axis_order: lat-lng
zones:
  - name: Good
    polygon: [[51.65, 39.19], [51.65, 39.22], [51.68, 39.22], [51.68, 39.19]]
    delivery_fee: 200
  - name: Line
    polygon: [[51.65, 39.19], [51.65, 39.22]]
    delivery_fee: 200
  - name: Negative
    polygon: [[51.65, 39.19], [51.65, 39.22], [51.68, 39.22]]
    delivery_fee: -5
",
        )
        .unwrap();

        let err = validate_zone_file(&file).unwrap_err();
        assert!(matches!(err, CommandError::InvalidZones(2)));
    }
}
