//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::BlobStore;
use super::Error;
use super::Result;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres blob store
///
/// Every blob is a row in the `blobs` table, the primary key on `key` gives the conditional
/// create
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Connect to Postgres using the given connection string
    ///
    /// Migrations will be run
    pub async fn connect(database_connection_string: &str) -> anyhow::Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_connection_string)
            .await?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> anyhow::Result<Self> {
        MIGRATOR.run(&connection_pool).await?;

        Ok(Self { connection_pool })
    }
}

#[async_trait]
impl BlobStore for Postgres {
    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let result = sqlx::query(
            r"
            INSERT INTO blobs (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO NOTHING
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        if result.rows_affected() == 0 {
            Err(Error::Conflict)
        } else {
            Ok(())
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        sqlx::query_scalar::<_, Vec<u8>>(
            r"
            SELECT value
            FROM blobs
            WHERE key = $1
            ",
        )
        .bind(key)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?
        .ok_or(Error::NotFound)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let result = sqlx::query(
            r"
            DELETE FROM blobs
            WHERE key = $1
            ",
        )
        .bind(key)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        if result.rows_affected() == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM blobs
                WHERE key = $1
            )
            ",
        )
        .bind(key)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }
}

/// Utility function for mapping any error into a connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
