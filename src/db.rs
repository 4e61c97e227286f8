//! Database module
//!
//! DSQL connection setup: IAM auth token generation, pool construction and
//! schema verification.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_dsql::auth_token::{AuthTokenGenerator, Config as AuthTokenConfig};
use aws_sdk_dsql::config::Region;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Tables the transfer use case reads and writes
const REQUIRED_TABLES: [&str; 2] = ["simple_account", "simple_transaction"];

/// Mint a short-lived auth token for the configured database role.
///
/// Credentials come from the default AWS provider chain. The `admin` role
/// needs the admin signing action; any other role uses the regular one.
pub async fn generate_auth_token(config: &Config) -> AppResult<String> {
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

    let generator = AuthTokenGenerator::new(
        AuthTokenConfig::builder()
            .hostname(config.cluster_endpoint.clone())
            .region(Region::new(config.region.clone()))
            .expires_in(config.auth_token_expires_secs)
            .build()
            .map_err(|e| AppError::AuthToken(e.to_string()))?,
    );

    let token = if config.database_user == "admin" {
        generator.db_connect_admin_auth_token(&sdk_config).await
    } else {
        generator.db_connect_auth_token(&sdk_config).await
    }
    .map_err(|e| AppError::AuthToken(e.to_string()))?;

    Ok(token.to_string())
}

/// Connection options for the cluster, authenticated with `token`
pub fn connect_options(config: &Config, token: &str) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.cluster_endpoint)
        .port(config.database_port)
        .username(&config.database_user)
        .database(&config.database_name)
        .password(token)
        .ssl_mode(PgSslMode::VerifyFull)
}

/// Build the process-wide connection pool
pub async fn connect(config: &Config) -> AppResult<PgPool> {
    let token = generate_auth_token(config).await?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.request_timeout())
        .connect_with(connect_options(config, &token))
        .await?;

    tracing::info!(
        endpoint = %config.cluster_endpoint,
        region = %config.region,
        max_connections = config.database_max_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Keep minting tokens for a long-running pool.
///
/// Tokens only authenticate new connections, so the pool's connect options
/// are swapped well before the current token expires.
pub fn spawn_token_refresh(pool: PgPool, config: Config) -> JoinHandle<()> {
    let period = Duration::from_secs((config.auth_token_expires_secs / 2).max(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // First tick completes immediately; the pool already has a fresh token
        interval.tick().await;

        loop {
            interval.tick().await;
            if pool.is_closed() {
                break;
            }

            match generate_auth_token(&config).await {
                Ok(token) => {
                    pool.set_connect_options(connect_options(&config, &token));
                    tracing::debug!("Auth token refreshed");
                }
                Err(e) => tracing::error!("Failed to refresh auth token: {}", e),
            }
        }
    })
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}
