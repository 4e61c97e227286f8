//! dsql_transfer - balance transfers against Aurora DSQL
//!
//! `transfer` and `show` run one request and exit; `serve` exposes the same
//! operations over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dsql_transfer::api::{self, ApiState};
use dsql_transfer::domain::CancelSignal;
use dsql_transfer::infrastructure::{PgAccountRepository, PgTransferRecordRepository, PgUnitOfWork};
use dsql_transfer::{db, AccountService, AccountUseCase, Amount, Config, RequestContext};

#[derive(Debug, Parser)]
#[command(name = "dsql_transfer", version, about = "Balance transfers against Aurora DSQL")]
struct Cli {
    /// Abandon the request after this many seconds (defaults to REQUEST_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Move an integer amount between two accounts
    Transfer {
        from_id: String,
        to_id: String,
        amount: Amount,
    },
    /// Print one account
    Show { account_id: String },
    /// Run the HTTP API
    Serve,
}

/// Initialize tracing/logging. Logs go to stderr so command output stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dsql_transfer=info,tower_http=info".into());
    let json = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api/v1", api::create_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let timeout = cli
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.request_timeout());

    tracing::info!("Connecting to database...");
    let pool = db::connect(&config).await?;

    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete.");
        pool.close().await;
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    let accounts: Arc<dyn AccountUseCase> = Arc::new(AccountService::new(
        PgUnitOfWork::new(pool.clone()),
        PgAccountRepository::new(),
        PgTransferRecordRepository::new(),
    ));

    let outcome = run(cli.command, accounts, &config, &pool, timeout).await;

    pool.close().await;
    tracing::debug!("Database connections closed");

    outcome
}

async fn run(
    command: Command,
    accounts: Arc<dyn AccountUseCase>,
    config: &Config,
    pool: &PgPool,
    timeout: Duration,
) -> anyhow::Result<()> {
    match command {
        Command::Transfer {
            from_id,
            to_id,
            amount,
        } => {
            let ctx = cli_context(timeout);
            let receipt = accounts.transfer(&ctx, &from_id, &to_id, amount).await?;
            println!(
                "Transfer {} from {} to {} (balances: {} -> {}, {} -> {})",
                amount, from_id, to_id, from_id, receipt.from_balance, to_id, receipt.to_balance
            );
        }
        Command::Show { account_id } => {
            let ctx = cli_context(timeout);
            let account = accounts.find_account(&ctx, &account_id).await?;
            println!("{}", account);
        }
        Command::Serve => {
            let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
            let refresh = db::spawn_token_refresh(pool.clone(), config.clone());

            let app = build_router(ApiState::new(accounts, timeout));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!("Listening on http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            refresh.abort();
            tracing::info!("Server shutting down...");
        }
    }

    Ok(())
}

/// Context for a one-shot command: bounded by `timeout`, cancelled by Ctrl+C
fn cli_context(timeout: Duration) -> RequestContext {
    let signal = CancelSignal::new();
    let ctx = RequestContext::new()
        .with_timeout(timeout)
        .with_cancellation(&signal);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C, cancelling request...");
            signal.cancel();
        }
    });

    ctx
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
