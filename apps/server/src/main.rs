use std::net::SocketAddr;

use clap::Parser;
use tracing::info;
use tree_core::Database;

mod error;
mod routes;
mod state;

use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "tree-server", about = "Multi-tenant hierarchical tree storage service")]
struct Args {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Port to bind the HTTP server.
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Deployment environment; gates `/api/tree/bulk` and `DELETE /api/tree`.
    #[arg(long, env = "ENVIRONMENT", default_value = "development")]
    environment: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tree_core=debug,tree_server=debug".into()),
        )
        .init();

    let args = Args::parse();

    if args.environment == "production" {
        info!("running in production: bulk-load and delete-tenant are disabled");
    }

    let database = Database::connect(&args.database_url).await?;
    let config = tree_core::config::AppConfig::new(args.database_url.clone(), args.environment.clone());
    let state = AppState {
        conn: database.connection().clone(),
        config,
    };

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("tree-server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down gracefully"),
        () = terminate => info!("received SIGTERM, shutting down gracefully"),
    }
}
