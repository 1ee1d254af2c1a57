mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use reviewdb_catalog::CatalogResolver;
use reviewdb_import::ImportSettings;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = reviewdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = reviewdb_db::PoolConfig::from_app_config(&config);
    let pool = reviewdb_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = reviewdb_db::run_migrations(&pool).await?;

    let resolver = CatalogResolver::from_app_config(&config)?;
    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        migrations_applied = applied,
        catalog_enabled = resolver.is_enabled(),
        "starting reviewdb-server"
    );

    let app = build_app(AppState {
        pool,
        resolver: Arc::new(resolver),
        settings: ImportSettings::from_app_config(&config),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
