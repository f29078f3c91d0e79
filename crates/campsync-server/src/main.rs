mod api;
mod functions;
mod middleware;
mod moderation;
mod scheduler;

use std::sync::Arc;

use campsync_sync::SyncRunner;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    functions::FunctionsClient,
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = campsync_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = campsync_db::connect_pool_from_config(&config).await?;
    let applied = campsync_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations up to date");

    let runner = Arc::new(SyncRunner::from_config(pool.clone(), &config)?);
    let functions = FunctionsClient::from_app_config(&config)?.map(Arc::new);
    if functions.is_none() {
        tracing::warn!("collaborator functions not configured; clawback is unavailable");
    }

    let _scheduler = scheduler::build_scheduler(Arc::clone(&runner), &config.sync_cron).await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        campsync_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            pool,
            runner,
            functions,
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "campsync server listening");
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
