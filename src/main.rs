// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, sync::Arc};

use tokio::net::TcpListener;
use tracing::info;

use wallet_gateway::{
    api::router,
    config::GatewayConfig,
    datasets::Datasets,
    http::SourceClient,
    state::AppState,
    store::RedbStore,
    telemetry,
    watch::TracingObserver,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = GatewayConfig::from_env()?;
    telemetry::init(config.log_format);

    let store_path = config.store_path();
    let store = RedbStore::open(&store_path)?;
    info!(path = %store_path.display(), "Document store opened");

    let datasets = Datasets::new(
        &config.sources,
        SourceClient::new()?,
        Arc::new(store),
        Arc::new(TracingObserver),
    );

    // Serve only after every dataset has had its priming cycle
    datasets.start_all().await;

    let app = router(AppState::new(datasets.clone()));
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Wallet gateway listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    datasets.stop_all();
    info!("Wallet gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
