use std::{path::Path, time::Duration};

use accrual_client::AccrualApi;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use loyalty_engine::{BalanceApi, OrderFlowApi, SqliteDatabase};
use tokio::sync::watch;

use crate::{
    accrual_worker::start_reconciliation_worker,
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    routes::{health, user_scope},
};

/// Opens the database, starts the reconciliation worker and serves HTTP until the server is stopped (e.g. by Ctrl-C).
/// The worker is then told to stop and is awaited before returning.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    ensure_data_dir(&config.database_url)?;
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let accrual = AccrualApi::new(config.accrual.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Accrual system at {}", config.accrual.base_url);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = start_reconciliation_worker(db.clone(), accrual, config.worker.clone(), shutdown_rx);
    let srv = create_server_instance(config, db.clone())?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));

    info!("🚀️ Server stopped. Waiting for the reconciliation worker to finish.");
    signal_shutdown(&shutdown_tx);
    if let Err(e) = worker.await {
        error!("🚀️ The reconciliation worker did not shut down cleanly. {e}");
    }
    db.close().await;
    result
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let balance_api = BalanceApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("lps::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(balance_api))
            .app_data(web::Data::new(jwt_signer))
            .service(health)
            .service(user_scope::<SqliteDatabase>())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Returns false if no worker was listening any more.
fn signal_shutdown(tx: &watch::Sender<bool>) -> bool {
    let delivered = tx.send(true).is_ok();
    if !delivered {
        debug!("🚀️ The reconciliation worker had already stopped before the shutdown signal was sent.");
    }
    delivered
}

/// SQLite will create the database file, but not the directory it lives in.
fn ensure_data_dir(url: &str) -> Result<(), ServerError> {
    let path = url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
    if path.starts_with(':') {
        return Ok(());
    }
    let path = path.split('?').next().unwrap_or(path);
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            info!("🚀️ Creating data directory {}", dir.display());
            std::fs::create_dir_all(dir)?;
            Ok(())
        },
        _ => Ok(()),
    }
}
