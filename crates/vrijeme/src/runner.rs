//! Process lifecycle helpers for the poller binary.

use std::sync::Arc;
use tokio::sync::watch;

use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::NodeError;
use crate::feed::FeedSource;

/// Poller logs go to stderr so stdout stays clean for JSON snapshots.
///
/// `RUST_LOG=vrijeme=debug` shows every fetch and joined refresh.
pub fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .format_timestamp_secs()
        .init();
}

/// Shutdown channel fired on Ctrl+C.
pub fn shutdown_on_ctrlc() -> Result<watch::Receiver<()>, NodeError> {
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
    })
    .map_err(|e| NodeError::Init(e.to_string()))?;
    Ok(shutdown_rx)
}

/// Start polling `config.city`.
///
/// Performs the first refresh before returning; if it fails the poller is
/// not ready and the error propagates. Otherwise the periodic loop is
/// spawned and its handle returned alongside the coordinator.
pub async fn start(
    config: &Config,
    shutdown: watch::Receiver<()>,
) -> Result<(Arc<Coordinator>, tokio::task::JoinHandle<()>), NodeError> {
    let coordinator = Arc::new(Coordinator::from_config(config)?);
    start_with(coordinator, shutdown).await
}

/// Like [`start`], for an already-built coordinator.
pub async fn start_with<S: FeedSource>(
    coordinator: Arc<Coordinator<S>>,
    shutdown: watch::Receiver<()>,
) -> Result<(Arc<Coordinator<S>>, tokio::task::JoinHandle<()>), NodeError> {
    log::info!("Starting poller for {}", coordinator.city());
    coordinator.first_refresh().await?;

    let handle = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.run(shutdown).await })
    };
    Ok((coordinator, handle))
}
