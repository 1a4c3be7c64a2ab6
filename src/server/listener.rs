use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::info;

use crate::config::Config;
use crate::files::FileService;
use crate::http::connection::{Connection, Handler};

/// Binds the configured address and serves files until `shutdown` resolves.
pub async fn run(cfg: &Config, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("binding {}", cfg.listen_addr))?;
    info!(
        addr = %cfg.listen_addr,
        root = %cfg.root.display(),
        min_size_hint = cfg.min_size_hint,
        "File server listening"
    );

    serve(listener, Arc::new(FileService::from_config(cfg)), shutdown).await
}

/// Accepts connections on `listener`, one task each, until `shutdown` resolves.
///
/// On shutdown, stops accepting, tells every connection to close once its
/// in-flight request is done and waits for all of them.
pub async fn serve<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        continue;
                    }
                };
                tracing::debug!("Accepted connection from {}", peer);

                let handler = handler.clone();
                let stop = stop_rx.clone();
                connections.spawn(async move {
                    let mut conn = Connection::new(socket, handler, stop);
                    if let Err(e) = conn.run().await {
                        tracing::error!("Connection error from {}: {}", peer, e);
                    }
                });
            }

            Some(finished) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = finished {
                    tracing::error!(error = %e, "Connection task failed");
                }
            }

            _ = &mut shutdown => break,
        }
    }

    info!(active = connections.len(), "Shutdown requested, draining connections");
    drop(listener);
    let _ = stop_tx.send(true);

    while let Some(finished) = connections.join_next().await {
        if let Err(e) = finished {
            tracing::error!(error = %e, "Connection task failed");
        }
    }

    info!("Shutdown complete");
    Ok(())
}
