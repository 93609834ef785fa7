//! RPC server implementation for the calculator daemon.
//!
//! Implements the tarpc `Calculator` trait on top of [`SessionStore`].

use crate::calc_daemon::protocol::PortFileContent;
use crate::calc_daemon::reducer::Reducer;
use crate::calc_daemon::session_store::SessionStore;
use crate::calc_paths;
use crate::config::ServerConfig;
use crate::daemon_log::DaemonLog;
use crate::rpc::calculator_service::Calculator;
use crate::rpc::{CalcError, CalcResult, SessionId};
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tarpc::server::{self, Channel};
use tarpc::tokio_serde::formats::Bincode;
use tokio::sync::{broadcast, oneshot};

/// Server implementation for the Calculator service.
///
/// Cheap to clone; every connection gets a clone sharing the same store.
#[derive(Clone)]
pub struct CalculatorServer {
    store: Arc<SessionStore>,
}

impl CalculatorServer {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }
}

impl Calculator for CalculatorServer {
    async fn create_session(self, _: tarpc::context::Context) -> SessionId {
        let session_id = self.store.create_session().await;
        tracing::debug!(%session_id, "session created");
        session_id
    }

    async fn push_value(
        self,
        _: tarpc::context::Context,
        session_id: SessionId,
        value: i64,
    ) -> CalcResult<()> {
        self.store
            .with_stack(&session_id, |stack| stack.push(value))
            .await
    }

    async fn push_operation(
        self,
        _: tarpc::context::Context,
        session_id: SessionId,
        operator: String,
    ) -> CalcResult<()> {
        let handle = self.store.resolve(&session_id).await?;
        let reducer: Reducer = operator.parse()?;

        handle
            .with_stack(|stack| -> CalcResult<()> {
                // Reduce first so a failed reduction leaves the stack untouched
                if let Some(result) = reducer.reduce(stack.as_slice())? {
                    stack.clear();
                    stack.push(result);
                }
                Ok(())
            })
            .await
            .inspect_err(|e| tracing::debug!(%session_id, error = %e, "push_operation rejected"))
    }

    async fn pop(self, _: tarpc::context::Context, session_id: SessionId) -> CalcResult<Option<i64>> {
        self.store.with_stack(&session_id, |stack| stack.pop()).await
    }

    async fn is_empty(self, _: tarpc::context::Context, session_id: SessionId) -> CalcResult<bool> {
        self.store
            .with_stack(&session_id, |stack| stack.is_empty())
            .await
    }

    async fn delay_pop(
        self,
        _: tarpc::context::Context,
        session_id: SessionId,
        millis: i64,
    ) -> CalcResult<Option<i64>> {
        let millis = u64::try_from(millis).map_err(|_| CalcError::InvalidArgument {
            message: format!("delay must not be negative, got {}", millis),
        })?;
        let handle = self.store.resolve(&session_id).await?;

        // No lock is held while waiting; the pop sees whatever the stack
        // holds once the timer fires.
        tokio::time::sleep(Duration::from_millis(millis)).await;

        let popped = handle.with_stack(|stack| stack.pop()).await;
        tracing::debug!(%session_id, millis, ?popped, "delayed pop completed");
        Ok(popped)
    }
}

/// Run the calculator RPC server on `addr` until `shutdown_tx` fires.
///
/// The listener is bound once; its actual address (useful with port 0) is
/// sent on `ready_tx` before the first connection is accepted. Each request
/// is spawned on its own task so a pending delayed pop never holds up other
/// calls, even on the same connection.
pub async fn run_calculator_server(
    store: Arc<SessionStore>,
    shutdown_tx: broadcast::Sender<()>,
    addr: &str,
    log: DaemonLog,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    use tarpc::serde_transport::tcp;

    let mut listener = tcp::listen(addr, Bincode::default).await?;
    let local_addr = listener.local_addr();

    log.log("rpc_server", &format!("RPC server listening on {}", local_addr));
    if let Some(ready_tx) = ready_tx {
        let _ = ready_tx.send(local_addr);
    }

    let mut shutdown_rx = shutdown_tx.subscribe();

    loop {
        tokio::select! {
            Some(result) = listener.next() => {
                match result {
                    Ok(transport) => {
                        let server = CalculatorServer::new(store.clone());
                        let channel = server::BaseChannel::with_defaults(transport);

                        tokio::spawn(async move {
                            channel.execute(server.serve()).for_each(|response| async {
                                tokio::spawn(response);
                            }).await;
                        });
                    }
                    Err(e) => {
                        log.log("rpc_server", &format!("Accept error: {}", e));
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }

    log.log("rpc_server", "RPC server stopped");
    Ok(())
}

/// Main entry point for the calculator daemon.
///
/// Binds the configured address, publishes the bound address through the
/// port file so clients can discover it, and serves until Ctrl-C.
pub async fn run_daemon(config: &ServerConfig) -> anyhow::Result<()> {
    use anyhow::Context;

    let log = DaemonLog::home();
    let store = Arc::new(SessionStore::new());
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let (ready_tx, ready_rx) = oneshot::channel();

    let bind_addr = format!("{}:{}", config.host, config.port);
    let server = {
        let store = store.clone();
        let shutdown_tx = shutdown_tx.clone();
        let bind_addr = bind_addr.clone();
        let log = log.clone();
        tokio::spawn(async move {
            run_calculator_server(store, shutdown_tx, &bind_addr, log, Some(ready_tx)).await
        })
    };

    let local_addr = match ready_rx.await {
        Ok(local_addr) => local_addr,
        // The server exited before binding; surface its error
        Err(_) => {
            return match server.await.context("Server task panicked")? {
                Ok(()) => Err(anyhow::anyhow!("Server stopped before listening")),
                Err(e) => Err(e.context(format!("Failed to listen on {}", bind_addr))),
            };
        }
    };

    let port_path = calc_paths::calcd_port_path()?;
    let port_content = PortFileContent {
        host: config.host.clone(),
        port: local_addr.port(),
        pid: std::process::id(),
    };
    if let Err(e) = std::fs::write(&port_path, serde_json::to_string(&port_content)?) {
        let _ = shutdown_tx.send(());
        return Err(e).context("Failed to write port file");
    }

    log.log(
        "rpc_server",
        &format!("Daemon started on {} (pid {})", port_content.addr(), port_content.pid),
    );
    tracing::info!(addr = %port_content.addr(), "calculator daemon started");

    let signal_log = log.clone();
    let signal_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_log.log("rpc_server", "Interrupt received, shutting down");
            let _ = signal_shutdown.send(());
        }
    });

    let result = server.await.context("Server task panicked")?;

    let _ = std::fs::remove_file(&port_path);
    let sessions = store.len().await;
    tracing::info!(sessions, "calculator daemon stopped");

    result
}

#[cfg(test)]
#[path = "tests/rpc_server_tests.rs"]
mod tests;
