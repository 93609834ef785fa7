//! Integration tests for the calculator RPC service.
//!
//! These tests spin up a real tarpc server and real clients over TCP.
//! No mocks are used.

mod operator_tests;

use crate::calc_daemon::rpc_client::CalcClient;
use crate::calc_daemon::rpc_server::run_calculator_server;
use crate::calc_daemon::session_store::SessionStore;
use crate::config::ClientConfig;
use crate::daemon_log::DaemonLog;
use crate::rpc::calculator_service::CalculatorClient;
use std::path::PathBuf;
use std::sync::Arc;
use tarpc::client;
use tarpc::tokio_serde::formats::Bincode;
use tokio::sync::{broadcast, oneshot};

/// Find an available TCP port for testing.
pub fn find_test_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Test harness that manages a real RPC server for testing.
///
/// The server binds an ephemeral port and logs into its own temp dir, so
/// tests never touch the real calculator home.
pub struct TestServer {
    pub port: u16,
    pub store: Arc<SessionStore>,
    pub shutdown_tx: broadcast::Sender<()>,
    pub log_path: PathBuf,
    _log_dir: tempfile::TempDir,
    _server_handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a real RPC server for testing.
    pub async fn start() -> Self {
        let log_dir = tempfile::tempdir().unwrap();
        let log_path = log_dir.path().join("calcd.log");
        let store = Arc::new(SessionStore::new());
        let (shutdown_tx, _) = broadcast::channel(1);
        let (ready_tx, ready_rx) = oneshot::channel();

        let server_handle = {
            let store = store.clone();
            let shutdown_tx = shutdown_tx.clone();
            let log = DaemonLog::at(&log_path);
            tokio::spawn(async move {
                let _ =
                    run_calculator_server(store, shutdown_tx, "127.0.0.1:0", log, Some(ready_tx))
                        .await;
            })
        };

        let port = ready_rx.await.unwrap().port();

        Self {
            port,
            store,
            shutdown_tx,
            log_path,
            _log_dir: log_dir,
            _server_handle: server_handle,
        }
    }

    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Create a raw tarpc client connected to this server.
    pub async fn create_client(&self) -> CalculatorClient {
        use tarpc::serde_transport::tcp;

        let transport = tcp::connect(&self.addr(), Bincode::default).await.unwrap();
        CalculatorClient::new(client::Config::default(), transport).spawn()
    }

    /// Create a [`CalcClient`] connected to this server.
    pub async fn calc_client(&self) -> CalcClient {
        CalcClient::connect(&self.addr(), &ClientConfig::default())
            .await
            .unwrap()
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
