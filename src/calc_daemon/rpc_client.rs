//! RPC client for the calculator daemon using tarpc.
//!
//! Connects over TCP, either to an explicit address or to whatever the
//! daemon advertised in its port file.

use crate::calc_daemon::protocol::PortFileContent;
use crate::calc_paths;
use crate::config::ClientConfig;
use crate::rpc::calculator_service::CalculatorClient;
use crate::rpc::{CalcError, SessionId};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tarpc::client::{self, RpcError};
use tarpc::tokio_serde::formats::Bincode;

/// Errors surfaced by [`CalcClient`] calls.
///
/// Keeps failures of the call mechanism apart from calls the daemon
/// received and rejected.
#[derive(Debug)]
pub enum ClientError {
    /// The RPC itself failed (connection lost, deadline exceeded, ...)
    Transport(RpcError),
    /// The daemon rejected the call
    Rejected(CalcError),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "RPC transport error: {}", e),
            ClientError::Rejected(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Transport(e) => Some(e),
            ClientError::Rejected(e) => Some(e),
        }
    }
}

impl From<RpcError> for ClientError {
    fn from(e: RpcError) -> Self {
        ClientError::Transport(e)
    }
}

impl From<CalcError> for ClientError {
    fn from(e: CalcError) -> Self {
        ClientError::Rejected(e)
    }
}

/// RPC client for the calculator daemon.
///
/// Clones share one connection; calls from different clones run
/// concurrently.
#[derive(Clone)]
pub struct CalcClient {
    client: CalculatorClient,
    call_timeout: Duration,
}

impl CalcClient {
    /// Connects to the daemon listening on `addr`, retrying with backoff.
    pub async fn connect(addr: &str, config: &ClientConfig) -> Result<Self> {
        let mut delay_ms = config.base_delay_ms;

        for attempt in 1..=config.connect_attempts {
            match Self::try_connect(addr, config).await {
                Ok(client) => return Ok(client),
                Err(e) => {
                    tracing::debug!(addr, attempt, error = %e, "connect attempt failed");
                }
            }

            if attempt < config.connect_attempts {
                // Add jitter (±25%)
                let jitter = (delay_ms as f64 * 0.25 * (rand::random::<f64>() * 2.0 - 1.0)) as i64;
                let actual_delay = (delay_ms as i64 + jitter).max(10) as u64;
                tokio::time::sleep(Duration::from_millis(actual_delay)).await;
                delay_ms = delay_ms.saturating_mul(2);
            }
        }

        anyhow::bail!(
            "Failed to connect to {} after {} attempts",
            addr,
            config.connect_attempts
        )
    }

    /// Connects to the daemon advertised in the port file.
    pub async fn discover(config: &ClientConfig) -> Result<Self> {
        let port_path = calc_paths::calcd_port_path()?;
        let content = std::fs::read_to_string(&port_path).with_context(|| {
            format!(
                "No running calculator daemon found (missing {})",
                port_path.display()
            )
        })?;
        let port_info: PortFileContent =
            serde_json::from_str(&content).context("Failed to parse daemon port file")?;

        Self::connect(&port_info.addr(), config).await
    }

    async fn try_connect(addr: &str, config: &ClientConfig) -> Result<Self> {
        use tarpc::serde_transport::tcp;

        let transport = tcp::connect(addr, Bincode::default).await?;
        let client = CalculatorClient::new(client::Config::default(), transport).spawn();

        Ok(Self {
            client,
            call_timeout: Duration::from_millis(config.call_timeout_ms),
        })
    }

    /// Context whose deadline allows `extra` on top of the call timeout.
    fn context(&self, extra: Duration) -> tarpc::context::Context {
        let mut ctx = tarpc::context::current();
        ctx.deadline = Instant::now() + self.call_timeout + extra;
        ctx
    }

    pub async fn create_session(&self) -> Result<SessionId, ClientError> {
        let session_id = self
            .client
            .create_session(self.context(Duration::ZERO))
            .await?;
        tracing::debug!(%session_id, "created session");
        Ok(session_id)
    }

    pub async fn push_value(&self, session_id: &str, value: i64) -> Result<(), ClientError> {
        Ok(self
            .client
            .push_value(self.context(Duration::ZERO), session_id.to_string(), value)
            .await??)
    }

    pub async fn push_operation(&self, session_id: &str, operator: &str) -> Result<(), ClientError> {
        Ok(self
            .client
            .push_operation(
                self.context(Duration::ZERO),
                session_id.to_string(),
                operator.to_string(),
            )
            .await??)
    }

    pub async fn pop(&self, session_id: &str) -> Result<Option<i64>, ClientError> {
        Ok(self
            .client
            .pop(self.context(Duration::ZERO), session_id.to_string())
            .await??)
    }

    pub async fn is_empty(&self, session_id: &str) -> Result<bool, ClientError> {
        Ok(self
            .client
            .is_empty(self.context(Duration::ZERO), session_id.to_string())
            .await??)
    }

    /// Delayed pop. The call deadline is stretched by the requested delay.
    pub async fn delay_pop(&self, session_id: &str, millis: i64) -> Result<Option<i64>, ClientError> {
        let wait = Duration::from_millis(millis.max(0) as u64);
        Ok(self
            .client
            .delay_pop(self.context(wait), session_id.to_string(), millis)
            .await??)
    }
}

#[cfg(test)]
#[path = "tests/rpc_client_tests.rs"]
mod tests;
