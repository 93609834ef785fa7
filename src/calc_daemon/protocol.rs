//! Discovery file shared between the daemon and its clients.

use serde::{Deserialize, Serialize};

/// Contents of the port file the daemon writes once it is listening.
///
/// Clients read this to find the daemon without being told an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortFileContent {
    /// Host the daemon is reachable on
    pub host: String,
    /// TCP port of the calculator RPC service
    pub port: u16,
    /// PID of the daemon process
    pub pid: u32,
}

impl PortFileContent {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
