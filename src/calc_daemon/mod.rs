//! Calculator daemon: per-session integer stacks behind a tarpc service.
//!
//! ## Architecture
//!
//! - **Store (`session_store.rs`)**: session id → stack registry with one
//!   lock per stack.
//! - **Reducers (`reducer.rs`)**: min, max, gcd and lcm over a whole stack.
//! - **Daemon (`rpc_server.rs`)**: tarpc server implementing the calculator
//!   operations on top of the store.
//! - **Client (`rpc_client.rs`)**: connects directly or through the port
//!   file, one method per remote operation.
//! - **Scripts (`script.rs`)**: batch command driver used for testing.
//! - **Protocol (`protocol.rs`)**: port file contents.

pub mod protocol;
pub mod reducer;
pub mod rpc_client;
pub mod rpc_server;
pub mod script;
pub mod session_store;

#[cfg(test)]
pub(crate) mod rpc_tests;

pub use rpc_client::CalcClient;
pub use rpc_server::run_daemon;
