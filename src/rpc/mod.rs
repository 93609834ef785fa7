//! RPC service definitions for the calculator daemon.
//!
//! This module defines the tarpc service clients use to drive their
//! per-session stacks, and the error type that crosses the wire.

pub mod calculator_service;

use serde::{Deserialize, Serialize};

/// Opaque session identifier handed out by `create_session`.
pub type SessionId = String;

/// Errors returned by calculator RPC methods.
///
/// An empty stack is not an error: pops report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalcError {
    /// The session identifier was never handed out by this daemon
    UnknownSession { session_id: SessionId },
    /// `push_operation` got something other than min, max, gcd or lcm
    UnknownOperator { operator: String },
    /// An argument was out of range (e.g. a negative delay)
    InvalidArgument { message: String },
    /// The reduction does not fit in a 64-bit signed integer
    Overflow { operator: String },
}

impl std::fmt::Display for CalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalcError::UnknownSession { session_id } => {
                write!(f, "Unknown session: {}", session_id)
            }
            CalcError::UnknownOperator { operator } => {
                write!(f, "Unknown operator: {}", operator)
            }
            CalcError::InvalidArgument { message } => {
                write!(f, "Invalid argument: {}", message)
            }
            CalcError::Overflow { operator } => {
                write!(f, "Integer overflow while reducing with {}", operator)
            }
        }
    }
}

impl std::error::Error for CalcError {}

/// Result type for calculator operations.
pub type CalcResult<T> = Result<T, CalcError>;

#[cfg(test)]
#[path = "tests/rpc_tests.rs"]
mod tests;
