//! Calculator service definition for client ↔ daemon RPC.

use crate::rpc::{CalcResult, SessionId};

/// Service exposed by the calculator daemon.
///
/// Every call except `create_session` addresses one session's stack. Calls
/// on the same session are linearizable; calls on different sessions never
/// contend with each other.
#[tarpc::service]
pub trait Calculator {
    /// Create a new session with an empty stack.
    async fn create_session() -> SessionId;

    /// Push a value onto the top of the session's stack.
    async fn push_value(session_id: SessionId, value: i64) -> CalcResult<()>;

    /// Collapse the whole stack with `min`, `max`, `gcd` or `lcm`.
    /// No-op on an empty stack.
    async fn push_operation(session_id: SessionId, operator: String) -> CalcResult<()>;

    /// Pop the top value. `None` when the stack is empty.
    async fn pop(session_id: SessionId) -> CalcResult<Option<i64>>;

    /// Whether the session's stack has no elements.
    async fn is_empty(session_id: SessionId) -> CalcResult<bool>;

    /// Wait `millis` milliseconds, then pop.
    ///
    /// The stack is inspected when the wait ends, so values pushed during
    /// the wait are visible. Negative delays are rejected.
    async fn delay_pop(session_id: SessionId, millis: i64) -> CalcResult<Option<i64>>;
}
