//! In-memory registry of calculator sessions and their stacks.
//!
//! ## Locking
//!
//! - The id → stack map sits behind its own `RwLock`. It is append-only and
//!   the lock is held just long enough to insert or clone a handle.
//! - Each stack sits behind its own `Mutex`. All reads and writes of a stack
//!   go through that mutex, which makes operations on one session
//!   linearizable while different sessions never share a lock.
//!
//! Sessions are never removed; a stack lives until the process exits.

use crate::rpc::{CalcError, CalcResult, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A session's stack. The top is the last element.
pub type Stack = Vec<i64>;

/// Shared handle to one session's stack.
///
/// Obtained from [`SessionStore::resolve`]; stays valid for the life of the
/// store since sessions are never deleted.
#[derive(Clone)]
pub struct SessionHandle {
    stack: Arc<Mutex<Stack>>,
}

impl SessionHandle {
    /// Runs `f` with exclusive access to the stack.
    pub async fn with_stack<R>(&self, f: impl FnOnce(&mut Stack) -> R) -> R {
        let mut stack = self.stack.lock().await;
        f(&mut stack)
    }
}

/// Registry mapping session identifiers to their stacks.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Stack>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with an empty stack and returns its identifier.
    pub async fn create_session(&self) -> SessionId {
        let mut sessions = self.sessions.write().await;
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if !sessions.contains_key(&id) {
                sessions.insert(id.clone(), Arc::new(Mutex::new(Stack::new())));
                return id;
            }
        }
    }

    /// Looks up the handle for `id` without touching its stack.
    pub async fn resolve(&self, id: &str) -> CalcResult<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(|stack| SessionHandle {
                stack: Arc::clone(stack),
            })
            .ok_or_else(|| CalcError::UnknownSession {
                session_id: id.to_string(),
            })
    }

    /// Runs `f` with exclusive access to the stack owned by `id`.
    ///
    /// This is the only way stacks are read or mutated. The map lock is
    /// released before the stack lock is taken, so a slow operation on one
    /// session never holds up session creation or other sessions.
    pub async fn with_stack<R>(&self, id: &str, f: impl FnOnce(&mut Stack) -> R) -> CalcResult<R> {
        let handle = self.resolve(id).await?;
        Ok(handle.with_stack(f).await)
    }

    /// Number of sessions created so far.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
#[path = "tests/session_store_tests.rs"]
mod tests;
