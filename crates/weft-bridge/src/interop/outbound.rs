//! Calls initiated locally and completed by the remote surface.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::debug;
use weft_common::{BridgeError, IdAllocator};

type Outcome = Result<Option<String>, BridgeError>;

/// Table of in-flight outbound calls keyed by task id.
#[derive(Default)]
pub struct PendingCalls {
    calls: Mutex<HashMap<u64, oneshot::Sender<Outcome>>>,
    ids: IdAllocator,
}

impl PendingCalls {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reserve a fresh task id, skipping ids still in flight. Fails with
    /// `ProtocolMismatch` once the id space is used up.
    pub fn allocate(self: &Arc<Self>) -> Result<PendingCall, BridgeError> {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            let task_id = self.ids.next_id().ok_or_else(|| {
                BridgeError::ProtocolMismatch("outbound task ids exhausted".into())
            })?;
            if let Entry::Vacant(slot) = calls.entry(task_id) {
                let (tx, rx) = oneshot::channel();
                slot.insert(tx);
                return Ok(PendingCall::new(task_id, rx, self));
            }
        }
    }

    /// Reserve a caller-supplied task id.
    pub fn register(self: &Arc<Self>, task_id: u64) -> Result<PendingCall, BridgeError> {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        let Entry::Vacant(slot) = calls.entry(task_id) else {
            return Err(BridgeError::ProtocolMismatch(format!(
                "task id {task_id} is already in flight"
            )));
        };
        // Allocated ids must never collide with caller-chosen ones.
        self.ids.observe(task_id);
        let (tx, rx) = oneshot::channel();
        slot.insert(tx);
        Ok(PendingCall::new(task_id, rx, self))
    }

    /// Resolve the call registered under `task_id`.
    ///
    /// Fails with `ProtocolMismatch` when no such call is in flight, which
    /// covers duplicate completions and completions after a timeout.
    pub fn complete(
        &self,
        task_id: u64,
        success: bool,
        result: Option<String>,
    ) -> Result<(), BridgeError> {
        let sender = self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&task_id)
            .ok_or_else(|| {
                BridgeError::ProtocolMismatch(format!("no pending call with task id {task_id}"))
            })?;

        let outcome = if success {
            Ok(result)
        } else {
            Err(BridgeError::RemoteCallFailed(
                result.unwrap_or_else(|| "remote call failed".into()),
            ))
        };
        if sender.send(outcome).is_err() {
            debug!(task_id, "call completed after its waiter went away");
        }
        Ok(())
    }

    pub fn forget(&self, task_id: u64) -> bool {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&task_id)
            .is_some()
    }

    /// Drop every in-flight call; their waiters see `CallAbandoned`.
    pub fn abandon_all(&self) -> usize {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        let count = calls.len();
        calls.clear();
        count
    }

    pub fn in_flight(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Receiving half of one outbound call.
#[must_use = "a pending call does nothing unless awaited"]
pub struct PendingCall {
    task_id: u64,
    rx: oneshot::Receiver<Outcome>,
    calls: Weak<PendingCalls>,
}

impl PendingCall {
    fn new(task_id: u64, rx: oneshot::Receiver<Outcome>, calls: &Arc<PendingCalls>) -> Self {
        Self {
            task_id,
            rx,
            calls: Arc::downgrade(calls),
        }
    }

    pub fn task_id(&self) -> u64 {
        self.task_id
    }

    /// Wait for the remote result. There is no timeout.
    pub async fn wait(self) -> Result<Option<String>, BridgeError> {
        let task_id = self.task_id;
        self.rx
            .await
            .unwrap_or(Err(BridgeError::CallAbandoned { task_id }))
    }

    /// Wait at most `timeout`. On expiry the task id is forgotten, so a late
    /// completion is reported as a protocol mismatch.
    pub async fn wait_timeout(self, timeout: Duration) -> Result<Option<String>, BridgeError> {
        let task_id = self.task_id;
        match tokio::time::timeout(timeout, self.rx).await {
            Ok(outcome) => outcome.unwrap_or(Err(BridgeError::CallAbandoned { task_id })),
            Err(_) => {
                if let Some(calls) = self.calls.upgrade() {
                    calls.forget(task_id);
                }
                Err(BridgeError::CallTimedOut { task_id })
            }
        }
    }
}
