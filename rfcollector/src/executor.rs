//! Request/response transactions over the shared connection
//!
//! The transport delivers everything asynchronously to the dispatcher. The
//! executor turns that into a synchronous call: register what is expected,
//! send, then wait for the dispatcher to hand over the matching response or
//! for the deadline to pass.
//!
//! Only one transaction is in flight at a time. The executor does not
//! enforce this itself; callers hold the session's operation lock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rfcollector_core::{MessageIds, MessageKind, Request, Response};
use rfcollector_transport::Transport;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A request awaiting its response
#[derive(Debug)]
struct PendingTransaction {
    message_id: u32,
    expected: MessageKind,
    operation: &'static str,
    reply: oneshot::Sender<Result<Response>>,
}

/// Slot holding the single outstanding transaction
///
/// Shared between the executor, which fills it, and the dispatcher, which
/// resolves it from the inbound task.
#[derive(Debug, Default)]
pub struct PendingSlot {
    inner: Mutex<Option<PendingTransaction>>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(
        &self,
        message_id: u32,
        expected: MessageKind,
        operation: &'static str,
    ) -> oneshot::Receiver<Result<Response>> {
        let (reply, rx) = oneshot::channel();
        let previous = self.inner.lock().replace(PendingTransaction {
            message_id,
            expected,
            operation,
            reply,
        });
        if let Some(stale) = previous {
            warn!(
                "Replaced stale pending transaction id={} ({})",
                stale.message_id, stale.operation
            );
        }
        rx
    }

    /// Drop the pending transaction if it is still `message_id`
    fn clear(&self, message_id: u32) {
        let mut slot = self.inner.lock();
        if slot.as_ref().is_some_and(|p| p.message_id == message_id) {
            *slot = None;
        }
    }

    /// Check whether a transaction is outstanding
    pub fn is_pending(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Complete the pending transaction with `response` if id and kind match
    ///
    /// Hands the response back when it belongs to no pending transaction.
    pub fn try_resolve(&self, response: Response) -> Option<Response> {
        let pending = {
            let mut slot = self.inner.lock();
            match slot.as_ref() {
                Some(p) if p.message_id == response.message_id && p.expected == response.kind => {
                    slot.take()
                }
                _ => None,
            }
        };

        match pending {
            Some(p) => {
                // Receiver gone means the caller already timed out
                let _ = p.reply.send(Ok(response));
                None
            }
            None => Some(response),
        }
    }

    /// Fail the pending transaction if its id is `message_id`
    ///
    /// `error` is built only when there is a match; it receives the
    /// operation name of the failed transaction.
    pub fn try_fail(&self, message_id: u32, error: impl FnOnce(&'static str) -> Error) -> bool {
        let pending = {
            let mut slot = self.inner.lock();
            match slot.as_ref() {
                Some(p) if p.message_id == message_id => slot.take(),
                _ => None,
            }
        };

        match pending {
            Some(p) => {
                let _ = p.reply.send(Err(error(p.operation)));
                true
            }
            None => false,
        }
    }

    /// Kind the pending transaction waits for, if its id is `message_id`
    pub fn expected_kind(&self, message_id: u32) -> Option<MessageKind> {
        self.inner
            .lock()
            .as_ref()
            .filter(|p| p.message_id == message_id)
            .map(|p| p.expected)
    }

    /// Fail whatever is pending; used when the connection goes away
    pub fn fail_any(&self, error: impl FnOnce(&'static str) -> Error) -> bool {
        match self.inner.lock().take() {
            Some(p) => {
                let _ = p.reply.send(Err(error(p.operation)));
                true
            }
            None => false,
        }
    }
}

/// Sends requests and waits for their correlated responses
#[derive(Debug, Clone)]
pub struct Executor {
    ids: MessageIds,
    pending: Arc<PendingSlot>,
    timeout: Duration,
}

impl Executor {
    pub fn new(pending: Arc<PendingSlot>, timeout: Duration) -> Self {
        Self {
            ids: MessageIds::new(),
            pending,
            timeout,
        }
    }

    /// Message id generator shared by every request of this executor
    pub fn ids(&self) -> &MessageIds {
        &self.ids
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `request` and wait for its successful response
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] when nothing matching arrives in time
    /// - [`Error::Status`] when the reader answers with a failure status,
    ///   or with an ERROR_MESSAGE for this request
    /// - [`Error::Disconnected`] when the connection drops while waiting
    pub async fn execute(&self, transport: &mut dyn Transport, request: &Request) -> Result<Response> {
        let operation = request.operation();
        let message_id = self.ids.next_id()?;
        let reply = self
            .pending
            .register(message_id, request.expected_response(), operation);

        debug!("{} -> {} (id={})", operation, request.message_type(), message_id);

        if let Err(e) = transport.send(&request.encode(message_id)).await {
            self.pending.clear(message_id);
            return Err(e.into());
        }

        let response = match tokio::time::timeout(self.timeout, reply).await {
            Ok(Ok(outcome)) => outcome?,
            Ok(Err(_)) => return Err(Error::Disconnected { operation }),
            Err(_) => {
                self.pending.clear(message_id);
                warn!("{} timed out after {:?} (id={})", operation, self.timeout, message_id);
                return Err(Error::Timeout {
                    operation,
                    after: self.timeout,
                });
            }
        };

        if !response.status.is_success() {
            return Err(Error::Status {
                operation,
                code: response.status.code,
                description: response.status.description,
            });
        }

        debug!("{} <- {} (id={})", operation, response.kind, message_id);
        Ok(response)
    }
}
