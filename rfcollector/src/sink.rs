//! Receivers for what the dispatcher delivers
//!
//! Both traits are called from the transport's inbound task, outside the
//! session's operation lock. Implementations must not block: a slow sink
//! holds back every later message.

use rfcollector_core::ReaderEvent;
use rfcollector_types::TagEvent;
use tokio::sync::mpsc;
use tracing::warn;

/// Destination for decoded tag observations
///
/// Failures are the sink's own business; nothing is reported back.
#[cfg_attr(test, mockall::automock)]
pub trait TagSink: Send + Sync {
    fn accept(&self, event: TagEvent);
}

/// Optional observer for reader event notifications
#[cfg_attr(test, mockall::automock)]
pub trait EventObserver: Send + Sync {
    fn on_event(&self, event: &ReaderEvent);
}

/// Sink forwarding events into a bounded channel
///
/// Never waits: when the channel is full or its receiver is gone the event
/// is dropped with a warning.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<TagEvent>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<TagEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl TagSink for ChannelSink {
    fn accept(&self, event: TagEvent) {
        if let Err(e) = self.tx.try_send(event) {
            match e {
                mpsc::error::TrySendError::Full(event) => {
                    warn!("Tag channel full, dropping {}", event.tag_id_hex());
                }
                mpsc::error::TrySendError::Closed(event) => {
                    warn!("Tag channel closed, dropping {}", event.tag_id_hex());
                }
            }
        }
    }
}
