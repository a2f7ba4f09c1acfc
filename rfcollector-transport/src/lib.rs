//! Transport layer for LLRP readers
//!
//! A transport owns the connection. Outbound frames go through
//! [`Transport::send`]; every inbound message, response or notification
//! alike, is pushed to the [`InboundHandler`] registered at connect time,
//! one at a time and in the order the frames arrived.

pub mod error;
pub mod tcp;

pub use error::{Error, Result};
pub use tcp::TcpTransport;

use std::sync::Arc;

use async_trait::async_trait;
use rfcollector_core::{Frame, FrameHeader, Message};

/// Receiver for everything the reader sends
///
/// Called from the transport's inbound task. Implementations must return
/// quickly: while a call runs, no further message is delivered.
pub trait InboundHandler: Send + Sync {
    /// A decoded message
    fn on_message(&self, message: Message);

    /// A frame arrived whole but its body did not decode
    ///
    /// The stream continues with the next frame.
    fn on_malformed(&self, header: &FrameHeader, error: &rfcollector_core::Error);

    /// The inbound stream ended; nothing more will be delivered
    fn on_closed(&self, reason: &Error);
}

/// Transport trait for different connection methods
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect and start delivering inbound messages to `handler`
    async fn connect(&mut self, handler: Arc<dyn InboundHandler>) -> Result<()>;

    /// Stop inbound delivery and drop the connection
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send one frame
    async fn send(&mut self, frame: &Frame) -> Result<()>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
