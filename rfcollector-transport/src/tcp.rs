//! TCP transport

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use rfcollector_core::{Frame, FrameHeader, Message};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::{error::*, InboundHandler, Transport};

/// TCP transport for LLRP readers
pub struct TcpTransport {
    addr: String,
    port: u16,
    socket_addr: Option<SocketAddr>,
    writer: Option<OwnedWriteHalf>,
    reader_task: Option<JoinHandle<()>>,
    /// Cleared by the inbound task when the stream ends
    alive: Arc<AtomicBool>,
    connect_timeout: Duration,
}

impl TcpTransport {
    /// Create new TCP transport
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
            socket_addr: None,
            writer: None,
            reader_task: None,
            alive: Arc::new(AtomicBool::new(false)),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Resolve address to SocketAddr
    async fn resolve_addr(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.socket_addr {
            return Ok(addr);
        }

        let addr_str = format!("{}:{}", self.addr, self.port);

        let addr = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))?;

        self.socket_addr = Some(addr);
        Ok(addr)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self, handler: Arc<dyn InboundHandler>) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        let addr = self.resolve_addr().await?;

        debug!("Connecting to {}...", addr);

        let stream = timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(Error::Io)?;

        // Requests are small and answered one at a time
        stream.set_nodelay(true)?;

        debug!("Connected to {}", addr);

        let (reader, writer) = stream.into_split();
        self.alive.store(true, Ordering::Release);
        self.reader_task = Some(tokio::spawn(read_loop(
            reader,
            handler,
            Arc::clone(&self.alive),
        )));
        self.writer = Some(writer);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
        self.alive.store(false, Ordering::Release);

        if let Some(mut writer) = self.writer.take() {
            debug!("Disconnecting from {}...", self.remote_addr());

            // Graceful shutdown
            let _ = writer.shutdown().await;
        }

        self.socket_addr = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.writer.is_some() && self.alive.load(Ordering::Acquire)
    }

    async fn send(&mut self, frame: &Frame) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::NotConnected)?;
        if !self.alive.load(Ordering::Acquire) {
            return Err(Error::ConnectionClosed);
        }

        let data = frame.encode();
        trace!("Sending {} bytes: {:02X?}", data.len(), &data[..data.len().min(16)]);

        writer.write_all(&data).await?;
        writer.flush().await?;

        Ok(())
    }

    fn remote_addr(&self) -> String {
        self.socket_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.addr, self.port))
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
        if self.writer.is_some() {
            warn!("TCP transport dropped while still connected");
        }
    }
}

/// Read one whole frame: header first, then exactly the declared body
pub(crate) async fn read_frame<R>(reader: &mut R) -> Result<(FrameHeader, BytesMut)>
where
    R: AsyncRead + Unpin,
{
    let mut head = [0u8; Frame::HEADER_SIZE];
    reader.read_exact(&mut head).await.map_err(Error::from_read)?;
    let header = FrameHeader::parse(&head)?;

    let mut body = BytesMut::zeroed(header.body_len());
    reader.read_exact(&mut body).await.map_err(Error::from_read)?;

    trace!(
        "Received frame type={} id={} ({} bytes)",
        header.message_type,
        header.message_id,
        header.length
    );
    Ok((header, body))
}

/// Decode and deliver frames until the stream ends or loses framing
async fn read_loop(mut reader: OwnedReadHalf, handler: Arc<dyn InboundHandler>, alive: Arc<AtomicBool>) {
    let reason = loop {
        let (header, body) = match read_frame(&mut reader).await {
            Ok(parts) => parts,
            Err(e) => break e,
        };

        match Frame::from_parts(header, body.freeze()).and_then(Message::decode) {
            Ok(message) => handler.on_message(message),
            Err(e) => {
                debug!("Malformed frame id={}: {}", header.message_id, e);
                handler.on_malformed(&header, &e);
            }
        }
    };

    alive.store(false, Ordering::Release);
    match &reason {
        Error::ConnectionClosed => debug!("Reader closed the connection"),
        other => warn!("Inbound stream stopped: {}", other),
    }
    handler.on_closed(&reason);
}
