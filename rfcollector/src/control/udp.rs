//! Datagram command source
//!
//! Each datagram carries one verb: `START`, `STOP` or `CLOSE`, trimmed and
//! case-insensitive. `CLOSE` stops scanning and ends this source; the
//! session itself stays open for the process to close.

use std::net::SocketAddr;

use rfcollector_types::{Command, CommandSource, CommandVerb};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::apply;
use crate::error::Result;
use crate::session::Session;

/// Largest datagram read; longer ones are truncated
pub const MAX_DATAGRAM: usize = 1024;

pub struct UdpSource {
    session: Session,
    socket: UdpSocket,
    cancel: CancellationToken,
}

impl UdpSource {
    /// Bind the listening socket
    pub async fn bind(session: Session, addr: SocketAddr, cancel: CancellationToken) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!("Listening for commands on udp://{}", socket.local_addr()?);
        Ok(Self {
            session,
            socket,
            cancel,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub async fn run(self) -> Result<()> {
        let mut buf = [0u8; MAX_DATAGRAM];

        loop {
            let (len, peer) = tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("UDP source cancelled");
                    break;
                }
                received = self.socket.recv_from(&mut buf) => received?,
            };

            let text = String::from_utf8_lossy(&buf[..len]);
            let verb = match text.parse::<CommandVerb>() {
                Ok(verb) => verb,
                Err(e) => {
                    warn!("Ignoring datagram from {}: {}", peer, e);
                    continue;
                }
            };

            let command = Command::new(verb, CommandSource::Udp { peer });
            let _ = apply(&self.session, command).await;

            if verb == CommandVerb::ShutdownListener {
                info!("UDP source closed by {}", peer);
                break;
            }
        }

        Ok(())
    }
}
