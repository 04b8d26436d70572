use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::protocol::{classify_datagram, format_command, Inbound};
use super::{DisplayTarget, Panel};
use crate::display::Layout;
use crate::task::BinTag;

const RECV_BUFFER_BYTES: usize = 4096;

/// Socket parameters for the broadcast transport.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub bind: SocketAddr,
    pub destination: SocketAddr,
    /// Minimum spacing between outbound commands.
    pub command_gap: Duration,
    /// Receive wake-up interval; bounds how long an interrupt goes unnoticed.
    pub poll_interval: Duration,
}

/// Lamp hub transport over a broadcast UDP socket.
///
/// Commands are not acknowledged and never retried; a lost datagram leaves
/// the display unchanged and nothing here can tell.
pub struct UdpPanel {
    socket: UdpSocket,
    destination: SocketAddr,
    command_gap: Duration,
    last_send: Option<Instant>,
    buf: Vec<u8>,
}

impl UdpPanel {
    pub fn bind(settings: &TransportSettings) -> Result<Self> {
        let socket = UdpSocket::bind(settings.bind)
            .with_context(|| format!("failed to bind panel socket on {}", settings.bind))?;
        socket
            .set_broadcast(true)
            .context("failed to enable broadcast on panel socket")?;
        socket
            .set_read_timeout(Some(settings.poll_interval))
            .context("failed to set panel socket read timeout")?;
        debug!(
            bind = %settings.bind,
            destination = %settings.destination,
            "panel transport ready"
        );
        Ok(Self {
            socket,
            destination: settings.destination,
            command_gap: settings.command_gap,
            last_send: None,
            buf: vec![0u8; RECV_BUFFER_BYTES],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    fn pace(&mut self) {
        if let Some(last) = self.last_send {
            let elapsed = last.elapsed();
            if elapsed < self.command_gap {
                thread::sleep(self.command_gap - elapsed);
            }
        }
    }
}

impl Panel for UdpPanel {
    fn send_layout(&mut self, target: DisplayTarget, layout: Layout) -> Result<()> {
        self.pace();
        let message = format_command(&target, layout);
        self.socket
            .send_to(message.as_bytes(), self.destination)
            .with_context(|| format!("failed to send layout {layout} to {target}"))?;
        self.last_send = Some(Instant::now());
        debug!(%target, %layout, "layout sent");
        Ok(())
    }

    fn await_press(&mut self) -> Result<Option<BinTag>> {
        let len = match self.socket.recv_from(&mut self.buf) {
            Ok((len, _from)) => len,
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                return Ok(None);
            }
            Err(err) => return Err(err).context("failed to receive from panel socket"),
        };
        match classify_datagram(&self.buf[..len]) {
            Inbound::Press(tag) => {
                debug!(%tag, "button press");
                Ok(Some(tag))
            }
            Inbound::Heartbeat => {
                trace!("heartbeat discarded");
                Ok(None)
            }
            Inbound::Unrecognized => {
                trace!(bytes = len, "unrecognized datagram discarded");
                Ok(None)
            }
        }
    }
}

impl Drop for UdpPanel {
    fn drop(&mut self) {
        debug!("panel transport released");
    }
}
