//! Indicator panel transport.
//!
//! The lamp hub speaks xPL over UDP broadcast: we emit `control.basic`
//! commands that set a display's segment mask, and the hub broadcasts
//! heartbeats plus trigger messages when a bin's button goes HIGH.
//!
//! Architecture:
//! - `Panel` trait: the only surface the pick-path and session code use
//! - `UdpPanel`: the real broadcast transport
//! - `ObservedPanel`: wraps any panel and fans events out to observers

mod observer;
mod protocol;
mod udp;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::display::Layout;
use crate::task::BinTag;

pub use observer::{EventLog, ObservedPanel, PanelEvent, PanelObserver};
pub use protocol::{classify_datagram, format_command, Inbound};
pub use udp::{TransportSettings, UdpPanel};

/// Which display(s) a command addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplayTarget {
    /// Every display on the hub. Only used for resets.
    All,
    Bin(BinTag),
}

impl fmt::Display for DisplayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayTarget::All => f.write_str("*"),
            DisplayTarget::Bin(tag) => write!(f, "{tag}"),
        }
    }
}

impl Serialize for DisplayTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&BinTag> for DisplayTarget {
    fn from(tag: &BinTag) -> Self {
        DisplayTarget::Bin(tag.clone())
    }
}

/// Bidirectional channel to the indicator hardware.
pub trait Panel {
    /// Fire-and-forget: no acknowledgement exists on the wire.
    fn send_layout(&mut self, target: DisplayTarget, layout: Layout) -> Result<()>;

    /// Wait for the next datagram. `Ok(None)` means nothing actionable arrived
    /// (heartbeat, noise, or a receive wake-up); callers loop.
    fn await_press(&mut self) -> Result<Option<BinTag>>;

    /// Blank every display.
    fn reset(&mut self) -> Result<()> {
        self.send_layout(DisplayTarget::All, Layout::EMPTY)
    }
}

impl<P: Panel + ?Sized> Panel for &mut P {
    fn send_layout(&mut self, target: DisplayTarget, layout: Layout) -> Result<()> {
        (**self).send_layout(target, layout)
    }

    fn await_press(&mut self) -> Result<Option<BinTag>> {
        (**self).await_press()
    }
}

impl<P: Panel + ?Sized> Panel for Box<P> {
    fn send_layout(&mut self, target: DisplayTarget, layout: Layout) -> Result<()> {
        (**self).send_layout(target, layout)
    }

    fn await_press(&mut self) -> Result<Option<BinTag>> {
        (**self).await_press()
    }
}
