use std::net::{IpAddr, Ipv4Addr};

/// Standard xPL hub port.
pub const DEFAULT_PORT: u16 = 3865;
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
/// Broadcast address of the lab network the lamp hub sits on.
pub const DEFAULT_BROADCAST_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 2, 255));

pub const DEFAULT_COMMAND_GAP_MS: u64 = 150;
pub const DEFAULT_POLL_MS: u64 = 250;
pub const DEFAULT_TASK_PAUSE_MS: u64 = 500;
/// Both decimal points lit.
pub const DEFAULT_READY_LAYOUT: u16 = 0x8080;

pub(super) const MAX_COMMAND_GAP_MS: u64 = 2_000;
pub(super) const MIN_POLL_MS: u64 = 10;
pub(super) const MAX_POLL_MS: u64 = 5_000;
pub(super) const MAX_TASK_PAUSE_MS: u64 = 10_000;
