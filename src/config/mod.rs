//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::display::Layout;
use crate::panel::TransportSettings;
use crate::session::SessionOptions;

pub use defaults::{
    DEFAULT_BIND_ADDR, DEFAULT_BROADCAST_ADDR, DEFAULT_COMMAND_GAP_MS, DEFAULT_POLL_MS,
    DEFAULT_PORT, DEFAULT_READY_LAYOUT, DEFAULT_TASK_PAUSE_MS,
};

/// CLI options for the pick-by-light controller.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "pickbylight",
    about = "Pick-by-light session controller",
    author,
    version
)]
pub struct AppConfig {
    /// Task document (JSON) to run
    #[arg(value_name = "TASKS")]
    pub tasks: PathBuf,

    /// Local address for the panel socket
    #[arg(long = "bind-addr", default_value_t = DEFAULT_BIND_ADDR)]
    pub bind_addr: IpAddr,

    /// Local and destination port of the lamp hub
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Broadcast address the display commands go to
    #[arg(long = "broadcast-addr", default_value_t = DEFAULT_BROADCAST_ADDR)]
    pub broadcast_addr: IpAddr,

    /// Minimum spacing between display commands (milliseconds)
    #[arg(long = "command-gap-ms", default_value_t = DEFAULT_COMMAND_GAP_MS)]
    pub command_gap_ms: u64,

    /// How often a blocked receive wakes up to check for interrupts (milliseconds)
    #[arg(long = "poll-ms", default_value_t = DEFAULT_POLL_MS)]
    pub poll_ms: u64,

    /// Pause after each finished task (milliseconds)
    #[arg(long = "task-pause-ms", default_value_t = DEFAULT_TASK_PAUSE_MS)]
    pub task_pause_ms: u64,

    /// Raw segment layout shown on the first receive bin before the session starts
    #[arg(long = "ready-layout", default_value_t = DEFAULT_READY_LAYOUT)]
    pub ready_layout: u16,

    /// Print the pick list and exit
    #[arg(long = "list-tasks", default_value_t = false)]
    pub list_tasks: bool,

    /// Print a text mirror of the rack to stderr on every display change
    #[arg(long, default_value_t = false)]
    pub mirror: bool,

    /// Append every panel event to this JSON-lines file
    #[arg(long = "event-log", value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Log verbosity
    #[arg(
        long = "log-level",
        env = "PICKBYLIGHT_LOG_LEVEL",
        value_enum,
        default_value_t = LogLevel::Info
    )]
    pub log_level: LogLevel,

    /// Write JSON logs to this file instead of stderr
    #[arg(long = "log-file", env = "PICKBYLIGHT_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl AppConfig {
    /// Socket settings for the panel transport.
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            bind: SocketAddr::new(self.bind_addr, self.port),
            destination: SocketAddr::new(self.broadcast_addr, self.port),
            command_gap: Duration::from_millis(self.command_gap_ms),
            poll_interval: Duration::from_millis(self.poll_ms),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            task_pause: Duration::from_millis(self.task_pause_ms),
            ready_layout: Layout::raw(self.ready_layout),
        }
    }
}
