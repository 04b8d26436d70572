pub mod config;
pub mod display;
pub mod mirror;
pub mod panel;
pub mod pick_path;
pub mod session;
pub mod signal;
pub mod stats;
pub mod task;
mod telemetry;

pub use display::{decode, encode, Digits, EncodeError, Layout};
pub use panel::{DisplayTarget, Panel};
pub use pick_path::{run_pick_path, PickPath, PickState, PressOutcome};
pub use session::{SessionOptions, SessionReport, SessionRunner};
pub use signal::{install_interrupt_handler, interrupt_requested, Interrupted};
pub use task::{load_task_file, BinTag, PickTask, ReceiveBin, SourceBin, TaskSequence};
pub use telemetry::init_tracing;
