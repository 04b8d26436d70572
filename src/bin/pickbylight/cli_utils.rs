use anyhow::Result;
use pickbylight::config::AppConfig;
use pickbylight::mirror::RackMirror;
use pickbylight::panel::{EventLog, PanelObserver};

/// Exit status after an operator interrupt (128 + SIGINT).
pub(crate) const INTERRUPTED_EXIT_CODE: u8 = 130;

pub(crate) fn should_print_stats(stats_output: &str) -> bool {
    !stats_output.is_empty()
}

/// Observers requested on the command line, in notification order.
pub(crate) fn build_observers(config: &AppConfig) -> Result<Vec<Box<dyn PanelObserver>>> {
    let mut observers: Vec<Box<dyn PanelObserver>> = Vec::new();
    if let Some(path) = &config.event_log {
        observers.push(Box::new(EventLog::open(path)?));
    }
    if config.mirror {
        observers.push(Box::new(RackMirror::echoing()));
    }
    Ok(observers)
}
