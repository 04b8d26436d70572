//! Pick-by-light entrypoint: load a task document and guide the operator
//! through it on the lamp rack.
//!
//! Single-threaded. The only blocking point is the panel socket receive,
//! which wakes up every poll interval so SIGINT/SIGTERM end the run cleanly.

mod cli_utils;

use anyhow::Result;
use std::process::ExitCode;
use tracing::info;

use pickbylight::config::AppConfig;
use pickbylight::panel::{ObservedPanel, UdpPanel};
use pickbylight::{
    init_tracing, install_interrupt_handler, load_task_file, Interrupted, SessionRunner,
};

use crate::cli_utils::{build_observers, should_print_stats, INTERRUPTED_EXIT_CODE};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is::<Interrupted>() => {
            eprintln!("pickbylight: {err}; panel reset");
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        }
        Err(err) => {
            eprintln!("pickbylight: error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_tracing(&config)?;

    let sequence = load_task_file(&config.tasks)?;
    if config.list_tasks {
        print!("{}", sequence.render_pick_list());
        return Ok(());
    }

    install_interrupt_handler()?;
    let settings = config.transport_settings();
    let mut panel = ObservedPanel::new(UdpPanel::bind(&settings)?);
    for observer in build_observers(&config)? {
        panel = panel.with_observer(observer);
    }
    info!(
        tasks = sequence.len(),
        destination = %settings.destination,
        observers = panel.observer_count(),
        "panel ready"
    );

    let mut runner = SessionRunner::new(panel, config.session_options());
    let report = runner.run(&sequence)?;
    let stats_output = report.summary();
    if should_print_stats(&stats_output) {
        println!("{stats_output}");
    }
    Ok(())
}
