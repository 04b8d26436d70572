//! Session runner: sequences every task of a run over one panel.
//!
//! The panel is reset before the first task, after every task and on every
//! exit path. A [`PanelResetGuard`] covers the exit paths the normal flow does
//! not reach (errors, interrupts, panics).

use anyhow::{Context, Result};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::display::{encode, Layout};
use crate::panel::{DisplayTarget, Panel};
use crate::pick_path::run_pick_path;
use crate::signal::{interrupt_requested, Interrupted};
use crate::stats::{format_session_stats, SessionStats};
use crate::task::{PickTask, TaskSequence};

pub const DEFAULT_TASK_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Pause between a finished task and the next one.
    pub task_pause: Duration,
    /// Layout shown on the first receive bin until the operator starts.
    pub ready_layout: Layout,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            task_pause: DEFAULT_TASK_PAUSE,
            ready_layout: Layout::READY,
        }
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub stats: SessionStats,
}

impl SessionReport {
    pub fn tasks_completed(&self) -> usize {
        self.stats.tasks_completed()
    }

    pub fn summary(&self) -> String {
        format_session_stats(&self.stats)
    }
}

/// RAII guard that leaves every display dark when the run ends early.
pub struct PanelResetGuard<'a, P: Panel + ?Sized> {
    panel: &'a mut P,
    armed: bool,
}

impl<'a, P: Panel + ?Sized> PanelResetGuard<'a, P> {
    pub fn new(panel: &'a mut P) -> Self {
        Self { panel, armed: true }
    }

    pub fn panel(&mut self) -> &mut P {
        self.panel
    }

    /// Reset now and disarm; the caller sees a reset failure.
    pub fn finish(mut self) -> Result<()> {
        self.armed = false;
        self.panel.reset()
    }

    /// Disarm without another reset (the panel is already dark).
    pub fn release(mut self) {
        self.armed = false;
    }
}

impl<P: Panel + ?Sized> Drop for PanelResetGuard<'_, P> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.panel.reset() {
            Ok(()) => info!("panel reset after aborted session"),
            Err(err) => warn!("panel reset during cleanup failed: {err:#}"),
        }
    }
}

pub struct SessionRunner<P: Panel> {
    panel: P,
    options: SessionOptions,
    stop_requested: Box<dyn Fn() -> bool>,
}

impl<P: Panel> SessionRunner<P> {
    pub fn new(panel: P, options: SessionOptions) -> Self {
        Self {
            panel,
            options,
            stop_requested: Box::new(interrupt_requested),
        }
    }

    /// Replace the interrupt check (defaults to the process signal flag).
    pub fn with_stop_check(mut self, stop_requested: Box<dyn Fn() -> bool>) -> Self {
        self.stop_requested = stop_requested;
        self
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn into_panel(self) -> P {
        self.panel
    }

    /// Run every task in order. Returns once the last task completes.
    ///
    /// Any error (including [`Interrupted`]) ends the run after a best-effort
    /// panel reset.
    pub fn run(&mut self, sequence: &TaskSequence) -> Result<SessionReport> {
        preflight(sequence)?;
        let mut stats = SessionStats::new();
        let stop = &*self.stop_requested;
        let mut guard = PanelResetGuard::new(&mut self.panel);

        let Some(first) = sequence.first() else {
            info!("task sequence is empty; nothing to pick");
            guard.finish()?;
            return Ok(SessionReport { stats });
        };

        guard.panel().reset()?;
        info!(tasks = sequence.len(), "session starting");
        await_ready(guard.panel(), first, self.options.ready_layout, stop, &mut stats)?;

        for (index, task) in sequence.iter().enumerate() {
            if stop() {
                return Err(Interrupted.into());
            }
            let started = Instant::now();
            let summary = run_pick_path(task, guard.panel(), stop)?;
            stats.record_task(task, summary, started.elapsed());
            guard.panel().reset()?;

            let is_last = index + 1 == sequence.len();
            if !is_last && !self.options.task_pause.is_zero() {
                thread::sleep(self.options.task_pause);
            }
        }

        guard.release();
        info!(
            tasks = stats.tasks_completed(),
            picks = stats.confirmed_picks,
            "session complete"
        );
        Ok(SessionReport { stats })
    }
}

/// Every quantity in the run must fit the two-digit displays.
fn preflight(sequence: &TaskSequence) -> Result<()> {
    for task in sequence {
        for bin in &task.source_bins {
            encode(bin.count).with_context(|| {
                format!("task {} order {} bin {}", task.task_id, task.order_id, bin.tag)
            })?;
        }
        encode(task.receive_bin.expected_count).with_context(|| {
            format!(
                "task {} order {} receive bin {}",
                task.task_id, task.order_id, task.receive_bin.tag
            )
        })?;
    }
    Ok(())
}

/// Show the ready layout on the first receive bin and wait for that exact bin.
fn await_ready<P: Panel + ?Sized>(
    panel: &mut P,
    first: &PickTask,
    ready_layout: Layout,
    stop: &dyn Fn() -> bool,
    stats: &mut SessionStats,
) -> Result<()> {
    let ready_bin = &first.receive_bin.tag;
    panel.send_layout(DisplayTarget::from(ready_bin), ready_layout)?;
    info!(bin = %ready_bin, "waiting for operator to press the ready bin");
    loop {
        if stop() {
            return Err(Interrupted.into());
        }
        match panel.await_press()? {
            Some(tag) if tag == *ready_bin => return Ok(()),
            Some(tag) => {
                warn!(%tag, expected = %ready_bin, "press ignored before session start");
                stats.record_unexpected();
            }
            None => {}
        }
    }
}
