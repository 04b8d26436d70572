//! Per-task confirmation state machine.
//!
//! A task lights every source bin with its quantity and the receive bin with
//! the task total. Each source-bin press zeroes that bin and refreshes the
//! receive bin's outstanding count; once nothing is outstanding, pressing the
//! receive bin clears the task's displays and completes it.
//!
//! The outstanding count is always the sum over the bins still unconfirmed,
//! so duplicate or out-of-order presses can never push it below zero.


use anyhow::{Context, Result};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::display::{encode, Layout};
use crate::panel::{DisplayTarget, Panel};
use crate::signal::Interrupted;
use crate::task::{BinTag, PickTask, SourceBin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickState {
    AwaitingInputs,
    Complete,
}

/// Why a press left the task unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredPress {
    /// Bin is not part of this task.
    NotInTask,
    /// Source bin was already confirmed.
    AlreadyConfirmed,
    /// Receive bin pressed while source bins are still outstanding.
    ReceivePending { remaining: usize },
    /// Task already completed.
    AfterCompletion,
}

/// Result of feeding one press to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOutcome {
    Confirmed { tag: BinTag, outstanding: u32 },
    Completed,
    Ignored(IgnoredPress),
}

/// Counters for one finished task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickSummary {
    pub confirmed: usize,
    pub unexpected_presses: usize,
}

/// Progress through one task. Dropped when the task completes or aborts.
#[derive(Debug)]
pub struct PickPath<'t> {
    task: &'t PickTask,
    remaining: BTreeSet<BinTag>,
    confirmed: Vec<&'t SourceBin>,
    state: PickState,
    unexpected: usize,
}

impl<'t> PickPath<'t> {
    pub fn new(task: &'t PickTask) -> Self {
        Self {
            task,
            remaining: task.source_bins.iter().map(|bin| bin.tag.clone()).collect(),
            confirmed: Vec::with_capacity(task.source_bins.len()),
            state: PickState::AwaitingInputs,
            unexpected: 0,
        }
    }

    pub fn state(&self) -> PickState {
        self.state
    }

    pub fn task(&self) -> &'t PickTask {
        self.task
    }

    /// Items still to be picked for this task.
    pub fn outstanding(&self) -> u32 {
        self.task
            .source_bins
            .iter()
            .filter(|bin| self.remaining.contains(&bin.tag))
            .map(|bin| bin.count)
            .sum()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &BinTag> {
        self.remaining.iter()
    }

    pub fn confirmed(&self) -> &[&'t SourceBin] {
        &self.confirmed
    }

    pub fn summary(&self) -> PickSummary {
        PickSummary {
            confirmed: self.confirmed.len(),
            unexpected_presses: self.unexpected,
        }
    }

    /// Entry action: show every source quantity, then the receive total.
    pub fn light_all<P: Panel + ?Sized>(&self, panel: &mut P) -> Result<()> {
        for bin in &self.task.source_bins {
            show_quantity(panel, &bin.tag, bin.count)?;
        }
        let receive = &self.task.receive_bin;
        show_quantity(panel, &receive.tag, receive.expected_count)
    }

    /// Apply one press. Displays change only for confirmations and completion.
    pub fn handle_press<P: Panel + ?Sized>(
        &mut self,
        tag: &BinTag,
        panel: &mut P,
    ) -> Result<PressOutcome> {
        if self.state == PickState::Complete {
            return Ok(self.ignore(tag, IgnoredPress::AfterCompletion));
        }
        let task = self.task;

        if self.remaining.remove(tag) {
            show_quantity(panel, tag, 0)?;
            self.confirmed
                .extend(task.source_bins.iter().filter(|bin| &bin.tag == tag));
            let outstanding = self.outstanding();
            show_quantity(panel, &task.receive_bin.tag, outstanding)?;
            debug!(%tag, outstanding, "source bin confirmed");
            return Ok(PressOutcome::Confirmed {
                tag: tag.clone(),
                outstanding,
            });
        }

        if *tag == task.receive_bin.tag {
            if !self.remaining.is_empty() {
                let remaining = self.remaining.len();
                return Ok(self.ignore(tag, IgnoredPress::ReceivePending { remaining }));
            }
            self.clear_footprint(panel)?;
            self.state = PickState::Complete;
            return Ok(PressOutcome::Completed);
        }

        let reason = if self.confirmed.iter().any(|bin| &bin.tag == tag) {
            IgnoredPress::AlreadyConfirmed
        } else {
            IgnoredPress::NotInTask
        };
        Ok(self.ignore(tag, reason))
    }

    fn ignore(&mut self, tag: &BinTag, reason: IgnoredPress) -> PressOutcome {
        self.unexpected += 1;
        warn!(%tag, ?reason, task_id = self.task.task_id, "unexpected press ignored");
        PressOutcome::Ignored(reason)
    }

    fn clear_footprint<P: Panel + ?Sized>(&self, panel: &mut P) -> Result<()> {
        for bin in &self.confirmed {
            panel.send_layout(DisplayTarget::from(&bin.tag), Layout::EMPTY)?;
        }
        panel.send_layout(
            DisplayTarget::from(&self.task.receive_bin.tag),
            Layout::EMPTY,
        )
    }
}

fn show_quantity<P: Panel + ?Sized>(panel: &mut P, tag: &BinTag, quantity: u32) -> Result<()> {
    let layout = encode(quantity).with_context(|| format!("cannot show quantity on {tag}"))?;
    panel.send_layout(DisplayTarget::from(tag), layout)
}

/// Drive one task from first light to completion.
///
/// Blocks on the panel until the task completes. `stop_requested` is polled
/// whenever the panel hands back control; a `true` aborts with [`Interrupted`].
pub fn run_pick_path<P: Panel + ?Sized>(
    task: &PickTask,
    panel: &mut P,
    stop_requested: &dyn Fn() -> bool,
) -> Result<PickSummary> {
    let mut path = PickPath::new(task);
    info!(
        task_id = task.task_id,
        order_id = task.order_id,
        rack = %task.rack,
        bins = task.source_bins.len(),
        items = task.total_items(),
        "presenting task"
    );
    path.light_all(panel)?;

    while path.state() == PickState::AwaitingInputs {
        if stop_requested() {
            return Err(Interrupted.into());
        }
        let Some(tag) = panel.await_press()? else {
            continue;
        };
        if path.handle_press(&tag, panel)? == PressOutcome::Completed {
            info!(
                task_id = task.task_id,
                order_id = task.order_id,
                "task complete"
            );
        }
    }
    Ok(path.summary())
}
