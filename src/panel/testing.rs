use anyhow::{anyhow, Result};
use std::collections::VecDeque;

use super::{DisplayTarget, Panel, PanelEvent};
use crate::display::Layout;
use crate::mirror::RackMirror;
use crate::task::BinTag;

/// In-memory panel that replays a fixed press script and records every command.
///
/// `None` entries stand for datagrams that were not presses. Once the script
/// runs out, `await_press` errors so a stuck loop fails instead of hanging.
#[derive(Default)]
pub(crate) struct ScriptedPanel {
    script: VecDeque<Option<BinTag>>,
    pub(crate) sent: Vec<(DisplayTarget, Layout)>,
    pub(crate) presses_served: usize,
    pub(crate) mirror: RackMirror,
    fail_sends_after: Option<usize>,
}

impl ScriptedPanel {
    pub(crate) fn with_presses(presses: &[&str]) -> Self {
        let script = presses
            .iter()
            .map(|raw| Some(BinTag::parse(raw).expect("scripted tag")))
            .collect();
        Self {
            script,
            ..Self::default()
        }
    }

    pub(crate) fn push_noise(&mut self) {
        self.script.push_back(None);
    }

    pub(crate) fn push_press(&mut self, raw: &str) {
        self.script
            .push_back(Some(BinTag::parse(raw).expect("scripted tag")));
    }

    pub(crate) fn fail_sends_after(&mut self, sends: usize) {
        self.fail_sends_after = Some(sends);
    }

    pub(crate) fn remaining_script(&self) -> usize {
        self.script.len()
    }

    pub(crate) fn quantity(&self, raw: &str) -> Option<u32> {
        self.mirror.quantity_of(&tag(raw))
    }

    pub(crate) fn layout(&self, raw: &str) -> Option<Layout> {
        self.mirror.layout_of(&tag(raw))
    }

    pub(crate) fn resets(&self) -> usize {
        self.sent
            .iter()
            .filter(|(target, layout)| *target == DisplayTarget::All && layout.is_empty())
            .count()
    }
}

impl Panel for ScriptedPanel {
    fn send_layout(&mut self, target: DisplayTarget, layout: Layout) -> Result<()> {
        if let Some(limit) = self.fail_sends_after {
            if self.sent.len() >= limit {
                return Err(anyhow!("scripted send failure"));
            }
        }
        self.mirror.apply(&PanelEvent::Layout {
            target: target.clone(),
            layout,
        });
        self.sent.push((target, layout));
        Ok(())
    }

    fn await_press(&mut self) -> Result<Option<BinTag>> {
        let next = self
            .script
            .pop_front()
            .ok_or_else(|| anyhow!("press script exhausted"))?;
        self.presses_served += 1;
        Ok(next)
    }
}

pub(crate) fn tag(raw: &str) -> BinTag {
    BinTag::parse(raw).expect("valid tag")
}
