//! Passive consumers of the panel event stream (rack mirror, event log).

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

use super::{DisplayTarget, Panel};
use crate::display::Layout;
use crate::task::BinTag;

/// Something that happened on the panel.
///
/// Serialized with an `"event"` tag field for type discrimination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum PanelEvent {
    /// A command left for the hub
    #[serde(rename = "layout")]
    Layout { target: DisplayTarget, layout: Layout },

    /// A recognized button press
    #[serde(rename = "press")]
    Press { tag: BinTag },
}

pub trait PanelObserver {
    fn on_event(&mut self, event: &PanelEvent);
}

/// Panel decorator that reports every sent command and recognized press.
///
/// Observers see a command only after the transport accepted it.
pub struct ObservedPanel<P> {
    inner: P,
    observers: Vec<Box<dyn PanelObserver>>,
}

impl<P: Panel> ObservedPanel<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn PanelObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    fn notify(&mut self, event: PanelEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

impl<P: Panel> Panel for ObservedPanel<P> {
    fn send_layout(&mut self, target: DisplayTarget, layout: Layout) -> Result<()> {
        self.inner.send_layout(target.clone(), layout)?;
        self.notify(PanelEvent::Layout { target, layout });
        Ok(())
    }

    fn await_press(&mut self) -> Result<Option<BinTag>> {
        let press = self.inner.await_press()?;
        if let Some(tag) = &press {
            self.notify(PanelEvent::Press { tag: tag.clone() });
        }
        Ok(press)
    }
}

#[derive(Serialize)]
struct EventRecord<'a> {
    ts_ms: u64,
    #[serde(flatten)]
    event: &'a PanelEvent,
}

/// Appends panel events to a JSON-lines file.
pub struct EventLog<W: Write = BufWriter<File>> {
    writer: W,
    failed: bool,
}

impl EventLog {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open event log {}", path.display()))?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }
}

impl<W: Write> EventLog<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn into_writer(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &PanelEvent) -> Result<()> {
        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        let line = serde_json::to_string(&EventRecord { ts_ms, event })?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> PanelObserver for EventLog<W> {
    fn on_event(&mut self, event: &PanelEvent) {
        if self.failed {
            return;
        }
        if let Err(err) = self.write_event(event) {
            // one warning, then stay quiet; the run itself must not stop
            warn!("event log disabled after write failure: {err:#}");
            self.failed = true;
        }
    }
}
