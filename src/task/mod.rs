//! Pick task records and the ordered sequence the session runs through.

mod loader;
#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use loader::{load_task_file, parse_task_document};

/// Rack letters the lamp hub reports presses for. `C` holds the receive carts.
pub const RACK_LETTERS: &str = "ABC";

/// Identifier of a physical bin: one rack letter followed by two digits (`A32`, `C11`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BinTag(String);

impl BinTag {
    pub fn parse(raw: &str) -> Result<Self, BinTagError> {
        let bytes = raw.as_bytes();
        let valid = bytes.len() == 3
            && RACK_LETTERS.as_bytes().contains(&bytes[0])
            && bytes[1].is_ascii_digit()
            && bytes[2].is_ascii_digit();
        if valid {
            Ok(BinTag(raw.to_string()))
        } else {
            Err(BinTagError {
                raw: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rack letter the bin belongs to.
    pub fn rack(&self) -> char {
        // validated ASCII, first byte is the rack letter
        char::from(self.0.as_bytes()[0])
    }
}

impl fmt::Display for BinTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BinTag {
    type Error = BinTagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BinTag::parse(&value)
    }
}

impl From<BinTag> for String {
    fn from(tag: BinTag) -> Self {
        tag.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinTagError {
    raw: String,
}

impl fmt::Display for BinTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid bin tag {:?}: expected one of racks {RACK_LETTERS} followed by two digits",
            self.raw
        )
    }
}

impl std::error::Error for BinTagError {}

/// Storage bin the operator picks from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBin {
    pub tag: BinTag,
    pub count: u32,
}

/// Cart bin the picked items go into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiveBin {
    pub tag: BinTag,
    pub expected_count: u32,
}

/// One order's share of a single rack.
///
/// `receive_bin.expected_count` equals the sum of the source counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickTask {
    pub task_id: u32,
    pub order_id: u32,
    pub rack: char,
    pub training: bool,
    pub source_bins: Vec<SourceBin>,
    pub receive_bin: ReceiveBin,
}

impl PickTask {
    pub fn total_items(&self) -> u32 {
        self.source_bins
            .iter()
            .fold(0u32, |total, bin| total.saturating_add(bin.count))
    }
}

impl fmt::Display for PickTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {} order {} rack {}: {} bins -> {}",
            self.task_id,
            self.order_id,
            self.rack,
            self.source_bins.len(),
            self.receive_bin.tag
        )
    }
}

/// Tasks in the order the operator works them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSequence {
    tasks: Vec<PickTask>,
}

impl TaskSequence {
    pub fn new(tasks: Vec<PickTask>) -> Self {
        Self { tasks }
    }

    /// Stable-sort one task definition's split tasks so each rack's tasks are
    /// contiguous, then append them.
    pub fn extend_grouped_by_rack(&mut self, mut tasks: Vec<PickTask>) {
        tasks.sort_by_key(|task| task.rack);
        self.tasks.extend(tasks);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn first(&self) -> Option<&PickTask> {
        self.tasks.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PickTask> {
        self.tasks.iter()
    }

    /// Render a plain-text pick list, one block per task.
    pub fn render_pick_list(&self) -> String {
        let mut out = String::new();
        for (index, task) in self.tasks.iter().enumerate() {
            let training = if task.training { " (training)" } else { "" };
            out.push_str(&format!(
                "#{:<3} task {} order {} rack {}{training}\n",
                index + 1,
                task.task_id,
                task.order_id,
                task.rack
            ));
            for bin in &task.source_bins {
                out.push_str(&format!("     {} x{}\n", bin.tag, bin.count));
            }
            out.push_str(&format!(
                "  -> {} ({} items)\n",
                task.receive_bin.tag, task.receive_bin.expected_count
            ));
        }
        out
    }
}

impl<'a> IntoIterator for &'a TaskSequence {
    type Item = &'a PickTask;
    type IntoIter = std::slice::Iter<'a, PickTask>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
