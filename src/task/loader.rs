use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::{BinTag, PickTask, ReceiveBin, SourceBin, TaskSequence};

#[derive(Debug, Deserialize)]
struct TaskDocument {
    tasks: Vec<TaskDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDefinition {
    task_id: u32,
    #[serde(default)]
    is_training_task: bool,
    orders: Vec<OrderDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDefinition {
    order_id: u32,
    receiving_bin_tag: BinTag,
    source_bins: Vec<SourceBinDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceBinDefinition {
    bin_tag: BinTag,
    num_items: u32,
}

/// Read a task document from disk and build the run's sequence.
pub fn load_task_file(path: &Path) -> Result<TaskSequence> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read task file {}", path.display()))?;
    parse_task_document(&raw).with_context(|| format!("invalid task file {}", path.display()))
}

/// Build a sequence from the JSON text of a task document.
///
/// Each order becomes one task per rack its source bins live on; racks the
/// order does not touch produce nothing.
pub fn parse_task_document(raw: &str) -> Result<TaskSequence> {
    let document: TaskDocument = serde_json::from_str(raw).context("malformed task document")?;
    let mut sequence = TaskSequence::default();
    for definition in document.tasks {
        let mut split = Vec::new();
        for order in definition.orders {
            if order.source_bins.is_empty() {
                bail!(
                    "order {} of task {} has no source bins",
                    order.order_id,
                    definition.task_id
                );
            }
            split.extend(split_order_by_rack(
                definition.task_id,
                definition.is_training_task,
                order,
            )?);
        }
        debug!(
            task_id = definition.task_id,
            rack_tasks = split.len(),
            "task definition split by rack"
        );
        sequence.extend_grouped_by_rack(split);
    }
    Ok(sequence)
}

fn split_order_by_rack(
    task_id: u32,
    training: bool,
    order: OrderDefinition,
) -> Result<Vec<PickTask>> {
    let mut by_rack: BTreeMap<char, Vec<SourceBin>> = BTreeMap::new();
    for bin in order.source_bins {
        by_rack.entry(bin.bin_tag.rack()).or_default().push(SourceBin {
            tag: bin.bin_tag,
            count: bin.num_items,
        });
    }
    let mut tasks = Vec::with_capacity(by_rack.len());
    for (rack, source_bins) in by_rack {
        let Some(expected_count) = source_bins
            .iter()
            .try_fold(0u32, |total, bin| total.checked_add(bin.count))
        else {
            bail!(
                "order {} of task {} has too many items on rack {rack}",
                order.order_id,
                task_id
            );
        };
        tasks.push(PickTask {
            task_id,
            order_id: order.order_id,
            rack,
            training,
            source_bins,
            receive_bin: ReceiveBin {
                tag: order.receiving_bin_tag.clone(),
                expected_count,
            },
        });
    }
    Ok(tasks)
}
