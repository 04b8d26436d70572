//! Text mirror of what every indicator on the rack currently shows.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::display::{decode, Layout};
use crate::panel::{DisplayTarget, PanelEvent, PanelObserver};
use crate::task::BinTag;

/// Physical arrangement of the lab rack: racks A and B side by side, receive carts to the right.
#[rustfmt::skip]
const RACK_GRID: [[Option<&str>; 11]; 4] = [
    [
        Some("A11"), Some("A12"), Some("A13"), None,
        Some("B11"), Some("B12"), Some("B13"), None,
        None, None, None,
    ],
    [
        Some("A21"), Some("A22"), Some("A23"), None,
        Some("B21"), Some("B22"), Some("B23"), None,
        Some("C11"), Some("C12"), Some("C13"),
    ],
    [
        Some("A31"), Some("A32"), Some("A33"), None,
        Some("B31"), Some("B32"), Some("B33"), None,
        None, None, None,
    ],
    [
        Some("A41"), Some("A42"), Some("A43"), None,
        Some("B41"), Some("B42"), Some("B43"), None,
        None, None, None,
    ],
];

/// Tracks the last layout sent to each bin.
#[derive(Debug, Default, Clone)]
pub struct RackMirror {
    lit: BTreeMap<BinTag, Layout>,
    echo: bool,
}

impl RackMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror that also prints the grid to stderr after every command.
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, event: &PanelEvent) {
        let PanelEvent::Layout { target, layout } = event else {
            return;
        };
        match target {
            DisplayTarget::All if layout.is_empty() => self.lit.clear(),
            DisplayTarget::All => {
                let tags: Vec<BinTag> = grid_tags().collect();
                for tag in tags {
                    self.lit.insert(tag, *layout);
                }
            }
            DisplayTarget::Bin(tag) if layout.is_empty() => {
                self.lit.remove(tag);
            }
            DisplayTarget::Bin(tag) => {
                self.lit.insert(tag.clone(), *layout);
            }
        }
    }

    pub fn layout_of(&self, tag: &BinTag) -> Option<Layout> {
        self.lit.get(tag).copied()
    }

    /// Quantity a bin shows, if it shows a number at all.
    pub fn quantity_of(&self, tag: &BinTag) -> Option<u32> {
        self.layout_of(tag)
            .and_then(decode)
            .map(|digits| digits.quantity())
    }

    pub fn is_dark(&self) -> bool {
        self.lit.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in RACK_GRID.iter() {
            let mut line = String::new();
            for cell in row.iter() {
                match cell.and_then(|raw| BinTag::parse(raw).ok()) {
                    Some(tag) => line.push_str(&self.render_cell(&tag)),
                    None => line.push_str("     "),
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        let off_grid: Vec<String> = self
            .lit
            .keys()
            .filter(|tag| !grid_tags().any(|known| &known == *tag))
            .map(|tag| format!("{tag}={}", cell_value(self.lit[tag])))
            .collect();
        if !off_grid.is_empty() {
            out.push_str(&format!("other: {}\n", off_grid.join(" ")));
        }
        out
    }

    fn render_cell(&self, tag: &BinTag) -> String {
        match self.lit.get(tag) {
            Some(layout) => format!("[{}] ", cell_value(*layout)),
            None => format!(" {tag} "),
        }
    }
}

fn cell_value(layout: Layout) -> String {
    if layout == Layout::READY {
        return "..".to_string();
    }
    match decode(layout) {
        Some(digits) => format!("{:02}", digits.quantity()),
        None => "##".to_string(),
    }
}

fn grid_tags() -> impl Iterator<Item = BinTag> {
    RACK_GRID
        .iter()
        .flat_map(|row| row.iter())
        .filter_map(|cell| cell.and_then(|raw| BinTag::parse(raw).ok()))
}

impl PanelObserver for RackMirror {
    fn on_event(&mut self, event: &PanelEvent) {
        self.apply(event);
        if self.echo && matches!(event, PanelEvent::Layout { .. }) {
            let mut stderr = io::stderr().lock();
            let _ = writeln!(stderr, "{}", self.render());
        }
    }
}
