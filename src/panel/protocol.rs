//! xPL wire format for the lamp hub.

use regex::bytes::Regex;
use std::sync::OnceLock;

use super::DisplayTarget;
use crate::display::Layout;
use crate::task::{BinTag, RACK_LETTERS};

const SOURCE: &str = "bnz-sender.orderpick";
const TARGET_PREFIX: &str = "smgpoe-lamp.";

/// Classification of one inbound datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Heartbeat,
    Press(BinTag),
    Unrecognized,
}

/// Render the `control.basic` command that sets one display (or all, for `*`).
pub fn format_command(target: &DisplayTarget, layout: Layout) -> String {
    format!(
        "xpl-cmnd\n{{\nhop=1\nsource={SOURCE}\ntarget={TARGET_PREFIX}{target}\n}}\n\
         control.basic\n{{\ndevice=display\ntype=variable\ncurrent={layout}\n}}\n"
    )
}

fn heartbeat_regex() -> &'static Regex {
    static HEARTBEAT: OnceLock<Regex> = OnceLock::new();
    HEARTBEAT.get_or_init(|| Regex::new("hbeat").expect("heartbeat regex should compile"))
}

fn active_regex() -> &'static Regex {
    static ACTIVE: OnceLock<Regex> = OnceLock::new();
    ACTIVE.get_or_init(|| Regex::new("HIGH").expect("active marker regex should compile"))
}

/// Bin tag token, ASCII digits only.
fn press_tag_regex() -> &'static Regex {
    static PRESS_TAG: OnceLock<Regex> = OnceLock::new();
    PRESS_TAG.get_or_init(|| {
        Regex::new(&format!("(?-u:[{RACK_LETTERS}][0-9]{{2}})"))
            .expect("press tag regex should compile")
    })
}

/// Decide whether a datagram is a button press, and for which bin.
///
/// The first tag-shaped token in an active message wins.
pub fn classify_datagram(payload: &[u8]) -> Inbound {
    if payload.is_empty() {
        return Inbound::Unrecognized;
    }
    if heartbeat_regex().is_match(payload) {
        return Inbound::Heartbeat;
    }
    if !active_regex().is_match(payload) {
        return Inbound::Unrecognized;
    }
    let Some(found) = press_tag_regex().find(payload) else {
        return Inbound::Unrecognized;
    };
    match std::str::from_utf8(found.as_bytes())
        .ok()
        .and_then(|raw| BinTag::parse(raw).ok())
    {
        Some(tag) => Inbound::Press(tag),
        None => Inbound::Unrecognized,
    }
}
