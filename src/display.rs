//! Seven-segment layout encoding for the two-digit bin indicators.
//!
//! The lamp firmware takes a raw 16-bit segment mask: the low byte drives the
//! right (ones) digit and the high byte drives the left (tens) digit. Bit 7 of
//! each byte is that digit's decimal point.

use serde::Serialize;
use std::fmt;

/// Largest quantity a two-digit indicator can show.
pub const MAX_QUANTITY: u32 = 99;

/// Segment masks for the right digit, indexed by digit value.
const ONES_SEGMENTS: [u16; 10] = [63, 6, 91, 79, 102, 109, 125, 7, 127, 111];

/// Segment masks for the left digit. Same glyphs as [`ONES_SEGMENTS`], shifted
/// into the high byte so both can be OR-ed into one layout.
const TENS_SEGMENTS: [u16; 10] = [
    16128, 1536, 23296, 20224, 26112, 27904, 32000, 1792, 32512, 28416,
];

/// Raw segment mask sent to an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Layout(u16);

impl Layout {
    /// All segments off.
    pub const EMPTY: Layout = Layout(0);
    /// Both decimal points lit; shown on a receive bin before the run starts.
    pub const READY: Layout = Layout(0x8080);

    /// Wrap a raw mask without interpreting it.
    pub const fn raw(bits: u16) -> Self {
        Layout(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quantity that cannot be shown on a two-digit indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    OutOfRange { quantity: u32 },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::OutOfRange { quantity } => write!(
                f,
                "quantity {quantity} does not fit a two-digit display (max {MAX_QUANTITY})"
            ),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Encode a quantity as the segment layout that shows it.
///
/// A leading zero is never drawn: `7` lights only the right digit.
pub fn encode(quantity: u32) -> Result<Layout, EncodeError> {
    if quantity > MAX_QUANTITY {
        return Err(EncodeError::OutOfRange { quantity });
    }
    let ones = (quantity % 10) as usize;
    let tens = ((quantity / 10) % 10) as usize;
    let mut bits = ONES_SEGMENTS[ones];
    if tens != 0 {
        bits |= TENS_SEGMENTS[tens];
    }
    Ok(Layout(bits))
}

/// Digit pair read back from a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digits {
    pub tens: u8,
    pub ones: u8,
}

impl Digits {
    pub fn quantity(self) -> u32 {
        u32::from(self.tens) * 10 + u32::from(self.ones)
    }
}

/// Inverse of [`encode`]. Returns `None` for blank, reserved, or non-digit layouts.
pub fn decode(layout: Layout) -> Option<Digits> {
    let low = layout.0 & 0x00ff;
    let high = layout.0 & 0xff00;
    let ones = ONES_SEGMENTS.iter().position(|&mask| mask == low)?;
    let tens = if high == 0 {
        0
    } else {
        match TENS_SEGMENTS.iter().position(|&mask| mask == high)? {
            // a drawn leading zero is never produced by encode
            0 => return None,
            digit => digit,
        }
    };
    Some(Digits {
        tens: tens as u8,
        ones: ones as u8,
    })
}
