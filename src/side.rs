//! Book side selector.
//!
//! A side carries no runtime state of its own; it only picks which half
//! of the order table (and which size counter) an operation works on.

use serde::{Deserialize, Serialize};

/// Book side (bid = buy, ask = sell)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    Bid = 0,
    /// Sell side (asks)
    Ask = 1,
}

impl Side {
    /// Both sides, bid first (the order of the order-table halves)
    pub const BOTH: [Side; 2] = [Side::Bid, Side::Ask];

    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    /// Position of this side's half in the order table (0 or 1)
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}
