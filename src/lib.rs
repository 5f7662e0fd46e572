//! # Slot-Book
//!
//! A fixed-capacity, two-sided order book container whose levels never move.
//!
//! ## Design Principles
//!
//! - **Bounded**: At most 127 levels per side, fixed at construction
//! - **Stable Slots**: A level stays in its arena slot for its whole life;
//!   references survive inserts, sorts and removal of other levels
//! - **Byte Indices**: Arena slots and positions are `u8`, `255` is `NPOS`
//! - **Borrowed Tables**: The caller owns the storage (stack, heap, static
//!   or shared memory); [`BookData`] is a ready-made owner
//!
//! ## Architecture
//!
//! ```text
//!  push/emplace ─┐                 ┌─ sort (moves indices only)
//!                ▼                 ▼
//!   [free stack] ──slot──> [order table: bids | asks] ──slot──> [levels]
//!                ▲                 │
//!  remove ───────┘                 └─ binary_search / lower_bound /
//!                                     upper_bound / equal_range
//! ```
//!
//! ## Example
//!
//! ```
//! use slot_book::{BookData, IndexedBook, Side, TickPolicy, Ticked, NPOS};
//!
//! #[derive(Debug, Default, Clone, Copy, PartialEq)]
//! struct Level { ticks: i64, size: i64 }
//!
//! impl Ticked for Level {
//!     fn ticks(&self) -> i64 { self.ticks }
//! }
//!
//! let mut data = BookData::<Level, 3>::new();
//! let mut book: IndexedBook<Level, TickPolicy<Level>> = data.book();
//!
//! assert_eq!(book.push(Side::Bid, Level { ticks: 120120, size: 100 }), 0);
//! assert_eq!(book.push(Side::Bid, Level { ticks: 120123, size: 400 }), 1);
//! book.sort(Side::Bid);
//! assert_eq!(book.at(Side::Bid, 0).ticks, 120123);
//! assert_eq!(book.lower_bound(Side::Bid, &120121), 1);
//! assert_eq!(book.binary_search(Side::Bid, &120121), NPOS);
//! ```

pub mod append;
pub mod arena;
pub mod book;
pub mod config;
pub mod error;
pub mod policy;
mod search;
pub mod side;
pub mod view;

// Re-exports for convenience
pub use append::AppendBook;
pub use arena::BookData;
pub use book::IndexedBook;
pub use config::{
    validate_capacity, BookConfig, CapacityMode, SlotIndex, MAX_CAPACITY, MAX_SLOTS, NPOS,
};
pub use error::{BookError, Result};
pub use policy::{BookPolicy, TickPolicy, Ticked};
pub use side::Side;
pub use view::{BookView, Depth, Iter};
