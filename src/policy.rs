//! Ordering policy - how levels compare on each side.
//!
//! The book never looks inside a level. Sorting and every search go
//! through a [`BookPolicy`], which decides what "closer to the top of
//! the book" means for a side. A level type may be its own policy (the
//! default type parameter of the books), or a separate zero-sized type
//! can carry the ordering.

use std::marker::PhantomData;

use crate::side::Side;

/// Comparison contract between a book and its level type.
///
/// All three predicates must describe the same strict weak ordering.
/// Searching a side that is not sorted by that ordering gives an
/// unspecified (but memory-safe) answer.
pub trait BookPolicy<L> {
    /// Raw search key, compared against stored levels without building a level.
    type Key: ?Sized;

    /// `lhs` is closer to the top of the book than `rhs` on `side`.
    fn better(side: Side, lhs: &L, rhs: &L) -> bool;

    /// `key` is closer to the top of the book than `level` on `side`.
    fn key_better(side: Side, key: &Self::Key, level: &L) -> bool;

    /// `level` is closer to the top of the book than `key` on `side`.
    fn level_better(side: Side, level: &L, key: &Self::Key) -> bool;
}

/// A level priced in integer ticks.
pub trait Ticked {
    /// Price of the level in ticks.
    fn ticks(&self) -> i64;
}

/// Price-priority policy for [`Ticked`] levels.
///
/// Higher ticks win on the bid side, lower ticks win on the ask side. The
/// search key is a tick count.
pub struct TickPolicy<L>(PhantomData<fn(&L)>);

impl<L: Ticked> TickPolicy<L> {
    #[inline]
    fn ticks_better(side: Side, lhs: i64, rhs: i64) -> bool {
        match side {
            Side::Bid => lhs > rhs,
            Side::Ask => lhs < rhs,
        }
    }
}

impl<L: Ticked> BookPolicy<L> for TickPolicy<L> {
    type Key = i64;

    #[inline]
    fn better(side: Side, lhs: &L, rhs: &L) -> bool {
        Self::ticks_better(side, lhs.ticks(), rhs.ticks())
    }

    #[inline]
    fn key_better(side: Side, key: &i64, level: &L) -> bool {
        Self::ticks_better(side, *key, level.ticks())
    }

    #[inline]
    fn level_better(side: Side, level: &L, key: &i64) -> bool {
        Self::ticks_better(side, level.ticks(), *key)
    }
}
