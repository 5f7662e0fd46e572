//! Read-only book over shared tables.
//!
//! A `BookView` is what the mutable books hand out for reading, and it can
//! also be built directly over table images written elsewhere (a restored
//! snapshot, a static table). It has no free list and offers no mutation.

use std::fmt;
use std::marker::PhantomData;

use arrayvec::ArrayVec;
use tracing::debug;

use crate::config::{validate_capacity, CapacityMode, SlotIndex, MAX_CAPACITY};
use crate::policy::BookPolicy;
use crate::search;
use crate::side::Side;

/// Levels of one side in presentation order, best first.
pub type Depth<'a, L> = ArrayVec<&'a L, { MAX_CAPACITY as usize }>;

/// Immutable two-sided book.
///
/// `levels` and `sides` must each hold at least `2 * capacity` entries;
/// bid positions live in `sides[..capacity]`, ask positions in
/// `sides[capacity..2 * capacity]`.
pub struct BookView<'a, L, P = L> {
    levels: &'a [L],
    sides: &'a [SlotIndex],
    capacity: SlotIndex,
    len: [SlotIndex; 2],
    _policy: PhantomData<fn() -> P>,
}

impl<L, P> Clone for BookView<'_, L, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L, P> Copy for BookView<'_, L, P> {}

impl<'a, L, P> BookView<'a, L, P> {
    /// Build a view over pre-populated tables holding `bid` and `ask` levels.
    ///
    /// An invalid capacity yields an empty zero-capacity view.
    ///
    /// # Panics
    /// Panics if a count exceeds the capacity, if a table is shorter than
    /// `2 * capacity`, or if a live order entry points outside the arena.
    pub fn new(
        levels: &'a [L],
        sides: &'a [SlotIndex],
        capacity: i64,
        bid: SlotIndex,
        ask: SlotIndex,
    ) -> Self {
        let capacity = validate_capacity(capacity, CapacityMode::Clamp).unwrap_or(0);
        let (bid, ask) = if capacity == 0 { (0, 0) } else { (bid, ask) };
        let slots = capacity as usize * 2;
        assert!(levels.len() >= slots, "levels table shorter than 2 * capacity");
        assert!(sides.len() >= slots, "sides table shorter than 2 * capacity");
        assert!(bid <= capacity && ask <= capacity, "side size exceeds capacity");
        let view = Self::from_parts(levels, sides, capacity, [bid, ask]);
        for side in Side::BOTH {
            assert!(
                view.order(side).iter().all(|&slot| (slot as usize) < view.slots()),
                "order entry outside the arena"
            );
        }
        debug!(capacity, bid, ask, "book view opened");
        view
    }

    /// Internal constructor; tables already validated by the owning book.
    pub(crate) fn from_parts(
        levels: &'a [L],
        sides: &'a [SlotIndex],
        capacity: SlotIndex,
        len: [SlotIndex; 2],
    ) -> Self {
        debug_assert!(len[0] <= capacity && len[1] <= capacity);
        Self {
            levels,
            sides,
            capacity,
            len,
            _policy: PhantomData,
        }
    }

    #[inline]
    fn slots(&self) -> usize {
        self.capacity as usize * 2
    }

    /// Live part of one side's order table.
    #[inline]
    pub(crate) fn order(&self, side: Side) -> &'a [SlotIndex] {
        let begin = side.index() * self.capacity as usize;
        &self.sides[begin..begin + self.len[side.index()] as usize]
    }

    /// Maximum number of levels per side
    #[inline]
    pub fn capacity(&self) -> SlotIndex {
        self.capacity
    }

    #[inline]
    pub fn size(&self, side: Side) -> SlotIndex {
        self.len[side.index()]
    }

    #[inline]
    pub fn is_empty(&self, side: Side) -> bool {
        self.len[side.index()] == 0
    }

    /// True when the side holds `capacity` levels (always true at capacity 0)
    #[inline]
    pub fn is_full(&self, side: Side) -> bool {
        self.len[side.index()] == self.capacity
    }

    /// Level at position `i` of `side`.
    ///
    /// # Panics
    /// Panics if `i >= size(side)`.
    #[inline]
    pub fn at(&self, side: Side, i: SlotIndex) -> &'a L {
        &self.levels[self.slot_of(side, i) as usize]
    }

    /// Arena slot holding position `i` of `side`.
    ///
    /// # Panics
    /// Panics if `i >= size(side)`.
    #[inline]
    pub fn slot_of(&self, side: Side, i: SlotIndex) -> SlotIndex {
        let order = self.order(side);
        assert!((i as usize) < order.len(), "position {i} out of range on {side:?}");
        order[i as usize]
    }

    /// Levels of `side` in presentation order.
    pub fn iter(&self, side: Side) -> Iter<'a, L> {
        Iter {
            levels: self.levels,
            order: self.order(side).iter(),
        }
    }

    /// First `n` levels of `side` (fewer if the side is shorter).
    pub fn top(&self, side: Side, n: usize) -> Depth<'a, L> {
        self.iter(side).take(n).collect()
    }
}

impl<'a, L, P: BookPolicy<L>> BookView<'a, L, P> {
    /// Position of a level comparing equal to `key`, or `NPOS`.
    ///
    /// With duplicates, any position of the equal run may be returned.
    pub fn binary_search(&self, side: Side, key: &P::Key) -> SlotIndex {
        search::binary_search::<L, P>(self.levels, self.order(side), side, key)
    }

    /// First position whose level is not better than `key`, or `NPOS` at the end.
    pub fn lower_bound(&self, side: Side, key: &P::Key) -> SlotIndex {
        search::lower_bound::<L, P>(self.levels, self.order(side), side, key)
    }

    /// First position `key` is better than, or `NPOS` at the end.
    pub fn upper_bound(&self, side: Side, key: &P::Key) -> SlotIndex {
        search::upper_bound::<L, P>(self.levels, self.order(side), side, key)
    }

    /// Positions spanning the levels equal to `key`; `(NPOS, NPOS)` when absent.
    pub fn equal_range(&self, side: Side, key: &P::Key) -> (SlotIndex, SlotIndex) {
        search::equal_range::<L, P>(self.levels, self.order(side), side, key)
    }

    pub fn is_sorted(&self, side: Side) -> bool {
        search::is_sorted::<L, P>(self.levels, self.order(side), side)
    }
}

/// Iterator over one side's levels, best first.
pub struct Iter<'a, L> {
    levels: &'a [L],
    order: std::slice::Iter<'a, SlotIndex>,
}

impl<'a, L> Iterator for Iter<'a, L> {
    type Item = &'a L;

    #[inline]
    fn next(&mut self) -> Option<&'a L> {
        let levels = self.levels;
        self.order.next().map(|&slot| &levels[slot as usize])
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<'a, L> DoubleEndedIterator for Iter<'a, L> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a L> {
        let levels = self.levels;
        self.order.next_back().map(|&slot| &levels[slot as usize])
    }
}

impl<L> ExactSizeIterator for Iter<'_, L> {}

impl<L: fmt::Debug, P> fmt::Debug for BookView<'_, L, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookView")
            .field("capacity", &self.capacity)
            .field("bids", &self.iter(Side::Bid).collect::<Vec<_>>())
            .field("asks", &self.iter(Side::Ask).collect::<Vec<_>>())
            .finish()
    }
}
