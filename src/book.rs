//! Indexed Book - the free-list, remove-capable two-sided container.
//!
//! Three borrowed tables, all `2 * capacity` long:
//!
//! ```text
//! levels: [L0 L1 L2 L3 L4 L5]        arena, addressed by slot
//! sides:  [b0 b1 b2 | a0 a1 a2]      slot of each position, bids then asks
//! free:   [f0 f1 ..]  <- tail        stack of unused slots
//! ```
//!
//! Insert pops a slot and appends its index to a side; remove pushes the
//! slot back and closes the gap in the side's order. Sorting permutes the
//! order entries only. Levels are written once per insert and never moved.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::arena::FreeList;
use crate::config::{validate_capacity, CapacityMode, SlotIndex, NPOS};
use crate::error::Result;
use crate::policy::BookPolicy;
use crate::search;
use crate::side::Side;
use crate::view::{BookView, Depth, Iter};

/// Bounded two-sided book with slot reuse.
///
/// At most `capacity` (≤ 127) levels per side. Positions and slots are
/// [`SlotIndex`] values; [`NPOS`] reports a declined insert or a failed
/// search.
pub struct IndexedBook<'a, L, P = L> {
    levels: &'a mut [L],
    sides: &'a mut [SlotIndex],
    free: FreeList<'a>,
    capacity: SlotIndex,
    len: [SlotIndex; 2],
    _policy: PhantomData<fn() -> P>,
}

impl<'a, L, P> IndexedBook<'a, L, P> {
    /// Create an empty book over caller-owned tables.
    ///
    /// # Errors
    /// [`BookError::BadCapacity`](crate::BookError::BadCapacity) if
    /// `capacity` is outside `0..=127`.
    ///
    /// # Panics
    /// Panics if any table is shorter than `2 * capacity`.
    pub fn new(
        levels: &'a mut [L],
        sides: &'a mut [SlotIndex],
        free: &'a mut [SlotIndex],
        capacity: i64,
    ) -> Result<Self> {
        Self::with_mode(levels, sides, free, capacity, CapacityMode::Strict)
    }

    /// Like [`new`](Self::new), with an explicit policy for a bad capacity.
    ///
    /// With [`CapacityMode::Clamp`] this never fails.
    pub fn with_mode(
        levels: &'a mut [L],
        sides: &'a mut [SlotIndex],
        free: &'a mut [SlotIndex],
        capacity: i64,
        mode: CapacityMode,
    ) -> Result<Self> {
        let capacity = validate_capacity(capacity, mode)?;
        Ok(Self::from_tables(levels, sides, free, capacity))
    }

    /// Open a book over tables already holding `bid` and `ask` levels.
    ///
    /// The first `bid` bid entries and `ask` ask entries of `sides` are
    /// taken as live; the free table is rebuilt from the remaining slots.
    ///
    /// # Panics
    /// See [`accept`](Self::accept).
    pub fn restore(
        levels: &'a mut [L],
        sides: &'a mut [SlotIndex],
        free: &'a mut [SlotIndex],
        capacity: i64,
        bid: SlotIndex,
        ask: SlotIndex,
    ) -> Result<Self> {
        let mut book = Self::new(levels, sides, free, capacity)?;
        book.accept(bid, ask);
        Ok(book)
    }

    /// Like [`restore`](Self::restore), with an explicit policy for a bad capacity.
    ///
    /// A clamped book has capacity 0, so the counts must then be 0.
    pub fn restore_with_mode(
        levels: &'a mut [L],
        sides: &'a mut [SlotIndex],
        free: &'a mut [SlotIndex],
        capacity: i64,
        mode: CapacityMode,
        bid: SlotIndex,
        ask: SlotIndex,
    ) -> Result<Self> {
        let mut book = Self::with_mode(levels, sides, free, capacity, mode)?;
        book.accept(bid, ask);
        Ok(book)
    }

    pub(crate) fn from_tables(
        levels: &'a mut [L],
        sides: &'a mut [SlotIndex],
        free: &'a mut [SlotIndex],
        capacity: SlotIndex,
    ) -> Self {
        let slots = capacity as usize * 2;
        assert!(levels.len() >= slots, "levels table shorter than 2 * capacity");
        assert!(sides.len() >= slots, "sides table shorter than 2 * capacity");
        assert!(free.len() >= slots, "free table shorter than 2 * capacity");

        let mut book = Self {
            levels,
            sides,
            free: FreeList::new(free),
            capacity,
            len: [0, 0],
            _policy: PhantomData,
        };
        book.reset();
        book
    }

    // ========================================================================
    // Initialisation
    // ========================================================================

    /// Empty both sides and mark every slot free.
    ///
    /// Stored levels are left in place until overwritten.
    pub fn reset(&mut self) {
        self.free.reset(self.slots());
        self.len = [0, 0];
    }

    /// Same as [`reset`](Self::reset).
    pub fn clear(&mut self) {
        self.reset();
    }

    /// Adopt order entries written by someone else.
    ///
    /// Sets the side sizes to `bid` and `ask` and rebuilds the free stack
    /// so it holds exactly the slots not referenced by those entries.
    ///
    /// # Panics
    /// Panics if a count exceeds the capacity, or if a live order entry
    /// is outside the arena or duplicated.
    pub fn accept(&mut self, bid: SlotIndex, ask: SlotIndex) {
        assert!(
            bid <= self.capacity && ask <= self.capacity,
            "accepted sizes {bid}/{ask} exceed capacity {}",
            self.capacity
        );
        let cap = self.capacity as usize;
        let taken = self.sides[..bid as usize]
            .iter()
            .chain(&self.sides[cap..cap + ask as usize])
            .copied();
        self.free.accept(cap * 2, taken);
        self.len = [bid, ask];
        debug!(bid, ask, free = self.free.len(), "book tables accepted");
        self.check_accounting();
    }

    // ========================================================================
    // Capacity Queries
    // ========================================================================

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

    /// Number of unused slots across both sides
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    #[inline]
    fn slots(&self) -> usize {
        self.capacity as usize * 2
    }

    #[inline]
    fn check_accounting(&self) {
        debug_assert_eq!(
            self.len[0] as usize + self.len[1] as usize + self.free.len(),
            self.slots(),
            "slot accounting out of balance"
        );
    }

    // ========================================================================
    // Insertion & Removal
    // ========================================================================

    /// Append `level` to the end of `side`.
    ///
    /// # Returns
    /// The new position (the old size), or `NPOS` if the side is full.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn push(&mut self, side: Side, level: L) -> SlotIndex {
        self.emplace(side, || level)
    }

    /// Append a level built by `make`, which runs only if there is room.
    ///
    /// The previous occupant of the claimed slot is dropped in place.
    ///
    /// # Complexity
    /// O(1)
    pub fn emplace(&mut self, side: Side, make: impl FnOnce() -> L) -> SlotIndex {
        self.check_accounting();
        let pos = self.len[side.index()];
        // A side below capacity implies a free slot while the accounting holds
        if pos >= self.capacity || self.free.len() == 0 {
            return NPOS;
        }
        // Build first: a panicking `make` must not leak the slot
        let level = make();
        let Some(slot) = self.free.pop() else {
            return NPOS;
        };

        self.levels[slot as usize] = level;
        self.sides[side.index() * self.capacity as usize + pos as usize] = slot;
        self.len[side.index()] = pos + 1;
        pos
    }

    /// Remove position `i` of `side`, returning its slot to the free stack.
    ///
    /// Later positions on the same side shift down by one. The level
    /// stays in its slot until a later insert reuses it.
    ///
    /// # Panics
    /// Panics if `i >= size(side)`.
    ///
    /// # Complexity
    /// O(size(side) - i)
    pub fn remove(&mut self, side: Side, i: SlotIndex) {
        self.check_accounting();
        let len = self.len[side.index()] as usize;
        let i = i as usize;
        assert!(i < len, "position {i} out of range on {side:?} (size {len})");

        let begin = side.index() * self.capacity as usize;
        self.free.push(self.sides[begin + i]);
        self.sides.copy_within(begin + i + 1..begin + len, begin + i);
        self.len[side.index()] -= 1;
    }

    /// Remove position `i` of `side` and hand back its level.
    ///
    /// The slot is left holding `L::default()`.
    ///
    /// # Panics
    /// Panics if `i >= size(side)`.
    pub fn take(&mut self, side: Side, i: SlotIndex) -> L
    where
        L: Default,
    {
        let slot = self.slot_of(side, i);
        let level = std::mem::take(&mut self.levels[slot as usize]);
        self.remove(side, i);
        level
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Read-only view sharing this book's tables.
    #[inline]
    pub fn view(&self) -> BookView<'_, L, P> {
        BookView::from_parts(&*self.levels, &*self.sides, self.capacity, self.len)
    }

    /// Level at position `i` of `side`.
    ///
    /// # Panics
    /// Panics if `i >= size(side)`.
    #[inline]
    pub fn at(&self, side: Side, i: SlotIndex) -> &L {
        self.view().at(side, i)
    }

    /// Mutable level at position `i` of `side`.
    ///
    /// Changing what the policy compares leaves the side unsorted.
    ///
    /// # Panics
    /// Panics if `i >= size(side)`.
    #[inline]
    pub fn at_mut(&mut self, side: Side, i: SlotIndex) -> &mut L {
        let slot = self.slot_of(side, i);
        &mut self.levels[slot as usize]
    }

    /// Arena slot holding position `i` of `side`.
    #[inline]
    pub fn slot_of(&self, side: Side, i: SlotIndex) -> SlotIndex {
        self.view().slot_of(side, i)
    }

    pub fn iter(&self, side: Side) -> Iter<'_, L> {
        self.view().iter(side)
    }

    /// First `n` levels of `side`.
    pub fn top(&self, side: Side, n: usize) -> Depth<'_, L> {
        self.view().top(side, n)
    }
}

impl<'a, L, P: BookPolicy<L>> IndexedBook<'a, L, P> {
    // ========================================================================
    // Ordering & Search
    // ========================================================================

    /// Order `side` best first according to the policy.
    ///
    /// Only order entries move; references taken before the sort still
    /// point at the same levels.
    pub fn sort(&mut self, side: Side) {
        let begin = side.index() * self.capacity as usize;
        let end = begin + self.len[side.index()] as usize;
        search::sort::<L, P>(&*self.levels, &mut self.sides[begin..end], side);
    }

    pub fn is_sorted(&self, side: Side) -> bool {
        self.view().is_sorted(side)
    }

    /// See [`BookView::binary_search`].
    #[inline]
    pub fn binary_search(&self, side: Side, key: &P::Key) -> SlotIndex {
        self.view().binary_search(side, key)
    }

    /// See [`BookView::lower_bound`].
    #[inline]
    pub fn lower_bound(&self, side: Side, key: &P::Key) -> SlotIndex {
        self.view().lower_bound(side, key)
    }

    /// See [`BookView::upper_bound`].
    #[inline]
    pub fn upper_bound(&self, side: Side, key: &P::Key) -> SlotIndex {
        self.view().upper_bound(side, key)
    }

    /// See [`BookView::equal_range`].
    #[inline]
    pub fn equal_range(&self, side: Side, key: &P::Key) -> (SlotIndex, SlotIndex) {
        self.view().equal_range(side, key)
    }
}

impl<L: fmt::Debug, P> fmt::Debug for IndexedBook<'_, L, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedBook")
            .field("capacity", &self.capacity)
            .field("bids", &self.iter(Side::Bid).collect::<Vec<_>>())
            .field("asks", &self.iter(Side::Ask).collect::<Vec<_>>())
            .field("free", &self.free)
            .finish()
    }
}
