//! Slot bookkeeping - the free stack and owned table storage.
//!
//! The arena itself is just a slice of levels addressed by [`SlotIndex`].
//! Which slots are unused is tracked by a [`FreeList`]: a stack of slot
//! indices living in a caller-provided table, popped on insert and pushed
//! on remove. Nothing here ever moves a level.

use std::fmt;

use crate::append::AppendBook;
use crate::book::IndexedBook;
use crate::config::{SlotIndex, MAX_CAPACITY, MAX_SLOTS, NPOS};
use crate::view::BookView;

/// Stack of unused arena slots.
///
/// `tail` is the index of the top entry, or [`NPOS`] when the stack is
/// empty. Incrementing `NPOS` wraps to 0, so `tail + 1` is always the
/// stack length.
pub(crate) struct FreeList<'a> {
    slots: &'a mut [SlotIndex],
    tail: SlotIndex,
}

impl<'a> FreeList<'a> {
    /// Wrap a table without touching its contents (stack starts empty).
    pub(crate) fn new(slots: &'a mut [SlotIndex]) -> Self {
        Self { slots, tail: NPOS }
    }

    /// Number of free slots
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.tail.wrapping_add(1) as usize
    }

    /// Mark every slot in `0..total` free.
    ///
    /// Slot `total - 1` ends up on top of the stack.
    pub(crate) fn reset(&mut self, total: usize) {
        debug_assert!(total <= MAX_SLOTS && total <= self.slots.len());
        for (i, slot) in self.slots[..total].iter_mut().enumerate() {
            *slot = i as SlotIndex;
        }
        self.tail = (total as SlotIndex).wrapping_sub(1);
    }

    /// Rebuild the stack from the slots in `0..total` not named by `taken`.
    ///
    /// # Panics
    /// Panics if a taken slot is out of range or appears twice.
    pub(crate) fn accept(&mut self, total: usize, taken: impl IntoIterator<Item = SlotIndex>) {
        debug_assert!(total <= MAX_SLOTS && total <= self.slots.len());
        let mut used = [false; MAX_SLOTS];
        for slot in taken {
            let i = slot as usize;
            assert!(i < total, "order entry {slot} outside the arena");
            assert!(!used[i], "slot {slot} appears twice in the order table");
            used[i] = true;
        }
        let mut n = 0;
        for i in (0..total).filter(|&i| !used[i]) {
            self.slots[n] = i as SlotIndex;
            n += 1;
        }
        self.tail = (n as SlotIndex).wrapping_sub(1);
    }

    /// Take a free slot (LIFO).
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub(crate) fn pop(&mut self) -> Option<SlotIndex> {
        if self.tail == NPOS {
            return None;
        }
        let slot = self.slots[self.tail as usize];
        self.tail = self.tail.wrapping_sub(1);
        Some(slot)
    }

    /// Return a slot to the stack.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub(crate) fn push(&mut self, slot: SlotIndex) {
        self.tail = self.tail.wrapping_add(1);
        debug_assert!((self.tail as usize) < self.slots.len(), "free list overflow");
        self.slots[self.tail as usize] = slot;
    }

    /// Free slots, bottom of the stack first.
    pub(crate) fn as_slice(&self) -> &[SlotIndex] {
        &self.slots[..self.len()]
    }
}

impl fmt::Debug for FreeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreeList")
            .field("len", &self.len())
            .field("slots", &self.as_slice())
            .finish()
    }
}

/// Owned tables for a book with compile-time capacity `CAP`.
///
/// Holds `2 * CAP` levels and `2 * CAP` entries in each index table. A
/// book borrows the tables, so levels stay where they are after the book
/// is dropped and a new book can [`restore`](Self::restore) them.
#[derive(Clone)]
pub struct BookData<L, const CAP: usize> {
    levels: [[L; CAP]; 2],
    sides: [[SlotIndex; CAP]; 2],
    free: [[SlotIndex; CAP]; 2],
}

impl<L, const CAP: usize> BookData<L, CAP> {
    const VALID: () = assert!(
        CAP > 0 && CAP <= MAX_CAPACITY as usize,
        "BookData capacity must be in 1..=127"
    );

    /// Levels per side
    pub const CAPACITY: SlotIndex = CAP as SlotIndex;

    /// Tables whose levels are produced by `f(slot)`.
    pub fn from_fn(mut f: impl FnMut(usize) -> L) -> Self {
        let () = Self::VALID;
        Self {
            levels: std::array::from_fn(|half| std::array::from_fn(|i| f(half * CAP + i))),
            sides: [[0; CAP]; 2],
            free: [[0; CAP]; 2],
        }
    }

    #[inline]
    pub fn capacity(&self) -> SlotIndex {
        Self::CAPACITY
    }

    /// The whole arena, `2 * CAP` slots.
    #[inline]
    pub fn levels(&self) -> &[L] {
        self.levels.as_flattened()
    }

    /// The whole order table; bids first, then asks.
    #[inline]
    pub fn sides(&self) -> &[SlotIndex] {
        self.sides.as_flattened()
    }

    /// A fresh book over these tables: every slot free, both sides empty.
    pub fn book<P>(&mut self) -> IndexedBook<'_, L, P> {
        IndexedBook::from_tables(
            self.levels.as_flattened_mut(),
            self.sides.as_flattened_mut(),
            self.free.as_flattened_mut(),
            Self::CAPACITY,
        )
    }

    /// A book over tables left behind by an earlier book holding `bid` and `ask` levels.
    ///
    /// # Panics
    /// See [`IndexedBook::accept`].
    pub fn restore<P>(&mut self, bid: SlotIndex, ask: SlotIndex) -> IndexedBook<'_, L, P> {
        let mut book = self.book();
        book.accept(bid, ask);
        book
    }

    /// An append-only book over the level and order tables.
    pub fn append_book<P>(&mut self) -> AppendBook<'_, L, P> {
        AppendBook::from_tables(
            self.levels.as_flattened_mut(),
            self.sides.as_flattened_mut(),
            Self::CAPACITY,
        )
    }

    /// Read-only view of the tables holding `bid` and `ask` levels.
    pub fn view<P>(&self, bid: SlotIndex, ask: SlotIndex) -> BookView<'_, L, P> {
        BookView::new(self.levels(), self.sides(), CAP as i64, bid, ask)
    }
}

impl<L: Default, const CAP: usize> BookData<L, CAP> {
    /// Tables filled with default levels.
    pub fn new() -> Self {
        Self::from_fn(|_| L::default())
    }
}

impl<L: Default, const CAP: usize> Default for BookData<L, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L, const CAP: usize> fmt::Debug for BookData<L, CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookData")
            .field("capacity", &CAP)
            .field("sides", &self.sides())
            .finish()
    }
}
