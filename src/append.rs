//! Append Book - the simpler variant without removal.
//!
//! Slots are claimed monotonically from the front of the arena and never
//! given back, so there is no free table. Running out of slots is an
//! ordinary `NPOS` outcome. Everything else matches [`IndexedBook`].
//!
//! [`IndexedBook`]: crate::IndexedBook

use std::fmt;
use std::marker::PhantomData;

use crate::config::{validate_capacity, CapacityMode, SlotIndex, NPOS};
use crate::error::Result;
use crate::policy::BookPolicy;
use crate::search;
use crate::side::Side;
use crate::view::{BookView, Depth, Iter};

/// Bounded two-sided book that only grows.
pub struct AppendBook<'a, L, P = L> {
    levels: &'a mut [L],
    sides: &'a mut [SlotIndex],
    /// Slots handed out so far
    claimed: SlotIndex,
    capacity: SlotIndex,
    len: [SlotIndex; 2],
    _policy: PhantomData<fn() -> P>,
}

impl<'a, L, P> AppendBook<'a, L, P> {
    /// Create an empty book over caller-owned tables.
    ///
    /// # Errors
    /// [`BookError::BadCapacity`](crate::BookError::BadCapacity) if
    /// `capacity` is outside `0..=127`.
    ///
    /// # Panics
    /// Panics if a table is shorter than `2 * capacity`.
    pub fn new(levels: &'a mut [L], sides: &'a mut [SlotIndex], capacity: i64) -> Result<Self> {
        Self::with_mode(levels, sides, capacity, CapacityMode::Strict)
    }

    /// Like [`new`](Self::new), with an explicit policy for a bad capacity.
    pub fn with_mode(
        levels: &'a mut [L],
        sides: &'a mut [SlotIndex],
        capacity: i64,
        mode: CapacityMode,
    ) -> Result<Self> {
        let capacity = validate_capacity(capacity, mode)?;
        Ok(Self::from_tables(levels, sides, capacity))
    }

    pub(crate) fn from_tables(
        levels: &'a mut [L],
        sides: &'a mut [SlotIndex],
        capacity: SlotIndex,
    ) -> Self {
        let slots = capacity as usize * 2;
        assert!(levels.len() >= slots, "levels table shorter than 2 * capacity");
        assert!(sides.len() >= slots, "sides table shorter than 2 * capacity");
        Self {
            levels,
            sides,
            claimed: 0,
            capacity,
            len: [0, 0],
            _policy: PhantomData,
        }
    }

    /// Forget all levels and start claiming slots from the front again.
    pub fn reset(&mut self) {
        self.claimed = 0;
        self.len = [0, 0];
    }

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

    #[inline]
    pub fn is_full(&self, side: Side) -> bool {
        self.len[side.index()] == self.capacity
    }

    /// Slots never claimed yet
    #[inline]
    pub fn unclaimed_slots(&self) -> usize {
        self.capacity as usize * 2 - self.claimed as usize
    }

    /// Append `level` to the end of `side`; `NPOS` if the side is full.
    #[inline]
    pub fn push(&mut self, side: Side, level: L) -> SlotIndex {
        self.emplace(side, || level)
    }

    /// Append a level built by `make`, which runs only if there is room.
    pub fn emplace(&mut self, side: Side, make: impl FnOnce() -> L) -> SlotIndex {
        let pos = self.len[side.index()];
        if pos >= self.capacity || self.claimed as usize >= self.capacity as usize * 2 {
            return NPOS;
        }
        let level = make();
        let slot = self.claimed;
        self.claimed += 1;
        self.levels[slot as usize] = level;
        self.sides[side.index() * self.capacity as usize + pos as usize] = slot;
        self.len[side.index()] = pos + 1;
        pos
    }

    #[inline]
    pub fn view(&self) -> BookView<'_, L, P> {
        BookView::from_parts(&*self.levels, &*self.sides, self.capacity, self.len)
    }

    /// # Panics
    /// Panics if `i >= size(side)`.
    #[inline]
    pub fn at(&self, side: Side, i: SlotIndex) -> &L {
        self.view().at(side, i)
    }

    /// # Panics
    /// Panics if `i >= size(side)`.
    #[inline]
    pub fn at_mut(&mut self, side: Side, i: SlotIndex) -> &mut L {
        let slot = self.view().slot_of(side, i);
        &mut self.levels[slot as usize]
    }

    pub fn iter(&self, side: Side) -> Iter<'_, L> {
        self.view().iter(side)
    }

    pub fn top(&self, side: Side, n: usize) -> Depth<'_, L> {
        self.view().top(side, n)
    }
}

impl<'a, L, P: BookPolicy<L>> AppendBook<'a, L, P> {
    /// Order `side` best first; levels stay in their slots.
    pub fn sort(&mut self, side: Side) {
        let begin = side.index() * self.capacity as usize;
        let end = begin + self.len[side.index()] as usize;
        search::sort::<L, P>(&*self.levels, &mut self.sides[begin..end], side);
    }

    pub fn is_sorted(&self, side: Side) -> bool {
        self.view().is_sorted(side)
    }

    pub fn binary_search(&self, side: Side, key: &P::Key) -> SlotIndex {
        self.view().binary_search(side, key)
    }

    pub fn lower_bound(&self, side: Side, key: &P::Key) -> SlotIndex {
        self.view().lower_bound(side, key)
    }

    pub fn upper_bound(&self, side: Side, key: &P::Key) -> SlotIndex {
        self.view().upper_bound(side, key)
    }

    pub fn equal_range(&self, side: Side, key: &P::Key) -> (SlotIndex, SlotIndex) {
        self.view().equal_range(side, key)
    }
}

impl<L: fmt::Debug, P> fmt::Debug for AppendBook<'_, L, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppendBook")
            .field("capacity", &self.capacity)
            .field("claimed", &self.claimed)
            .field("bids", &self.iter(Side::Bid).collect::<Vec<_>>())
            .field("asks", &self.iter(Side::Ask).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BookData;
    use crate::policy::{TickPolicy, Ticked};

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    struct Lvl {
        ticks: i64,
        size: i64,
    }

    impl Ticked for Lvl {
        fn ticks(&self) -> i64 {
            self.ticks
        }
    }

    fn lvl(ticks: i64, size: i64) -> Lvl {
        Lvl { ticks, size }
    }

    type Book<'a> = AppendBook<'a, Lvl, TickPolicy<Lvl>>;

    #[test]
    fn test_fill_both_sides() {
        let mut data = BookData::<Lvl, 3>::new();
        let mut book: Book = data.append_book();

        assert_eq!(book.push(Side::Bid, lvl(120120, 100)), 0);
        assert_eq!(book.push(Side::Bid, lvl(120121, 100)), 1);
        assert_eq!(book.push(Side::Ask, lvl(120124, 200)), 0);
        assert_eq!(book.push(Side::Ask, lvl(120125, 300)), 1);
        assert_eq!(book.push(Side::Ask, lvl(120126, 400)), 2);
        assert!(book.is_full(Side::Ask));
        assert_eq!(book.push(Side::Ask, lvl(120121, 100)), NPOS);

        assert_eq!(book.push(Side::Bid, lvl(120125, 200)), 2);
        assert_eq!(book.push(Side::Bid, lvl(120121, 100)), NPOS);
        assert_eq!(book.unclaimed_slots(), 0);

        let asks: Vec<_> = book.iter(Side::Ask).copied().collect();
        assert_eq!(asks, vec![lvl(120124, 200), lvl(120125, 300), lvl(120126, 400)]);
    }

    #[test]
    fn test_slots_claimed_in_order() {
        let mut data = BookData::<Lvl, 2>::new();
        {
            let mut book: Book = data.append_book();
            book.push(Side::Ask, lvl(1, 1));
            book.push(Side::Bid, lvl(2, 2));
            book.push(Side::Ask, lvl(3, 3));
        }
        assert_eq!(data.levels()[..3], [lvl(1, 1), lvl(2, 2), lvl(3, 3)]);
        assert_eq!(data.sides(), &[1, 0, 0, 2]);
    }

    #[test]
    fn test_sort_and_search() {
        let mut data = BookData::<Lvl, 4>::new();
        let mut book: Book = data.append_book();
        for t in [100, 102, 101, 102] {
            book.push(Side::Bid, lvl(t, 1));
        }
        let first = book.at(Side::Bid, 0) as *const Lvl;
        book.sort(Side::Bid);
        assert!(book.is_sorted(Side::Bid));
        assert!(std::ptr::eq(book.at(Side::Bid, 3), first));
        assert_eq!(book.equal_range(Side::Bid, &102), (0, 2));
        assert_eq!(book.lower_bound(Side::Bid, &101), 2);
        assert_eq!(book.upper_bound(Side::Bid, &100), NPOS);
        assert_eq!(book.binary_search(Side::Bid, &100), 3);
    }

    #[test]
    fn test_reset_reclaims_from_front() {
        let mut data = BookData::<Lvl, 1>::new();
        let mut book: Book = data.append_book();
        book.push(Side::Bid, lvl(1, 1));
        book.push(Side::Ask, lvl(2, 2));
        assert_eq!(book.push(Side::Bid, lvl(3, 3)), NPOS);
        book.reset();
        assert_eq!(book.unclaimed_slots(), 2);
        assert_eq!(book.push(Side::Bid, lvl(3, 3)), 0);
        assert_eq!(book.view().slot_of(Side::Bid, 0), 0);
    }

    #[test]
    fn test_panicking_builder_claims_nothing() {
        let mut data = BookData::<Lvl, 1>::new();
        let mut book: Book = data.append_book();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            book.emplace(Side::Ask, || panic!("builder failed"))
        }));
        assert!(result.is_err());
        assert_eq!(book.unclaimed_slots(), 2);
        assert_eq!(book.push(Side::Ask, lvl(1, 1)), 0);
        assert_eq!(book.push(Side::Bid, lvl(2, 2)), 0);
    }

    #[test]
    fn test_zero_capacity_and_clamp() {
        let mut levels: Vec<Lvl> = Vec::new();
        let mut sides: Vec<u8> = Vec::new();
        let mut book = Book::with_mode(&mut levels, &mut sides, -5, CapacityMode::Clamp).unwrap();
        assert_eq!(book.capacity(), 0);
        assert!(book.is_full(Side::Bid) && book.is_empty(Side::Bid));
        assert_eq!(book.emplace(Side::Ask, Lvl::default), NPOS);
    }
}
