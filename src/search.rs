//! Sorting and binary search over one side of the order table.
//!
//! Every function takes the arena (`levels`) and the live part of one
//! side's order table (`order`), and returns a position within `order`.
//! Any position equal to `order.len()` is reported as [`NPOS`].

use std::cmp::Ordering;

use crate::config::{SlotIndex, NPOS};
use crate::policy::BookPolicy;
use crate::side::Side;

#[inline]
fn position(order: &[SlotIndex], pos: usize) -> SlotIndex {
    if pos == order.len() {
        NPOS
    } else {
        pos as SlotIndex
    }
}

/// Ordering of the level in `slot` relative to `key` ("Less" = closer to the top).
#[inline]
fn cmp_slot<L, P: BookPolicy<L>>(levels: &[L], slot: SlotIndex, side: Side, key: &P::Key) -> Ordering {
    let level = &levels[slot as usize];
    if P::level_better(side, level, key) {
        Ordering::Less
    } else if P::key_better(side, key, level) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// First index in `order` whose level is not better than `key`.
#[inline]
fn lower_in<L, P: BookPolicy<L>>(levels: &[L], order: &[SlotIndex], side: Side, key: &P::Key) -> usize {
    order.partition_point(|&slot| P::level_better(side, &levels[slot as usize], key))
}

/// First index in `order` whose level `key` is better than.
#[inline]
fn upper_in<L, P: BookPolicy<L>>(levels: &[L], order: &[SlotIndex], side: Side, key: &P::Key) -> usize {
    order.partition_point(|&slot| !P::key_better(side, key, &levels[slot as usize]))
}

pub(crate) fn binary_search<L, P: BookPolicy<L>>(
    levels: &[L],
    order: &[SlotIndex],
    side: Side,
    key: &P::Key,
) -> SlotIndex {
    match order.binary_search_by(|&slot| cmp_slot::<L, P>(levels, slot, side, key)) {
        Ok(pos) => pos as SlotIndex,
        Err(_) => NPOS,
    }
}

pub(crate) fn lower_bound<L, P: BookPolicy<L>>(
    levels: &[L],
    order: &[SlotIndex],
    side: Side,
    key: &P::Key,
) -> SlotIndex {
    position(order, lower_in::<L, P>(levels, order, side, key))
}

pub(crate) fn upper_bound<L, P: BookPolicy<L>>(
    levels: &[L],
    order: &[SlotIndex],
    side: Side,
    key: &P::Key,
) -> SlotIndex {
    position(order, upper_in::<L, P>(levels, order, side, key))
}

/// `(lower, upper)` of the run equal to `key`, or `(NPOS, NPOS)` when absent.
///
/// Bisects until some element compares equal, then finishes the two
/// bounds inside the halves on either side of it.
pub(crate) fn equal_range<L, P: BookPolicy<L>>(
    levels: &[L],
    order: &[SlotIndex],
    side: Side,
    key: &P::Key,
) -> (SlotIndex, SlotIndex) {
    let (mut from, mut end) = (0, order.len());
    while from < end {
        let mid = from + (end - from) / 2;
        match cmp_slot::<L, P>(levels, order[mid], side, key) {
            Ordering::Less => from = mid + 1,
            Ordering::Greater => end = mid,
            Ordering::Equal => {
                let lower = from + lower_in::<L, P>(levels, &order[from..mid], side, key);
                let upper = mid + 1 + upper_in::<L, P>(levels, &order[mid + 1..end], side, key);
                return (position(order, lower), position(order, upper));
            }
        }
    }
    (NPOS, NPOS)
}

/// Sort one side's order entries, best first, moving only indices.
///
/// Stable insertion sort. Only `better` is consulted; an inconsistent
/// policy yields some permutation, never a panic.
pub(crate) fn sort<L, P: BookPolicy<L>>(levels: &[L], order: &mut [SlotIndex], side: Side) {
    for i in 1..order.len() {
        let slot = order[i];
        let level = &levels[slot as usize];
        let mut j = i;
        while j > 0 && P::better(side, level, &levels[order[j - 1] as usize]) {
            order[j] = order[j - 1];
            j -= 1;
        }
        order[j] = slot;
    }
}

pub(crate) fn is_sorted<L, P: BookPolicy<L>>(levels: &[L], order: &[SlotIndex], side: Side) -> bool {
    order
        .windows(2)
        .all(|w| !P::better(side, &levels[w[1] as usize], &levels[w[0] as usize]))
}
