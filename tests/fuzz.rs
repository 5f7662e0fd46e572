//! Fuzz Test - Compares the indexed book against a reference implementation.
//!
//! Uses a naive `Vec` per side as the reference and replays the same
//! random operation stream against both, checking contents, search
//! results, slot bookkeeping and address stability after every step.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use slot_book::{BookPolicy, IndexedBook, Side, TickPolicy, Ticked, NPOS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Level {
    ticks: i64,
    id: u64,
}

impl Ticked for Level {
    fn ticks(&self) -> i64 {
        self.ticks
    }
}

type Policy = TickPolicy<Level>;

/// Simple reference implementation for verification
struct ReferenceBook {
    capacity: usize,
    sides: [Vec<Level>; 2],
}

impl ReferenceBook {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            sides: [Vec::new(), Vec::new()],
        }
    }

    fn push(&mut self, side: Side, level: Level) -> u8 {
        let levels = &mut self.sides[side.index()];
        if levels.len() == self.capacity {
            return NPOS;
        }
        levels.push(level);
        (levels.len() - 1) as u8
    }

    fn remove(&mut self, side: Side, i: usize) -> Level {
        self.sides[side.index()].remove(i)
    }

    fn sort(&mut self, side: Side) {
        // Stable, like the book's sort
        self.sides[side.index()].sort_by(|a, b| {
            if Policy::better(side, a, b) {
                std::cmp::Ordering::Less
            } else if Policy::better(side, b, a) {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        });
    }

    fn lower_bound(&self, side: Side, key: i64) -> usize {
        self.sides[side.index()]
            .iter()
            .position(|l| !Policy::level_better(side, l, &key))
            .unwrap_or(self.sides[side.index()].len())
    }

    fn upper_bound(&self, side: Side, key: i64) -> usize {
        self.sides[side.index()]
            .iter()
            .position(|l| Policy::key_better(side, &key, l))
            .unwrap_or(self.sides[side.index()].len())
    }
}

fn to_pos(pos: usize, len: usize) -> u8 {
    if pos == len {
        NPOS
    } else {
        pos as u8
    }
}

fn random_side(rng: &mut ChaCha8Rng) -> Side {
    if rng.gen_bool(0.5) {
        Side::Bid
    } else {
        Side::Ask
    }
}

fn check_state(
    book: &IndexedBook<'_, Level, Policy>,
    reference: &ReferenceBook,
    addresses: &FxHashMap<u64, *const Level>,
) {
    let mut slots = FxHashSet::default();
    for side in Side::BOTH {
        let expected = &reference.sides[side.index()];
        assert_eq!(book.size(side) as usize, expected.len());
        assert_eq!(book.is_empty(side), expected.is_empty());
        assert_eq!(book.is_full(side), expected.len() == reference.capacity);

        let actual: Vec<Level> = book.iter(side).copied().collect();
        assert_eq!(&actual, expected, "contents diverged on {side:?}");

        for i in 0..book.size(side) {
            assert!(slots.insert(book.slot_of(side, i)), "slot shared by two positions");
            let level = book.at(side, i);
            assert_eq!(addresses[&level.id], level as *const Level, "level {} moved", level.id);
        }
    }
    assert!(slots.iter().all(|&s| (s as usize) < reference.capacity * 2));
    assert_eq!(slots.len() + book.free_slots(), reference.capacity * 2);
}

fn check_search(book: &IndexedBook<'_, Level, Policy>, reference: &ReferenceBook, side: Side, key: i64) {
    let len = reference.sides[side.index()].len();
    let lower = reference.lower_bound(side, key);
    let upper = reference.upper_bound(side, key);

    assert_eq!(book.lower_bound(side, &key), to_pos(lower, len), "lower_bound({key})");
    assert_eq!(book.upper_bound(side, &key), to_pos(upper, len), "upper_bound({key})");

    let found = book.binary_search(side, &key);
    if lower == upper {
        assert_eq!(found, NPOS);
        assert_eq!(book.equal_range(side, &key), (NPOS, NPOS));
    } else {
        assert!((lower..upper).contains(&(found as usize)), "binary_search({key}) = {found}");
        assert_eq!(book.equal_range(side, &key), (to_pos(lower, len), to_pos(upper, len)));
    }
}

fn run(seed: u64, capacity: usize, ops: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut levels = vec![Level::default(); capacity * 2];
    let mut sides = vec![0u8; capacity * 2];
    let mut free = vec![0u8; capacity * 2];
    let mut book: IndexedBook<Level, Policy> =
        IndexedBook::new(&mut levels, &mut sides, &mut free, capacity as i64).unwrap();
    let mut reference = ReferenceBook::new(capacity);
    let mut addresses: FxHashMap<u64, *const Level> = FxHashMap::default();
    let mut next_id = 0u64;

    for _ in 0..ops {
        let side = random_side(&mut rng);
        match rng.gen_range(0..10) {
            0..=4 => {
                let level = Level {
                    ticks: rng.gen_range(9_990..10_010),
                    id: next_id,
                };
                next_id += 1;
                let pos = book.push(side, level);
                assert_eq!(pos, reference.push(side, level));
                if pos != NPOS {
                    addresses.insert(level.id, book.at(side, pos) as *const Level);
                }
            }
            5..=7 => {
                let len = book.size(side);
                if len > 0 {
                    let i = rng.gen_range(0..len);
                    let removed = reference.remove(side, i as usize);
                    assert_eq!(book.at(side, i).id, removed.id);
                    book.remove(side, i);
                    addresses.remove(&removed.id);
                }
            }
            _ => {
                book.sort(side);
                reference.sort(side);
                assert!(book.is_sorted(side));
                for _ in 0..4 {
                    let key = rng.gen_range(9_985..10_015);
                    check_search(&book, &reference, side, key);
                }
            }
        }
        check_state(&book, &reference, &addresses);
    }
}

#[test]
fn test_fuzz_small_book() {
    run(0xFEEDFACE, 3, 5_000);
}

#[test]
fn test_fuzz_medium_book() {
    run(0xDEADBEEF, 16, 10_000);
}

#[test]
fn test_fuzz_max_capacity() {
    run(0xC0FFEE, 127, 20_000);
}

#[test]
fn test_fuzz_seeds() {
    for seed in 0..20 {
        run(seed, 1 + (seed as usize % 8), 1_000);
    }
}
