//! C4: the random-pick source backing SPOP/SRANDMEMBER/HRANDFIELD/
//! ZRANDMEMBER.
//!
//! The teacher pulls in `rand` for `SkipList::randome_level`; this reuses
//! the same crate rather than hand-rolling an LCG. Consumption happens
//! while the executor holds its store lock (see `executor::Executor`), so a
//! seeded `RandomPick` produces a repeatable sequence of picks across a
//! single-threaded replay even though the generator itself is mutated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct RandomPick {
    rng: StdRng,
}

impl RandomPick {
    pub fn from_seed(seed: Option<u64>) -> RandomPick {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomPick { rng }
    }

    /// Picks an index in `[0, n)`. Panics if `n == 0` — callers must check
    /// for an empty collection before calling.
    pub fn pick(&mut self, n: usize) -> usize {
        assert!(n > 0, "pick() called on an empty collection");
        self.rng.gen_range(0..n)
    }

    pub fn select_one<T: Clone>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.pick(items.len());
        Some(items[idx].clone())
    }

    /// Samples up to `count` distinct items without replacement.
    pub fn select_n<T: Clone>(&mut self, items: &[T], count: usize) -> Vec<T> {
        let mut pool: Vec<T> = items.to_vec();
        let take = count.min(pool.len());
        let mut result = Vec::with_capacity(take);
        for _ in 0..take {
            let idx = self.pick(pool.len());
            result.push(pool.swap_remove(idx));
        }
        result
    }

    /// Samples exactly `count` items with replacement (duplicates allowed).
    pub fn select_n_with_replacement<T: Clone>(&mut self, items: &[T], count: usize) -> Vec<T> {
        if items.is_empty() {
            return Vec::new();
        }
        (0..count).map(|_| items[self.pick(items.len())].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_stream_is_repeatable() {
        let mut a = RandomPick::from_seed(Some(42));
        let mut b = RandomPick::from_seed(Some(42));
        let items = vec![1, 2, 3, 4, 5];
        for _ in 0..10 {
            assert_eq!(a.pick(items.len()), b.pick(items.len()));
        }
    }

    #[test]
    fn select_n_without_replacement_has_no_duplicates_and_respects_bound() {
        let mut rp = RandomPick::from_seed(Some(7));
        let items = vec!["a", "b", "c", "d"];
        let picked = rp.select_n(&items, 10);
        assert_eq!(picked.len(), 4);
        let mut sorted = picked.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), picked.len());
    }

    #[test]
    fn select_n_with_replacement_returns_exact_count() {
        let mut rp = RandomPick::from_seed(Some(1));
        let items = vec![1, 2];
        let picked = rp.select_n_with_replacement(&items, 5);
        assert_eq!(picked.len(), 5);
    }

    #[test]
    fn select_one_on_empty_is_none() {
        let mut rp = RandomPick::from_seed(Some(1));
        let items: Vec<i32> = Vec::new();
        assert_eq!(rp.select_one(&items), None);
    }
}
