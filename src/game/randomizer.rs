use log::error;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore, SeedableRng};

use crate::error::EmptyInputError;

/// Integer in `[min, max]`, each value equally likely. Bounds may be given in either order.
pub fn uniform_int<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(low..=high)
}

pub fn shuffle<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

pub fn pick_one<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Result<&'a T, EmptyInputError> {
    items.choose(rng).ok_or(EmptyInputError)
}

/// For pools that are non-empty by construction: an empty pool is a bug, fatal in debug
/// builds and answered with `T::default()` in release builds.
pub fn pick_or_default<T: Clone + Default, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> T {
    match pick_one(rng, items) {
        Ok(item) => item.clone(),
        Err(err) => {
            error!(target: "game_state", "{err}; falling back to default");
            debug_assert!(false, "{err}");
            T::default()
        }
    }
}

pub fn coin_flip<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.random_bool(0.5)
}

/// Session RNG: seeded when a seed is given so a session can be replayed, random otherwise.
pub fn session_rng(seed: Option<u64>) -> (Box<dyn RngCore>, u64) {
    let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
    (Box::new(StdRng::seed_from_u64(seed)), seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use std::collections::HashMap;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_uniform_int_stays_in_bounds_and_hits_both_ends() {
        let mut rng = seeded();
        let values: Vec<i64> = (0..2_000).map(|_| uniform_int(&mut rng, 3, 6)).collect();
        assert!(values.iter().all(|v| (3..=6).contains(v)));
        assert!(values.contains(&3));
        assert!(values.contains(&6));
        assert_eq!(uniform_int(&mut rng, 5, 5), 5);
    }

    #[test]
    fn test_shuffle_preserves_multiset_and_input() {
        let mut rng = seeded();
        let input = vec![1, 1, 2, 3, 5, 8, 13];
        let shuffled = shuffle(&mut rng, &input);
        assert_eq!(input, vec![1, 1, 2, 3, 5, 8, 13]);
        assert_eq!(
            shuffled.iter().sorted().collect_vec(),
            input.iter().sorted().collect_vec()
        );
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        let mut rng = seeded();
        let trials = 6_000;
        let mut counts: HashMap<Vec<char>, usize> = HashMap::new();
        for _ in 0..trials {
            *counts.entry(shuffle(&mut rng, &['a', 'b', 'c'])).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        for (permutation, count) in counts {
            assert!(
                (800..=1_200).contains(&count),
                "permutation {permutation:?} appeared {count} times"
            );
        }
    }

    #[test]
    fn test_pick_one_empty_fails() {
        let mut rng = seeded();
        let empty: [u8; 0] = [];
        assert_eq!(pick_one(&mut rng, &empty), Err(EmptyInputError));
        assert_eq!(pick_one(&mut rng, &[9]), Ok(&9));
    }

    #[test]
    fn test_session_rng_is_reproducible() {
        let (mut first, seed) = session_rng(Some(42));
        let (mut second, _) = session_rng(Some(seed));
        assert_eq!(first.next_u64(), second.next_u64());
    }
}
