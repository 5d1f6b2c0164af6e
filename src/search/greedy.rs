//! Greedy move selection with jitter and exploration
//!
//! Candidates arrive already scored. The picker adds a small random jitter to
//! break ties, sorts best first and, with probability `randomness`, picks
//! uniformly among the top `top_n` instead of the best. All randomness comes
//! from one seeded generator, so a fixed seed replays the same choices.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::trace;

/// How often and how widely the picker strays from the best candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exploration {
    pub randomness: f64,
    pub top_n: usize,
}

impl Exploration {
    /// Always take the best candidate.
    pub fn greedy() -> Self {
        Exploration {
            randomness: 0.0,
            top_n: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GreedyPicker {
    rng: Xoshiro256PlusPlus,
    jitter: f64,
}

impl GreedyPicker {
    /// `jitter` is the width of the uniform noise added to each score; zero
    /// disables it.
    pub fn new(seed: u64, jitter: f64) -> Self {
        GreedyPicker {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            jitter: jitter.max(0.0),
        }
    }

    /// The shared generator, also used for dice.
    pub fn rng(&mut self) -> &mut Xoshiro256PlusPlus {
        &mut self.rng
    }

    /// Chooses one of the scored candidates, or `None` if there are none.
    pub fn pick<M>(&mut self, scored: Vec<(M, f64)>, exploration: Exploration) -> Option<M> {
        if scored.is_empty() {
            return None;
        }

        let mut ranked: Vec<(M, f64)> = scored
            .into_iter()
            .map(|(mv, score)| {
                let noise = if self.jitter > 0.0 {
                    self.rng.random::<f64>() * self.jitter
                } else {
                    0.0
                };
                (mv, score + noise)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let randomness = exploration.randomness.clamp(0.0, 1.0);
        let pool = exploration.top_n.clamp(1, ranked.len());
        let index = if pool > 1 && self.rng.random_bool(randomness) {
            self.rng.random_range(0..pool)
        } else {
            0
        };
        trace!(candidates = ranked.len(), pool, index, "greedy pick");

        ranked.into_iter().nth(index).map(|(mv, _)| mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<(&'static str, f64)> {
        vec![("a", 1.0), ("b", 50.0), ("c", 10.0), ("d", 49.0)]
    }

    #[test]
    fn test_empty_yields_none() {
        let mut picker = GreedyPicker::new(1, 5.0);
        assert_eq!(picker.pick(Vec::<((), f64)>::new(), Exploration::greedy()), None);
    }

    #[test]
    fn test_greedy_without_jitter_takes_best() {
        let mut picker = GreedyPicker::new(7, 0.0);
        for _ in 0..20 {
            assert_eq!(picker.pick(candidates(), Exploration::greedy()), Some("b"));
        }
    }

    #[test]
    fn test_jitter_only_breaks_near_ties() {
        // A jitter of 5 can swap b and d but never promote c or a.
        let mut picker = GreedyPicker::new(3, 5.0);
        for _ in 0..50 {
            let pick = picker.pick(candidates(), Exploration::greedy()).unwrap();
            assert!(pick == "b" || pick == "d");
        }
    }

    #[test]
    fn test_exploration_stays_within_top_n() {
        let mut picker = GreedyPicker::new(11, 0.0);
        let wide = Exploration {
            randomness: 1.0,
            top_n: 2,
        };
        for _ in 0..50 {
            let pick = picker.pick(candidates(), wide).unwrap();
            assert!(pick == "b" || pick == "d");
        }
    }

    #[test]
    fn test_same_seed_same_choices() {
        let explore = Exploration {
            randomness: 0.5,
            top_n: 4,
        };
        let mut left = GreedyPicker::new(42, 5.0);
        let mut right = GreedyPicker::new(42, 5.0);
        for _ in 0..20 {
            assert_eq!(left.pick(candidates(), explore), right.pick(candidates(), explore));
        }
    }
}
