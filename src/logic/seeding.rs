//! Standard tournament seeding: which seeds meet in the first round, and how seeds are assigned.

use crate::models::Participant;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// How seeds are assigned when a roster arrives without explicit seeds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMode {
    /// Roster order is seed order.
    #[default]
    Ordered,
    /// Shuffle the roster, then seed in the shuffled order.
    Random,
}

impl SeedingMode {
    /// Reassign seeds 1..N over `participants` according to this mode.
    pub fn apply(self, mut participants: Vec<Participant>) -> Vec<Participant> {
        if self == SeedingMode::Random {
            participants.shuffle(&mut rand::thread_rng());
        }
        for (i, p) in participants.iter_mut().enumerate() {
            p.seed = i as u32 + 1;
        }
        participants
    }
}

/// Smallest power of two that can hold `count` participants.
pub fn bracket_size(count: usize) -> usize {
    count.max(2).next_power_of_two()
}

/// Seed order of first-round slots for a bracket of `size` (a power of two).
///
/// Built by repeatedly pairing each seed `s` with `2n + 1 - s`, so slot pairs
/// `(order[2i], order[2i + 1])` are the round-one matches. For 8: `1 8 4 5 2 7 3 6`.
/// Seeds 1 and 2 end up in opposite halves and cannot meet before the final.
pub fn seed_order(size: usize) -> Vec<u32> {
    let mut order = vec![1u32];
    while order.len() < size {
        let sum = (order.len() * 2 + 1) as u32;
        order = order.iter().flat_map(|&s| [s, sum - s]).collect();
    }
    order
}

/// First-round pairings as seed pairs; a seed greater than `count` is an empty slot.
pub fn first_round_pairs(count: usize) -> Vec<(u32, u32)> {
    seed_order(bracket_size(count))
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}
