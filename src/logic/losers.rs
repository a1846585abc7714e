//! Double elimination: losers bracket shape and the drop-in table for winners-bracket losers.
//!
//! For a bracket of `2^k` slots the losers bracket has `2(k-1)` rounds. Odd rounds are
//! consolidation rounds (losers-bracket survivors play each other, round 1 being fed by
//! winners round 1 losers), even rounds are drop-in rounds where a survivor in slot 1 meets
//! a loser falling from winners round `r/2 + 1` in slot 2.

use crate::models::{BracketSide, Match, Round, Slot};

pub fn losers_match_id(round: u32, index: usize) -> String {
    format!("l{round}-m{index}")
}

/// Number of losers rounds for a bracket of `size` slots.
pub fn losers_round_count(size: usize) -> u32 {
    let k = size.trailing_zeros();
    if k < 2 {
        0
    } else {
        2 * (k - 1)
    }
}

/// Matches in losers round `round` (1-based).
pub fn losers_match_count(size: usize, round: u32) -> usize {
    size >> ((round as usize + 1) / 2 + 1)
}

/// Losers round that catches the losers of winners round `winners_round`.
pub fn drop_in_round(winners_round: u32) -> u32 {
    if winners_round == 1 {
        1
    } else {
        2 * (winners_round - 1)
    }
}

/// Entry match index and slot for the loser of winners match `index` in `winners_round`.
///
/// Round 1 losers pair up in order. Later drop-ins alternate between a reversed order and
/// a half swap so that a dropped player does not immediately meet someone from the same
/// part of the winners bracket.
pub fn drop_in_target(winners_round: u32, index: usize, matches: usize) -> (usize, Slot) {
    if winners_round == 1 {
        return (index / 2, Slot::from_position(index));
    }
    let target = if winners_round % 2 == 0 {
        matches - 1 - index
    } else {
        (index + matches / 2) % matches
    };
    (target, Slot::Player2)
}

fn round_name(round: u32, total: u32) -> String {
    if round == total {
        "Losers Final".to_string()
    } else {
        format!("Losers Round {round}")
    }
}

/// Build the losers bracket and wire `next_loser_*` on every winners match.
///
/// `winners` holds the winners-side rounds only. The losers final feeds slot 2 of
/// `grand_final_id`; with a two-slot bracket there is no losers bracket and the single
/// winners match drops its loser straight into the grand final.
pub fn build_losers_bracket(size: usize, winners: &mut [Round], grand_final_id: &str) -> Vec<Round> {
    let total = losers_round_count(size);

    if total == 0 {
        for m in winners.iter_mut().flat_map(|r| r.matches.iter_mut()) {
            m.next_loser_match_id = Some(grand_final_id.to_string());
            m.next_loser_slot = Some(Slot::Player2);
        }
        return Vec::new();
    }

    let rounds: Vec<Round> = (1..=total)
        .map(|r| {
            let matches = (0..losers_match_count(size, r))
                .map(|j| {
                    let mut m = Match::new(losers_match_id(r, j), r, j, BracketSide::Losers);
                    let (next_id, slot) = if r == total {
                        (grand_final_id.to_string(), Slot::Player2)
                    } else if r % 2 == 1 {
                        (losers_match_id(r + 1, j), Slot::Player1)
                    } else {
                        (losers_match_id(r + 1, j / 2), Slot::from_position(j))
                    };
                    m.next_match_id = Some(next_id);
                    m.next_slot = Some(slot);
                    m
                })
                .collect();
            Round {
                round_number: r,
                name: round_name(r, total),
                bracket_side: BracketSide::Losers,
                matches,
            }
        })
        .collect();

    for round in winners.iter_mut() {
        let target_round = drop_in_round(round.round_number);
        let count = round.matches.len();
        for m in round.matches.iter_mut() {
            let (index, slot) = drop_in_target(round.round_number, m.position, count);
            m.next_loser_match_id = Some(losers_match_id(target_round, index));
            m.next_loser_slot = Some(slot);
        }
    }

    rounds
}
