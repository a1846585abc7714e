//! Bracket construction: seeded roster in, fully wired tournament out.

use crate::logic::advancement::{advance, refresh_standings, settle_byes};
use crate::logic::losers::build_losers_bracket;
use crate::logic::seeding::{bracket_size, first_round_pairs};
use crate::models::{
    BracketSide, BracketType, Match, Participant, Round, Slot, Tournament, TournamentError,
};
use chrono::Utc;
use std::collections::HashSet;

/// Largest roster a bracket may be built for unless configured otherwise.
pub const DEFAULT_MAX_PARTICIPANTS: usize = 128;

pub const GRAND_FINAL_ID: &str = "gf-1";
pub const RESET_MATCH_ID: &str = "gf-2";

/// Engine-side limits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    pub max_participants: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_participants: DEFAULT_MAX_PARTICIPANTS,
        }
    }
}

pub fn winners_match_id(round: u32, index: usize) -> String {
    format!("w{round}-m{index}")
}

/// Label of winners round `round` out of `total`.
fn winners_round_name(round: u32, total: u32, bracket_type: BracketType) -> String {
    let base = match total - round {
        0 => "Final".to_string(),
        1 => "Semifinals".to_string(),
        2 => "Quarterfinals".to_string(),
        _ => format!("Round {round}"),
    };
    match bracket_type {
        BracketType::Single => base,
        BracketType::Double => format!("Winners {base}"),
    }
}

/// Check roster size, ids and seeds. Nothing is built until this passes.
fn validate_participants(participants: &[Participant], config: &EngineConfig) -> Result<(), TournamentError> {
    let count = participants.len();
    if count < 2 {
        return Err(TournamentError::InvalidParticipantCount(count));
    }
    if count > config.max_participants {
        return Err(TournamentError::BracketSizeExceeded {
            count,
            max: config.max_participants,
        });
    }
    let mut ids = HashSet::with_capacity(count);
    let mut seeds = HashSet::with_capacity(count);
    for p in participants {
        if p.id.trim().is_empty() {
            return Err(TournamentError::MissingParticipantId);
        }
        if !ids.insert(p.id.as_str()) {
            return Err(TournamentError::DuplicateParticipant(p.id.clone()));
        }
        if !seeds.insert(p.seed) {
            return Err(TournamentError::DuplicateSeed(p.seed));
        }
    }
    // Unique seeds all inside 1..=N are necessarily a permutation of it.
    if let Some(p) = participants.iter().find(|p| p.seed == 0 || p.seed as usize > count) {
        return Err(TournamentError::InvalidSeed { seed: p.seed, count });
    }
    Ok(())
}

/// First winners round: standard seed pairings, byes resolved on the spot.
///
/// `participants` must be sorted by seed; a seed past the roster is an empty slot.
fn first_round(participants: &[Participant]) -> Vec<Match> {
    let lookup = |seed: u32| participants.get(seed as usize - 1).map(|p| p.id.clone());
    first_round_pairs(participants.len())
        .into_iter()
        .enumerate()
        .map(|(i, (a, b))| {
            let mut m = Match::new(winners_match_id(1, i), 1, i, BracketSide::Winners);
            m.player1_id = lookup(a);
            m.player2_id = lookup(b);
            if !m.has_both_players() {
                if let Some(present) = m.player1_id.clone().or_else(|| m.player2_id.clone()) {
                    m.resolve_bye(present, Utc::now());
                }
            }
            m
        })
        .collect()
}

/// Winners-side rounds, wired round to round; the last match feeds `after_final` if given.
fn winners_rounds(
    participants: &[Participant],
    size: usize,
    bracket_type: BracketType,
    after_final: Option<&str>,
) -> Vec<Round> {
    let total = size.trailing_zeros();
    (1..=total)
        .map(|r| {
            let mut matches = if r == 1 {
                first_round(participants)
            } else {
                (0..size >> r)
                    .map(|i| Match::new(winners_match_id(r, i), r, i, BracketSide::Winners))
                    .collect()
            };
            for m in matches.iter_mut() {
                if r < total {
                    m.next_match_id = Some(winners_match_id(r + 1, m.position / 2));
                    m.next_slot = Some(Slot::from_position(m.position));
                } else if let Some(gf) = after_final {
                    m.next_match_id = Some(gf.to_string());
                    m.next_slot = Some(Slot::Player1);
                }
            }
            Round {
                round_number: r,
                name: winners_round_name(r, total, bracket_type),
                bracket_side: BracketSide::Winners,
                matches,
            }
        })
        .collect()
}

fn grand_final_round(round_number: u32, match_id: &str, name: &str) -> Round {
    Round {
        round_number,
        name: name.to_string(),
        bracket_side: BracketSide::GrandFinal,
        matches: vec![Match::new(match_id, round_number, 0, BracketSide::GrandFinal)],
    }
}

/// Build a tournament bracket from a seeded roster.
///
/// Participants are ordered by seed in the result. Round-one byes are completed immediately and
/// their winners already placed in round two (and, for double elimination, losers-bracket
/// matches that can never get a second player are settled too).
pub fn generate_bracket(
    name: impl Into<String>,
    mut participants: Vec<Participant>,
    bracket_type: BracketType,
    config: &EngineConfig,
) -> Result<Tournament, TournamentError> {
    let name = name.into();
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::EmptyName);
    }
    validate_participants(&participants, config)?;
    participants.sort_by_key(|p| p.seed);

    let size = bracket_size(participants.len());
    let total = size.trailing_zeros();
    let mut tournament = Tournament::new(name, bracket_type);

    match bracket_type {
        BracketType::Single => {
            tournament.rounds = winners_rounds(&participants, size, bracket_type, None);
            tournament.final_match_id = winners_match_id(total, 0);
        }
        BracketType::Double => {
            let mut rounds = winners_rounds(&participants, size, bracket_type, Some(GRAND_FINAL_ID));
            tournament.losers_rounds = build_losers_bracket(size, &mut rounds, GRAND_FINAL_ID);
            let mut grand_final = grand_final_round(total + 1, GRAND_FINAL_ID, "Grand Final");
            // Slots of the reset are filled by the grand-final result, not by plain advancement.
            grand_final.matches[0].next_match_id = Some(RESET_MATCH_ID.to_string());
            rounds.push(grand_final);
            rounds.push(grand_final_round(total + 2, RESET_MATCH_ID, "Grand Final Reset"));
            tournament.rounds = rounds;
            tournament.final_match_id = GRAND_FINAL_ID.to_string();
            tournament.reset_match_id = Some(RESET_MATCH_ID.to_string());
        }
    }
    tournament.participants = participants;

    let byes: Vec<String> = tournament
        .rounds
        .first()
        .map(|r| r.matches.iter().filter(|m| m.is_bye).map(|m| m.match_id.clone()).collect())
        .unwrap_or_default();
    for match_id in &byes {
        advance(&mut tournament, match_id)?;
    }
    settle_byes(&mut tournament)?;
    refresh_standings(&mut tournament);
    Ok(tournament)
}
