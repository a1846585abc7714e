//! Shared helpers for integration tests.
#![allow(dead_code)]

use cobblemon_bracket::{
    generate_bracket, set_match_result, BracketType, EngineConfig, Match, MatchResult,
    Participant, Tournament, TournamentStatus,
};

/// Participants `s1..sN`, id matching seed.
pub fn roster(n: u32) -> Vec<Participant> {
    (1..=n).map(|s| Participant::new(format!("s{s}"), s)).collect()
}

pub fn single(n: u32) -> Tournament {
    generate_bracket("Copa Pitufa", roster(n), BracketType::Single, &EngineConfig::default()).unwrap()
}

pub fn double(n: u32) -> Tournament {
    generate_bracket("Copa Pitufa", roster(n), BracketType::Double, &EngineConfig::default()).unwrap()
}

pub fn play(t: &mut Tournament, match_id: &str, winner: &str) {
    set_match_result(t, &MatchResult::new(match_id, winner)).unwrap();
}

pub fn ready_matches(t: &Tournament) -> Vec<Match> {
    t.matches().filter(|m| m.is_ready()).cloned().collect()
}

/// Play ready matches until the tournament completes; `pick` chooses each winner.
/// Returns the number of results submitted.
pub fn play_out(t: &mut Tournament, mut pick: impl FnMut(&Match) -> String) -> usize {
    let mut played = 0;
    while t.status != TournamentStatus::Completed {
        let m = ready_matches(t)
            .into_iter()
            .next()
            .expect("an unfinished tournament always has a ready match");
        let winner = pick(&m);
        play(t, &m.match_id, &winner);
        played += 1;
    }
    played
}

/// Seed encoded in a `roster` id (`s7` -> 7).
pub fn seed_of(id: &str) -> u32 {
    id.trim_start_matches('s').parse().unwrap()
}

/// Lower seed (stronger player) always wins.
pub fn favourite(m: &Match) -> String {
    let p1 = m.player1_id.clone().unwrap();
    let p2 = m.player2_id.clone().unwrap();
    if seed_of(&p1) < seed_of(&p2) {
        p1
    } else {
        p2
    }
}

/// Higher seed always wins.
pub fn underdog(m: &Match) -> String {
    let fav = favourite(m);
    if m.player1_id.as_deref() == Some(fav.as_str()) {
        m.player2_id.clone().unwrap()
    } else {
        m.player1_id.clone().unwrap()
    }
}
