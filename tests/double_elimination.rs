//! Integration tests for double elimination: drop-ins, losers bracket byes, grand final and reset.

mod common;

use cobblemon_bracket::{
    BracketSide, Match, MatchStatus, Tournament, TournamentStatus, VictoryType,
};
use common::{double, favourite, play, play_out, ready_matches, single, underdog};

#[test]
fn round_one_losers_drop_in_order() {
    let mut t = double(8);
    // w1: s1-s8, s4-s5, s2-s7, s3-s6
    play(&mut t, "w1-m0", "s1");
    play(&mut t, "w1-m1", "s5");
    play(&mut t, "w1-m2", "s2");
    play(&mut t, "w1-m3", "s3");

    let l1 = t.find_match("l1-m0").unwrap();
    assert_eq!(l1.player1_id.as_deref(), Some("s8"));
    assert_eq!(l1.player2_id.as_deref(), Some("s4"));
    let l1 = t.find_match("l1-m1").unwrap();
    assert_eq!(l1.player1_id.as_deref(), Some("s7"));
    assert_eq!(l1.player2_id.as_deref(), Some("s6"));

    let s4 = t.participant("s4").unwrap();
    assert_eq!(s4.losses, 1);
    assert!(!s4.eliminated);
}

#[test]
fn round_two_losers_cross_over() {
    let mut t = double(8);
    play_round_one(&mut t);
    play(&mut t, "w2-m0", "s1"); // s4 drops
    play(&mut t, "w2-m1", "s2"); // s3 drops

    assert_eq!(t.find_match("l2-m1").unwrap().player2_id.as_deref(), Some("s4"));
    assert_eq!(t.find_match("l2-m0").unwrap().player2_id.as_deref(), Some("s3"));
}

fn play_round_one(t: &mut Tournament) {
    for id in ["w1-m0", "w1-m1", "w1-m2", "w1-m3"] {
        let m = t.find_match(id).unwrap().clone();
        play(t, id, &favourite(&m));
    }
}

#[test]
fn grand_final_won_by_winners_champion_completes() {
    let mut t = double(4);
    play(&mut t, "w1-m0", "s1");
    play(&mut t, "w1-m1", "s2");
    play(&mut t, "w2-m0", "s1");
    play(&mut t, "l1-m0", "s3");
    assert!(t.participant("s4").unwrap().eliminated);
    play(&mut t, "l2-m0", "s2");
    assert!(t.participant("s3").unwrap().eliminated);

    let gf = t.find_match("gf-1").unwrap();
    assert_eq!(gf.player1_id.as_deref(), Some("s1"));
    assert_eq!(gf.player2_id.as_deref(), Some("s2"));

    play(&mut t, "gf-1", "s1");
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.winner_id.as_deref(), Some("s1"));
    let reset = t.find_match("gf-2").unwrap();
    assert_eq!(reset.status, MatchStatus::Pending);
    assert_eq!(reset.player1_id, None);
    assert!(t.participant("s2").unwrap().eliminated);
}

#[test]
fn losers_champion_winning_grand_final_forces_reset() {
    let mut t = double(4);
    play(&mut t, "w1-m0", "s1");
    play(&mut t, "w1-m1", "s2");
    play(&mut t, "w2-m0", "s1");
    play(&mut t, "l1-m0", "s3");
    play(&mut t, "l2-m0", "s2");

    play(&mut t, "gf-1", "s2");
    assert_ne!(t.status, TournamentStatus::Completed);
    assert_eq!(t.winner_id, None);
    let s1 = t.participant("s1").unwrap();
    assert_eq!(s1.losses, 1);
    assert!(!s1.eliminated);

    let reset = t.find_match("gf-2").unwrap();
    assert_eq!(reset.player1_id.as_deref(), Some("s1"));
    assert_eq!(reset.player2_id.as_deref(), Some("s2"));
    assert!(reset.is_ready());

    play(&mut t, "gf-2", "s1");
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.winner_id.as_deref(), Some("s1"));
    let s2 = t.participant("s2").unwrap();
    assert!(s2.eliminated);
    assert_eq!(s2.eliminated_in.as_deref(), Some("gf-2"));
}

#[test]
fn losers_bracket_byes_settle_around_missing_players() {
    // 6 players in 8 slots: s1 and s2 get byes, so l1-m0 and l1-m1 each miss one loser.
    let mut t = double(6);
    let l1 = t.find_match("l1-m0").unwrap();
    assert!(!l1.is_completed());

    play(&mut t, "w1-m1", "s4"); // s5 drops into l1-m0 and walks through
    let l1 = t.find_match("l1-m0").unwrap();
    assert!(l1.is_bye);
    assert_eq!(l1.winner_id.as_deref(), Some("s5"));
    assert_eq!(t.find_match("l2-m0").unwrap().player1_id.as_deref(), Some("s5"));
    // A walkover is not a win.
    assert_eq!(t.participant("s5").unwrap().wins, 0);
}

#[test]
fn every_roster_size_finishes() {
    for n in 2..=17 {
        for pick in [favourite as fn(&Match) -> String, underdog] {
            let mut t = double(n);
            let played = play_out(&mut t, pick);
            let champion = t.winner_id.clone().unwrap();
            let reset_played = t.find_match("gf-2").unwrap().is_completed();
            assert_eq!(played, 2 * n as usize - 2 + usize::from(reset_played), "n={n}");
            for p in &t.participants {
                assert_eq!(p.eliminated, p.id != champion, "n={n} {}", p.id);
            }
        }
    }
}

#[test]
fn losers_bracket_only_holds_winners_losers() {
    let mut t = double(8);
    play_out(&mut t, underdog);
    for m in t.matches().filter(|m| m.bracket_side == BracketSide::Losers) {
        for id in [&m.player1_id, &m.player2_id].into_iter().flatten() {
            let lost_in_winners = t
                .side_rounds(BracketSide::Winners)
                .flat_map(|r| r.matches.iter())
                .any(|w| w.loser_id() == Some(id));
            assert!(lost_in_winners, "{id} reached {} without a winners loss", m.match_id);
        }
    }
}

fn assert_byes_have_one_player(t: &Tournament, context: &str) {
    for m in t.matches().filter(|m| m.is_bye) {
        let present: Vec<_> = [&m.player1_id, &m.player2_id].into_iter().flatten().collect();
        assert_eq!(present.len(), 1, "{context}: bye {} has {} players", m.match_id, present.len());
        assert_eq!(m.winner_id.as_ref(), Some(present[0]), "{context}: {}", m.match_id);
        assert_eq!(m.victory_type, Some(VictoryType::Bye));
        assert!(!m.is_void);
    }
    for m in t.matches().filter(|m| m.is_void) {
        assert!(m.is_completed(), "{context}: {}", m.match_id);
        assert_eq!((&m.player1_id, &m.player2_id, &m.winner_id), (&None, &None, &None));
    }
}

#[test]
fn byes_always_hold_exactly_one_player() {
    for n in 2..=33 {
        for build in [single as fn(u32) -> Tournament, double] {
            let mut t = build(n);
            assert_byes_have_one_player(&t, &format!("n={n} at creation"));
            while t.status != TournamentStatus::Completed {
                let m = ready_matches(&t).remove(0);
                play(&mut t, &m.match_id, &underdog(&m));
                assert_byes_have_one_player(&t, &format!("n={n} after {}", m.match_id));
            }
        }
    }
}

#[test]
fn unreachable_losers_match_is_void_not_a_bye() {
    // 5 players in 8 slots: w1-m2 and w1-m3 are both byes, so nobody can reach l1-m1.
    let t = double(5);
    let l1 = t.find_match("l1-m1").unwrap();
    assert!(l1.is_void);
    assert!(!l1.is_bye);
    assert_eq!(l1.status, MatchStatus::Completed);
    assert_eq!(l1.player1_id, None);
    assert_eq!(l1.player2_id, None);
}

#[test]
fn only_the_reset_match_is_terminal() {
    for n in [2, 5, 8, 13] {
        let t = double(n);
        let terminal: Vec<&str> = t
            .matches()
            .filter(|m| m.bracket_side == BracketSide::GrandFinal && m.next_match_id.is_none())
            .map(|m| m.match_id.as_str())
            .collect();
        assert_eq!(terminal, vec!["gf-2"], "n={n}");
        assert_eq!(t.matches().filter(|m| m.next_match_id.is_none()).count(), 1, "n={n}");
        assert_eq!(t.find_match("gf-1").unwrap().next_match_id.as_deref(), Some("gf-2"));
    }
}
