//! Result propagation: winners move up, losers drop into the losers bracket, the final decides
//! the tournament. Also settles byes that appear in the losers bracket and recomputes standings.

use crate::logic::match_state::{record_result, MatchResult};
use crate::models::{
    BracketType, Match, MatchId, ParticipantId, Slot, Tournament, TournamentError,
    TournamentStatus,
};
use chrono::Utc;

/// Submit a match result and propagate it through the bracket.
///
/// Works on a copy and only replaces `tournament` once everything succeeded, so a failed
/// submission leaves the aggregate exactly as it was.
pub fn set_match_result(tournament: &mut Tournament, result: &MatchResult) -> Result<(), TournamentError> {
    let mut next = tournament.clone();
    record_result(&mut next, result)?;
    advance(&mut next, &result.match_id)?;
    settle_byes(&mut next)?;
    refresh_standings(&mut next);
    next.touch();
    *tournament = next;
    Ok(())
}

fn place(
    tournament: &mut Tournament,
    from: &str,
    target: &str,
    slot: Slot,
    player: ParticipantId,
) -> Result<(), TournamentError> {
    let m = tournament
        .find_match_mut(target)
        .ok_or_else(|| TournamentError::BrokenBracket(from.to_string()))?;
    if m.player(slot).is_some_and(|p| *p != player) || m.is_completed() {
        return Err(TournamentError::BrokenBracket(from.to_string()));
    }
    m.set_player(slot, player);
    Ok(())
}

fn complete_tournament(tournament: &mut Tournament, winner: ParticipantId) {
    tournament.winner_id = Some(winner);
    tournament.status = TournamentStatus::Completed;
    tournament.completed_at.get_or_insert_with(Utc::now);
}

/// Admin override: end the tournament now with `winner_id` as champion.
///
/// Unplayed matches stay as they are. Rejected once a champion exists.
pub fn declare_winner(tournament: &mut Tournament, winner_id: &str) -> Result<(), TournamentError> {
    if tournament.winner_id.is_some() {
        return Err(TournamentError::TournamentCompleted);
    }
    if tournament.participant(winner_id).is_none() {
        return Err(TournamentError::UnknownParticipant(winner_id.to_string()));
    }
    complete_tournament(tournament, winner_id.to_string());
    tournament.admin_override = true;
    tournament.touch();
    Ok(())
}

/// Route the outcome of a completed match into its downstream matches.
pub(crate) fn advance(tournament: &mut Tournament, match_id: &str) -> Result<(), TournamentError> {
    let m = tournament
        .find_match(match_id)
        .cloned()
        .ok_or_else(|| TournamentError::MatchNotFound(match_id.to_string()))?;
    let Some(winner) = m.winner_id.clone() else {
        // Void match: nobody to route. Downstream slots become byes in `settle_byes`.
        return Ok(());
    };

    if tournament.reset_match_id.as_deref() == Some(match_id) {
        complete_tournament(tournament, winner);
        return Ok(());
    }

    if tournament.final_match_id == match_id {
        let reset = tournament.reset_match_id.clone();
        match reset {
            // Losers-bracket champion sits in slot 2 and just handed the winners champion a first loss.
            Some(reset_id) if m.player2_id.as_ref() == Some(&winner) => {
                let (p1, p2) = match (m.player1_id.clone(), m.player2_id.clone()) {
                    (Some(p1), Some(p2)) => (p1, p2),
                    _ => return Err(TournamentError::BrokenBracket(m.match_id.clone())),
                };
                place(tournament, match_id, &reset_id, Slot::Player1, p1)?;
                place(tournament, match_id, &reset_id, Slot::Player2, p2)?;
            }
            _ => complete_tournament(tournament, winner),
        }
        return Ok(());
    }

    if let (Some(next), Some(slot)) = (&m.next_match_id, m.next_slot) {
        place(tournament, match_id, next, slot, winner.clone())?;
    }

    if tournament.bracket_type == BracketType::Double {
        if let (Some(loser), Some(next), Some(slot)) =
            (m.loser_id().cloned(), &m.next_loser_match_id, m.next_loser_slot)
        {
            place(tournament, match_id, next, slot, loser)?;
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SlotState {
    Filled,
    /// Feeder still undecided, or no feeder at all (dormant reset match).
    Awaiting,
    /// Feeder is decided and will never send anyone.
    Dead,
}

fn slot_state(tournament: &Tournament, m: &Match, slot: Slot) -> SlotState {
    if m.player(slot).is_some() {
        return SlotState::Filled;
    }
    let winner_feed = tournament.matches().find(|f| {
        f.next_match_id.as_deref() == Some(m.match_id.as_str()) && f.next_slot == Some(slot)
    });
    if let Some(f) = winner_feed {
        return if f.is_completed() && f.winner_id.is_none() {
            SlotState::Dead
        } else {
            SlotState::Awaiting
        };
    }
    let loser_feed = tournament.matches().find(|f| {
        f.next_loser_match_id.as_deref() == Some(m.match_id.as_str())
            && f.next_loser_slot == Some(slot)
    });
    match loser_feed {
        Some(f) if f.is_completed() && f.loser_id().is_none() => SlotState::Dead,
        _ => SlotState::Awaiting,
    }
}

/// Find the next unresolved match that can only ever receive one participant (or none).
fn next_unplayable(tournament: &Tournament) -> Option<(MatchId, Option<ParticipantId>)> {
    tournament
        .matches()
        .filter(|m| !m.is_completed())
        .find_map(|m| {
            let s1 = slot_state(tournament, m, Slot::Player1);
            let s2 = slot_state(tournament, m, Slot::Player2);
            match (s1, s2) {
                (SlotState::Filled, SlotState::Dead) => Some((m.match_id.clone(), m.player1_id.clone())),
                (SlotState::Dead, SlotState::Filled) => Some((m.match_id.clone(), m.player2_id.clone())),
                (SlotState::Dead, SlotState::Dead) => Some((m.match_id.clone(), None)),
                _ => None,
            }
        })
}

/// Resolve byes created by missing players further down the bracket until nothing changes.
///
/// Only double elimination produces these: a first-round bye has no loser, so the
/// losers-bracket slot it would feed stays empty forever.
pub(crate) fn settle_byes(tournament: &mut Tournament) -> Result<(), TournamentError> {
    while let Some((match_id, present)) = next_unplayable(tournament) {
        let m = tournament
            .find_match_mut(&match_id)
            .ok_or_else(|| TournamentError::MatchNotFound(match_id.clone()))?;
        match present {
            Some(player) => m.resolve_bye(player, Utc::now()),
            None => m.resolve_void(Utc::now()),
        }
        advance(tournament, &match_id)?;
    }
    Ok(())
}

/// Recompute wins, losses and elimination of every participant from completed matches.
pub(crate) fn refresh_standings(tournament: &mut Tournament) {
    let lives = tournament.bracket_type.lives();
    for p in tournament.participants.iter_mut() {
        p.reset_standing();
    }
    // Order is winners rounds, grand finals, then losers rounds. A grand-final loser's first
    // loss is always in the winners bracket, so `eliminated_in` still names the second loss.
    let outcomes: Vec<(MatchId, ParticipantId, ParticipantId)> = tournament
        .matches()
        .filter(|m| m.was_played())
        .filter_map(|m| {
            let winner = m.winner_id.clone()?;
            let loser = m.loser_id().cloned()?;
            Some((m.match_id.clone(), winner, loser))
        })
        .collect();
    for (match_id, winner, loser) in outcomes {
        if let Some(p) = tournament.participants.iter_mut().find(|p| p.id == winner) {
            p.wins += 1;
        }
        if let Some(p) = tournament.participants.iter_mut().find(|p| p.id == loser) {
            p.losses += 1;
            if p.losses >= lives && !p.eliminated {
                p.eliminated = true;
                p.eliminated_in = Some(match_id);
            }
        }
    }
}
