//! Integration tests for the command service and the repositories behind it.

use cobblemon_bracket::service::SeedEntry;
use cobblemon_bracket::{
    BracketType, CreateTournament, EngineConfig, JsonFileRepository, MatchResult,
    MemoryRepository, Roster, SeedingMode, ServiceError, StoreError, TournamentCommand,
    TournamentError, TournamentFilter, TournamentRepository, TournamentService, TournamentStatus,
};
use std::sync::Arc;
use std::thread;

fn ids(n: u32) -> Vec<String> {
    (1..=n).map(|s| format!("s{s}")).collect()
}

fn memory_service() -> TournamentService {
    TournamentService::new(Arc::new(MemoryRepository::new()), EngineConfig::default())
}

#[test]
fn create_then_read_twice_is_identical() {
    let svc = memory_service();
    let created = svc.create(CreateTournament::new("Copa", ids(5), BracketType::Single)).unwrap();
    assert_eq!(created.version, 1);

    let first = svc.queries().tournament(created.id).unwrap();
    let second = svc.queries().tournament(created.id).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, created);
}

#[test]
fn results_flow_through_and_complete() {
    let svc = memory_service();
    let t = svc.create(CreateTournament::new("Copa", ids(4), BracketType::Single)).unwrap();
    svc.update_status(t.id, TournamentStatus::Active).unwrap();
    svc.set_match_result(t.id, MatchResult::new("w1-m0", "s1")).unwrap();
    svc.set_match_result(t.id, MatchResult::new("w1-m1", "s2")).unwrap();
    let done = svc
        .set_match_result(t.id, MatchResult::new("w2-m0", "s2").with_scores(2, 3))
        .unwrap();
    assert_eq!(done.status, TournamentStatus::Completed);
    assert_eq!(done.winner_id.as_deref(), Some("s2"));
    assert_eq!(done.version, 5);

    let err = svc
        .set_match_result(t.id, MatchResult::new("w2-m0", "s1"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Tournament(TournamentError::MatchAlreadyCompleted(_))
    ));
}

#[test]
fn rejected_result_is_not_persisted() {
    let svc = memory_service();
    let t = svc.create(CreateTournament::new("Copa", ids(4), BracketType::Single)).unwrap();
    let err = svc
        .set_match_result(t.id, MatchResult::new("w1-m0", "s3"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Tournament(TournamentError::InvalidWinner { .. })
    ));
    assert_eq!(svc.queries().tournament(t.id).unwrap(), t);
}

#[test]
fn unknown_tournament() {
    let svc = memory_service();
    let id = uuid::Uuid::new_v4();
    let err = svc.set_match_result(id, MatchResult::new("w1-m0", "s1")).unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::NotFound(x)) if x == id));
}

#[test]
fn create_needs_exactly_one_roster_form() {
    let svc = memory_service();
    let mut request = CreateTournament::new("Copa", ids(4), BracketType::Single);
    request.participants = Some(vec![]);
    assert!(matches!(svc.create(request), Err(ServiceError::InvalidRequest(_))));

    let mut request = CreateTournament::new("Copa", ids(4), BracketType::Single);
    request.participant_ids = None;
    assert!(matches!(svc.create(request), Err(ServiceError::InvalidRequest(_))));
}

#[test]
fn explicit_seeds_and_display_names() {
    let roster = Roster::from_reader(
        "id,nickname,discordUsername,minecraftUsername\nu1,Ash,,\nu2,,misty,\n".as_bytes(),
    )
    .unwrap();
    let svc = memory_service().with_roster(roster);
    let mut request = CreateTournament::new("Copa", vec![], BracketType::Single);
    request.participant_ids = None;
    request.participants = Some(vec![
        SeedEntry { id: "u2".into(), seed: 1, display_name: None },
        SeedEntry { id: "u1".into(), seed: 2, display_name: None },
        SeedEntry { id: "u3".into(), seed: 3, display_name: Some("Brock".into()) },
    ]);
    let t = svc.create(request).unwrap();
    let names: Vec<_> = t.participants.iter().map(|p| p.label().to_string()).collect();
    assert_eq!(names, vec!["misty", "Ash", "Brock"]);
}

#[test]
fn random_seeding_keeps_everyone() {
    let svc = memory_service();
    let mut request = CreateTournament::new("Copa", ids(9), BracketType::Double);
    request.seeding = SeedingMode::Random;
    let t = svc.create(request).unwrap();
    let mut seen: Vec<_> = t.participants.iter().map(|p| p.id.clone()).collect();
    seen.sort();
    let mut expected = ids(9);
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn only_drafts_can_be_deleted() {
    let svc = memory_service();
    let draft = svc.create(CreateTournament::new("Borrador", ids(2), BracketType::Single)).unwrap();
    svc.delete(draft.id).unwrap();
    assert!(matches!(
        svc.queries().tournament(draft.id),
        Err(StoreError::NotFound(_))
    ));

    let live = svc.create(CreateTournament::new("En curso", ids(2), BracketType::Single)).unwrap();
    svc.update_status(live.id, TournamentStatus::Active).unwrap();
    assert!(matches!(
        svc.delete(live.id),
        Err(ServiceError::Tournament(TournamentError::NotDraft(TournamentStatus::Active)))
    ));
}

#[test]
fn list_filters_by_status() {
    let svc = memory_service();
    let a = svc.create(CreateTournament::new("A", ids(2), BracketType::Single)).unwrap();
    let b = svc.create(CreateTournament::new("B", ids(2), BracketType::Double)).unwrap();
    svc.update_status(b.id, TournamentStatus::Active).unwrap();

    let all = svc.queries().list(&TournamentFilter::default()).unwrap();
    assert_eq!(all.len(), 2);
    let drafts = svc.queries().list(&TournamentFilter::with_status(TournamentStatus::Draft)).unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].id, a.id);
    let doubles = svc
        .queries()
        .list(&TournamentFilter { bracket_type: Some(BracketType::Double), ..Default::default() })
        .unwrap();
    assert_eq!(doubles.len(), 1);
    assert_eq!(doubles[0].id, b.id);
}

#[test]
fn concurrent_results_for_one_tournament_all_land() {
    let svc = Arc::new(memory_service());
    let t = svc.create(CreateTournament::new("Copa", ids(16), BracketType::Single)).unwrap();

    // Sibling matches feed the same quarterfinal slots from different threads.
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let svc = Arc::clone(&svc);
            let id = t.id;
            thread::spawn(move || {
                let m = svc.queries().tournament(id).unwrap();
                let game = m.find_match(&format!("w1-m{i}")).unwrap().clone();
                let winner = game.player1_id.unwrap();
                svc.set_match_result(id, MatchResult::new(game.match_id, winner)).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let t = svc.queries().tournament(t.id).unwrap();
    assert_eq!(t.version, 9);
    for q in &t.rounds[1].matches {
        assert!(q.has_both_players(), "{} is missing a player", q.match_id);
    }
}

#[test]
fn json_repository_round_trips_through_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Arc::new(JsonFileRepository::open(dir.path()).unwrap());
    let svc = TournamentService::new(repo.clone(), EngineConfig::default());

    let t = svc.create(CreateTournament::new("Copa", ids(3), BracketType::Double)).unwrap();
    svc.execute(
        t.id,
        TournamentCommand::SetMatchResult(MatchResult::new("w1-m1", "s3")),
    )
    .unwrap();

    // A fresh handle on the same directory sees the saved aggregate.
    let reopened = JsonFileRepository::open(dir.path()).unwrap();
    let stored = reopened.load(t.id).unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.find_match("w2-m0").unwrap().player2_id.as_deref(), Some("s3"));
    assert_eq!(reopened.list(&TournamentFilter::default()).unwrap().len(), 1);

    // Saving the stale copy fails.
    assert!(matches!(
        reopened.save(&t),
        Err(StoreError::VersionConflict { expected: 1, found: 2 })
    ));

    reopened.delete(t.id).unwrap();
    assert!(matches!(repo.load(t.id), Err(StoreError::NotFound(_))));
}

#[test]
fn admin_can_name_the_champion_after_forcing_completion() {
    let svc = memory_service();
    let t = svc.create(CreateTournament::new("Copa", ids(6), BracketType::Double)).unwrap();
    let forced = svc.update_status(t.id, TournamentStatus::Completed).unwrap();
    assert_eq!(forced.winner_id, None);

    let err = svc.set_winner(t.id, "s9").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Tournament(TournamentError::UnknownParticipant(ref id)) if id == "s9"
    ));

    let done = svc.set_winner(t.id, "s4").unwrap();
    assert_eq!(done.winner_id.as_deref(), Some("s4"));
    assert!(done.admin_override);
    let standings = svc.queries().standings(t.id).unwrap();
    assert!(standings.iter().any(|s| s.champion && s.participant.id == "s4"));

    assert!(matches!(
        svc.set_winner(t.id, "s1"),
        Err(ServiceError::Tournament(TournamentError::TournamentCompleted))
    ));
}
