// Turn decision engine, end to end through the store and timers.

mod common;
mod support;

use backend::domain::{Phase, PlayerAction, SYSTEM_ACTOR};
use backend::ErrorCode;
use support::{command, harness, running_game};

const PLAYERS: [&str; 3] = ["alice", "bob", "carl"];

fn log_len(h: &support::Harness, session_id: &str) -> usize {
    h.state
        .store
        .list_event_log_after(session_id, None)
        .unwrap()
        .len()
}

#[tokio::test]
async fn replayed_command_returns_current_state_once() {
    let h = harness();
    running_game(&h, "s-1", &PLAYERS, 11).await;
    let before_log = log_len(&h, "s-1");

    let cmd = command(&h, "s-1", "cmd-1", "alice", PlayerAction::TakeCard);
    let first = h.state.engine.apply_command(cmd.clone()).await.unwrap();
    // Same id, now-stale expected version.
    let second = h.state.engine.apply_command(cmd).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(log_len(&h, "s-1"), before_log + 1);
}

#[tokio::test]
async fn every_applied_command_moves_the_version() {
    let h = harness();
    running_game(&h, "s-1", &PLAYERS, 3).await;

    for (i, action) in [
        PlayerAction::PlaceChip,
        PlayerAction::PlaceChip,
        PlayerAction::TakeCard,
        PlayerAction::PlaceChip,
    ]
    .into_iter()
    .enumerate()
    {
        let cmd = command(&h, "s-1", &format!("cmd-{i}"), SYSTEM_ACTOR, action);
        let expected = cmd.expected_version.clone();
        let out = h.state.engine.apply_command(cmd).await.unwrap();

        assert_ne!(out.version, expected);
        let envelope = h.state.store.get_envelope("s-1").unwrap();
        assert_eq!(envelope.version(), out.version);
    }
}

#[tokio::test]
async fn stale_version_is_rejected_without_side_effects() {
    let h = harness();
    running_game(&h, "s-1", &PLAYERS, 3).await;
    let stale = command(&h, "s-1", "late", "alice", PlayerAction::TakeCard);
    h.state
        .engine
        .apply_command(command(&h, "s-1", "first", "alice", PlayerAction::PlaceChip))
        .await
        .unwrap();
    let before = h.state.store.get_envelope("s-1").unwrap().versioned();
    let before_log = log_len(&h, "s-1");

    let err = h.state.engine.apply_command(stale).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::StateVersionMismatch);
    assert_eq!(h.state.store.get_envelope("s-1").unwrap().versioned(), before);
    assert_eq!(log_len(&h, "s-1"), before_log);
    assert!(!h.state.store.has_processed_command("s-1", "late").unwrap());
}

#[tokio::test]
async fn zero_chips_may_take_but_not_place() {
    let h = harness();
    let started = running_game(&h, "s-1", &PLAYERS, 5).await;

    let mut snap = started.snapshot;
    snap.chips.insert("alice".into(), 0);
    snap.central_pot += 11;
    h.state.store.save_snapshot(&snap).unwrap();

    let err = h
        .state
        .engine
        .apply_command(command(&h, "s-1", "place", "alice", PlayerAction::PlaceChip))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ChipInsufficient);

    let out = h
        .state
        .engine
        .apply_command(command(&h, "s-1", "take", "alice", PlayerAction::TakeCard))
        .await
        .unwrap();
    assert_eq!(out.snapshot.chips["alice"], 11);
    assert_eq!(out.snapshot.central_pot, 0);
}

#[tokio::test]
async fn one_chip_may_place() {
    let h = harness();
    let started = running_game(&h, "s-1", &PLAYERS, 5).await;

    let mut snap = started.snapshot;
    snap.chips.insert("alice".into(), 1);
    snap.central_pot += 10;
    h.state.store.save_snapshot(&snap).unwrap();

    let out = h
        .state
        .engine
        .apply_command(command(&h, "s-1", "place", "alice", PlayerAction::PlaceChip))
        .await
        .unwrap();
    assert_eq!(out.snapshot.chips["alice"], 0);
    assert_eq!(out.snapshot.central_pot, 11);
}

#[tokio::test]
async fn last_card_completes_game_and_clears_timer() {
    let h = harness();
    let started = running_game(&h, "s-1", &PLAYERS, 9).await;
    assert_eq!(h.scheduler.pending_count(), 1);

    let mut snap = started.snapshot;
    let mut rest = std::mem::take(&mut snap.deck);
    // Hand the remaining deck to bob so every card stays accounted for.
    snap.hands.get_mut("bob").unwrap().append(&mut rest);
    h.state.store.save_snapshot(&snap).unwrap();

    let out = h
        .state
        .engine
        .apply_command(command(&h, "s-1", "last", "alice", PlayerAction::TakeCard))
        .await
        .unwrap();

    let done = out.snapshot;
    assert_eq!(done.phase, Phase::Completed);
    assert!(!done.turn_state.awaiting_action);
    assert_eq!(done.turn_state.card_in_center, None);
    assert_eq!(done.turn_state.deadline, None);
    let results = done.final_results.expect("final results");
    assert_eq!(results.placements.len(), 3);

    assert_eq!(h.scheduler.pending_count(), 0);
    assert!(h.state.store.get_envelope("s-1").unwrap().deadline_at().is_none());

    let err = h
        .state
        .engine
        .apply_command(command(&h, "s-1", "after", "bob", PlayerAction::TakeCard))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameAlreadyCompleted);
}

#[tokio::test]
async fn system_plays_a_whole_game_to_completion() {
    let h = harness();
    let started = running_game(&h, "s-1", &PLAYERS, 21).await;
    let total_chips = started.snapshot.total_chips();
    let mut expected: Vec<u8> = started.snapshot.all_cards();
    expected.sort_unstable();

    let mut step = 0;
    loop {
        let snap = h.state.store.get_snapshot("s-1").unwrap();
        if snap.phase == Phase::Completed {
            break;
        }
        let current = snap.turn_state.current_player_id.clone().unwrap();
        // Alternate so both actions are exercised; broke players must take.
        let action = if step % 3 == 2 || snap.chips[&current] == 0 {
            PlayerAction::TakeCard
        } else {
            PlayerAction::PlaceChip
        };
        let out = h
            .state
            .engine
            .apply_command(command(&h, "s-1", &format!("step-{step}"), SYSTEM_ACTOR, action))
            .await
            .unwrap();

        assert_eq!(out.snapshot.total_chips(), total_chips);
        let mut cards = out.snapshot.all_cards();
        cards.sort_unstable();
        assert_eq!(cards, expected);
        step += 1;
    }

    let done = h.state.store.get_snapshot("s-1").unwrap();
    let results = done.final_results.unwrap();
    assert_eq!(results.placements[0].rank, 1);
    let collected: usize = done.hands.values().map(Vec::len).sum();
    assert_eq!(collected, 33 - 9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_commands_on_one_version_apply_once() {
    let h = harness();
    running_game(&h, "s-1", &PLAYERS, 4).await;
    let before_log = log_len(&h, "s-1");

    let mut tasks = Vec::new();
    for i in 0..8 {
        let engine = h.state.engine.clone();
        let cmd = command(&h, "s-1", &format!("racer-{i}"), "alice", PlayerAction::PlaceChip);
        tasks.push(tokio::spawn(async move { engine.apply_command(cmd).await }));
    }

    let mut applied = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => applied += 1,
            Err(err) => assert!(matches!(
                err.code(),
                ErrorCode::StateVersionMismatch | ErrorCode::TurnNotAvailable
            )),
        }
    }
    assert_eq!(applied, 1);
    assert_eq!(log_len(&h, "s-1"), before_log + 1);
}

#[tokio::test]
async fn sessions_are_independent() {
    let h = harness();
    running_game(&h, "s-1", &PLAYERS, 1).await;
    running_game(&h, "s-2", &PLAYERS, 2).await;
    let untouched = h.state.store.get_envelope("s-2").unwrap().versioned();

    h.state
        .engine
        .apply_command(command(&h, "s-1", "c", "alice", PlayerAction::TakeCard))
        .await
        .unwrap();

    assert_eq!(h.state.store.get_envelope("s-2").unwrap().versioned(), untouched);
}

#[tokio::test]
async fn applied_commands_are_published() {
    let h = harness();
    running_game(&h, "s-1", &PLAYERS, 1).await;
    let mut rx = h.state.updates.subscribe("s-1");

    let out = h
        .state
        .engine
        .apply_command(command(&h, "s-1", "c", "alice", PlayerAction::PlaceChip))
        .await
        .unwrap();

    let update = rx.recv().await.unwrap();
    assert_eq!(update.session_id, "s-1");
    assert_eq!(update.version, out.version);
}

#[tokio::test]
async fn log_records_action_details() {
    let h = harness();
    let started = running_game(&h, "s-1", &PLAYERS, 6).await;
    let card = started.snapshot.turn_state.card_in_center.unwrap();
    let tail = h
        .state
        .store
        .list_event_log_after("s-1", None)
        .unwrap()
        .last()
        .unwrap()
        .id
        .clone();

    h.state
        .engine
        .apply_command(command(&h, "s-1", "c1", "alice", PlayerAction::PlaceChip))
        .await
        .unwrap();
    h.state
        .engine
        .apply_command(command(&h, "s-1", "c2", "bob", PlayerAction::TakeCard))
        .await
        .unwrap();

    let entries = h.state.store.list_event_log_after("s-1", Some(&tail)).unwrap();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].actor, "alice");
    assert_eq!(entries[0].action, "placeChip");
    assert_eq!(entries[0].chips_delta, Some(-1));
    let details = entries[0].details.as_ref().unwrap();
    assert_eq!(details["card"], card);
    assert_eq!(details["centralPotBefore"], 0);
    assert_eq!(details["centralPotAfter"], 1);

    assert_eq!(entries[1].actor, "bob");
    assert_eq!(entries[1].action, "takeCard");
    assert_eq!(entries[1].chips_delta, Some(1));
    assert_eq!(entries[1].turn, 1);
    assert_ne!(entries[0].id, entries[1].id);
}
