use crate::domain::scoring::{calculate_score_summary, card_sets, score_for};
use crate::domain::snapshot::{Phase, TieBreakReason};
use crate::domain::test_state_helpers::{running_snapshot, RunningSnapshotArgs};

fn completed(
    chips: Vec<(&'static str, u32)>,
    hands: Vec<(&'static str, Vec<u8>)>,
) -> crate::domain::snapshot::GameSnapshot {
    running_snapshot(RunningSnapshotArgs {
        chips,
        hands,
        deck: Vec::new(),
        card_in_center: None,
        phase: Phase::Completed,
        ..RunningSnapshotArgs::default()
    })
}

#[test]
fn runs_are_split_on_gaps() {
    assert_eq!(card_sets(&[3, 4, 7]), vec![vec![3, 4], vec![7]]);
    assert_eq!(card_sets(&[9, 10, 11]), vec![vec![9, 10, 11]]);
    assert!(card_sets(&[]).is_empty());
    assert_eq!(card_sets(&[5, 7, 9]), vec![vec![5], vec![7], vec![9]]);
}

#[test]
fn run_costs_only_its_minimum() {
    assert_eq!(score_for(0, &card_sets(&[20, 21, 22])), -20);
    assert_eq!(score_for(0, &card_sets(&[20, 22])), -42);
    assert_eq!(score_for(8, &[]), 8);
}

#[test]
fn chip_count_breaks_shared_score() {
    let snap = completed(
        vec![("alice", 5), ("bob", 4), ("carl", 8)],
        vec![("alice", vec![7, 3, 4]), ("bob", vec![9, 10, 11])],
    );
    let summary = calculate_score_summary(&snap);

    let order: Vec<(&str, u32, i32)> = summary
        .placements
        .iter()
        .map(|p| (p.player_id.as_str(), p.rank, p.score))
        .collect();
    assert_eq!(order, vec![("carl", 1, 8), ("alice", 2, -5), ("bob", 3, -5)]);

    let alice = &summary.placements[1];
    assert_eq!(alice.cards, vec![3, 4, 7]);
    assert_eq!(alice.card_sets, vec![vec![3, 4], vec![7]]);

    let tie = summary.tie_break.expect("alice and bob share a score");
    assert_eq!(tie.reason, TieBreakReason::ChipCount);
    assert_eq!(tie.tied_score, -5);
    assert_eq!(tie.contenders, vec!["alice".to_string(), "bob".to_string()]);
    assert_eq!(tie.winner.as_deref(), Some("alice"));
}

#[test]
fn full_tie_shares_rank_and_leaves_winner_open() {
    let snap = completed(
        vec![("alice", 2), ("bob", 2), ("carl", 10)],
        vec![("alice", vec![6]), ("bob", vec![16, 17]), ("carl", vec![30])],
    );
    // alice: 2 - 6 = -4; bob: 2 - 16 = -14; carl: 10 - 30 = -20
    let summary = calculate_score_summary(&snap);
    assert!(summary.tie_break.is_none());

    let snap = completed(
        vec![("bob", 3), ("alice", 3), ("carl", 1)],
        vec![("alice", vec![10]), ("bob", vec![4, 6])],
    );
    let summary = calculate_score_summary(&snap);
    let ranks: Vec<(&str, u32)> = summary
        .placements
        .iter()
        .map(|p| (p.player_id.as_str(), p.rank))
        .collect();
    assert_eq!(ranks, vec![("carl", 1), ("alice", 2), ("bob", 2)]);

    let tie = summary.tie_break.expect("alice and bob are fully tied");
    assert_eq!(tie.tied_score, -7);
    assert_eq!(tie.winner, None);
}

#[test]
fn next_group_after_tie_is_consecutive_rank() {
    let snap = completed(
        vec![("alice", 4), ("bob", 4), ("carl", 0)],
        vec![("carl", vec![35])],
    );
    let summary = calculate_score_summary(&snap);
    let ranks: Vec<u32> = summary.placements.iter().map(|p| p.rank).collect();
    assert_eq!(ranks, vec![1, 1, 2]);
}

#[test]
fn no_shared_score_means_no_tie_break() {
    let snap = completed(vec![("alice", 1), ("bob", 2), ("carl", 3)], Vec::new());
    let summary = calculate_score_summary(&snap);
    assert!(summary.tie_break.is_none());
    assert_eq!(summary.placements[0].player_id, "carl");
}

#[test]
fn scoring_is_deterministic() {
    let snap = completed(
        vec![("alice", 5), ("bob", 4), ("carl", 8)],
        vec![("alice", vec![3, 4, 7]), ("bob", vec![9, 10, 11])],
    );
    assert_eq!(calculate_score_summary(&snap), calculate_score_summary(&snap));
}
