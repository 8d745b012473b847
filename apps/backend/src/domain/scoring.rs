//! End-of-game settlement: card-set scoring, ranking and tie-break report.

use crate::domain::snapshot::{
    Card, GameSnapshot, Placement, ScoreSummary, TieBreak, TieBreakReason,
};

/// Split sorted cards into maximal runs of consecutive values.
pub fn card_sets(sorted: &[Card]) -> Vec<Vec<Card>> {
    let mut sets: Vec<Vec<Card>> = Vec::new();
    for &card in sorted {
        match sets.last_mut() {
            Some(run) if run.last().is_some_and(|&last| last + 1 == card) => run.push(card),
            _ => sets.push(vec![card]),
        }
    }
    sets
}

/// Chips minus the lowest card of each run. Higher is better.
pub fn score_for(chips_remaining: u32, sets: &[Vec<Card>]) -> i32 {
    let cost: i32 = sets
        .iter()
        .filter_map(|set| set.first())
        .map(|&c| i32::from(c))
        .sum();
    chips_remaining as i32 - cost
}

/// Compute placements and tie-break for a finished snapshot.
///
/// Ordering is score desc, chips desc, then player id asc for determinism.
/// Equal (score, chips) pairs share a rank; the next group gets rank + 1.
pub fn calculate_score_summary(snapshot: &GameSnapshot) -> ScoreSummary {
    let mut placements: Vec<Placement> = snapshot
        .players
        .iter()
        .map(|player| {
            let mut cards = snapshot
                .hands
                .get(&player.id)
                .cloned()
                .unwrap_or_default();
            cards.sort_unstable();
            let chips_remaining = snapshot.chips.get(&player.id).copied().unwrap_or(0);
            let sets = card_sets(&cards);
            Placement {
                rank: 0,
                player_id: player.id.clone(),
                score: score_for(chips_remaining, &sets),
                chips_remaining,
                cards,
                card_sets: sets,
            }
        })
        .collect();

    placements.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.chips_remaining.cmp(&a.chips_remaining))
            .then(a.player_id.cmp(&b.player_id))
    });

    let mut rank = 0;
    let mut previous: Option<(i32, u32)> = None;
    for placement in placements.iter_mut() {
        let key = (placement.score, placement.chips_remaining);
        if previous != Some(key) {
            rank += 1;
            previous = Some(key);
        }
        placement.rank = rank;
    }

    let tie_break = tie_break_for(&placements);
    ScoreSummary {
        placements,
        tie_break,
    }
}

fn tie_break_for(placements: &[Placement]) -> Option<TieBreak> {
    let tied_score = placements.iter().map(|p| p.score).find(|score| {
        placements.iter().filter(|p| p.score == *score).count() >= 2
    })?;

    let group: Vec<&Placement> = placements
        .iter()
        .filter(|p| p.score == tied_score)
        .collect();
    let max_chips = group.iter().map(|p| p.chips_remaining).max()?;
    let leaders: Vec<&&Placement> = group
        .iter()
        .filter(|p| p.chips_remaining == max_chips)
        .collect();

    Some(TieBreak {
        reason: TieBreakReason::ChipCount,
        tied_score,
        contenders: group.iter().map(|p| p.player_id.clone()).collect(),
        winner: match leaders.as_slice() {
            [only] => Some(only.player_id.clone()),
            _ => None,
        },
    })
}
