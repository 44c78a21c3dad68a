//! Round scoring and the block-level premium / penalty cascade.

use crate::model::player::{PlayerCount, Seat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fixed bonus for bidding and taking zero in every round of block 1 or 3.
pub const ZERO_PREMIUM_BONUS: i32 = 500;

/// Score of a single round for one player.
///
/// | Condition | Score |
/// |---|---|
/// | taken = bid = cards | bid × 100 |
/// | taken = bid < cards | bid × 50 + 50 |
/// | taken > bid | taken × 10 |
/// | taken < bid | −(bid − taken) × 50 − 50 |
///
/// A blind bid doubles the signed result.
pub fn round_score(cards_in_round: u8, bid: u8, tricks_taken: u8, is_blind: bool) -> i32 {
    let cards = i32::from(cards_in_round);
    let bid = i32::from(bid);
    let taken = i32::from(tricks_taken);

    let score = if taken == bid && bid == cards {
        bid * 100
    } else if taken == bid {
        bid * 50 + 50
    } else if taken > bid {
        taken * 10
    } else {
        -(bid - taken) * 50 - 50
    };

    if is_blind { score * 2 } else { score }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub cards_in_round: u8,
    pub bid: u8,
    pub tricks_taken: u8,
    pub is_blind: bool,
    /// Premium bonus injected by block finalization; only ever set on a block's last round.
    #[serde(default)]
    adjustment: i32,
}

impl RoundResult {
    pub const fn new(cards_in_round: u8, bid: u8, tricks_taken: u8, is_blind: bool) -> Self {
        Self {
            cards_in_round,
            bid,
            tricks_taken,
            is_blind,
            adjustment: 0,
        }
    }

    pub const fn bid_matched(&self) -> bool {
        self.bid == self.tricks_taken
    }

    pub fn base_score(&self) -> i32 {
        round_score(self.cards_in_round, self.bid, self.tricks_taken, self.is_blind)
    }

    pub fn score(&self) -> i32 {
        self.base_score() + self.adjustment
    }

    pub const fn adjustment(&self) -> i32 {
        self.adjustment
    }

    fn is_zero_round(&self) -> bool {
        self.bid == 0 && self.tricks_taken == 0
    }
}

/// Where a penalty amount came from, kept for score-table diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltySource {
    pub round_index: usize,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockResult {
    pub block_number: u8,
    /// Per player, in round order, with premium bonuses already injected.
    pub rounds: Vec<Vec<RoundResult>>,
    pub base_scores: Vec<i32>,
    pub premium_players: BTreeSet<Seat>,
    pub zero_premium_players: BTreeSet<Seat>,
    pub bonuses: Vec<i32>,
    pub penalties: Vec<i32>,
    pub penalty_sources: Vec<Option<PenaltySource>>,
    pub final_scores: Vec<i32>,
}

impl BlockResult {
    pub fn holds_premium(&self, seat: Seat) -> bool {
        self.premium_players.contains(&seat) || self.zero_premium_players.contains(&seat)
    }
}

/// Finalizes one block from each player's ordered round results.
///
/// Premium holders get their bonus added into their last round; each holder then
/// penalizes the nearest player to their left who holds no premium.
pub fn finalize_block(per_player: &[Vec<RoundResult>], block_number: u8) -> BlockResult {
    let block_number = block_number.clamp(1, 4);
    let players = per_player.len();
    let mut rounds = per_player.to_vec();

    let base_scores: Vec<i32> = rounds
        .iter()
        .map(|list| list.iter().map(RoundResult::base_score).sum())
        .collect();

    let zero_premium_block = matches!(block_number, 1 | 3);
    let mut premium_players = BTreeSet::new();
    let mut zero_premium_players = BTreeSet::new();
    let mut bonuses = vec![0; players];

    for (seat, list) in rounds.iter_mut().enumerate() {
        let eligible = !list.is_empty() && list.iter().all(RoundResult::bid_matched);
        if !eligible {
            continue;
        }

        let bonus = if zero_premium_block && list.iter().all(RoundResult::is_zero_round) {
            zero_premium_players.insert(seat);
            ZERO_PREMIUM_BONUS
        } else {
            premium_players.insert(seat);
            max_score_before_last(list)
        };

        bonuses[seat] = bonus;
        if let Some(last) = list.last_mut() {
            last.adjustment += bonus;
        }
    }

    let mut penalties = vec![0; players];
    let mut penalty_sources = vec![None; players];
    for holder in 0..players {
        let holds = premium_players.contains(&holder) || zero_premium_players.contains(&holder);
        if !holds {
            continue;
        }
        let target = (1..players)
            .map(|offset| (holder + offset) % players)
            .find(|seat| !premium_players.contains(seat) && !zero_premium_players.contains(seat));
        let Some(target) = target else {
            continue;
        };

        if let Some(source) = max_positive_before_last(&rounds[target]) {
            penalties[target] += source.score;
            penalty_sources[target].get_or_insert(source);
        }
    }

    let final_scores = rounds
        .iter()
        .zip(&penalties)
        .map(|(list, penalty)| list.iter().map(RoundResult::score).sum::<i32>() - penalty)
        .collect();

    BlockResult {
        block_number,
        rounds,
        base_scores,
        premium_players,
        zero_premium_players,
        bonuses,
        penalties,
        penalty_sources,
        final_scores,
    }
}

fn max_score_before_last(list: &[RoundResult]) -> i32 {
    if list.len() <= 1 {
        return 0;
    }
    list[..list.len() - 1]
        .iter()
        .map(RoundResult::base_score)
        .max()
        .unwrap_or(0)
}

/// Earliest round (excluding the last) holding the player's best positive score.
fn max_positive_before_last(list: &[RoundResult]) -> Option<PenaltySource> {
    if list.len() <= 1 {
        return None;
    }
    let mut best: Option<PenaltySource> = None;
    for (round_index, round) in list[..list.len() - 1].iter().enumerate() {
        let score = round.base_score();
        if score <= 0 {
            continue;
        }
        if best.is_none_or(|current| score > current.score) {
            best = Some(PenaltySource { round_index, score });
        }
    }
    best
}

/// Running score sheet for a match: rounds of the block in progress plus finalized blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreManager {
    players: usize,
    current: Vec<Vec<RoundResult>>,
    completed: Vec<BlockResult>,
}

impl ScoreManager {
    pub fn new(players: PlayerCount) -> Self {
        Self {
            players: players.count(),
            current: vec![Vec::new(); players.count()],
            completed: Vec::new(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.players
    }

    /// Records one round for every player. Lists of the wrong length are truncated, or
    /// padded with zero-bid results for the missing seats.
    pub fn record_round_results(&mut self, results: &[RoundResult]) {
        let Some(first) = results.first() else {
            return;
        };
        let filler = RoundResult::new(first.cards_in_round, 0, 0, false);
        for seat in 0..self.players {
            let result = results.get(seat).copied().unwrap_or(filler);
            self.current[seat].push(result);
        }
    }

    pub fn rounds_in_current_block(&self) -> usize {
        self.current.first().map(Vec::len).unwrap_or(0)
    }

    pub fn current_block_rounds(&self) -> &[Vec<RoundResult>] {
        &self.current
    }

    /// Closes the block in progress and starts an empty one.
    pub fn finalize_block(&mut self, block_number: u8) -> BlockResult {
        let rounds = std::mem::replace(&mut self.current, vec![Vec::new(); self.players]);
        let result = finalize_block(&rounds, block_number);
        self.completed.push(result.clone());
        result
    }

    pub fn completed_blocks(&self) -> &[BlockResult] {
        &self.completed
    }

    pub fn total_scores(&self) -> Vec<i32> {
        let mut totals = vec![0; self.players];
        for block in &self.completed {
            for (total, score) in totals.iter_mut().zip(&block.final_scores) {
                *total += score;
            }
        }
        totals
    }

    /// Completed blocks plus the raw scores of rounds already played in the current block.
    pub fn total_scores_including_current_block(&self) -> Vec<i32> {
        let mut totals = self.total_scores();
        for (total, list) in totals.iter_mut().zip(&self.current) {
            *total += list.iter().map(RoundResult::score).sum::<i32>();
        }
        totals
    }
}
