use crate::model::player::PlayerCount;
use serde::{Deserialize, Serialize};

pub const BLOCK_COUNT: usize = 4;

/// Card counts for every round of a match, grouped by block.
///
/// Block 1 climbs from one card to the maximum, block 2 deals the maximum once per seat,
/// block 3 descends back to one and block 4 repeats block 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSchedule {
    blocks: Vec<Vec<u8>>,
}

impl MatchSchedule {
    pub fn new(players: PlayerCount) -> Self {
        let max = u8::try_from(players.max_cards()).unwrap_or(u8::MAX);
        let held = vec![max; players.count()];
        Self {
            blocks: vec![(1..=max).collect(), held.clone(), (1..=max).rev().collect(), held],
        }
    }

    /// Card counts of block `block_number` (1-based; out of range clamps into 1..=4).
    pub fn block(&self, block_number: u8) -> &[u8] {
        let index = usize::from(block_number.clamp(1, 4)) - 1;
        &self.blocks[index]
    }

    pub fn cards_for(&self, block_number: u8, round_in_block: usize) -> Option<u8> {
        self.block(block_number).get(round_in_block).copied()
    }

    pub fn rounds_in_block(&self, block_number: u8) -> usize {
        self.block(block_number).len()
    }

    pub fn total_rounds(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }

    /// `(block_number, cards)` for every round in play order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.blocks.iter().zip(1u8..).flat_map(|(cards, block)| {
            cards.iter().map(move |&count| (block, count))
        })
    }
}
