use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A playing card. The derived ordering sorts regular cards by suit then rank and
/// places jokers after every regular card; bots rely on it for deterministic tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Card {
    Regular { suit: Suit, rank: Rank },
    Joker,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Card::Regular { suit, rank }
    }

    pub const fn is_joker(self) -> bool {
        matches!(self, Card::Joker)
    }

    pub const fn suit(self) -> Option<Suit> {
        match self {
            Card::Regular { suit, .. } => Some(suit),
            Card::Joker => None,
        }
    }

    pub const fn rank(self) -> Option<Rank> {
        match self {
            Card::Regular { rank, .. } => Some(rank),
            Card::Joker => None,
        }
    }

    pub fn is_suit(self, suit: Suit) -> bool {
        self.suit() == Some(suit)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Regular { suit, rank } => write!(f, "{rank}{suit}"),
            Card::Joker => f.write_str("JK"),
        }
    }
}
