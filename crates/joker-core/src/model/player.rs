use crate::model::deck::DECK_SIZE;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Seats are plain indices `0..PlayerCount::count()`; "left" means the next index.
pub type Seat = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlayerCount {
    Three = 3,
    Four = 4,
}

impl PlayerCount {
    /// Maps a raw count onto a supported table size; only 3 selects the short table.
    pub const fn from_count(count: usize) -> Self {
        match count {
            3 => PlayerCount::Three,
            _ => PlayerCount::Four,
        }
    }

    pub const fn count(self) -> usize {
        self as usize
    }

    /// Largest hand that can be dealt from the 36-card deck.
    pub const fn max_cards(self) -> usize {
        DECK_SIZE / self.count()
    }

    pub const fn next(self, seat: Seat) -> Seat {
        (seat + 1) % self.count()
    }

    /// Seats in clockwise order starting from `first`.
    pub fn order_from(self, first: Seat) -> impl Iterator<Item = Seat> {
        let count = self.count();
        (0..count).map(move |offset| (first + offset) % count)
    }

    /// Out-of-range seat indices fall back to seat 0.
    pub const fn clamp_seat(self, seat: Seat) -> Seat {
        if seat < self.count() { seat } else { 0 }
    }
}

impl fmt::Display for PlayerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} players", self.count())
    }
}
