mod bid;
mod play;
mod power;
mod tracker;
mod trump;

pub use bid::{BidPlanner, BlindPosture};
pub use play::{CandidateEvaluation, PlayPlanner};
pub use power::{card_power, expected_tricks, interpolated_score};
pub use tracker::UnseenTracker;
pub use trump::TrumpPlanner;

use crate::tuning::BotTuning;
use joker_core::model::player::Seat;
use joker_core::model::round::RoundState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl BotDifficulty {
    /// Reads `JOKER_BOT_DIFFICULTY`; unknown or missing values mean normal.
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        read("JOKER_BOT_DIFFICULTY")
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => BotDifficulty::Easy,
            "hard" => BotDifficulty::Hard,
            _ => BotDifficulty::Normal,
        }
    }

    pub fn tuning(self) -> BotTuning {
        match self {
            BotDifficulty::Easy => BotTuning::easy(),
            BotDifficulty::Normal => BotTuning::normal(),
            BotDifficulty::Hard => BotTuning::hard(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BotDifficulty::Easy => "easy",
            BotDifficulty::Normal => "normal",
            BotDifficulty::Hard => "hard",
        }
    }
}

/// Everything the play planner reads for one decision.
#[derive(Debug, Clone, Copy)]
pub struct BotContext<'a> {
    pub seat: Seat,
    pub round: &'a RoundState,
    pub bid: u8,
    pub blind: bool,
    pub tracker: &'a UnseenTracker,
    pub tuning: &'a BotTuning,
}
