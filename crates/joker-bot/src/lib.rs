pub mod bot;
pub mod policy;
pub mod tuning;

pub use bot::{
    BidPlanner, BlindPosture, BotContext, BotDifficulty, PlayPlanner, TrumpPlanner, UnseenTracker,
};
pub use policy::{BidContext, BlindBidContext, HeuristicPolicy, PlayContext, Policy, TrumpContext};
pub use tuning::{
    BiddingTuning, BotTuning, TimingTuning, TrumpSelectionTuning, TurnStrategyTuning,
};
