mod heuristic;

pub use heuristic::HeuristicPolicy;

use crate::bot::UnseenTracker;
use joker_core::model::card::Card;
use joker_core::model::player::Seat;
use joker_core::model::round::RoundState;
use joker_core::model::suit::Suit;
use joker_core::rules::play::PlayChoice;

/// Inputs for the optional blind bid offered before the deal.
pub struct BlindBidContext<'a> {
    pub seat: Seat,
    pub cards_in_round: u8,
    pub legal_bids: &'a [u8],
    /// Running match totals, indexed by seat.
    pub totals: &'a [i32],
}

pub struct BidContext<'a> {
    pub seat: Seat,
    pub hand: &'a [Card],
    pub cards_in_round: u8,
    pub trump: Option<Suit>,
    pub legal_bids: &'a [u8],
    pub totals: &'a [i32],
}

pub struct TrumpContext<'a> {
    pub seat: Seat,
    /// The first cards dealt to the chooser.
    pub visible: &'a [Card],
}

pub struct PlayContext<'a> {
    pub seat: Seat,
    pub round: &'a RoundState,
    pub bid: u8,
    pub blind: bool,
    pub tracker: &'a UnseenTracker,
}

/// Decision seam shared by bots and any human-driven front end.
pub trait Policy: Send {
    /// `None` declines the blind bid.
    fn choose_blind_bid(&mut self, ctx: &BlindBidContext) -> Option<u8>;

    fn choose_bid(&mut self, ctx: &BidContext) -> u8;

    /// `None` declares no-trump.
    fn choose_trump(&mut self, ctx: &TrumpContext) -> Option<Suit>;

    fn choose_play(&mut self, ctx: &PlayContext) -> PlayChoice;
}
