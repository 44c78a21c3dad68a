use crate::model::card::Card;
use crate::model::player::{PlayerCount, Seat};
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrumpMode {
    /// Trump is the next card off the deck after the deal.
    Automatic,
    /// `chooser` sees their first `visible_cards` cards and names a suit or no-trump.
    PlayerChosen { chooser: Seat, visible_cards: usize },
}

/// Rounds dealing the full hand let the player left of the dealer pick trump.
pub fn trump_mode(
    cards_in_round: usize,
    players: PlayerCount,
    dealer: Seat,
    partial_deal_cards: usize,
) -> TrumpMode {
    if cards_in_round >= players.max_cards() {
        TrumpMode::PlayerChosen {
            chooser: players.next(players.clamp_seat(dealer)),
            visible_cards: partial_deal_cards.clamp(1, cards_in_round.max(1)),
        }
    } else {
        TrumpMode::Automatic
    }
}

/// A flipped joker (or no card at all) means the round is played without trump.
pub fn trump_from_card(card: Option<Card>) -> Option<Suit> {
    card.and_then(Card::suit)
}
