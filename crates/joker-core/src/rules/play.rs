use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::model::trick::{JokerLeadDeclaration, JokerPlayStyle, PlayedCard, lead_suit};
use serde::{Deserialize, Serialize};

/// A card plus how it is laid down. Regular cards are always face-up with no declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayChoice {
    pub card: Card,
    pub style: JokerPlayStyle,
    pub declaration: JokerLeadDeclaration,
}

impl PlayChoice {
    pub const fn regular(card: Card) -> Self {
        Self {
            card,
            style: JokerPlayStyle::FaceUp,
            declaration: JokerLeadDeclaration::None,
        }
    }

    pub const fn joker(style: JokerPlayStyle, declaration: JokerLeadDeclaration) -> Self {
        Self {
            card: Card::Joker,
            style,
            declaration,
        }
    }

    pub const fn played_by(self, player: Seat) -> PlayedCard {
        PlayedCard {
            player,
            card: self.card,
            style: self.style,
            declaration: self.declaration,
        }
    }
}

/// Distinct cards from `hand` that may be played onto `plays`.
///
/// Jokers are always playable. Otherwise a player holding the lead suit must follow it
/// (with their highest card of it when a joker led with `above`/`takes`), and a player
/// void in the lead suit must trump when able.
pub fn legal_cards(hand: &Hand, plays: &[PlayedCard], trump: Option<Suit>) -> Vec<Card> {
    let mut cards: Vec<Card> = hand.cards().to_vec();
    cards.dedup();

    let Some(lead) = lead_suit(plays) else {
        return cards;
    };

    if hand.has_suit(lead) {
        let joker_demand = plays
            .first()
            .is_some_and(|first| first.card.is_joker() && first.declaration.demanded_suit().is_some());
        if joker_demand {
            let highest = cards
                .iter()
                .copied()
                .filter(|card| card.is_suit(lead))
                .max_by_key(|card| card.rank());
            return cards
                .into_iter()
                .filter(|card| card.is_joker() || Some(*card) == highest)
                .collect();
        }
        return cards
            .into_iter()
            .filter(|card| card.is_joker() || card.is_suit(lead))
            .collect();
    }

    if let Some(trump) = trump.filter(|suit| hand.has_suit(*suit)) {
        return cards
            .into_iter()
            .filter(|card| card.is_joker() || card.is_suit(trump))
            .collect();
    }

    cards
}

/// Every legal (card, style, declaration) move, in ascending order.
pub fn legal_plays(hand: &Hand, plays: &[PlayedCard], trump: Option<Suit>) -> Vec<PlayChoice> {
    let leading = plays.is_empty();
    let mut choices = Vec::new();
    for card in legal_cards(hand, plays, trump) {
        if !card.is_joker() {
            choices.push(PlayChoice::regular(card));
            continue;
        }
        if leading {
            choices.push(PlayChoice::joker(JokerPlayStyle::FaceUp, JokerLeadDeclaration::Wish));
            for suit in Suit::ALL {
                choices.push(PlayChoice::joker(
                    JokerPlayStyle::FaceUp,
                    JokerLeadDeclaration::Above(suit),
                ));
                choices.push(PlayChoice::joker(
                    JokerPlayStyle::FaceDown,
                    JokerLeadDeclaration::Takes(suit),
                ));
            }
        } else {
            choices.push(PlayChoice::joker(JokerPlayStyle::FaceUp, JokerLeadDeclaration::None));
            choices.push(PlayChoice::joker(JokerPlayStyle::FaceDown, JokerLeadDeclaration::None));
        }
    }
    choices.sort();
    choices
}

pub fn is_legal_play(
    hand: &Hand,
    plays: &[PlayedCard],
    trump: Option<Suit>,
    choice: PlayChoice,
) -> bool {
    legal_plays(hand, plays, trump).contains(&choice)
}
