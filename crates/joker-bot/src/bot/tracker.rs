use joker_core::model::card::Card;
use joker_core::model::deck::Deck;
use joker_core::model::hand::Hand;
use joker_core::model::player::Seat;
use joker_core::model::round::RoundState;

/// Cards a seat has not seen this round: the deck minus its own hand minus every card
/// already on the table. Jokers are counted as a multiset.
#[derive(Debug, Clone, Default)]
pub struct UnseenTracker {
    unseen: Vec<Card>,
}

impl UnseenTracker {
    pub fn new() -> Self {
        Self {
            unseen: Deck::standard().cards().to_vec(),
        }
    }

    pub fn from_round(round: &RoundState, seat: Seat) -> Self {
        let mut tracker = Self::new();
        tracker.reset_for_round(round, seat);
        tracker
    }

    pub fn reset_for_round(&mut self, round: &RoundState, seat: Seat) {
        self.unseen = Deck::standard().cards().to_vec();
        self.remove_hand(round.hand(seat));
        for play in round.played_cards() {
            self.note_card(play.card);
        }
    }

    pub fn remove_hand(&mut self, hand: &Hand) {
        for &card in hand.iter() {
            self.note_card(card);
        }
    }

    pub fn note_card(&mut self, card: Card) {
        if let Some(index) = self.unseen.iter().position(|&c| c == card) {
            self.unseen.swap_remove(index);
        }
    }

    pub fn unseen(&self) -> &[Card] {
        &self.unseen
    }

    pub fn unseen_count(&self) -> usize {
        self.unseen.len()
    }

    pub fn is_unseen(&self, card: Card) -> bool {
        self.unseen.contains(&card)
    }
}

#[cfg(test)]
mod tests {
    use super::UnseenTracker;
    use joker_core::model::card::Card;
    use joker_core::model::player::PlayerCount;
    use joker_core::model::rank::Rank;
    use joker_core::model::round::RoundState;
    use joker_core::model::suit::Suit;
    use joker_core::rules::play::PlayChoice;

    #[test]
    fn hand_and_table_cards_are_not_unseen() {
        let ace = Card::new(Rank::Ace, Suit::Hearts);
        let six = Card::new(Rank::Six, Suit::Hearts);
        let mut round = RoundState::new(
            PlayerCount::Three,
            vec![vec![ace], vec![six], vec![Card::Joker]],
            None,
            0,
        );
        round.play_card(0, PlayChoice::regular(ace)).unwrap();

        let tracker = UnseenTracker::from_round(&round, 2);
        assert_eq!(tracker.unseen_count(), 34);
        assert!(!tracker.is_unseen(ace));
        assert!(tracker.is_unseen(six));
        // One joker is in hand; the other is still out there.
        assert!(tracker.is_unseen(Card::Joker));
    }
}
