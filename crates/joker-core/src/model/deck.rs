use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const DECK_SIZE: usize = 36;
pub const JOKER_COUNT: usize = 2;

/// The fixed 36-card deck plus a cursor marking how many cards have been dealt.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ranks_for(suit).iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        cards.extend(std::iter::repeat_n(Card::Joker, JOKER_COUNT));
        Self { cards, next: 0 }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    /// Shuffles the whole deck and rewinds the deal cursor.
    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.next = 0;
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }

    /// Deals `cards_each` cards to every one of `players` seats, round robin, with seat
    /// `start_seat` receiving the first card. Returned hands are indexed by seat and keep
    /// the order the cards were dealt in.
    ///
    /// Panics when the deck cannot cover the deal.
    pub fn deal(&mut self, players: usize, cards_each: usize, start_seat: usize) -> Vec<Vec<Card>> {
        assert!(players > 0, "deal requires at least one player");
        let needed = players * cards_each;
        assert!(
            needed <= self.remaining(),
            "deal of {needed} cards exceeds the {} left in the deck",
            self.remaining()
        );

        let mut hands = vec![Vec::with_capacity(cards_each); players];
        for offset in 0..needed {
            let seat = (start_seat + offset) % players;
            hands[seat].push(self.cards[self.next]);
            self.next += 1;
        }
        hands
    }

    /// Takes the next undealt card, e.g. to flip the trump indicator.
    pub fn draw(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied()?;
        self.next += 1;
        Some(card)
    }
}

#[cfg(test)]
mod tests {
    use super::{DECK_SIZE, Deck};
    use crate::model::card::Card;
    use crate::model::suit::Suit;
    use std::collections::HashSet;

    #[test]
    fn standard_deck_has_fixed_composition() {
        let deck = Deck::standard();
        assert_eq!(deck.cards().len(), DECK_SIZE);

        let jokers = deck.cards().iter().filter(|c| c.is_joker()).count();
        assert_eq!(jokers, 2);

        let regular: HashSet<Card> = deck.cards().iter().copied().filter(|c| !c.is_joker()).collect();
        assert_eq!(regular.len(), 34);

        let count = |suit: Suit| deck.cards().iter().filter(|c| c.is_suit(suit)).count();
        assert_eq!(count(Suit::Diamonds), 9);
        assert_eq!(count(Suit::Hearts), 9);
        assert_eq!(count(Suit::Spades), 8);
        assert_eq!(count(Suit::Clubs), 8);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::shuffled_with_seed(1);
        let deck_b = Deck::shuffled_with_seed(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn deal_is_round_robin_from_start_seat() {
        let mut deck = Deck::standard();
        let order: Vec<Card> = deck.cards().to_vec();
        let hands = deck.deal(4, 2, 1);

        assert_eq!(hands[1], vec![order[0], order[4]]);
        assert_eq!(hands[2], vec![order[1], order[5]]);
        assert_eq!(hands[3], vec![order[2], order[6]]);
        assert_eq!(hands[0], vec![order[3], order[7]]);
        assert_eq!(deck.remaining(), DECK_SIZE - 8);
        assert_eq!(deck.draw(), Some(order[8]));
    }

    #[test]
    fn full_deal_for_three_players_uses_every_card() {
        let mut deck = Deck::shuffled_with_seed(7);
        let hands = deck.deal(3, 12, 0);
        assert!(hands.iter().all(|hand| hand.len() == 12));
        assert_eq!(deck.remaining(), 0);
        assert_eq!(deck.draw(), None);
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn dealing_past_exhaustion_panics() {
        let mut deck = Deck::standard();
        let _ = deck.deal(4, 10, 0);
    }
}
