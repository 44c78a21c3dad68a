use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::player::{PlayerCount, Seat};
use crate::model::suit::Suit;
use crate::model::trick::{JokerLeadDeclaration, JokerPlayStyle, PlayedCard, Trick, TrickError};
use crate::rules::play::{PlayChoice, is_legal_play, legal_plays};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A finished trick and the seat that took it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedTrick {
    pub trick: Trick,
    pub winner: Seat,
}

/// Card play for one round: hands, trump, the trick in progress and what has been taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    players: PlayerCount,
    cards_in_round: u8,
    trump: Option<Suit>,
    hands: Vec<Hand>,
    current_trick: Trick,
    trick_history: Vec<CompletedTrick>,
    tricks_taken: Vec<u8>,
}

impl RoundState {
    /// Starts play with `leader` on lead. Every hand must hold `cards_in_round` cards.
    pub fn new(
        players: PlayerCount,
        hands: Vec<Vec<Card>>,
        trump: Option<Suit>,
        leader: Seat,
    ) -> Self {
        assert_eq!(hands.len(), players.count(), "one hand per seat");
        let cards_in_round = hands.first().map(Vec::len).unwrap_or(0);
        assert!(
            hands.iter().all(|hand| hand.len() == cards_in_round),
            "every seat is dealt the same number of cards"
        );
        let cards_in_round = u8::try_from(cards_in_round).unwrap_or(u8::MAX);

        Self {
            players,
            cards_in_round,
            trump,
            hands: hands.into_iter().map(Hand::with_cards).collect(),
            current_trick: Trick::new(players.clamp_seat(leader), players),
            trick_history: Vec::with_capacity(usize::from(cards_in_round)),
            tricks_taken: vec![0; players.count()],
        }
    }

    pub fn players(&self) -> PlayerCount {
        self.players
    }

    pub fn cards_in_round(&self) -> u8 {
        self.cards_in_round
    }

    pub fn trump(&self) -> Option<Suit> {
        self.trump
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[self.players.clamp_seat(seat)]
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[CompletedTrick] {
        &self.trick_history
    }

    pub fn tricks_taken(&self) -> &[u8] {
        &self.tricks_taken
    }

    pub fn tricks_completed(&self) -> usize {
        self.trick_history.len()
    }

    pub fn is_complete(&self) -> bool {
        self.trick_history.len() >= usize::from(self.cards_in_round)
    }

    pub fn expected_player(&self) -> Seat {
        self.current_trick.expected_player()
    }

    /// Every card already played this round, finished tricks first.
    pub fn played_cards(&self) -> impl Iterator<Item = &PlayedCard> {
        self.trick_history
            .iter()
            .flat_map(|done| done.trick.plays().iter())
            .chain(self.current_trick.plays().iter())
    }

    pub fn legal_plays(&self, seat: Seat) -> Vec<PlayChoice> {
        legal_plays(self.hand(seat), self.current_trick.plays(), self.trump)
    }

    pub fn play_card(&mut self, seat: Seat, choice: PlayChoice) -> Result<PlayOutcome, PlayError> {
        if self.is_complete() {
            return Err(PlayError::RoundComplete);
        }

        let expected = self.current_trick.expected_player();
        if expected != seat {
            return Err(PlayError::OutOfTurn { expected, actual: seat });
        }

        let hand = &self.hands[seat];
        if !hand.contains(choice.card) {
            return Err(PlayError::CardNotInHand(choice.card));
        }

        if !choice.card.is_joker()
            && (choice.declaration != JokerLeadDeclaration::None
                || choice.style != JokerPlayStyle::FaceUp)
        {
            return Err(PlayError::InvalidStyle(choice.card));
        }

        if !is_legal_play(hand, self.current_trick.plays(), self.trump, choice) {
            return Err(match self.current_trick.lead_suit() {
                Some(suit) if hand.has_suit(suit) => PlayError::MustFollowSuit(suit),
                Some(_) => match self.trump {
                    Some(trump) if hand.has_suit(trump) => PlayError::MustPlayTrump(trump),
                    _ => PlayError::IllegalPlay(choice.card),
                },
                None => PlayError::IllegalPlay(choice.card),
            });
        }

        self.current_trick
            .play(choice.played_by(seat))
            .map_err(PlayError::Trick)?;
        self.hands[seat].remove(choice.card);

        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Played);
        }

        let winner = self.close_trick();
        if self.is_complete() {
            assert!(
                self.hands.iter().all(Hand::is_empty),
                "all hands are empty once every trick is played"
            );
            return Ok(PlayOutcome::RoundCompleted { winner });
        }
        Ok(PlayOutcome::TrickCompleted { winner })
    }

    /// Credits the winner of the full current trick and opens the next one on their lead.
    fn close_trick(&mut self) -> Seat {
        let winner = self
            .current_trick
            .winner(self.trump)
            .expect("complete trick has a winner");
        self.tricks_taken[winner] = self.tricks_taken[winner].saturating_add(1);
        let finished = std::mem::replace(&mut self.current_trick, Trick::new(winner, self.players));
        self.trick_history.push(CompletedTrick {
            trick: finished,
            winner,
        });
        winner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted { winner: Seat },
    RoundCompleted { winner: Seat },
}

impl PlayOutcome {
    pub fn trick_winner(self) -> Option<Seat> {
        match self {
            PlayOutcome::Played => None,
            PlayOutcome::TrickCompleted { winner } | PlayOutcome::RoundCompleted { winner } => {
                Some(winner)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    RoundComplete,
    CardNotInHand(Card),
    OutOfTurn { expected: Seat, actual: Seat },
    InvalidStyle(Card),
    MustFollowSuit(Suit),
    MustPlayTrump(Suit),
    IllegalPlay(Card),
    Trick(TrickError),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::RoundComplete => write!(f, "every trick of the round has been played"),
            PlayError::CardNotInHand(card) => write!(f, "{card} is not in hand"),
            PlayError::OutOfTurn { expected, actual } => {
                write!(f, "seat {actual} played out of turn; seat {expected} is next")
            }
            PlayError::InvalidStyle(card) => {
                write!(f, "{card} cannot be played face down or with a declaration")
            }
            PlayError::MustFollowSuit(suit) => write!(f, "must follow {suit}"),
            PlayError::MustPlayTrump(suit) => write!(f, "must play trump {suit}"),
            PlayError::IllegalPlay(card) => write!(f, "{card} is not a legal play"),
            PlayError::Trick(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PlayError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::deck::Deck;
    use crate::model::rank::Rank;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn small_round() -> RoundState {
        RoundState::new(
            PlayerCount::Three,
            vec![
                vec![c(Rank::Ace, Suit::Hearts), c(Rank::Seven, Suit::Clubs)],
                vec![c(Rank::Six, Suit::Hearts), Card::Joker],
                vec![c(Rank::King, Suit::Spades), c(Rank::Nine, Suit::Clubs)],
            ],
            Some(Suit::Clubs),
            0,
        )
    }

    #[test]
    fn follow_suit_and_trump_are_enforced() {
        let mut round = small_round();
        round.play_card(0, PlayChoice::regular(c(Rank::Ace, Suit::Hearts))).unwrap();
        assert_eq!(
            round.play_card(1, PlayChoice::regular(c(Rank::Six, Suit::Clubs))),
            Err(PlayError::CardNotInHand(c(Rank::Six, Suit::Clubs)))
        );
        round.play_card(1, PlayChoice::regular(c(Rank::Six, Suit::Hearts))).unwrap();
        assert_eq!(
            round.play_card(2, PlayChoice::regular(c(Rank::King, Suit::Spades))),
            Err(PlayError::MustPlayTrump(Suit::Clubs))
        );
        let outcome = round
            .play_card(2, PlayChoice::regular(c(Rank::Nine, Suit::Clubs)))
            .unwrap();
        assert_eq!(outcome, PlayOutcome::TrickCompleted { winner: 2 });
        assert_eq!(round.tricks_taken(), &[0, 0, 1]);
        assert_eq!(round.expected_player(), 2);
    }

    #[test]
    fn round_completes_with_empty_hands() {
        let mut round = small_round();
        round.play_card(0, PlayChoice::regular(c(Rank::Ace, Suit::Hearts))).unwrap();
        round.play_card(1, PlayChoice::regular(c(Rank::Six, Suit::Hearts))).unwrap();
        round.play_card(2, PlayChoice::regular(c(Rank::Nine, Suit::Clubs))).unwrap();

        round.play_card(2, PlayChoice::regular(c(Rank::King, Suit::Spades))).unwrap();
        round.play_card(0, PlayChoice::regular(c(Rank::Seven, Suit::Clubs))).unwrap();
        let joker = PlayChoice::joker(JokerPlayStyle::FaceUp, JokerLeadDeclaration::None);
        let outcome = round.play_card(1, joker).unwrap();
        assert_eq!(outcome, PlayOutcome::RoundCompleted { winner: 1 });
        assert!(round.is_complete());
        assert_eq!(round.tricks_taken().iter().map(|&t| u32::from(t)).sum::<u32>(), 2);
        assert_eq!(round.played_cards().count(), 6);
        assert_eq!(
            round.play_card(1, PlayChoice::regular(c(Rank::Six, Suit::Hearts))),
            Err(PlayError::RoundComplete)
        );
    }

    #[test]
    #[should_panic(expected = "every seat is dealt the same number of cards")]
    fn uneven_hands_are_rejected() {
        RoundState::new(
            PlayerCount::Three,
            vec![
                vec![c(Rank::Ace, Suit::Hearts), c(Rank::Seven, Suit::Clubs)],
                vec![c(Rank::Six, Suit::Hearts)],
                vec![c(Rank::King, Suit::Spades), c(Rank::Nine, Suit::Clubs)],
            ],
            None,
            0,
        );
    }

    #[test]
    #[should_panic(expected = "one hand per seat")]
    fn missing_hand_is_rejected() {
        RoundState::new(
            PlayerCount::Four,
            vec![vec![c(Rank::Ace, Suit::Hearts)], vec![c(Rank::Six, Suit::Hearts)]],
            None,
            0,
        );
    }

    #[test]
    #[should_panic(expected = "complete trick has a winner")]
    fn closing_an_unfinished_trick_panics() {
        let mut round = small_round();
        round.play_card(0, PlayChoice::regular(c(Rank::Ace, Suit::Hearts))).unwrap();
        round.close_trick();
    }

    #[test]
    #[should_panic(expected = "all hands are empty once every trick is played")]
    fn leftover_card_at_round_end_panics() {
        let mut round = small_round();
        round.hands[2].add(c(Rank::Eight, Suit::Diamonds));
        round.play_card(0, PlayChoice::regular(c(Rank::Ace, Suit::Hearts))).unwrap();
        round.play_card(1, PlayChoice::regular(c(Rank::Six, Suit::Hearts))).unwrap();
        round.play_card(2, PlayChoice::regular(c(Rank::Nine, Suit::Clubs))).unwrap();

        round.play_card(2, PlayChoice::regular(c(Rank::King, Suit::Spades))).unwrap();
        round.play_card(0, PlayChoice::regular(c(Rank::Seven, Suit::Clubs))).unwrap();
        let joker = PlayChoice::joker(JokerPlayStyle::FaceUp, JokerLeadDeclaration::None);
        let _ = round.play_card(1, joker);
    }

    #[test]
    fn regular_cards_cannot_be_played_face_down() {
        let mut round = small_round();
        let choice = PlayChoice {
            card: c(Rank::Ace, Suit::Hearts),
            style: JokerPlayStyle::FaceDown,
            declaration: JokerLeadDeclaration::None,
        };
        assert_eq!(round.play_card(0, choice), Err(PlayError::InvalidStyle(choice.card)));
    }

    #[test]
    fn out_of_turn_is_rejected() {
        let mut round = small_round();
        assert_eq!(
            round.play_card(1, PlayChoice::regular(c(Rank::Six, Suit::Hearts))),
            Err(PlayError::OutOfTurn { expected: 0, actual: 1 })
        );
    }

    #[test]
    fn full_four_player_round_with_legal_moves_takes_every_trick() {
        let mut deck = Deck::shuffled_with_seed(11);
        let hands = deck.deal(4, 9, 1);
        let mut round = RoundState::new(PlayerCount::Four, hands, Some(Suit::Spades), 1);
        while !round.is_complete() {
            let seat = round.expected_player();
            let choice = round.legal_plays(seat)[0];
            round.play_card(seat, choice).unwrap();
        }
        let taken: u32 = round.tricks_taken().iter().map(|&t| u32::from(t)).sum();
        assert_eq!(taken, 9);
        assert!((0..4).all(|seat| round.hand(seat).is_empty()));
    }
}
