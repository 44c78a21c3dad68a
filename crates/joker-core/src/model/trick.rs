use crate::model::card::Card;
use crate::model::player::{PlayerCount, Seat};
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a joker is laid on the table. Face-down jokers are throwaways and never win.
/// `FaceDown` orders before `FaceUp` so tie-breaks prefer the cheaper play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JokerPlayStyle {
    FaceDown,
    FaceUp,
}

/// What a joker leading a trick asks of the other players.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum JokerLeadDeclaration {
    #[default]
    None,
    Wish,
    Above(Suit),
    Takes(Suit),
}

impl JokerLeadDeclaration {
    pub const fn demanded_suit(self) -> Option<Suit> {
        match self {
            JokerLeadDeclaration::Above(suit) | JokerLeadDeclaration::Takes(suit) => Some(suit),
            JokerLeadDeclaration::None | JokerLeadDeclaration::Wish => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayedCard {
    pub player: Seat,
    pub card: Card,
    pub style: JokerPlayStyle,
    pub declaration: JokerLeadDeclaration,
}

impl PlayedCard {
    pub const fn regular(player: Seat, card: Card) -> Self {
        Self {
            player,
            card,
            style: JokerPlayStyle::FaceUp,
            declaration: JokerLeadDeclaration::None,
        }
    }

    pub const fn joker(
        player: Seat,
        style: JokerPlayStyle,
        declaration: JokerLeadDeclaration,
    ) -> Self {
        Self {
            player,
            card: Card::Joker,
            style,
            declaration,
        }
    }

    pub const fn is_face_up_joker(&self) -> bool {
        self.card.is_joker() && matches!(self.style, JokerPlayStyle::FaceUp)
    }

    pub const fn is_face_down_joker(&self) -> bool {
        self.card.is_joker() && matches!(self.style, JokerPlayStyle::FaceDown)
    }
}

/// Suit the trick is played in: the lead card's suit, or the suit a leading joker
/// names with `above`/`takes`. A joker led with `wish` (or nothing) sets no suit.
pub fn lead_suit(plays: &[PlayedCard]) -> Option<Suit> {
    let first = plays.first()?;
    match first.card {
        Card::Regular { suit, .. } => Some(suit),
        Card::Joker => first.declaration.demanded_suit(),
    }
}

/// Resolves the winner of a (possibly partial) trick. Returns `None` only for an empty trick.
pub fn trick_winner(plays: &[PlayedCard], trump: Option<Suit>) -> Option<Seat> {
    let first = plays.first()?;

    if let Some(joker) = plays.iter().rev().find(|play| play.is_face_up_joker()) {
        return Some(joker.player);
    }

    let highest_of = |target: Suit| {
        plays
            .iter()
            .filter_map(|play| match play.card {
                Card::Regular { suit, rank } if suit == target => Some((rank, play.player)),
                _ => None,
            })
            .max_by_key(|(rank, _)| *rank)
            .map(|(_, player)| player)
    };

    if let Some(winner) = trump.and_then(|suit| highest_of(suit)) {
        return Some(winner);
    }
    if let Some(winner) = lead_suit(plays).and_then(|suit| highest_of(suit)) {
        return Some(winner);
    }

    plays
        .iter()
        .find(|play| !play.card.is_joker())
        .map(|play| play.player)
        .or(Some(first.player))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trick {
    leader: Seat,
    players: PlayerCount,
    plays: Vec<PlayedCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrickError {
    TrickComplete,
    OutOfTurn { expected: Seat, actual: Seat },
    DeclarationOutOfLead,
}

impl fmt::Display for TrickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrickError::TrickComplete => write!(f, "trick already complete"),
            TrickError::OutOfTurn { expected, actual } => {
                write!(f, "expected seat {expected} to play next but got seat {actual}")
            }
            TrickError::DeclarationOutOfLead => {
                write!(f, "joker declarations are only allowed on the lead")
            }
        }
    }
}

impl std::error::Error for TrickError {}

impl Trick {
    pub fn new(leader: Seat, players: PlayerCount) -> Self {
        Self {
            leader,
            players,
            plays: Vec::with_capacity(players.count()),
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn plays(&self) -> &[PlayedCard] {
        &self.plays
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == self.players.count()
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        lead_suit(&self.plays)
    }

    /// Declaration of a joker that led this trick, if any.
    pub fn lead_declaration(&self) -> JokerLeadDeclaration {
        self.plays
            .first()
            .filter(|play| play.card.is_joker())
            .map(|play| play.declaration)
            .unwrap_or_default()
    }

    pub fn expected_player(&self) -> Seat {
        self.plays
            .last()
            .map(|play| self.players.next(play.player))
            .unwrap_or(self.leader)
    }

    pub fn play(&mut self, played: PlayedCard) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        let expected = self.expected_player();
        if expected != played.player {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: played.player,
            });
        }

        if !self.plays.is_empty() && played.declaration != JokerLeadDeclaration::None {
            return Err(TrickError::DeclarationOutOfLead);
        }

        self.plays.push(played);
        Ok(())
    }

    pub fn winner(&self, trump: Option<Suit>) -> Option<Seat> {
        if !self.is_complete() {
            return None;
        }
        trick_winner(&self.plays, trump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rank::Rank;

    fn card(player: Seat, rank: Rank, suit: Suit) -> PlayedCard {
        PlayedCard::regular(player, Card::new(rank, suit))
    }

    fn face_up(player: Seat) -> PlayedCard {
        PlayedCard::joker(player, JokerPlayStyle::FaceUp, JokerLeadDeclaration::None)
    }

    fn face_down(player: Seat) -> PlayedCard {
        PlayedCard::joker(player, JokerPlayStyle::FaceDown, JokerLeadDeclaration::None)
    }

    #[test]
    fn empty_trick_has_no_winner() {
        assert_eq!(trick_winner(&[], Some(Suit::Hearts)), None);
    }

    #[test]
    fn highest_card_of_lead_suit_wins() {
        let plays = [
            card(0, Rank::Ten, Suit::Clubs),
            card(1, Rank::Queen, Suit::Clubs),
            card(2, Rank::Ace, Suit::Diamonds),
            card(3, Rank::Eight, Suit::Clubs),
        ];
        assert_eq!(trick_winner(&plays, None), Some(1));
    }

    #[test]
    fn lowest_trump_beats_highest_lead_card() {
        let plays = [
            card(0, Rank::Ace, Suit::Clubs),
            card(1, Rank::Six, Suit::Hearts),
            card(2, Rank::King, Suit::Clubs),
            card(3, Rank::Seven, Suit::Spades),
        ];
        assert_eq!(trick_winner(&plays, Some(Suit::Hearts)), Some(1));
    }

    #[test]
    fn face_up_joker_beats_trump() {
        let plays = [
            card(0, Rank::Ace, Suit::Hearts),
            face_up(1),
            card(2, Rank::King, Suit::Hearts),
        ];
        assert_eq!(trick_winner(&plays, Some(Suit::Hearts)), Some(1));
    }

    #[test]
    fn later_face_up_joker_wins() {
        let plays = [
            PlayedCard::joker(0, JokerPlayStyle::FaceUp, JokerLeadDeclaration::Wish),
            card(1, Rank::Nine, Suit::Spades),
            face_up(2),
            card(3, Rank::Ace, Suit::Spades),
        ];
        assert_eq!(trick_winner(&plays, Some(Suit::Spades)), Some(2));
    }

    #[test]
    fn face_down_joker_never_wins() {
        let plays = [
            card(0, Rank::Seven, Suit::Diamonds),
            face_down(1),
            card(2, Rank::Eight, Suit::Diamonds),
        ];
        assert_eq!(trick_winner(&plays, None), Some(2));
    }

    #[test]
    fn lead_player_wins_when_nobody_follows_and_no_trump() {
        let plays = [
            card(2, Rank::Seven, Suit::Diamonds),
            card(3, Rank::Ace, Suit::Clubs),
            card(0, Rank::Ace, Suit::Spades),
        ];
        assert_eq!(trick_winner(&plays, None), Some(2));
    }

    #[test]
    fn takes_declaration_sets_lead_suit() {
        let plays = [
            PlayedCard::joker(0, JokerPlayStyle::FaceDown, JokerLeadDeclaration::Takes(Suit::Hearts)),
            card(1, Rank::Nine, Suit::Hearts),
            card(2, Rank::Ace, Suit::Spades),
            card(3, Rank::Queen, Suit::Hearts),
        ];
        assert_eq!(lead_suit(&plays), Some(Suit::Hearts));
        assert_eq!(trick_winner(&plays, None), Some(3));
    }

    #[test]
    fn face_down_lead_without_followers_goes_to_first_regular_card() {
        let plays = [
            PlayedCard::joker(0, JokerPlayStyle::FaceDown, JokerLeadDeclaration::Takes(Suit::Hearts)),
            card(1, Rank::Nine, Suit::Clubs),
            card(2, Rank::Ace, Suit::Spades),
        ];
        assert_eq!(trick_winner(&plays, None), Some(1));
    }

    #[test]
    fn wish_lead_has_no_lead_suit() {
        let plays = [PlayedCard::joker(1, JokerPlayStyle::FaceUp, JokerLeadDeclaration::Wish)];
        assert_eq!(lead_suit(&plays), None);
        assert_eq!(trick_winner(&plays, None), Some(1));
    }

    #[test]
    fn trick_enforces_turn_order() {
        let mut trick = Trick::new(1, PlayerCount::Three);
        trick.play(card(1, Rank::Six, Suit::Hearts)).unwrap();
        assert_eq!(
            trick.play(card(0, Rank::Seven, Suit::Hearts)),
            Err(TrickError::OutOfTurn { expected: 2, actual: 0 })
        );
        trick.play(card(2, Rank::Seven, Suit::Hearts)).unwrap();
        assert!(trick.winner(None).is_none());
        trick.play(card(0, Rank::Eight, Suit::Hearts)).unwrap();
        assert!(trick.is_complete());
        assert_eq!(trick.winner(None), Some(0));
        assert_eq!(
            trick.play(card(1, Rank::Nine, Suit::Hearts)),
            Err(TrickError::TrickComplete)
        );
    }

    #[test]
    fn declarations_only_on_lead() {
        let mut trick = Trick::new(0, PlayerCount::Four);
        trick.play(card(0, Rank::Six, Suit::Hearts)).unwrap();
        let bad = PlayedCard::joker(1, JokerPlayStyle::FaceUp, JokerLeadDeclaration::Wish);
        assert_eq!(trick.play(bad), Err(TrickError::DeclarationOutOfLead));
    }
}
