use crate::game::schedule::{BLOCK_COUNT, MatchSchedule};
use crate::model::card::Card;
use crate::model::player::{PlayerCount, Seat};
use crate::model::round::{PlayError, PlayOutcome, RoundState};
use crate::model::score::{BlockResult, RoundResult, ScoreManager};
use crate::model::suit::Suit;
use crate::rules::bidding::{self, BLIND_BLOCK};
use crate::rules::play::PlayChoice;
use crate::rules::trump::{TrumpMode, trump_mode};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    NotStarted,
    Bidding,
    Playing,
    RoundEnd,
    GameEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    WrongPhase { expected: GamePhase, actual: GamePhase },
    OutOfTurn { expected: Option<Seat>, actual: Seat },
    BlindNotAllowed(Seat),
    BlindPhasePending,
    AlreadyDealt,
    NotDealt,
    BidsIncomplete,
    InvalidDeal { expected_cards: usize },
    Play(PlayError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::WrongPhase { expected, actual } => {
                write!(f, "expected phase {expected:?} but game is in {actual:?}")
            }
            GameError::OutOfTurn {
                expected: Some(expected),
                actual,
            } => write!(f, "seat {actual} acted out of turn; seat {expected} is next"),
            GameError::OutOfTurn {
                expected: None,
                actual,
            } => write!(f, "seat {actual} acted but nobody is due to act"),
            GameError::BlindNotAllowed(seat) => write!(f, "seat {seat} may not bid blind now"),
            GameError::BlindPhasePending => write!(f, "blind bids are still being decided"),
            GameError::AlreadyDealt => write!(f, "cards have already been dealt this round"),
            GameError::NotDealt => write!(f, "cards have not been dealt yet"),
            GameError::BidsIncomplete => write!(f, "not every seat has bid"),
            GameError::InvalidDeal { expected_cards } => {
                write!(f, "every seat must be dealt exactly {expected_cards} cards")
            }
            GameError::Play(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<PlayError> for GameError {
    fn from(err: PlayError) -> Self {
        GameError::Play(err)
    }
}

/// Step-by-step state of a full match: bidding, card play and scoring for every round of
/// the four blocks. Callers deal cards and make decisions; the state validates each step.
#[derive(Debug, Clone)]
pub struct GameState {
    players: PlayerCount,
    schedule: MatchSchedule,
    partial_deal_cards: usize,
    phase: GamePhase,
    block_number: u8,
    round_in_block: usize,
    dealer: Seat,
    bids: Vec<Option<u8>>,
    blind: Vec<bool>,
    blind_decided: Vec<bool>,
    round: Option<RoundState>,
    scores: ScoreManager,
}

impl GameState {
    pub fn new(players: PlayerCount, partial_deal_cards: usize) -> Self {
        Self {
            players,
            schedule: MatchSchedule::new(players),
            partial_deal_cards,
            phase: GamePhase::NotStarted,
            block_number: 1,
            round_in_block: 0,
            dealer: 0,
            bids: vec![None; players.count()],
            blind: vec![false; players.count()],
            blind_decided: vec![false; players.count()],
            round: None,
            scores: ScoreManager::new(players),
        }
    }

    pub fn players(&self) -> PlayerCount {
        self.players
    }

    pub fn schedule(&self) -> &MatchSchedule {
        &self.schedule
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_block(&self) -> u8 {
        self.block_number
    }

    pub fn current_round_in_block(&self) -> usize {
        self.round_in_block
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn cards_in_round(&self) -> u8 {
        self.schedule
            .cards_for(self.block_number, self.round_in_block)
            .unwrap_or(1)
    }

    pub fn trump_mode(&self) -> TrumpMode {
        trump_mode(
            usize::from(self.cards_in_round()),
            self.players,
            self.dealer,
            self.partial_deal_cards,
        )
    }

    pub fn bids(&self) -> &[Option<u8>] {
        &self.bids
    }

    pub fn blind_bids(&self) -> &[bool] {
        &self.blind
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn scores(&self) -> &ScoreManager {
        &self.scores
    }

    /// Tricks won so far this round, zero before the deal.
    pub fn tricks_taken(&self) -> Vec<u8> {
        self.round
            .as_ref()
            .map(|round| round.tricks_taken().to_vec())
            .unwrap_or_else(|| vec![0; self.players.count()])
    }

    pub fn bidding_order(&self) -> Vec<Seat> {
        bidding::bidding_order(self.dealer, self.players)
    }

    /// Seat whose turn it is to act in the current phase.
    pub fn current_player(&self) -> Option<Seat> {
        match self.phase {
            GamePhase::Bidding if self.blind_phase_active() => self.current_blind_decider(),
            GamePhase::Bidding => self.current_bidder(),
            GamePhase::Playing => self.round.as_ref().map(RoundState::expected_player),
            _ => None,
        }
    }

    pub fn start_game(&mut self) -> Result<(), GameError> {
        self.expect_phase(GamePhase::NotStarted)?;
        self.phase = GamePhase::Bidding;
        Ok(())
    }

    /// The blind sub-phase runs before the deal in the final block until every seat has
    /// either locked a blind bid or declined.
    pub fn blind_phase_active(&self) -> bool {
        self.phase == GamePhase::Bidding
            && self.block_number == BLIND_BLOCK
            && self.round.is_none()
            && self.blind_decided.iter().any(|decided| !decided)
    }

    pub fn current_blind_decider(&self) -> Option<Seat> {
        self.bidding_order()
            .into_iter()
            .find(|&seat| !self.blind_decided[seat])
    }

    pub fn can_bid_blind(&self, seat: Seat) -> bool {
        let others_chosen = self
            .blind_decided
            .iter()
            .enumerate()
            .filter(|&(other, decided)| other != seat && *decided)
            .count();
        self.blind_phase_active()
            && self.current_blind_decider() == Some(seat)
            && bidding::can_bid_blind(
                self.block_number,
                seat == self.dealer,
                others_chosen,
                self.players,
            )
    }

    pub fn legal_blind_bids(&self, seat: Seat) -> Vec<u8> {
        let others_blind_total = self.others_all_blind(seat).then(|| self.others_bid_total(seat));
        bidding::legal_blind_bids(self.cards_in_round(), seat == self.dealer, others_blind_total)
    }

    /// Locks a bid before the deal. Illegal values fall back to the first legal blind bid.
    pub fn set_blind_bid(&mut self, seat: Seat, bid: u8) -> Result<u8, GameError> {
        self.expect_phase(GamePhase::Bidding)?;
        if self.round.is_some() {
            return Err(GameError::AlreadyDealt);
        }
        if !self.can_bid_blind(seat) {
            return Err(GameError::BlindNotAllowed(seat));
        }
        let bid = bidding::sanitize_bid(bid, &self.legal_blind_bids(seat));
        self.bids[seat] = Some(bid);
        self.blind[seat] = true;
        self.blind_decided[seat] = true;
        Ok(bid)
    }

    pub fn decline_blind_bid(&mut self, seat: Seat) -> Result<(), GameError> {
        self.expect_phase(GamePhase::Bidding)?;
        if !self.blind_phase_active() {
            return Err(GameError::BlindNotAllowed(seat));
        }
        let expected = self.current_blind_decider();
        if expected != Some(seat) {
            return Err(GameError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        self.blind_decided[seat] = true;
        Ok(())
    }

    /// Installs the dealt hands (indexed by seat) and the round's trump.
    pub fn deal(&mut self, hands: Vec<Vec<Card>>, trump: Option<Suit>) -> Result<(), GameError> {
        self.expect_phase(GamePhase::Bidding)?;
        if self.round.is_some() {
            return Err(GameError::AlreadyDealt);
        }
        if self.blind_phase_active() {
            return Err(GameError::BlindPhasePending);
        }
        let expected_cards = usize::from(self.cards_in_round());
        if hands.len() != self.players.count() || hands.iter().any(|hand| hand.len() != expected_cards) {
            return Err(GameError::InvalidDeal { expected_cards });
        }
        let leader = self.players.next(self.dealer);
        self.round = Some(RoundState::new(self.players, hands, trump, leader));
        Ok(())
    }

    pub fn current_bidder(&self) -> Option<Seat> {
        if self.phase != GamePhase::Bidding {
            return None;
        }
        self.bidding_order()
            .into_iter()
            .find(|&seat| self.bids[seat].is_none())
    }

    pub fn legal_bids(&self, seat: Seat) -> Vec<u8> {
        bidding::legal_bids(
            self.cards_in_round(),
            seat == self.dealer,
            self.others_bid_total(seat),
        )
    }

    /// Records a bid after the deal. Illegal values fall back to the first legal bid; the
    /// value actually recorded is returned.
    pub fn set_bid(&mut self, seat: Seat, bid: u8) -> Result<u8, GameError> {
        self.expect_phase(GamePhase::Bidding)?;
        if self.round.is_none() {
            return Err(GameError::NotDealt);
        }
        let expected = self.current_bidder();
        if expected != Some(seat) {
            return Err(GameError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        let bid = bidding::sanitize_bid(bid, &self.legal_bids(seat));
        self.bids[seat] = Some(bid);
        Ok(bid)
    }

    pub fn begin_playing(&mut self) -> Result<(), GameError> {
        self.expect_phase(GamePhase::Bidding)?;
        if self.round.is_none() {
            return Err(GameError::NotDealt);
        }
        if self.bids.iter().any(Option::is_none) {
            return Err(GameError::BidsIncomplete);
        }
        self.phase = GamePhase::Playing;
        Ok(())
    }

    pub fn legal_plays(&self, seat: Seat) -> Vec<PlayChoice> {
        match (&self.round, self.phase) {
            (Some(round), GamePhase::Playing) if round.expected_player() == seat => {
                round.legal_plays(seat)
            }
            _ => Vec::new(),
        }
    }

    /// Plays one card. Completing the last trick moves the game to `RoundEnd`.
    pub fn play_card(&mut self, seat: Seat, choice: PlayChoice) -> Result<PlayOutcome, GameError> {
        self.expect_phase(GamePhase::Playing)?;
        let round = self.round.as_mut().ok_or(GameError::NotDealt)?;
        let outcome = round.play_card(seat, choice)?;
        if let PlayOutcome::RoundCompleted { .. } = outcome {
            self.phase = GamePhase::RoundEnd;
        }
        Ok(outcome)
    }

    /// Scores the finished round, finalizing the block when it was the block's last round,
    /// and moves on to the next deal (or the end of the game).
    pub fn complete_round(&mut self) -> Result<Option<BlockResult>, GameError> {
        self.expect_phase(GamePhase::RoundEnd)?;
        let round = self.round.take().ok_or(GameError::NotDealt)?;

        let results: Vec<RoundResult> = (0..self.players.count())
            .map(|seat| {
                RoundResult::new(
                    round.cards_in_round(),
                    self.bids[seat].unwrap_or(0),
                    round.tricks_taken()[seat],
                    self.blind[seat],
                )
            })
            .collect();
        self.scores.record_round_results(&results);

        self.round_in_block += 1;
        let mut finished_block = None;
        if self.round_in_block >= self.schedule.rounds_in_block(self.block_number) {
            finished_block = Some(self.scores.finalize_block(self.block_number));
            self.block_number += 1;
            self.round_in_block = 0;
        }

        self.dealer = self.players.next(self.dealer);
        self.bids.iter_mut().for_each(|bid| *bid = None);
        self.blind.iter_mut().for_each(|blind| *blind = false);
        self.blind_decided.iter_mut().for_each(|decided| *decided = false);

        self.phase = if usize::from(self.block_number) > BLOCK_COUNT {
            self.block_number = BLOCK_COUNT as u8;
            GamePhase::GameEnd
        } else {
            GamePhase::Bidding
        };
        Ok(finished_block)
    }

    fn expect_phase(&self, expected: GamePhase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn others_bid_total(&self, seat: Seat) -> u32 {
        self.bids
            .iter()
            .enumerate()
            .filter(|&(other, _)| other != seat)
            .filter_map(|(_, bid)| bid.map(u32::from))
            .sum()
    }

    fn others_all_blind(&self, seat: Seat) -> bool {
        self.blind
            .iter()
            .enumerate()
            .all(|(other, &blind)| other == seat || blind)
    }
}
