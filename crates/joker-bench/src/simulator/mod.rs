//! Drives complete matches between [`Policy`] implementations.
//!
//! The simulator owns no randomness: callers pass the generator, and only dealing consumes
//! it, so the same seed replays the same cards whatever the seated policies decide.

use joker_bot::policy::{BidContext, BlindBidContext, PlayContext, Policy, TrumpContext};
use joker_bot::UnseenTracker;
use joker_core::game::match_state::{GameError, GamePhase, GameState};
use joker_core::model::card::Card;
use joker_core::model::deck::Deck;
use joker_core::model::player::{PlayerCount, Seat};
use joker_core::model::round::{PlayError, RoundState};
use joker_core::model::trick::PlayedCard;
use joker_core::model::score::{BlockResult, round_score};
use joker_core::model::suit::Suit;
use joker_core::rules::bidding;
use joker_core::rules::trump::{TrumpMode, trump_from_card};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("{policies} policies supplied for {seats} seats")]
    SeatCount { policies: usize, seats: usize },
    #[error("no seat is due to act during {0:?}")]
    Stalled(GamePhase),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Play(#[from] PlayError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationMode {
    /// Every round of all four blocks, with blind bids and block premiums.
    FullMatch,
    /// `rounds` independent deals of random size, scored as a raw sum.
    Legacy { rounds: usize },
}

/// What happened in one round, reported to observers as it finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round_index: usize,
    /// Zero in legacy mode.
    pub block_number: u8,
    pub dealer: Seat,
    pub cards_in_round: u8,
    pub trump: Option<Suit>,
    pub bids: Vec<u8>,
    pub blind: Vec<bool>,
    pub tricks_taken: Vec<u8>,
}

/// One finished trick, reported to observers as it is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrickSummary {
    pub round_index: usize,
    pub trick_index: usize,
    pub leader: Seat,
    pub plays: Vec<PlayedCard>,
    pub winner: Seat,
}

/// Hooks called while a full match is simulated. Both default to doing nothing.
pub trait MatchObserver {
    fn trick_completed(&mut self, _trick: &TrickSummary) {}

    fn round_completed(&mut self, _round: &RoundSummary) {}
}

impl MatchObserver for () {}

struct RoundObserver<F>(F);

impl<F: FnMut(&RoundSummary)> MatchObserver for RoundObserver<F> {
    fn round_completed(&mut self, round: &RoundSummary) {
        (self.0)(round)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub totals: Vec<i32>,
    pub rounds_played: usize,
    /// Empty in legacy mode.
    pub blocks: Vec<BlockResult>,
}

impl MatchOutcome {
    /// Seats sharing the highest total.
    pub fn leaders(&self) -> Vec<Seat> {
        let Some(top) = self.totals.iter().copied().max() else {
            return Vec::new();
        };
        self.totals
            .iter()
            .enumerate()
            .filter(|&(_, &total)| total == top)
            .map(|(seat, _)| seat)
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatchSimulator {
    players: PlayerCount,
    partial_deal_cards: usize,
}

impl MatchSimulator {
    pub fn new(players: PlayerCount, partial_deal_cards: usize) -> Self {
        Self {
            players,
            partial_deal_cards: partial_deal_cards.clamp(1, players.max_cards()),
        }
    }

    pub fn players(&self) -> PlayerCount {
        self.players
    }

    pub fn play<R: Rng + ?Sized>(
        &self,
        mode: SimulationMode,
        policies: &mut [Box<dyn Policy>],
        rng: &mut R,
    ) -> Result<MatchOutcome, SimulationError> {
        match mode {
            SimulationMode::FullMatch => self.play_match(policies, rng),
            SimulationMode::Legacy { rounds } => self.play_legacy(policies, rounds, rng),
        }
    }

    pub fn play_match<R: Rng + ?Sized>(
        &self,
        policies: &mut [Box<dyn Policy>],
        rng: &mut R,
    ) -> Result<MatchOutcome, SimulationError> {
        self.play_match_with_observer(policies, rng, &mut ())
    }

    /// Plays all four blocks, calling `observer` after every round.
    pub fn play_match_observed<R, F>(
        &self,
        policies: &mut [Box<dyn Policy>],
        rng: &mut R,
        observer: F,
    ) -> Result<MatchOutcome, SimulationError>
    where
        R: Rng + ?Sized,
        F: FnMut(&RoundSummary),
    {
        self.play_match_with_observer(policies, rng, &mut RoundObserver(observer))
    }

    /// Plays all four blocks, reporting every trick and then every round to `observer`.
    pub fn play_match_with_observer<R, O>(
        &self,
        policies: &mut [Box<dyn Policy>],
        rng: &mut R,
        observer: &mut O,
    ) -> Result<MatchOutcome, SimulationError>
    where
        R: Rng + ?Sized,
        O: MatchObserver + ?Sized,
    {
        self.check_seats(policies)?;

        let mut state = GameState::new(self.players, self.partial_deal_cards);
        state.start_game()?;
        let mut rounds_played = 0;

        while state.phase() != GamePhase::GameEnd {
            run_blind_phase(&mut state, policies)?;
            let (hands, trump) = self.deal(&state, policies, rng);
            state.deal(hands, trump)?;
            run_bidding(&mut state, policies)?;
            state.begin_playing()?;
            run_tricks(&mut state, policies, rounds_played, observer)?;

            let summary = RoundSummary {
                round_index: rounds_played,
                block_number: state.current_block(),
                dealer: state.dealer(),
                cards_in_round: state.cards_in_round(),
                trump,
                bids: state.bids().iter().map(|bid| bid.unwrap_or(0)).collect(),
                blind: state.blind_bids().to_vec(),
                tricks_taken: state.tricks_taken(),
            };
            log_round(&summary);
            observer.round_completed(&summary);

            if let Some(block) = state.complete_round()? {
                if tracing::enabled!(target: "joker_bench::simulator", Level::DEBUG) {
                    event!(
                        target: "joker_bench::simulator",
                        Level::DEBUG,
                        block = block.block_number,
                        premiums = ?block.premium_players,
                        zero_premiums = ?block.zero_premium_players,
                        final_scores = ?block.final_scores,
                    );
                }
            }
            rounds_played += 1;
        }

        Ok(MatchOutcome {
            totals: state.scores().total_scores(),
            rounds_played,
            blocks: state.scores().completed_blocks().to_vec(),
        })
    }

    /// Plays `rounds` standalone deals of 1..=max cards with automatic trump and no blind
    /// bids. Scores are raw round scores without block premiums.
    pub fn play_legacy<R: Rng + ?Sized>(
        &self,
        policies: &mut [Box<dyn Policy>],
        rounds: usize,
        rng: &mut R,
    ) -> Result<MatchOutcome, SimulationError> {
        self.check_seats(policies)?;

        let count = self.players.count();
        let max_cards = self.players.max_cards();
        let mut totals = vec![0i32; count];

        for round_index in 0..rounds {
            let dealer = round_index % count;
            let cards = rng.gen_range(1..=max_cards);
            let mut deck = Deck::shuffled(rng);
            let hands = deck.deal(count, cards, self.players.next(dealer));
            let trump = trump_from_card(deck.draw());
            let cards_in_round = cards as u8;

            let mut bids: Vec<Option<u8>> = vec![None; count];
            for seat in bidding::bidding_order(dealer, self.players) {
                let others_total: u32 = bids.iter().flatten().map(|&bid| u32::from(bid)).sum();
                let legal = bidding::legal_bids(cards_in_round, seat == dealer, others_total);
                let ctx = BidContext {
                    seat,
                    hand: &hands[seat],
                    cards_in_round,
                    trump,
                    legal_bids: &legal,
                    totals: &totals,
                };
                let bid = policies[seat].choose_bid(&ctx);
                bids[seat] = Some(bidding::sanitize_bid(bid, &legal));
            }
            let bids: Vec<u8> = bids.into_iter().map(|bid| bid.unwrap_or(0)).collect();

            let mut round = RoundState::new(self.players, hands, trump, self.players.next(dealer));
            while !round.is_complete() {
                let seat = round.expected_player();
                let tracker = UnseenTracker::from_round(&round, seat);
                let ctx = PlayContext {
                    seat,
                    round: &round,
                    bid: bids[seat],
                    blind: false,
                    tracker: &tracker,
                };
                let choice = policies[seat].choose_play(&ctx);
                round.play_card(seat, choice)?;
            }

            for seat in 0..count {
                totals[seat] += round_score(cards_in_round, bids[seat], round.tricks_taken()[seat], false);
            }

            log_round(&RoundSummary {
                round_index,
                block_number: 0,
                dealer,
                cards_in_round,
                trump,
                bids,
                blind: vec![false; count],
                tricks_taken: round.tricks_taken().to_vec(),
            });
        }

        Ok(MatchOutcome {
            totals,
            rounds_played: rounds,
            blocks: Vec::new(),
        })
    }

    fn check_seats(&self, policies: &[Box<dyn Policy>]) -> Result<(), SimulationError> {
        if policies.len() == self.players.count() {
            Ok(())
        } else {
            Err(SimulationError::SeatCount {
                policies: policies.len(),
                seats: self.players.count(),
            })
        }
    }

    /// Shuffles and deals from the seat left of the dealer, then resolves trump: the next
    /// card off the deck, or the chooser's declaration after seeing their first cards.
    fn deal<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        policies: &mut [Box<dyn Policy>],
        rng: &mut R,
    ) -> (Vec<Vec<Card>>, Option<Suit>) {
        let mut deck = Deck::shuffled(rng);
        let cards = usize::from(state.cards_in_round());
        let hands = deck.deal(self.players.count(), cards, self.players.next(state.dealer()));

        let trump = match state.trump_mode() {
            TrumpMode::Automatic => trump_from_card(deck.draw()),
            TrumpMode::PlayerChosen {
                chooser,
                visible_cards,
            } => {
                let hand = &hands[chooser];
                let visible = &hand[..visible_cards.min(hand.len())];
                policies[chooser].choose_trump(&TrumpContext {
                    seat: chooser,
                    visible,
                })
            }
        };
        (hands, trump)
    }
}

fn run_blind_phase(
    state: &mut GameState,
    policies: &mut [Box<dyn Policy>],
) -> Result<(), SimulationError> {
    while state.blind_phase_active() {
        let Some(seat) = state.current_blind_decider() else {
            return Err(SimulationError::Stalled(state.phase()));
        };
        if !state.can_bid_blind(seat) {
            state.decline_blind_bid(seat)?;
            continue;
        }

        let legal = state.legal_blind_bids(seat);
        let totals = state.scores().total_scores_including_current_block();
        let ctx = BlindBidContext {
            seat,
            cards_in_round: state.cards_in_round(),
            legal_bids: &legal,
            totals: &totals,
        };
        match policies[seat].choose_blind_bid(&ctx) {
            Some(bid) => {
                state.set_blind_bid(seat, bid)?;
            }
            None => state.decline_blind_bid(seat)?,
        }
    }
    Ok(())
}

fn run_bidding(
    state: &mut GameState,
    policies: &mut [Box<dyn Policy>],
) -> Result<(), SimulationError> {
    let totals = state.scores().total_scores_including_current_block();
    while let Some(seat) = state.current_bidder() {
        let legal = state.legal_bids(seat);
        let bid = {
            let round = state.round().ok_or(GameError::NotDealt)?;
            let ctx = BidContext {
                seat,
                hand: round.hand(seat).cards(),
                cards_in_round: round.cards_in_round(),
                trump: round.trump(),
                legal_bids: &legal,
                totals: &totals,
            };
            policies[seat].choose_bid(&ctx)
        };
        state.set_bid(seat, bid)?;
    }
    Ok(())
}

fn run_tricks<O: MatchObserver + ?Sized>(
    state: &mut GameState,
    policies: &mut [Box<dyn Policy>],
    round_index: usize,
    observer: &mut O,
) -> Result<(), SimulationError> {
    while state.phase() == GamePhase::Playing {
        let Some(seat) = state.current_player() else {
            return Err(SimulationError::Stalled(state.phase()));
        };
        let choice = {
            let round = state.round().ok_or(GameError::NotDealt)?;
            let tracker = UnseenTracker::from_round(round, seat);
            let ctx = PlayContext {
                seat,
                round,
                bid: state.bids()[seat].unwrap_or(0),
                blind: state.blind_bids()[seat],
                tracker: &tracker,
            };
            policies[seat].choose_play(&ctx)
        };
        let outcome = state.play_card(seat, choice)?;
        if outcome.trick_winner().is_none() {
            continue;
        }
        let round = state.round().ok_or(GameError::NotDealt)?;
        if let Some(done) = round.trick_history().last() {
            observer.trick_completed(&TrickSummary {
                round_index,
                trick_index: round.trick_history().len() - 1,
                leader: done.trick.leader(),
                plays: done.trick.plays().to_vec(),
                winner: done.winner,
            });
        }
    }
    Ok(())
}

fn log_round(summary: &RoundSummary) {
    if !tracing::enabled!(target: "joker_bench::simulator", Level::DEBUG) {
        return;
    }
    event!(
        target: "joker_bench::simulator",
        Level::DEBUG,
        round = summary.round_index,
        block = summary.block_number,
        dealer = summary.dealer,
        cards = summary.cards_in_round,
        trump = ?summary.trump,
        bids = ?summary.bids,
        blind = ?summary.blind,
        taken = ?summary.tricks_taken,
    );
}
