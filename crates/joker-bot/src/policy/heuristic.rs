use super::{BidContext, BlindBidContext, Policy, PlayContext, TrumpContext};
use crate::bot::{BidPlanner, BotContext, BotDifficulty, PlayPlanner, TrumpPlanner};
use crate::tuning::BotTuning;
use joker_core::model::suit::Suit;
use joker_core::rules::play::PlayChoice;
use tracing::{Level, event};

/// Rule-of-thumb bot driven entirely by a [`BotTuning`].
pub struct HeuristicPolicy {
    tuning: BotTuning,
}

impl HeuristicPolicy {
    pub fn new(tuning: BotTuning) -> Self {
        Self { tuning }
    }

    pub fn for_difficulty(difficulty: BotDifficulty) -> Self {
        Self::new(difficulty.tuning())
    }

    pub fn easy() -> Self {
        Self::for_difficulty(BotDifficulty::Easy)
    }

    pub fn normal() -> Self {
        Self::for_difficulty(BotDifficulty::Normal)
    }

    pub fn hard() -> Self {
        Self::for_difficulty(BotDifficulty::Hard)
    }

    pub fn tuning(&self) -> &BotTuning {
        &self.tuning
    }
}

impl Policy for HeuristicPolicy {
    fn choose_blind_bid(&mut self, ctx: &BlindBidContext) -> Option<u8> {
        let choice = BidPlanner::choose_blind(
            ctx.seat,
            ctx.totals,
            ctx.cards_in_round,
            ctx.legal_bids,
            &self.tuning.bidding,
        );
        if tracing::enabled!(target: "joker_bot::bid", Level::DEBUG) {
            event!(
                target: "joker_bot::bid",
                Level::DEBUG,
                seat = ctx.seat,
                cards = ctx.cards_in_round,
                legal_count = ctx.legal_bids.len(),
                chosen = ?choice,
                reason = "blind_posture",
            );
        }
        choice
    }

    fn choose_bid(&mut self, ctx: &BidContext) -> u8 {
        let planned = BidPlanner::choose(
            ctx.hand,
            ctx.cards_in_round,
            ctx.trump,
            ctx.legal_bids,
            &self.tuning.bidding,
        );
        let (bid, reason) = match planned {
            Some(bid) => (bid, "projected_score"),
            None => (ctx.legal_bids.first().copied().unwrap_or(0), "fallback_first_legal"),
        };
        if tracing::enabled!(target: "joker_bot::bid", Level::DEBUG) {
            event!(
                target: "joker_bot::bid",
                Level::DEBUG,
                seat = ctx.seat,
                cards = ctx.cards_in_round,
                trump = ?ctx.trump,
                legal_count = ctx.legal_bids.len(),
                chosen = bid,
                reason,
            );
        }
        bid
    }

    fn choose_trump(&mut self, ctx: &TrumpContext) -> Option<Suit> {
        let trump = TrumpPlanner::choose(ctx.visible, &self.tuning.trump);
        if tracing::enabled!(target: "joker_bot::trump", Level::DEBUG) {
            event!(
                target: "joker_bot::trump",
                Level::DEBUG,
                seat = ctx.seat,
                visible = ctx.visible.len(),
                chosen = ?trump,
            );
        }
        trump
    }

    fn choose_play(&mut self, ctx: &PlayContext) -> PlayChoice {
        let legal = ctx.round.legal_plays(ctx.seat);
        assert!(!legal.is_empty(), "seat {} asked to play with no legal move", ctx.seat);

        let bot_ctx = BotContext {
            seat: ctx.seat,
            round: ctx.round,
            bid: ctx.bid,
            blind: ctx.blind,
            tracker: ctx.tracker,
            tuning: &self.tuning,
        };
        let (chosen, reason) = match PlayPlanner::choose(&legal, &bot_ctx) {
            Some(choice) => (choice, "max_utility"),
            None => (legal[0], "fallback_first_legal"),
        };
        log_play_decision(ctx, &legal, chosen, reason);
        chosen
    }
}

fn log_play_decision(ctx: &PlayContext, legal: &[PlayChoice], chosen: PlayChoice, reason: &str) {
    if !tracing::enabled!(target: "joker_bot::play", Level::DEBUG) {
        return;
    }

    let legal_preview = if legal.len() <= 6 {
        legal
            .iter()
            .map(|choice| choice.card.to_string())
            .collect::<Vec<_>>()
            .join(",")
    } else {
        format!("{} moves", legal.len())
    };
    let taken = ctx.round.tricks_taken().get(ctx.seat).copied().unwrap_or(0);

    event!(
        target: "joker_bot::play",
        Level::DEBUG,
        seat = ctx.seat,
        bid = ctx.bid,
        taken,
        chasing = taken < ctx.bid,
        legal_count = legal.len(),
        legal_moves = %legal_preview,
        chosen = %chosen.card,
        style = ?chosen.style,
        declaration = ?chosen.declaration,
        trick_cards = ctx.round.current_trick().plays().len(),
        reason,
    );
}
