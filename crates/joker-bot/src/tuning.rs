//! Numeric weights behind every bot decision, grouped by the service that reads them.
//!
//! A [`BotTuning`] is a plain value: presets are constructed, evolved tunings are derived
//! from a baseline, and nothing is cached.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Weights for choosing a card during trick play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnStrategyTuning {
    pub chase_win_probability_weight: f64,
    pub chase_projected_score_weight: f64,
    pub chase_threat_penalty: f64,
    pub chase_joker_waste_penalty: f64,
    pub chase_pressure_weight: f64,
    pub dump_lose_probability_weight: f64,
    pub dump_projected_score_weight: f64,
    pub dump_threat_disposal_bonus: f64,
    pub dump_joker_waste_penalty: f64,
    /// Share of the win probability taken from card confidence rather than survival odds.
    pub power_confidence_blend: f64,
    pub threat_trump_weight: f64,
    pub threat_rank_weight: f64,
    pub threat_joker_face_up_weight: f64,
    pub threat_joker_face_down_weight: f64,
    pub threat_joker_declaration_weight: f64,
    pub future_trick_weight: f64,
}

impl Default for TurnStrategyTuning {
    fn default() -> Self {
        Self {
            chase_win_probability_weight: 900.0,
            chase_projected_score_weight: 1.0,
            chase_threat_penalty: 40.0,
            chase_joker_waste_penalty: 220.0,
            chase_pressure_weight: 300.0,
            dump_lose_probability_weight: 700.0,
            dump_projected_score_weight: 1.0,
            dump_threat_disposal_bonus: 60.0,
            dump_joker_waste_penalty: 260.0,
            power_confidence_blend: 0.35,
            threat_trump_weight: 1.4,
            threat_rank_weight: 1.0,
            threat_joker_face_up_weight: 2.0,
            threat_joker_face_down_weight: 0.3,
            threat_joker_declaration_weight: 0.5,
            future_trick_weight: 1.0,
        }
    }
}

/// Hand-power estimate and blind-bid posture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiddingTuning {
    pub rank_base_weight: f64,
    pub trump_bonus: f64,
    /// Flat bonus for queens and above when the round has no trump.
    pub no_trump_high_rank_bonus: f64,
    pub joker_power: f64,
    /// Per card beyond the second in a suit of three or more.
    pub long_suit_bonus: f64,
    /// Per trump beyond the first.
    pub trump_density_bonus: f64,
    pub expected_tricks_scale: f64,
    pub blind_desperate_gap: i32,
    pub blind_catch_up_gap: i32,
    pub blind_safe_lead_gap: i32,
    pub blind_desperate_pressure: f64,
    pub blind_catch_up_pressure: f64,
}

impl Default for BiddingTuning {
    fn default() -> Self {
        Self {
            rank_base_weight: 0.45,
            trump_bonus: 0.35,
            no_trump_high_rank_bonus: 0.2,
            joker_power: 0.95,
            long_suit_bonus: 0.25,
            trump_density_bonus: 0.15,
            expected_tricks_scale: 1.0,
            blind_desperate_gap: 600,
            blind_catch_up_gap: 300,
            blind_safe_lead_gap: 400,
            blind_desperate_pressure: 0.5,
            blind_catch_up_pressure: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrumpSelectionTuning {
    pub suit_rank_weight: f64,
    pub suit_count_weight: f64,
    pub pair_of_three_bonus: f64,
    pub min_declare_power: f64,
}

impl Default for TrumpSelectionTuning {
    fn default() -> Self {
        Self {
            suit_rank_weight: 1.0,
            suit_count_weight: 0.6,
            pair_of_three_bonus: 0.5,
            min_declare_power: 1.2,
        }
    }
}

/// Pacing hints for a UI; the rules core never waits on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    pub base_delay_ms: u64,
    pub per_card_delay_ms: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub trick_pause_ms: u64,
    pub round_pause_ms: u64,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            base_delay_ms: 450,
            per_card_delay_ms: 35,
            min_delay_ms: 250,
            max_delay_ms: 1200,
            trick_pause_ms: 700,
            round_pause_ms: 1500,
        }
    }
}

impl TimingTuning {
    /// Thinking time shown before a bot acts with `hand_size` cards left.
    pub fn decision_delay(&self, hand_size: usize) -> Duration {
        let raw = self
            .base_delay_ms
            .saturating_add(self.per_card_delay_ms.saturating_mul(hand_size as u64));
        let upper = self.max_delay_ms.max(self.min_delay_ms);
        Duration::from_millis(raw.clamp(self.min_delay_ms, upper))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotTuning {
    pub turn: TurnStrategyTuning,
    pub bidding: BiddingTuning,
    pub trump: TrumpSelectionTuning,
    pub timing: TimingTuning,
}

impl BotTuning {
    pub fn normal() -> Self {
        Self::default()
    }

    /// Overbids, barely looks ahead and trusts raw card strength.
    pub fn easy() -> Self {
        let mut tuning = Self::default();
        tuning.turn.chase_threat_penalty = 10.0;
        tuning.turn.chase_joker_waste_penalty = 60.0;
        tuning.turn.dump_threat_disposal_bonus = 20.0;
        tuning.turn.dump_joker_waste_penalty = 80.0;
        tuning.turn.power_confidence_blend = 0.7;
        tuning.turn.future_trick_weight = 0.5;
        tuning.bidding.expected_tricks_scale = 1.2;
        tuning.bidding.blind_desperate_pressure = 0.7;
        tuning.bidding.blind_catch_up_pressure = 0.5;
        tuning.trump.min_declare_power = 0.8;
        tuning.timing.base_delay_ms = 600;
        tuning
    }

    pub fn hard() -> Self {
        let mut tuning = Self::default();
        tuning.turn.chase_win_probability_weight = 1000.0;
        tuning.turn.chase_joker_waste_penalty = 280.0;
        tuning.turn.dump_lose_probability_weight = 780.0;
        tuning.turn.dump_threat_disposal_bonus = 75.0;
        tuning.turn.power_confidence_blend = 0.25;
        tuning.turn.threat_trump_weight = 1.55;
        tuning.bidding.rank_base_weight = 0.42;
        tuning.bidding.long_suit_bonus = 0.3;
        tuning.bidding.blind_safe_lead_gap = 300;
        tuning.trump.min_declare_power = 1.35;
        tuning.timing.base_delay_ms = 350;
        tuning
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
