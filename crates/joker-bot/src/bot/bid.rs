use super::power::{expected_tricks, interpolated_score};
use crate::tuning::BiddingTuning;
use joker_core::model::card::Card;
use joker_core::model::player::Seat;
use joker_core::model::suit::Suit;

/// How hard a seat should gamble on a blind bid given the running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlindPosture {
    Safe,
    CatchUp,
    Desperate,
}

pub struct BidPlanner;

impl BidPlanner {
    /// Best legal bid for the hand: maximizes the projected round score at the expected trick
    /// count, then prefers the bid nearest that estimate, then the lower bid.
    pub fn choose(
        cards: &[Card],
        cards_in_round: u8,
        trump: Option<Suit>,
        legal: &[u8],
        tuning: &BiddingTuning,
    ) -> Option<u8> {
        let expected = expected_tricks(cards, trump, tuning).min(f64::from(cards_in_round));
        Self::choose_for_expected(expected, cards_in_round, legal)
    }

    pub fn choose_for_expected(expected: f64, cards_in_round: u8, legal: &[u8]) -> Option<u8> {
        let mut best: Option<(u8, f64, f64)> = None;
        for &bid in legal {
            let score = interpolated_score(cards_in_round, bid, expected, false);
            let distance = (f64::from(bid) - expected).abs();
            let better = match best {
                None => true,
                Some((best_bid, best_score, best_distance)) => {
                    score > best_score
                        || (score == best_score
                            && (distance < best_distance
                                || (distance == best_distance && bid < best_bid)))
                }
            };
            if better {
                best = Some((bid, score, distance));
            }
        }
        best.map(|(bid, _, _)| bid)
    }

    pub fn blind_posture(seat: Seat, totals: &[i32], tuning: &BiddingTuning) -> BlindPosture {
        let Some(&mine) = totals.get(seat) else {
            return BlindPosture::Safe;
        };
        let best_opponent = totals
            .iter()
            .enumerate()
            .filter(|&(other, _)| other != seat)
            .map(|(_, &total)| total)
            .max();
        let Some(best_opponent) = best_opponent else {
            return BlindPosture::Safe;
        };
        let leader = best_opponent.max(mine);

        if mine - best_opponent >= tuning.blind_safe_lead_gap {
            return BlindPosture::Safe;
        }
        let gap = leader - mine;
        if gap >= tuning.blind_desperate_gap {
            BlindPosture::Desperate
        } else if gap >= tuning.blind_catch_up_gap {
            BlindPosture::CatchUp
        } else {
            BlindPosture::Safe
        }
    }

    /// A blind bid when the posture calls for one, snapped to the nearest legal value
    /// (lower on ties). `None` keeps the seat out of the blind sub-phase.
    pub fn choose_blind(
        seat: Seat,
        totals: &[i32],
        cards_in_round: u8,
        legal: &[u8],
        tuning: &BiddingTuning,
    ) -> Option<u8> {
        let pressure = match Self::blind_posture(seat, totals, tuning) {
            BlindPosture::Safe => return None,
            BlindPosture::CatchUp => tuning.blind_catch_up_pressure,
            BlindPosture::Desperate => tuning.blind_desperate_pressure,
        };
        let target = (pressure.clamp(0.0, 1.0) * f64::from(cards_in_round)).round();
        legal.iter().copied().min_by(|&a, &b| {
            let da = (f64::from(a) - target).abs();
            let db = (f64::from(b) - target).abs();
            da.total_cmp(&db).then(a.cmp(&b))
        })
    }
}
