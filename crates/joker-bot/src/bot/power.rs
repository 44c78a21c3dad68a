use crate::tuning::BiddingTuning;
use joker_core::model::card::Card;
use joker_core::model::rank::Rank;
use joker_core::model::score::round_score;
use joker_core::model::suit::Suit;

/// Trick-taking strength of one card under the round's trump.
pub fn card_power(card: Card, trump: Option<Suit>, tuning: &BiddingTuning) -> f64 {
    match card {
        Card::Joker => tuning.joker_power,
        Card::Regular { suit, rank } => {
            let mut power = tuning.rank_base_weight * rank.normalized();
            match trump {
                Some(trump) if trump == suit => power += tuning.trump_bonus,
                None if rank >= Rank::Queen => power += tuning.no_trump_high_rank_bonus,
                _ => {}
            }
            power
        }
    }
}

/// Estimated tricks a hand will take, clamped to `[0, cards.len()]`.
pub fn expected_tricks(cards: &[Card], trump: Option<Suit>, tuning: &BiddingTuning) -> f64 {
    let mut total: f64 = cards.iter().map(|&card| card_power(card, trump, tuning)).sum();

    for suit in Suit::ALL {
        let count = cards.iter().filter(|card| card.is_suit(suit)).count();
        if count >= 3 {
            total += tuning.long_suit_bonus * (count - 2) as f64;
        }
        if trump == Some(suit) && count > 1 {
            total += tuning.trump_density_bonus * (count - 1) as f64;
        }
    }

    (total * tuning.expected_tricks_scale).clamp(0.0, cards.len() as f64)
}

/// Round score when `tricks` (possibly fractional) are taken against `bid`, interpolated
/// linearly between the neighbouring whole trick counts.
pub fn interpolated_score(cards_in_round: u8, bid: u8, tricks: f64, is_blind: bool) -> f64 {
    let tricks = tricks.clamp(0.0, f64::from(cards_in_round));
    let floor = tricks.floor();
    let frac = tricks - floor;
    let low = floor as u8;
    let low_score = f64::from(round_score(cards_in_round, bid, low, is_blind));
    if frac == 0.0 || low >= cards_in_round {
        return low_score;
    }
    let high_score = f64::from(round_score(cards_in_round, bid, low + 1, is_blind));
    low_score * (1.0 - frac) + high_score * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> BiddingTuning {
        BiddingTuning::default()
    }

    #[test]
    fn high_cards_earn_no_trump_bonus() {
        let ace = Card::new(Rank::Ace, Suit::Spades);
        assert!((card_power(ace, None, &tuning()) - 0.65).abs() < 1e-9);
        assert!((card_power(ace, Some(Suit::Hearts), &tuning()) - 0.45).abs() < 1e-9);
        assert!((card_power(ace, Some(Suit::Spades), &tuning()) - 0.80).abs() < 1e-9);
        assert_eq!(card_power(Card::new(Rank::Six, Suit::Diamonds), None, &tuning()), 0.0);
        assert_eq!(card_power(Card::Joker, None, &tuning()), 0.95);
    }

    #[test]
    fn long_suits_and_trump_density_add_tricks() {
        let hand = [
            Card::new(Rank::Six, Suit::Hearts),
            Card::new(Rank::Seven, Suit::Hearts),
            Card::new(Rank::Eight, Suit::Hearts),
        ];
        let base: f64 = hand.iter().map(|&c| card_power(c, None, &tuning())).sum();
        let plain = expected_tricks(&hand, None, &tuning());
        assert!((plain - (base + 0.25)).abs() < 1e-9);

        let with_trump = expected_tricks(&hand, Some(Suit::Hearts), &tuning());
        let trump_base: f64 = hand
            .iter()
            .map(|&c| card_power(c, Some(Suit::Hearts), &tuning()))
            .sum();
        assert!((with_trump - (trump_base + 0.25 + 0.30)).abs() < 1e-9);
    }

    #[test]
    fn expected_tricks_never_exceed_hand_size() {
        let hand = [Card::Joker, Card::Joker];
        let strong = BiddingTuning {
            joker_power: 5.0,
            ..tuning()
        };
        assert_eq!(expected_tricks(&hand, None, &strong), 2.0);
        assert_eq!(expected_tricks(&[], None, &strong), 0.0);
    }

    #[test]
    fn interpolation_between_whole_tricks() {
        assert_eq!(interpolated_score(1, 1, 1.0, false), 100.0);
        assert!((interpolated_score(1, 1, 0.65, false) - 30.0).abs() < 1e-9);
        assert!((interpolated_score(1, 0, 0.65, false) - 24.0).abs() < 1e-9);
        assert_eq!(interpolated_score(2, 1, 5.0, false), 20.0);
        assert_eq!(interpolated_score(2, 1, 1.0, true), 200.0);
    }
}
