use crate::tuning::TrumpSelectionTuning;
use joker_core::model::card::Card;
use joker_core::model::suit::Suit;

pub struct TrumpPlanner;

impl TrumpPlanner {
    /// Per-suit strength of the visible cards, indexed by `Suit::index`.
    pub fn suit_powers(visible: &[Card], tuning: &TrumpSelectionTuning) -> [f64; 4] {
        let mut powers = [0.0; 4];
        let mut counts = [0usize; 4];
        for card in visible {
            if let Card::Regular { suit, rank } = *card {
                powers[suit.index()] +=
                    tuning.suit_rank_weight * rank.normalized() + tuning.suit_count_weight;
                counts[suit.index()] += 1;
            }
        }

        if visible.len() == 3 {
            if let Some(pair) = counts.iter().position(|&count| count == 2) {
                powers[pair] += tuning.pair_of_three_bonus;
            }
        }
        powers
    }

    /// Strongest suit if it clears the declaration threshold; `None` declares no-trump.
    pub fn choose(visible: &[Card], tuning: &TrumpSelectionTuning) -> Option<Suit> {
        let powers = Self::suit_powers(visible, tuning);
        let mut best: Option<(Suit, f64)> = None;
        for suit in Suit::ALL {
            let power = powers[suit.index()];
            if best.is_none_or(|(_, best_power)| power > best_power) {
                best = Some((suit, power));
            }
        }
        best.filter(|&(_, power)| power >= tuning.min_declare_power)
            .map(|(suit, _)| suit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use joker_core::model::rank::Rank;

    #[test]
    fn strong_pair_declares_its_suit() {
        let visible = [
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::King, Suit::Hearts),
            Card::new(Rank::Seven, Suit::Spades),
        ];
        let tuning = TrumpSelectionTuning::default();
        let powers = TrumpPlanner::suit_powers(&visible, &tuning);
        assert!((powers[Suit::Hearts.index()] - (1.0 + 0.875 + 1.2 + 0.5)).abs() < 1e-9);
        assert_eq!(TrumpPlanner::choose(&visible, &tuning), Some(Suit::Hearts));
    }

    #[test]
    fn scattered_low_cards_declare_no_trump() {
        let visible = [
            Card::new(Rank::Six, Suit::Diamonds),
            Card::new(Rank::Seven, Suit::Spades),
            Card::new(Rank::Eight, Suit::Clubs),
        ];
        assert_eq!(TrumpPlanner::choose(&visible, &TrumpSelectionTuning::default()), None);
    }

    #[test]
    fn pair_bonus_needs_exactly_three_visible_cards() {
        let visible = [
            Card::new(Rank::Six, Suit::Diamonds),
            Card::new(Rank::Seven, Suit::Diamonds),
        ];
        let powers = TrumpPlanner::suit_powers(&visible, &TrumpSelectionTuning::default());
        assert!((powers[Suit::Diamonds.index()] - (0.125 + 1.2)).abs() < 1e-9);
    }

    #[test]
    fn jokers_add_no_suit_power() {
        let powers = TrumpPlanner::suit_powers(&[Card::Joker], &TrumpSelectionTuning::default());
        assert_eq!(powers, [0.0; 4]);
        assert_eq!(TrumpPlanner::choose(&[], &TrumpSelectionTuning::default()), None);
    }
}
