use super::BotContext;
use super::power::{expected_tricks, interpolated_score};
use joker_core::model::card::Card;
use joker_core::model::trick::{
    JokerLeadDeclaration, JokerPlayStyle, PlayedCard, trick_winner,
};
use joker_core::rules::play::PlayChoice;

/// Scored view of one legal move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateEvaluation {
    pub choice: PlayChoice,
    pub wins_now: bool,
    pub win_probability: f64,
    pub projected_tricks: f64,
    pub expected_score: f64,
    pub threat: f64,
    pub utility: f64,
}

pub struct PlayPlanner;

impl PlayPlanner {
    pub fn choose(legal: &[PlayChoice], ctx: &BotContext<'_>) -> Option<PlayChoice> {
        Self::evaluate(legal, ctx)
            .into_iter()
            .fold(None::<CandidateEvaluation>, |best, candidate| match best {
                Some(current) if !is_better(&candidate, &current) => Some(current),
                _ => Some(candidate),
            })
            .map(|best| best.choice)
    }

    /// Every candidate with its utility, in the order given.
    pub fn evaluate(legal: &[PlayChoice], ctx: &BotContext<'_>) -> Vec<CandidateEvaluation> {
        let round = ctx.round;
        let plays = round.current_trick().plays();
        let trump = round.trump();
        let hand = round.hand(ctx.seat);
        let taken = round.tricks_taken().get(ctx.seat).copied().unwrap_or(0);
        let chasing = taken < ctx.bid;

        let remaining_plays = hand.len().max(1) as f64;
        let pressure = if chasing {
            (f64::from(ctx.bid - taken) / remaining_plays).min(1.0)
        } else {
            0.0
        };

        let winners: Vec<bool> = legal
            .iter()
            .map(|choice| wins_now(plays, *choice, ctx))
            .collect();
        let winning_regular = legal
            .iter()
            .zip(&winners)
            .any(|(choice, &wins)| wins && !choice.card.is_joker());
        let losing_regular = legal
            .iter()
            .zip(&winners)
            .any(|(choice, &wins)| !wins && !choice.card.is_joker());

        let turn = &ctx.tuning.turn;
        legal
            .iter()
            .zip(winners)
            .map(|(&choice, wins)| {
                let win_probability = if wins {
                    survival_probability(plays, choice, ctx)
                } else {
                    0.0
                };

                let mut rest: Vec<Card> = hand.cards().to_vec();
                if let Some(index) = rest.iter().position(|&card| card == choice.card) {
                    rest.remove(index);
                }
                let future = turn.future_trick_weight
                    * expected_tricks(&rest, trump, &ctx.tuning.bidding);
                let projected_tricks = (f64::from(taken) + win_probability + future)
                    .clamp(0.0, f64::from(round.cards_in_round()));
                let expected_score = interpolated_score(
                    round.cards_in_round(),
                    ctx.bid,
                    projected_tricks,
                    ctx.blind,
                );
                let threat = threat(choice, ctx);

                let utility = if chasing {
                    let waste = if choice.card.is_joker() && winning_regular {
                        turn.chase_joker_waste_penalty
                    } else {
                        0.0
                    };
                    turn.chase_win_probability_weight * win_probability
                        + turn.chase_pressure_weight * pressure * win_probability
                        + turn.chase_projected_score_weight * expected_score
                        - turn.chase_threat_penalty * threat
                        - waste
                } else {
                    let waste = if choice.card.is_joker() && losing_regular {
                        turn.dump_joker_waste_penalty
                    } else {
                        0.0
                    };
                    turn.dump_lose_probability_weight * (1.0 - win_probability)
                        + turn.dump_projected_score_weight * expected_score
                        + turn.dump_threat_disposal_bonus * threat
                        - waste
                };

                CandidateEvaluation {
                    choice,
                    wins_now: wins,
                    win_probability,
                    projected_tricks,
                    expected_score,
                    threat,
                    utility,
                }
            })
            .collect()
    }
}

fn is_better(candidate: &CandidateEvaluation, current: &CandidateEvaluation) -> bool {
    match candidate.utility.total_cmp(&current.utility) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => candidate.choice < current.choice,
    }
}

fn wins_now(plays: &[PlayedCard], choice: PlayChoice, ctx: &BotContext<'_>) -> bool {
    let mut table = plays.to_vec();
    table.push(choice.played_by(ctx.seat));
    trick_winner(&table, ctx.round.trump()) == Some(ctx.seat)
}

/// Chance a currently winning candidate still holds once the remaining opponents play.
fn survival_probability(plays: &[PlayedCard], choice: PlayChoice, ctx: &BotContext<'_>) -> f64 {
    let players = ctx.round.players();
    let opponents_remaining = players.count().saturating_sub(plays.len() + 1);
    if opponents_remaining == 0 {
        return 1.0;
    }

    let unseen = ctx.tracker.unseen();
    let beater_ratio = if unseen.is_empty() {
        0.0
    } else {
        let mut table = plays.to_vec();
        table.push(choice.played_by(ctx.seat));
        let next = players.next(ctx.seat);
        let beaters = unseen
            .iter()
            .filter(|&&card| {
                let response = if card.is_joker() {
                    PlayedCard::joker(next, JokerPlayStyle::FaceUp, JokerLeadDeclaration::None)
                } else {
                    PlayedCard::regular(next, card)
                };
                table.push(response);
                let beaten = trick_winner(&table, ctx.round.trump()) != Some(ctx.seat);
                table.pop();
                beaten
            })
            .count();
        beaters as f64 / unseen.len() as f64
    };

    let exposure = (opponents_remaining * ctx.round.hand(ctx.seat).len()) as i32;
    let survival = (1.0 - beater_ratio).powi(exposure);
    let blend = ctx.tuning.turn.power_confidence_blend.clamp(0.0, 1.0);
    (1.0 - blend) * survival + blend * confidence(choice, ctx)
}

fn confidence(choice: PlayChoice, ctx: &BotContext<'_>) -> f64 {
    match choice.card {
        Card::Joker if choice.style == JokerPlayStyle::FaceUp => 1.0,
        Card::Joker => 0.0,
        Card::Regular { suit, rank } => {
            let trump_boost = if ctx.round.trump() == Some(suit) { 0.5 } else { 0.0 };
            (rank.normalized() + trump_boost) / 1.5
        }
    }
}

/// How costly a card is to keep or to spend, by rank, trump and joker usage.
fn threat(choice: PlayChoice, ctx: &BotContext<'_>) -> f64 {
    let turn = &ctx.tuning.turn;
    match choice.card {
        Card::Joker => {
            let style = match choice.style {
                JokerPlayStyle::FaceUp => turn.threat_joker_face_up_weight,
                JokerPlayStyle::FaceDown => turn.threat_joker_face_down_weight,
            };
            let declared = if choice.declaration == JokerLeadDeclaration::None {
                0.0
            } else {
                turn.threat_joker_declaration_weight
            };
            style + declared
        }
        Card::Regular { suit, rank } => {
            let norm = rank.normalized();
            let trump = if ctx.round.trump() == Some(suit) {
                turn.threat_trump_weight * (0.5 + 0.5 * norm)
            } else {
                0.0
            };
            turn.threat_rank_weight * norm + trump
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::UnseenTracker;
    use crate::tuning::BotTuning;
    use joker_core::model::player::PlayerCount;
    use joker_core::model::rank::Rank;
    use joker_core::model::round::RoundState;
    use joker_core::model::suit::Suit;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Seats 0 and 1 have played K♠ and 9♠; seat 2 holds `hand` and plays last.
    fn last_to_play(hand: Vec<Card>) -> RoundState {
        let mut round = RoundState::new(
            PlayerCount::Three,
            vec![
                vec![c(Rank::King, Suit::Spades), c(Rank::Six, Suit::Diamonds)],
                vec![c(Rank::Nine, Suit::Spades), c(Rank::Seven, Suit::Diamonds)],
                hand,
            ],
            None,
            0,
        );
        round
            .play_card(0, PlayChoice::regular(c(Rank::King, Suit::Spades)))
            .unwrap();
        round
            .play_card(1, PlayChoice::regular(c(Rank::Nine, Suit::Spades)))
            .unwrap();
        round
    }

    fn decide(round: &RoundState, bid: u8) -> (PlayChoice, Vec<CandidateEvaluation>) {
        let tuning = BotTuning::normal();
        let tracker = UnseenTracker::from_round(round, 2);
        let ctx = BotContext {
            seat: 2,
            round,
            bid,
            blind: false,
            tracker: &tracker,
            tuning: &tuning,
        };
        let legal = round.legal_plays(2);
        let evaluations = PlayPlanner::evaluate(&legal, &ctx);
        (PlayPlanner::choose(&legal, &ctx).unwrap(), evaluations)
    }

    #[test]
    fn chasing_takes_the_trick_with_the_ace() {
        let round = last_to_play(vec![c(Rank::Ace, Suit::Spades), c(Rank::Eight, Suit::Spades)]);
        let (choice, evaluations) = decide(&round, 1);
        assert_eq!(choice, PlayChoice::regular(c(Rank::Ace, Suit::Spades)));
        let ace = evaluations.iter().find(|e| e.choice == choice).unwrap();
        assert!(ace.wins_now);
        assert_eq!(ace.win_probability, 1.0);
        assert!((ace.utility - 1101.0).abs() < 1e-6);
    }

    #[test]
    fn dumping_ducks_under_the_king() {
        let round = last_to_play(vec![c(Rank::Ace, Suit::Spades), c(Rank::Eight, Suit::Spades)]);
        let (choice, evaluations) = decide(&round, 0);
        assert_eq!(choice, PlayChoice::regular(c(Rank::Eight, Suit::Spades)));
        let eight = evaluations.iter().find(|e| e.choice == choice).unwrap();
        assert!(!eight.wins_now);
        assert!((eight.utility - 739.0).abs() < 1e-6);
    }

    #[test]
    fn chasing_saves_the_joker_when_the_ace_wins() {
        let round = last_to_play(vec![c(Rank::Ace, Suit::Spades), Card::Joker]);
        let (choice, evaluations) = decide(&round, 1);
        assert_eq!(choice, PlayChoice::regular(c(Rank::Ace, Suit::Spades)));

        let utility_of = |style| {
            evaluations
                .iter()
                .find(|e| {
                    e.choice == PlayChoice::joker(style, JokerLeadDeclaration::None)
                })
                .map(|e| e.utility)
                .unwrap()
        };
        assert!((evaluations[0].utility - 1034.0).abs() < 1e-6);
        assert!((utility_of(JokerPlayStyle::FaceUp) - 798.0).abs() < 1e-6);
        assert!(utility_of(JokerPlayStyle::FaceDown) < 0.0);
    }

    #[test]
    fn face_down_joker_never_counts_as_winning() {
        let round = last_to_play(vec![Card::Joker, c(Rank::Seven, Suit::Spades)]);
        let (_, evaluations) = decide(&round, 1);
        let face_down = evaluations
            .iter()
            .find(|e| e.choice.card.is_joker() && e.choice.style == JokerPlayStyle::FaceDown)
            .unwrap();
        assert!(!face_down.wins_now);
        assert_eq!(face_down.win_probability, 0.0);
    }

    #[test]
    fn leading_estimates_survival_below_certainty() {
        let round = RoundState::new(
            PlayerCount::Four,
            vec![
                vec![c(Rank::Queen, Suit::Hearts)],
                vec![c(Rank::Six, Suit::Clubs)],
                vec![c(Rank::Seven, Suit::Clubs)],
                vec![c(Rank::Eight, Suit::Clubs)],
            ],
            None,
            0,
        );
        let tuning = BotTuning::normal();
        let tracker = UnseenTracker::from_round(&round, 0);
        let ctx = BotContext {
            seat: 0,
            round: &round,
            bid: 1,
            blind: false,
            tracker: &tracker,
            tuning: &tuning,
        };
        let legal = round.legal_plays(0);
        let evaluations = PlayPlanner::evaluate(&legal, &ctx);
        assert_eq!(evaluations.len(), 1);
        let queen = evaluations[0];
        assert!(queen.wins_now);
        assert!(queen.win_probability > 0.0 && queen.win_probability < 1.0);
    }

    #[test]
    fn ties_prefer_lowest_choice() {
        let round = last_to_play(vec![c(Rank::Six, Suit::Hearts), c(Rank::Seven, Suit::Hearts)]);
        let tuning = BotTuning {
            turn: crate::tuning::TurnStrategyTuning {
                dump_projected_score_weight: 0.0,
                dump_threat_disposal_bonus: 0.0,
                ..Default::default()
            },
            ..BotTuning::normal()
        };
        let tracker = UnseenTracker::from_round(&round, 2);
        let ctx = BotContext {
            seat: 2,
            round: &round,
            bid: 0,
            blind: false,
            tracker: &tracker,
            tuning: &tuning,
        };
        let legal = round.legal_plays(2);
        assert_eq!(
            PlayPlanner::choose(&legal, &ctx),
            Some(PlayChoice::regular(c(Rank::Six, Suit::Hearts)))
        );
    }
}
