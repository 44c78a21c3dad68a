use crate::config::SelfPlayEvolutionConfig;
use crate::simulator::{MatchSimulator, SimulationError, SimulationMode};
use joker_bot::policy::Policy;
use joker_bot::{BotTuning, HeuristicPolicy};
use joker_core::model::player::Seat;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// One game from the candidate's seat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSample {
    pub seed: u64,
    pub seat: Seat,
    /// `1 / k` when the candidate is one of `k` seats sharing the top total, else `0`.
    pub win_share: f64,
    /// Candidate total minus the mean of the opponents' totals.
    pub score_diff: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub fitness: f64,
    pub win_rate: f64,
    pub avg_score_diff: f64,
    pub games: usize,
}

impl FitnessSummary {
    pub fn from_samples(samples: &[FitnessSample], config: &SelfPlayEvolutionConfig) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let games = samples.len();
        let win_rate = samples.iter().map(|s| s.win_share).sum::<f64>() / games as f64;
        let avg_score_diff = samples.iter().map(|s| s.score_diff).sum::<f64>() / games as f64;
        let fitness = config.win_rate_weight * win_rate
            + config.score_diff_weight * (avg_score_diff / config.score_diff_normalization);
        Self {
            fitness,
            win_rate,
            avg_score_diff,
            games,
        }
    }
}

pub fn win_share(totals: &[i32], seat: Seat) -> f64 {
    let Some(&mine) = totals.get(seat) else {
        return 0.0;
    };
    let Some(top) = totals.iter().copied().max() else {
        return 0.0;
    };
    if mine < top {
        return 0.0;
    }
    let tied = totals.iter().filter(|&&total| total == top).count();
    1.0 / tied as f64
}

pub fn score_diff(totals: &[i32], seat: Seat) -> f64 {
    let Some(&mine) = totals.get(seat) else {
        return 0.0;
    };
    let opponents = totals.len().saturating_sub(1);
    if opponents == 0 {
        return 0.0;
    }
    let others: i64 = totals
        .iter()
        .enumerate()
        .filter(|&(other, _)| other != seat)
        .map(|(_, &total)| i64::from(total))
        .sum();
    f64::from(mine) - others as f64 / opponents as f64
}

pub fn simulation_mode(config: &SelfPlayEvolutionConfig) -> SimulationMode {
    if config.use_full_match {
        SimulationMode::FullMatch
    } else {
        SimulationMode::Legacy {
            rounds: config.rounds_per_game,
        }
    }
}

/// Plays `candidate` against a table of `opponent` bots once per seed, in every seat when
/// rotation is on. Each seed deals the same cards in every rotation.
pub fn play_samples(
    candidate: &BotTuning,
    opponent: &BotTuning,
    seeds: &[u64],
    config: &SelfPlayEvolutionConfig,
) -> Result<Vec<FitnessSample>, SimulationError> {
    let players = config.players();
    let simulator = MatchSimulator::new(players, config.partial_deal_cards);
    let mode = simulation_mode(config);
    let seats: Vec<Seat> = if config.rotate_seats {
        (0..players.count()).collect()
    } else {
        vec![0]
    };

    let mut samples = Vec::with_capacity(seeds.len() * seats.len());
    for &seed in seeds {
        for &seat in &seats {
            let mut policies: Vec<Box<dyn Policy>> = (0..players.count())
                .map(|index| {
                    let tuning = if index == seat { *candidate } else { *opponent };
                    Box::new(HeuristicPolicy::new(tuning)) as Box<dyn Policy>
                })
                .collect();
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = simulator.play(mode, &mut policies, &mut rng)?;
            samples.push(FitnessSample {
                seed,
                seat,
                win_share: win_share(&outcome.totals, seat),
                score_diff: score_diff(&outcome.totals, seat),
            });
        }
    }
    Ok(samples)
}

pub fn evaluate_tuning(
    candidate: &BotTuning,
    opponent: &BotTuning,
    seeds: &[u64],
    config: &SelfPlayEvolutionConfig,
) -> Result<FitnessSummary, SimulationError> {
    let samples = play_samples(candidate, opponent, seeds, config)?;
    Ok(FitnessSummary::from_samples(&samples, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_share_splits_ties() {
        assert_eq!(win_share(&[100, 300, 300, 50], 1), 0.5);
        assert_eq!(win_share(&[100, 300, 300, 50], 0), 0.0);
        assert_eq!(win_share(&[400, 300, 200], 0), 1.0);
        assert_eq!(win_share(&[0, 0, 0], 2), 1.0 / 3.0);
        assert_eq!(win_share(&[10, 20], 5), 0.0);
    }

    #[test]
    fn score_diff_uses_mean_of_opponents() {
        assert_eq!(score_diff(&[500, 100, 200, 300], 0), 300.0);
        assert_eq!(score_diff(&[-100, 50, 100], 0), -175.0);
        assert_eq!(score_diff(&[42], 0), 0.0);
    }

    #[test]
    fn summary_blends_win_rate_and_score_diff() {
        let config = SelfPlayEvolutionConfig {
            win_rate_weight: 2.0,
            score_diff_weight: 0.5,
            score_diff_normalization: 100.0,
            ..SelfPlayEvolutionConfig::default()
        };
        let samples = [
            FitnessSample { seed: 1, seat: 0, win_share: 1.0, score_diff: 200.0 },
            FitnessSample { seed: 1, seat: 1, win_share: 0.0, score_diff: -100.0 },
        ];
        let summary = FitnessSummary::from_samples(&samples, &config);
        assert_eq!(summary.games, 2);
        assert_eq!(summary.win_rate, 0.5);
        assert_eq!(summary.avg_score_diff, 50.0);
        assert!((summary.fitness - (2.0 * 0.5 + 0.5 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn rotation_plays_each_seed_from_every_seat() {
        let config = SelfPlayEvolutionConfig {
            use_full_match: false,
            rounds_per_game: 2,
            player_count: 3,
            ..SelfPlayEvolutionConfig::default()
        }
        .clamped();
        let samples =
            play_samples(&BotTuning::hard(), &BotTuning::normal(), &[7, 8], &config).expect("plays");
        let seats: Vec<_> = samples.iter().map(|s| (s.seed, s.seat)).collect();
        assert_eq!(seats, vec![(7, 0), (7, 1), (7, 2), (8, 0), (8, 1), (8, 2)]);
    }

    #[test]
    fn mirrored_tunings_share_credit_evenly_under_rotation() {
        let config = SelfPlayEvolutionConfig {
            use_full_match: false,
            rounds_per_game: 3,
            ..SelfPlayEvolutionConfig::default()
        }
        .clamped();
        let tuning = BotTuning::normal();
        let summary = evaluate_tuning(&tuning, &tuning, &[13], &config).expect("plays");
        // Identical bots in every seat replay the same game four times, so the rotated
        // score differentials cancel out.
        assert_eq!(summary.games, 4);
        assert!(summary.avg_score_diff.abs() < 1e-9);
        assert!((summary.win_rate - 0.25).abs() < 1e-9);
    }
}
