//! Genetic self-play search over [`Genome`] scale factors.
//!
//! Each generation is evaluated, ranked by fitness (ties broken by the genome's own
//! values), and replaced by its elites plus blended, mutated children of the top
//! selection pool. All randomness comes from generators derived from the run seed.

pub mod fitness;
pub mod genome;

pub use fitness::{FitnessSample, FitnessSummary, evaluate_tuning, play_samples};
pub use genome::{GENE_COUNT, GENE_RANGES, GeneRange, Genome};

use crate::config::SelfPlayEvolutionConfig;
use crate::simulator::SimulationError;
use joker_bot::BotTuning;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{Level, event};

const GENERATION_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;
const EVOLUTION_SEED_SALT: u64 = 0xD1B5_4A32_D192_ED03;

/// Reported after every evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationProgress {
    pub generation: usize,
    pub generations: usize,
    pub generation_best_fitness: f64,
    pub best_fitness: f64,
    pub baseline_fitness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionResult {
    pub best_tuning: BotTuning,
    pub best_genome: Genome,
    pub baseline_fitness: f64,
    pub best_fitness: f64,
    /// Best fitness seen so far, recorded after each generation.
    pub per_generation_best_fitness: Vec<f64>,
    pub baseline_win_rate: f64,
    pub best_win_rate: f64,
    pub baseline_avg_score_diff: f64,
    pub best_avg_score_diff: f64,
    pub config: SelfPlayEvolutionConfig,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadResult {
    pub win_rate: f64,
    pub avg_score_diff: f64,
    pub fitness: f64,
    pub samples: Vec<FitnessSample>,
}

/// Evaluation seeds shared by every generation before the per-generation twist.
pub fn base_seeds(seed: u64, games: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..games).map(|_| rng.next_u64()).collect()
}

/// Generation `g` plays `base ^ (stride * g)`; generation zero plays the base seeds.
pub fn generation_seeds(base: &[u64], generation: usize) -> Vec<u64> {
    let twist = GENERATION_SEED_STRIDE.wrapping_mul(generation as u64);
    base.iter().map(|seed| seed ^ twist).collect()
}

/// Fitness descending, then genome ascending.
fn rank_order(a: &(Genome, FitnessSummary), b: &(Genome, FitnessSummary)) -> Ordering {
    b.1.fitness
        .total_cmp(&a.1.fitness)
        .then_with(|| a.0.lexicographic_cmp(&b.0))
}

/// Evolves `base` without progress reporting.
pub fn evolve_via_self_play(
    base: &BotTuning,
    config: &SelfPlayEvolutionConfig,
    seed: u64,
) -> Result<EvolutionResult, SimulationError> {
    evolve_via_self_play_with_progress(base, config, seed, |_| {})
}

/// Evolves `base`, calling `progress` after every generation.
pub fn evolve_via_self_play_with_progress<F>(
    base: &BotTuning,
    config: &SelfPlayEvolutionConfig,
    seed: u64,
    mut progress: F,
) -> Result<EvolutionResult, SimulationError>
where
    F: FnMut(&GenerationProgress),
{
    let config = config.clone().clamped();
    let seeds = base_seeds(seed, config.games_per_candidate);
    let mut rng = StdRng::seed_from_u64(seed ^ EVOLUTION_SEED_SALT);

    let baseline = evaluate_tuning(base, base, &seeds, &config)?;
    event!(
        target: "joker_bench::evolution",
        Level::INFO,
        seed,
        population = config.population_size,
        generations = config.generations,
        games = config.games_per_candidate,
        baseline_fitness = baseline.fitness,
        "evolution started"
    );

    let mut population = Vec::with_capacity(config.population_size);
    population.push(Genome::identity());
    while population.len() < config.population_size {
        population.push(Genome::random(&mut rng, config.mutation_magnitude));
    }

    let mut best: Option<(Genome, FitnessSummary)> = None;
    let mut per_generation_best_fitness = Vec::with_capacity(config.generations);

    for generation in 0..config.generations {
        let matchups = generation_seeds(&seeds, generation);
        let mut ranked = evaluate_population(&population, base, &matchups, &config)?;
        ranked.sort_by(rank_order);

        let leader = ranked[0];
        let improved = best.is_none_or(|(_, summary)| leader.1.fitness > summary.fitness);
        if improved {
            best = Some(leader);
        }
        let best_fitness = best.map_or(leader.1.fitness, |(_, summary)| summary.fitness);
        per_generation_best_fitness.push(best_fitness);

        event!(
            target: "joker_bench::evolution",
            Level::INFO,
            generation,
            generation_best = leader.1.fitness,
            best_fitness,
            improved,
            win_rate = leader.1.win_rate,
            avg_score_diff = leader.1.avg_score_diff,
        );
        progress(&GenerationProgress {
            generation,
            generations: config.generations,
            generation_best_fitness: leader.1.fitness,
            best_fitness,
            baseline_fitness: baseline.fitness,
        });

        if generation + 1 < config.generations {
            population = next_generation(&ranked, &config, &mut rng);
        }
    }

    let (best_genome, best_summary) = best.unwrap_or((Genome::identity(), baseline));
    Ok(EvolutionResult {
        best_tuning: best_genome.apply(base),
        best_genome,
        baseline_fitness: baseline.fitness,
        best_fitness: best_summary.fitness,
        per_generation_best_fitness,
        baseline_win_rate: baseline.win_rate,
        best_win_rate: best_summary.win_rate,
        baseline_avg_score_diff: baseline.avg_score_diff,
        best_avg_score_diff: best_summary.avg_score_diff,
        config,
        seed,
    })
}

/// Scores every genome against the baseline. The parallel path collects in population
/// order, so ranking is unaffected.
fn evaluate_population(
    population: &[Genome],
    base: &BotTuning,
    seeds: &[u64],
    config: &SelfPlayEvolutionConfig,
) -> Result<Vec<(Genome, FitnessSummary)>, SimulationError> {
    let evaluate = |genome: &Genome| {
        evaluate_tuning(&genome.apply(base), base, seeds, config).map(|summary| (*genome, summary))
    };
    if config.parallel {
        population.par_iter().map(evaluate).collect()
    } else {
        population.iter().map(evaluate).collect()
    }
}

fn next_generation<R: Rng + ?Sized>(
    ranked: &[(Genome, FitnessSummary)],
    config: &SelfPlayEvolutionConfig,
    rng: &mut R,
) -> Vec<Genome> {
    let mut next: Vec<Genome> = ranked
        .iter()
        .take(config.elite_count)
        .map(|(genome, _)| *genome)
        .collect();

    let pool = &ranked[..config.selection_pool_size().min(ranked.len())];
    while next.len() < config.population_size {
        let a = pool[rng.gen_range(0..pool.len())].0;
        let b = pool[rng.gen_range(0..pool.len())].0;
        let mut child = a.crossover(&b, rng);
        child.mutate(rng, config.mutation_chance, config.mutation_magnitude);
        next.push(child);
    }
    next
}

/// Plays `candidate` against a table of `opponent` bots without evolving either.
pub fn evaluate_head_to_head(
    candidate: &BotTuning,
    opponent: &BotTuning,
    config: &SelfPlayEvolutionConfig,
    seed: u64,
) -> Result<HeadToHeadResult, SimulationError> {
    let config = config.clone().clamped();
    let seeds = base_seeds(seed, config.games_per_candidate);
    let samples = play_samples(candidate, opponent, &seeds, &config)?;
    let summary = FitnessSummary::from_samples(&samples, &config);
    event!(
        target: "joker_bench::evolution",
        Level::INFO,
        seed,
        games = summary.games,
        win_rate = summary.win_rate,
        avg_score_diff = summary.avg_score_diff,
        "head-to-head finished"
    );
    Ok(HeadToHeadResult {
        win_rate: summary.win_rate,
        avg_score_diff: summary.avg_score_diff,
        fitness: summary.fitness,
        samples,
    })
}
