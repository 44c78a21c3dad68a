use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use joker_bench::analytics::{HeadToHeadReport, write_head_to_head_markdown};
use joker_bench::config::{RunConfig, SelfPlayEvolutionConfig, load_tuning};
use joker_bench::evolution::evaluate_head_to_head;
use joker_bench::logging::{init_console_logging, init_logging};
use joker_bench::runner::EvolutionRunner;
use joker_bench::simulator::{MatchObserver, MatchSimulator, RoundSummary, TrickSummary};
use joker_bot::policy::Policy;
use joker_bot::{BotDifficulty, HeuristicPolicy};
use joker_core::model::player::PlayerCount;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Self-play tuning and simulation harness for Joker bots.
#[derive(Debug, Parser)]
#[command(
    name = "joker-bench",
    author,
    version,
    about = "Deterministic Joker self-play tuner"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evolve a tuning by genetic self-play from a YAML run file.
    Evolve(EvolveArgs),
    /// Compare two fixed tunings without evolving.
    HeadToHead(HeadToHeadArgs),
    /// Play a single match and print the totals.
    Simulate(SimulateArgs),
}

#[derive(Debug, Args)]
struct EvolveArgs {
    /// Path to the YAML run file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/evolve.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    #[arg(long, value_name = "COUNT")]
    generations: Option<usize>,

    #[arg(long, value_name = "COUNT")]
    population: Option<usize>,

    /// Evaluate each generation's genomes on all cores.
    #[arg(long)]
    parallel: bool,

    /// Exit after validating the configuration.
    #[arg(long)]
    validate_only: bool,
}

#[derive(Debug, Args)]
struct HeadToHeadArgs {
    /// Preset name or tuning JSON file for the candidate seat.
    #[arg(long, value_name = "TUNING")]
    candidate: String,

    /// Preset name or tuning JSON file for the other seats.
    #[arg(long, value_name = "TUNING", default_value = "normal")]
    opponent: String,

    #[arg(long, default_value_t = 20)]
    games: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 4)]
    players: usize,

    /// Play this many random deals per game instead of full matches.
    #[arg(long, value_name = "ROUNDS")]
    legacy_rounds: Option<usize>,

    /// Keep the candidate in seat 0 instead of rotating it through every seat.
    #[arg(long)]
    no_rotate: bool,

    /// Write a markdown summary here.
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SimulateArgs {
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 4)]
    players: usize,

    /// Comma-separated difficulty per seat; defaults to JOKER_BOT_DIFFICULTY for every seat.
    #[arg(long, value_delimiter = ',')]
    seats: Vec<String>,

    /// Print every round as it finishes.
    #[arg(long)]
    verbose: bool,

    /// Also print every trick.
    #[arg(long)]
    tricks: bool,
}

struct ConsoleObserver {
    rounds: bool,
    tricks: bool,
}

impl MatchObserver for ConsoleObserver {
    fn trick_completed(&mut self, trick: &TrickSummary) {
        if !self.tricks {
            return;
        }
        let cards: Vec<String> = trick.plays.iter().map(|play| play.card.to_string()).collect();
        println!(
            "  trick {:>2}: {} -> seat {}",
            trick.trick_index + 1,
            cards.join(" "),
            trick.winner
        );
    }

    fn round_completed(&mut self, round: &RoundSummary) {
        if !self.rounds {
            return;
        }
        println!(
            "block {} round {:>2}: {} cards, trump {:?}, bids {:?}, taken {:?}",
            round.block_number,
            round.round_index + 1,
            round.cards_in_round,
            round.trump,
            round.bids,
            round.tricks_taken
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Evolve(args) => evolve(args),
        Command::HeadToHead(args) => head_to_head(args),
        Command::Simulate(args) => simulate(args),
    }
}

fn evolve(args: EvolveArgs) -> anyhow::Result<()> {
    let mut config = RunConfig::from_path(&args.config)?;

    if let Some(run_id) = args.run_id {
        config.run_id = run_id;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(generations) = args.generations {
        config.evolution.generations = generations;
    }
    if let Some(population) = args.population {
        config.evolution.population_size = population;
    }
    if args.parallel {
        config.evolution.parallel = true;
    }

    config.validate()?;

    let outputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let evolution = config.evolution.clone();
    println!(
        "Loaded run '{run_id}': population {}, {} generations, {} games per candidate, baseline '{}'",
        evolution.population_size, evolution.generations, evolution.games_per_candidate, config.baseline
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = EvolutionRunner::new(config, outputs)?;

    if args.validate_only {
        println!("Validation-only mode: evolution skipped.");
        return Ok(());
    }

    let summary = runner.run(|progress| {
        println!(
            "generation {}/{}: best {:.4} (this generation {:.4}, baseline {:.4})",
            progress.generation + 1,
            progress.generations,
            progress.best_fitness,
            progress.generation_best_fitness,
            progress.baseline_fitness
        );
    })?;

    println!(
        "Evolution complete for '{run_id}': fitness {:.4} → {:.4}",
        summary.result.baseline_fitness, summary.result.best_fitness
    );
    println!(
        "Validation vs baseline: win {:.1}% [{:.1}%, {:.1}%], avg score diff {:+.1}, p = {:.3}",
        summary.validation.win_rate * 100.0,
        summary.validation.win_rate_ci95.0 * 100.0,
        summary.validation.win_rate_ci95.1 * 100.0,
        summary.validation.avg_score_diff,
        summary.validation.p_value
    );
    println!("Result: {}", summary.result_path.display());
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Fitness plot: {}", plot_path.display());
    }
    Ok(())
}

fn head_to_head(args: HeadToHeadArgs) -> anyhow::Result<()> {
    init_console_logging(Level::WARN);

    let candidate = load_tuning(&args.candidate)?;
    let opponent = load_tuning(&args.opponent)?;
    let config = SelfPlayEvolutionConfig {
        games_per_candidate: args.games,
        player_count: args.players,
        use_full_match: args.legacy_rounds.is_none(),
        rounds_per_game: args.legacy_rounds.unwrap_or_default(),
        rotate_seats: !args.no_rotate,
        ..SelfPlayEvolutionConfig::default()
    }
    .clamped();

    let result = evaluate_head_to_head(&candidate, &opponent, &config, args.seed)?;
    let report = HeadToHeadReport::from_result(&result);
    let label = format!("{} vs {}", args.candidate, args.opponent);
    println!(
        "{label}: {} games, win {:.1}% [{:.1}%, {:.1}%], avg score diff {:+.1}, p = {:.3}",
        report.games,
        report.win_rate * 100.0,
        report.win_rate_ci95.0 * 100.0,
        report.win_rate_ci95.1 * 100.0,
        report.avg_score_diff,
        report.p_value
    );

    if let Some(path) = args.summary {
        write_head_to_head_markdown(&report, &label, &path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Summary table: {}", path.display());
    }
    Ok(())
}

fn simulate(args: SimulateArgs) -> anyhow::Result<()> {
    init_console_logging(Level::WARN);

    if args.players != 3 && args.players != 4 {
        bail!("a match seats 3 or 4 players, not {}", args.players);
    }
    let players = PlayerCount::from_count(args.players);
    let difficulties: Vec<BotDifficulty> = if args.seats.is_empty() {
        vec![BotDifficulty::from_env(); players.count()]
    } else if args.seats.len() == players.count() {
        args.seats.iter().map(|raw| BotDifficulty::parse(raw)).collect()
    } else {
        bail!(
            "--seats lists {} difficulties for {} players",
            args.seats.len(),
            players.count()
        );
    };

    let mut policies: Vec<Box<dyn Policy>> = difficulties
        .iter()
        .map(|&difficulty| Box::new(HeuristicPolicy::for_difficulty(difficulty)) as Box<dyn Policy>)
        .collect();
    let simulator = MatchSimulator::new(players, SelfPlayEvolutionConfig::default().partial_deal_cards);
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut observer = ConsoleObserver {
        rounds: args.verbose || args.tricks,
        tricks: args.tricks,
    };
    let outcome = simulator.play_match_with_observer(&mut policies, &mut rng, &mut observer)?;

    for (seat, (difficulty, total)) in difficulties.iter().zip(&outcome.totals).enumerate() {
        println!("seat {seat} ({}): {total}", difficulty.as_str());
    }
    println!("Winner(s): {:?}", outcome.leaders());
    Ok(())
}
