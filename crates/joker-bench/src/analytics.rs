use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::evolution::{EvolutionResult, FitnessSample, GENE_RANGES, HeadToHeadResult};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Wilson score interval for a win rate over `games` games. Fractional successes (shared
/// wins) are accepted.
pub fn wilson_interval(successes: f64, games: usize) -> (f64, f64) {
    if games == 0 {
        return (0.0, 0.0);
    }
    let n = games as f64;
    let p = (successes / n).clamp(0.0, 1.0);
    let z2 = CONFIDENCE_Z * CONFIDENCE_Z;
    let denominator = 1.0 + z2 / n;
    let centre = (p + z2 / (2.0 * n)) / denominator;
    let margin = CONFIDENCE_Z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denominator;
    ((centre - margin).max(0.0), (centre + margin).min(1.0))
}

/// Two-sided p-value that the mean score differential is zero, by normal approximation.
pub fn score_diff_p_value(diffs: &[f64]) -> f64 {
    let n = diffs.len();
    if n < 2 {
        return 1.0;
    }
    let n_f = n as f64;
    let mean = diffs.iter().sum::<f64>() / n_f;
    let variance = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n_f - 1.0);
    let std_error = (variance / n_f).sqrt();
    if std_error <= f64::EPSILON {
        return if mean.abs() <= f64::EPSILON { 1.0 } else { 0.0 };
    }

    let Ok(normal) = Normal::new(0.0, 1.0) else {
        return 1.0;
    };
    let z = (mean / std_error).abs();
    (2.0 * (1.0 - normal.cdf(z))).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadToHeadReport {
    pub games: usize,
    pub win_rate: f64,
    pub win_rate_ci95: (f64, f64),
    pub avg_score_diff: f64,
    pub p_value: f64,
}

impl HeadToHeadReport {
    pub fn from_result(result: &HeadToHeadResult) -> Self {
        Self::from_samples(&result.samples)
    }

    pub fn from_samples(samples: &[FitnessSample]) -> Self {
        let games = samples.len();
        let wins: f64 = samples.iter().map(|s| s.win_share).sum();
        let diffs: Vec<f64> = samples.iter().map(|s| s.score_diff).collect();
        let avg_score_diff = if games == 0 {
            0.0
        } else {
            diffs.iter().sum::<f64>() / games as f64
        };
        Self {
            games,
            win_rate: if games == 0 { 0.0 } else { wins / games as f64 },
            win_rate_ci95: wilson_interval(wins, games),
            avg_score_diff,
            p_value: score_diff_p_value(&diffs),
        }
    }

    fn markdown_rows(&self, label: &str) -> String {
        format!(
            "| {label} | {games} | {win:.1}% | [{lo:.1}%, {hi:.1}%] | {diff:+.1} | {p:.3} |\n",
            games = self.games,
            win = self.win_rate * 100.0,
            lo = self.win_rate_ci95.0 * 100.0,
            hi = self.win_rate_ci95.1 * 100.0,
            diff = self.avg_score_diff,
            p = self.p_value,
        )
    }
}

const HEAD_TO_HEAD_HEADER: &str = "| Matchup | Games | Win % | 95% CI | Avg score diff | p-value |\n|---------|-------|-------|--------|----------------|---------|\n";

pub fn write_head_to_head_markdown(
    report: &HeadToHeadReport,
    label: &str,
    path: impl AsRef<Path>,
) -> Result<(), AnalyticsError> {
    let mut out = String::from("# Head-to-Head Summary\n\n");
    out.push_str(HEAD_TO_HEAD_HEADER);
    out.push_str(&report.markdown_rows(label));
    write_file(path.as_ref(), out)
}

/// Summary of an evolution run, optionally with a validation matchup of the evolved
/// tuning against the baseline.
pub struct EvolutionReport<'a> {
    pub run_id: &'a str,
    pub result: &'a EvolutionResult,
    pub validation: Option<HeadToHeadReport>,
}

impl EvolutionReport<'_> {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let result = self.result;
        let config = &result.config;
        let mut out = format!("# Evolution Summary: {}\n\n", self.run_id);
        out.push_str(&format!(
            "Seed {seed}, {players} players, population {pop}, {gens} generations, {games} games per candidate ({mode}{rotation}).\n\n",
            seed = result.seed,
            players = config.player_count,
            pop = config.population_size,
            gens = config.generations,
            games = config.games_per_candidate,
            mode = if config.use_full_match {
                "full match".to_string()
            } else {
                format!("{} rounds per game", config.rounds_per_game)
            },
            rotation = if config.rotate_seats { ", seats rotated" } else { "" },
        ));

        out.push_str("| Tuning | Fitness | Win % | Avg score diff |\n");
        out.push_str("|--------|---------|-------|----------------|\n");
        out.push_str(&format!(
            "| baseline | {:.4} | {:.1}% | {:+.1} |\n",
            result.baseline_fitness,
            result.baseline_win_rate * 100.0,
            result.baseline_avg_score_diff
        ));
        out.push_str(&format!(
            "| best | {:.4} | {:.1}% | {:+.1} |\n\n",
            result.best_fitness,
            result.best_win_rate * 100.0,
            result.best_avg_score_diff
        ));

        out.push_str("## Best fitness per generation\n\n");
        for (generation, fitness) in result.per_generation_best_fitness.iter().enumerate() {
            out.push_str(&format!("- generation {generation}: {fitness:.4}\n"));
        }

        out.push_str("\n## Best genome\n\n| Gene | Scale | Range |\n|------|-------|-------|\n");
        for (value, range) in result.best_genome.genes().iter().zip(GENE_RANGES.iter()) {
            out.push_str(&format!(
                "| {} | {value:.3} | {:.2}..{:.2} |\n",
                range.name, range.min, range.max
            ));
        }

        if let Some(validation) = &self.validation {
            out.push_str("\n## Validation vs baseline\n\n");
            out.push_str(HEAD_TO_HEAD_HEADER);
            out.push_str(&validation.markdown_rows("best vs baseline"));
        }

        write_file(path.as_ref(), out)
    }

    /// Line chart of best fitness per generation against the baseline.
    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("fitness.png");
        let history = self.result.per_generation_best_fitness.clone();
        let baseline = self.result.baseline_fitness;

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let y_min = history.iter().copied().fold(baseline, f64::min);
            let y_max = history.iter().copied().fold(baseline, f64::max);
            let margin = ((y_max - y_min).abs() * 0.1).max(0.05);
            let x_max = history.len().max(2) - 1;

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Best fitness per generation", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 60)
                .set_label_area_size(LabelAreaPosition::Bottom, 40)
                .build_cartesian_2d(0..x_max, (y_min - margin)..(y_max + margin))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .y_desc("Fitness")
                .x_desc("Generation")
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(LineSeries::new(
                    (0..=x_max).map(|x| (x, baseline)),
                    BLUE.stroke_width(1),
                ))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(LineSeries::new(
                    history.iter().copied().enumerate(),
                    GREEN.stroke_width(2),
                ))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

fn write_file(path: &Path, contents: String) -> Result<(), AnalyticsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| AnalyticsError::Io {
                context: "creating summary directory",
                source: e,
            })?;
        }
    }
    fs::write(path, contents).map_err(|e| AnalyticsError::Io {
        context: "writing summary markdown",
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelfPlayEvolutionConfig;
    use crate::evolution::Genome;
    use joker_bot::BotTuning;

    fn sample(win_share: f64, score_diff: f64) -> FitnessSample {
        FitnessSample {
            seed: 0,
            seat: 0,
            win_share,
            score_diff,
        }
    }

    #[test]
    fn wilson_interval_brackets_the_rate() {
        let (lo, hi) = wilson_interval(30.0, 100);
        assert!(lo < 0.3 && 0.3 < hi);
        assert!((lo - 0.2189).abs() < 1e-3);
        assert!((hi - 0.3958).abs() < 1e-3);
        assert_eq!(wilson_interval(0.0, 0), (0.0, 0.0));
        let (lo, hi) = wilson_interval(5.0, 5);
        assert!(lo > 0.5 && hi <= 1.0);
    }

    #[test]
    fn p_value_handles_degenerate_samples() {
        assert_eq!(score_diff_p_value(&[]), 1.0);
        assert_eq!(score_diff_p_value(&[50.0]), 1.0);
        assert_eq!(score_diff_p_value(&[0.0, 0.0, 0.0]), 1.0);
        assert_eq!(score_diff_p_value(&[10.0, 10.0]), 0.0);
    }

    #[test]
    fn p_value_separates_clear_and_noisy_differences() {
        let clear: Vec<f64> = (0..40).map(|i| 100.0 + f64::from(i % 5)).collect();
        let noisy: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 100.0 } else { -100.0 }).collect();
        assert!(score_diff_p_value(&clear) < 0.001);
        assert!(score_diff_p_value(&noisy) > 0.9);
    }

    #[test]
    fn head_to_head_report_counts_shared_wins() {
        let report = HeadToHeadReport::from_samples(&[
            sample(1.0, 200.0),
            sample(0.5, 0.0),
            sample(0.0, -50.0),
            sample(0.0, -30.0),
        ]);
        assert_eq!(report.games, 4);
        assert_eq!(report.win_rate, 0.375);
        assert_eq!(report.avg_score_diff, 30.0);
    }

    #[test]
    fn evolution_markdown_lists_generations_and_genes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = EvolutionResult {
            best_tuning: BotTuning::normal(),
            best_genome: Genome::identity(),
            baseline_fitness: 0.25,
            best_fitness: 0.4,
            per_generation_best_fitness: vec![0.3, 0.4],
            baseline_win_rate: 0.25,
            best_win_rate: 0.35,
            baseline_avg_score_diff: 0.0,
            best_avg_score_diff: 42.0,
            config: SelfPlayEvolutionConfig::default(),
            seed: 7,
        };
        let report = EvolutionReport {
            run_id: "unit",
            result: &result,
            validation: Some(HeadToHeadReport::from_samples(&[sample(1.0, 10.0)])),
        };
        let path = dir.path().join("nested/summary.md");
        report.write_markdown(&path).expect("written");

        let text = fs::read_to_string(&path).expect("readable");
        assert!(text.contains("# Evolution Summary: unit"));
        assert!(text.contains("- generation 1: 0.4000"));
        assert!(text.contains("| trump_declare_threshold | 1.000 |"));
        assert!(text.contains("best vs baseline"));
    }
}
