use joker_bot::{BotDifficulty, BotTuning};
use joker_core::model::player::PlayerCount;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Options for one self-play tuning run.
///
/// Values are clamped into range whenever a config is built or loaded, so the engine
/// never has to reject one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPlayEvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub games_per_candidate: usize,
    /// Rounds per game when `use_full_match` is off.
    pub rounds_per_game: usize,
    pub player_count: usize,
    pub elite_count: usize,
    pub mutation_chance: f64,
    pub mutation_magnitude: f64,
    /// Top share of the ranked population that parents are drawn from.
    pub selection_pool_ratio: f64,
    pub use_full_match: bool,
    /// Play every seed once per seat with the candidate in that seat.
    pub rotate_seats: bool,
    pub win_rate_weight: f64,
    pub score_diff_weight: f64,
    pub score_diff_normalization: f64,
    /// Cards the trump chooser sees before declaring.
    pub partial_deal_cards: usize,
    pub parallel: bool,
}

impl Default for SelfPlayEvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 12,
            generations: 8,
            games_per_candidate: 6,
            rounds_per_game: 8,
            player_count: 4,
            elite_count: 2,
            mutation_chance: 0.25,
            mutation_magnitude: 0.15,
            selection_pool_ratio: 0.5,
            use_full_match: true,
            rotate_seats: true,
            win_rate_weight: 1.0,
            score_diff_weight: 0.35,
            score_diff_normalization: 400.0,
            partial_deal_cards: 3,
            parallel: false,
        }
    }
}

impl SelfPlayEvolutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces every field into its valid range. Non-finite floats fall back to the default.
    pub fn clamped(mut self) -> Self {
        let defaults = Self::default();

        self.population_size = self.population_size.clamp(2, 256);
        self.generations = self.generations.clamp(1, 500);
        self.games_per_candidate = self.games_per_candidate.clamp(1, 10_000);
        self.rounds_per_game = self.rounds_per_game.clamp(1, 64);
        self.player_count = PlayerCount::from_count(self.player_count).count();
        self.elite_count = self.elite_count.clamp(1, self.population_size - 1);
        self.mutation_chance = finite_clamp(self.mutation_chance, defaults.mutation_chance, 0.0, 1.0);
        self.mutation_magnitude =
            finite_clamp(self.mutation_magnitude, defaults.mutation_magnitude, 0.0, 1.0);
        self.selection_pool_ratio =
            finite_clamp(self.selection_pool_ratio, defaults.selection_pool_ratio, 0.05, 1.0);
        self.win_rate_weight = finite_clamp(self.win_rate_weight, defaults.win_rate_weight, 0.0, 100.0);
        self.score_diff_weight =
            finite_clamp(self.score_diff_weight, defaults.score_diff_weight, 0.0, 100.0);
        self.score_diff_normalization = finite_clamp(
            self.score_diff_normalization,
            defaults.score_diff_normalization,
            1.0,
            1e6,
        );
        self.partial_deal_cards = self.partial_deal_cards.clamp(1, self.players().max_cards());
        self
    }

    pub fn players(&self) -> PlayerCount {
        PlayerCount::from_count(self.player_count)
    }

    /// Number of genomes parents are drawn from; never fewer than two.
    pub fn selection_pool_size(&self) -> usize {
        let raw = (self.selection_pool_ratio * self.population_size as f64).ceil() as usize;
        raw.clamp(2, self.population_size.max(2))
    }
}

fn finite_clamp(value: f64, fallback: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// A `joker-bench evolve` run loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RunConfig {
    pub run_id: String,
    #[serde(default)]
    pub seed: u64,
    /// Preset name (`easy`, `normal`, `hard`) or a path to a tuning JSON file.
    #[serde(default = "default_baseline")]
    pub baseline: String,
    #[serde(default)]
    pub evolution: SelfPlayEvolutionConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RunConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: RunConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Checks names and paths and clamps the evolution block. Performs no I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        if self.baseline.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "baseline".to_string(),
                message: "baseline must name a preset or a tuning file".to_string(),
            });
        }
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        self.evolution = self.evolution.clone().clamped();
        Ok(())
    }

    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            result_json: resolve_template(&self.run_id, &self.outputs.result_json),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
        }
    }

    pub fn baseline_tuning(&self) -> Result<BotTuning, ConfigError> {
        load_tuning(&self.baseline)
    }
}

fn default_baseline() -> String {
    BotDifficulty::Normal.as_str().to_string()
}

/// Resolves a preset name or reads a tuning JSON file.
pub fn load_tuning(name_or_path: &str) -> Result<BotTuning, ConfigError> {
    let trimmed = name_or_path.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "easy" => return Ok(BotTuning::easy()),
        "normal" => return Ok(BotTuning::normal()),
        "hard" => return Ok(BotTuning::hard()),
        _ => {}
    }

    let path = PathBuf::from(trimmed);
    let json = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        source,
        path: path.clone(),
    })?;
    BotTuning::from_json(&json).map_err(|source| ConfigError::Tuning { source, path })
}

/// Output artifact paths; `{run_id}` is substituted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub result_json: String,
    pub summary_md: String,
    pub plots_dir: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.result_json", &self.result_json),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            if resolve_template(run_id, value).components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Structured logging is off unless a run asks for it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub result_json: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("failed to parse tuning {path:?}: {source}")]
    Tuning {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Tuning { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "evolve_smoke"
seed: 99
baseline: "hard"
evolution:
  population_size: 6
  generations: 3
  games_per_candidate: 2
  player_count: 3
outputs:
  result_json: "bench/out/{run_id}/result.json"
  summary_md: "bench/out/{run_id}/summary.md"
  plots_dir: "bench/out/{run_id}/plots"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: RunConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.seed, 99);
        assert_eq!(cfg.evolution.population_size, 6);
        assert_eq!(cfg.evolution.players(), PlayerCount::Three);
        assert_eq!(cfg.evolution.elite_count, 2);
        assert!(cfg.evolution.use_full_match);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));
        assert_eq!(cfg.baseline_tuning().expect("preset"), BotTuning::hard());

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.result_json,
            PathBuf::from("bench/out/evolve_smoke/result.json")
        );
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("evolve_smoke", "evolve smoke");
        let mut cfg: RunConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn rejects_empty_output_path() {
        let yaml = BASIC_YAML.replace("\"bench/out/{run_id}/summary.md\"", "\"  \"");
        let mut cfg: RunConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("empty path");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "outputs.summary_md"
        ));
    }

    #[test]
    fn missing_evolution_block_uses_defaults() {
        let yaml = r#"
run_id: "defaults"
outputs:
  result_json: "out/result.json"
  summary_md: "out/summary.md"
  plots_dir: "out/plots"
"#;
        let mut cfg: RunConfig = serde_yaml::from_str(yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.evolution, SelfPlayEvolutionConfig::default());
        assert_eq!(cfg.baseline, "normal");
        assert!(!cfg.logging.enable_structured);
    }

    #[test]
    fn clamping_forces_fields_into_range() {
        let cfg = SelfPlayEvolutionConfig {
            population_size: 1,
            generations: 0,
            games_per_candidate: 0,
            rounds_per_game: 500,
            player_count: 7,
            elite_count: 9,
            mutation_chance: f64::NAN,
            mutation_magnitude: 4.0,
            selection_pool_ratio: 0.0,
            win_rate_weight: -1.0,
            score_diff_weight: f64::INFINITY,
            score_diff_normalization: 0.0,
            partial_deal_cards: 40,
            ..SelfPlayEvolutionConfig::default()
        }
        .clamped();

        assert_eq!(cfg.population_size, 2);
        assert_eq!(cfg.generations, 1);
        assert_eq!(cfg.games_per_candidate, 1);
        assert_eq!(cfg.rounds_per_game, 64);
        assert_eq!(cfg.player_count, 4);
        assert_eq!(cfg.elite_count, 1);
        assert_eq!(cfg.mutation_chance, 0.25);
        assert_eq!(cfg.mutation_magnitude, 1.0);
        assert_eq!(cfg.selection_pool_ratio, 0.05);
        assert_eq!(cfg.win_rate_weight, 0.0);
        assert_eq!(cfg.score_diff_weight, 0.35);
        assert_eq!(cfg.score_diff_normalization, 1.0);
        assert_eq!(cfg.partial_deal_cards, 9);
        assert_eq!(cfg.selection_pool_size(), 2);
    }

    #[test]
    fn defaults_are_already_in_range() {
        let cfg = SelfPlayEvolutionConfig::new();
        assert_eq!(cfg.clone().clamped(), cfg);
        assert_eq!(cfg.selection_pool_size(), 6);
    }

    #[test]
    fn unknown_tuning_file_reports_path() {
        let err = load_tuning("definitely/missing/tuning.json").expect_err("missing file");
        assert_eq!(err.path(), Path::new("definitely/missing/tuning.json"));
    }
}
