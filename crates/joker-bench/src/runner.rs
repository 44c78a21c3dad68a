use std::fs;
use std::path::{Path, PathBuf};

use joker_bot::BotTuning;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsError, EvolutionReport, HeadToHeadReport};
use crate::config::{ConfigError, ResolvedOutputs, RunConfig};
use crate::evolution::{
    EvolutionResult, GenerationProgress, evaluate_head_to_head, evolve_via_self_play_with_progress,
};
use crate::simulator::SimulationError;

/// Runs one configured evolution and writes its artifacts.
pub struct EvolutionRunner {
    config: RunConfig,
    outputs: ResolvedOutputs,
    baseline: BotTuning,
}

pub struct RunSummary {
    pub result: EvolutionResult,
    pub validation: HeadToHeadReport,
    pub result_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
}

impl EvolutionRunner {
    /// Resolves the baseline tuning up front so a bad path fails before any games run.
    pub fn new(config: RunConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let baseline = config.baseline_tuning()?;
        Ok(Self {
            config,
            outputs,
            baseline,
        })
    }

    pub fn baseline(&self) -> &BotTuning {
        &self.baseline
    }

    pub fn run<F>(&self, progress: F) -> Result<RunSummary, RunnerError>
    where
        F: FnMut(&GenerationProgress),
    {
        ensure_parent(self.outputs.result_json.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let result = evolve_via_self_play_with_progress(
            &self.baseline,
            &self.config.evolution,
            self.config.seed,
            progress,
        )?;

        // Validation games use seeds the search never saw.
        let head_to_head = evaluate_head_to_head(
            &result.best_tuning,
            &self.baseline,
            &self.config.evolution,
            !self.config.seed,
        )?;
        let validation = HeadToHeadReport::from_result(&head_to_head);

        fs::write(&self.outputs.result_json, serde_json::to_string_pretty(&result)?)?;

        let report = EvolutionReport {
            run_id: &self.config.run_id,
            result: &result,
            validation: Some(validation.clone()),
        };
        report.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match report.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                event!(target: "joker_bench::runner", Level::WARN, error = %err, "plot skipped");
                None
            }
        };

        Ok(RunSummary {
            result,
            validation,
            result_path: self.outputs.result_json.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize result: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}
