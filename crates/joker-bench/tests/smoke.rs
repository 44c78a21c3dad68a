use std::fs;
use std::path::Path;

use joker_bench::config::RunConfig;
use joker_bench::evolution::EvolutionResult;
use joker_bench::runner::EvolutionRunner;
use sha2::{Digest, Sha256};
use tempfile::tempdir;

fn load_config(output_dir: &Path) -> RunConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
seed: 4242
baseline: "normal"
evolution:
  population_size: 4
  generations: 2
  games_per_candidate: 1
  player_count: 4
  elite_count: 1
  rotate_seats: false
outputs:
  result_json: "{result}"
  summary_md: "{summary}"
  plots_dir: "{plots}"
logging:
  enable_structured: false
"#,
        result = output_dir.join("{run_id}/result.json").display(),
        summary = output_dir.join("{run_id}/summary.md").display(),
        plots = output_dir.join("{run_id}/plots").display()
    );

    let mut cfg: RunConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn run_and_hash(output_dir: &Path) -> (String, EvolutionResult) {
    let config = load_config(output_dir);
    let outputs = config.resolved_outputs();
    let runner = EvolutionRunner::new(config, outputs).expect("runner created");

    let mut generations = 0;
    let summary = runner.run(|_| generations += 1).expect("evolution completes");
    assert_eq!(generations, 2);

    assert!(summary.result_path.ends_with("test_smoke/result.json"));
    assert!(summary.summary_path.exists(), "summary markdown missing");
    if let Some(plot_path) = summary.plot_path.as_ref() {
        assert!(plot_path.exists(), "plot path reported but missing on disk");
    }

    let json = fs::read(&summary.result_path).expect("result readable");
    let decoded: EvolutionResult = serde_json::from_slice(&json).expect("result decodes");
    assert_eq!(decoded.config, summary.result.config);

    let mut hasher = Sha256::new();
    hasher.update(&json);
    (hex::encode(hasher.finalize()), decoded)
}

#[test]
fn evolution_run_is_byte_identical_across_reruns() {
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");

    let (first_hash, first) = run_and_hash(first_dir.path());
    let (second_hash, second) = run_and_hash(second_dir.path());

    assert_eq!(first_hash, second_hash, "evolution result changed between identical runs");
    assert_eq!(first.seed, 4242);
    assert_eq!(first.per_generation_best_fitness.len(), 2);
    assert!(first.best_fitness >= first.baseline_fitness);
    assert_eq!(first, second);
}

#[test]
fn missing_baseline_file_fails_before_playing() {
    let dir = tempdir().expect("temp dir");
    let mut config = load_config(dir.path());
    config.baseline = dir.path().join("absent.json").display().to_string();
    let outputs = config.resolved_outputs();
    assert!(EvolutionRunner::new(config, outputs).is_err());
}

#[test]
fn tuning_file_baseline_is_loaded() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("hard.json");
    fs::write(&path, joker_bot::BotTuning::hard().to_json().expect("serialize")).expect("write");

    let mut config = load_config(dir.path());
    config.baseline = path.display().to_string();
    let outputs = config.resolved_outputs();
    let runner = EvolutionRunner::new(config, outputs).expect("runner created");
    assert_eq!(runner.baseline(), &joker_bot::BotTuning::hard());
}
