//! Repeated independent runs and extinction-probability estimation
//!
//! Run `k` draws from its own `StdRng` seeded with `base_seed + k`, so an
//! ensemble is reproducible for a fixed base seed no matter how rayon
//! schedules the runs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::SsaEngine;
use crate::error::{Result, SimulationError};
use crate::params::EpidemicParams;
use crate::types::{RunState, RunSummary, Sample, Termination};

/// Settings for a batch of runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Number of independent runs
    pub runs: usize,
    /// Seed of run 0; run `k` uses `base_seed + k`
    pub base_seed: u64,
    /// A run counts as an extinction when its final S is at least this
    pub extinction_threshold: u64,
    /// Keep every run's trajectory in the summary
    pub keep_trajectories: bool,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        EnsembleConfig {
            runs: 100,
            base_seed: 0,
            extinction_threshold: 500,
            keep_trajectories: false,
        }
    }
}

/// Outcome of one run within an ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub index: usize,
    pub seed: u64,
    pub final_state: RunState,
    pub termination: Termination,
    pub infections: u64,
    pub recoveries: u64,
    pub idle_steps: u64,
    pub extinct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<Vec<Sample>>,
}

/// Aggregate result of an ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleSummary {
    pub params: EpidemicParams,
    pub extinction_threshold: u64,
    pub runs: Vec<RunRecord>,
    pub extinction_count: usize,
    /// Fraction of runs that went extinct, in `[0, 1]`
    pub extinction_probability: f64,
}

impl EnsembleSummary {
    pub fn final_states(&self) -> impl Iterator<Item = &RunState> {
        self.runs.iter().map(|run| &run.final_state)
    }
}

fn simulate_one(
    params: &EpidemicParams,
    config: &EnsembleConfig,
    index: usize,
) -> Result<RunRecord> {
    let seed = config.base_seed.wrapping_add(index as u64);
    let mut engine = SsaEngine::seeded(params.clone(), seed)?;
    let RunSummary {
        final_state,
        termination,
        infections,
        recoveries,
        idle_steps,
    } = engine.run()?;

    let trajectory = config.keep_trajectories.then(|| engine.into_trajectory());

    Ok(RunRecord {
        index,
        seed,
        final_state,
        termination,
        infections,
        recoveries,
        idle_steps,
        extinct: final_state.s >= config.extinction_threshold,
        trajectory,
    })
}

/// Run `config.runs` independent simulations in parallel
///
/// Records come back in run-index order. The first failing run aborts the
/// ensemble with its error.
pub fn run_ensemble(params: &EpidemicParams, config: &EnsembleConfig) -> Result<EnsembleSummary> {
    if config.runs == 0 {
        return Err(SimulationError::config("ensemble needs at least one run"));
    }
    params.validate()?;

    let runs: Vec<RunRecord> = (0..config.runs)
        .into_par_iter()
        .map(|index| simulate_one(params, config, index))
        .collect::<Result<_>>()?;

    let extinction_count = runs.iter().filter(|run| run.extinct).count();
    let extinction_probability = extinction_count as f64 / runs.len() as f64;

    info!(
        runs = runs.len(),
        extinction_count,
        extinction_probability,
        "ensemble complete"
    );

    Ok(EnsembleSummary {
        params: params.clone(),
        extinction_threshold: config.extinction_threshold,
        runs,
        extinction_count,
        extinction_probability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_c() -> EnsembleConfig {
        EnsembleConfig {
            runs: 100,
            base_seed: 2024,
            extinction_threshold: 500,
            keep_trajectories: false,
        }
    }

    #[test]
    fn test_ensemble_is_reproducible() {
        let params = EpidemicParams::default();
        let first = run_ensemble(&params, &scenario_c()).unwrap();
        let second = run_ensemble(&params, &scenario_c()).unwrap();

        assert_eq!(first.runs.len(), 100);
        assert_eq!(first.extinction_count, second.extinction_count);
        assert_eq!(first.extinction_probability, second.extinction_probability);

        let a: Vec<_> = first.final_states().map(|s| s.as_tuple()).collect();
        let b: Vec<_> = second.final_states().map(|s| s.as_tuple()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ensemble_summary_consistency() {
        let params = EpidemicParams::default();
        let summary = run_ensemble(&params, &scenario_c()).unwrap();

        assert!((0.0..=1.0).contains(&summary.extinction_probability));
        for (k, run) in summary.runs.iter().enumerate() {
            assert_eq!(run.index, k);
            assert_eq!(run.seed, 2024 + k as u64);
            assert_eq!(run.final_state.population(), 1000);
            assert_eq!(run.extinct, run.final_state.s >= 500);
            assert_eq!(run.idle_steps, 0);
            assert!(run.trajectory.is_none());
        }
        let counted = summary.runs.iter().filter(|r| r.extinct).count();
        assert_eq!(summary.extinction_count, counted);
    }

    #[test]
    fn test_ensemble_matches_single_runs() {
        let params = EpidemicParams::new(1.34, 6.3, 300, 200.0).unwrap();
        let config = EnsembleConfig {
            runs: 8,
            base_seed: 10,
            keep_trajectories: true,
            ..EnsembleConfig::default()
        };
        let summary = run_ensemble(&params, &config).unwrap();

        for run in &summary.runs {
            let mut engine = SsaEngine::seeded(params.clone(), run.seed).unwrap();
            let single = engine.run().unwrap();
            assert_eq!(engine.final_state(), run.final_state);
            assert_eq!(single.infections, run.infections);
            assert_eq!(single.recoveries, run.recoveries);
            assert_eq!(single.idle_steps, run.idle_steps);
            assert_eq!(run.trajectory.as_deref(), Some(engine.trajectory()));
        }
    }

    #[test]
    fn test_no_transmission_is_always_extinct() {
        let params = EpidemicParams::new(0.0, 1.0, 1000, 200.0).unwrap();
        let summary = run_ensemble(&params, &EnsembleConfig { runs: 10, ..EnsembleConfig::default() }).unwrap();
        assert_eq!(summary.extinction_count, 10);
        assert_eq!(summary.extinction_probability, 1.0);
    }

    #[test]
    fn test_zero_runs_rejected() {
        let config = EnsembleConfig { runs: 0, ..EnsembleConfig::default() };
        let err = run_ensemble(&EpidemicParams::default(), &config).unwrap_err();
        assert!(matches!(err, SimulationError::Config(_)));
    }
}
