//! SIR Simulation Engine CLI
//!
//! Runs an ensemble of stochastic SIR epidemics and reports the final state
//! of every run together with the stochastic extinction probability.

use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sir_simulation_engine::{config::SimulationConfig, run_ensemble};

#[derive(Parser, Debug)]
#[command(name = "sir-sim")]
#[command(about = "Simulate stochastic SIR epidemics with the Gillespie algorithm", long_about = None)]
struct Args {
    /// JSON config file (flags below override its values)
    #[arg(short, long)]
    config: Option<String>,

    /// Basic reproduction number
    #[arg(long)]
    r0: Option<f64>,

    /// Mean infectious period in days
    #[arg(long)]
    tau_i: Option<f64>,

    /// Total population size
    #[arg(short = 'n', long)]
    population: Option<u64>,

    /// Simulated-time horizon in days
    #[arg(short, long)]
    t_end: Option<f64>,

    /// Calibration factor applied to the transmission rate
    #[arg(long)]
    infection_scale: Option<f64>,

    /// Number of independent runs
    #[arg(short, long)]
    runs: Option<usize>,

    /// Seed of the first run (run k uses seed + k)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Final susceptible count at or above which a run counts as extinct
    #[arg(long)]
    extinction_threshold: Option<u64>,

    /// Include full trajectories in the JSON output
    #[arg(long)]
    trajectories: bool,

    /// Output JSON file path (optional)
    #[arg(short, long)]
    output: Option<String>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(SimulationConfig, Option<String>)> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)
                .with_context(|| format!("failed to load config from {path}"))?,
            None => SimulationConfig::default(),
        };

        let params = &mut config.params;
        if let Some(r0) = self.r0 {
            params.r0 = r0;
        }
        if let Some(tau_i) = self.tau_i {
            params.tau_i = tau_i;
        }
        if let Some(population) = self.population {
            params.population_size = population;
        }
        if let Some(t_end) = self.t_end {
            params.t_end = t_end;
        }
        if let Some(scale) = self.infection_scale {
            params.infection_scale = scale;
        }
        params.validate().context("invalid epidemic parameters")?;

        let ensemble = &mut config.ensemble;
        if let Some(runs) = self.runs {
            ensemble.runs = runs;
        }
        if let Some(seed) = self.seed {
            ensemble.base_seed = seed;
        }
        if let Some(threshold) = self.extinction_threshold {
            ensemble.extinction_threshold = threshold;
        }
        ensemble.keep_trajectories |= self.trajectories;

        Ok((config, self.output))
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sir_simulation_engine=info,sir_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, output) = Args::parse().into_config()?;
    let params = &config.params;

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  SIR Simulation Engine                                   ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");

    println!("Configuration:");
    println!("  R0: {}", params.r0);
    println!("  Infectious period: {} days", params.tau_i);
    println!("  Population: {}", params.population_size);
    println!("  Horizon: {} days", params.t_end);
    println!("  Infection scale: {}", params.infection_scale);
    println!("  Runs: {} (base seed {})\n", config.ensemble.runs, config.ensemble.base_seed);

    info!(runs = config.ensemble.runs, "starting ensemble");
    let summary = run_ensemble(params, &config.ensemble).context("simulation failed")?;

    println!("Final data after each simulation:");
    for run in &summary.runs {
        let state = &run.final_state;
        println!(
            "Simulation {}: S = {}, I = {}, R = {}, Time = {:.2} ({})",
            run.index + 1,
            state.s,
            state.i,
            state.r,
            state.t,
            run.termination,
        );
    }

    println!("\n{}", "-".repeat(60));
    println!(
        "The Extinction Probability is:  {}% ({}/{} runs with S >= {})",
        summary.extinction_probability * 100.0,
        summary.extinction_count,
        summary.runs.len(),
        summary.extinction_threshold,
    );

    // Output to JSON if requested
    if let Some(output_path) = output {
        println!("\nWriting results to {}...", output_path);
        let json = serde_json::to_string_pretty(&summary).context("failed to serialize results")?;
        fs::write(&output_path, json)
            .with_context(|| format!("failed to write JSON output to {output_path}"))?;
        println!("  Results saved");
    }

    println!("\n✅ Simulation complete!\n");

    Ok(())
}
