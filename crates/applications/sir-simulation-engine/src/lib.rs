//! SIR Simulation Engine
//!
//! Gillespie stochastic simulation of an SIR epidemic in a closed population,
//! plus a parallel ensemble runner for extinction-probability estimates.

pub mod types;
pub mod error;
pub mod params;
pub mod engine;
pub mod ensemble;
pub mod config;

pub use engine::SsaEngine;
pub use config::SimulationConfig;
pub use ensemble::{run_ensemble, EnsembleConfig, EnsembleSummary, RunRecord};
pub use error::{Result, SimulationError};
pub use params::EpidemicParams;
pub use types::{Event, Propensities, RunState, RunSummary, Sample, StepOutcome, Termination};
