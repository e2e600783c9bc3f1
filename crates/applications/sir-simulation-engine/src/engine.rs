//! Gillespie SSA engine for a single SIR run
//!
//! Each call to [`SsaEngine::step`] fires exactly one event:
//! - Infection (S -> I) at rate `scaled_beta * S / N * S * I`
//! - Recovery (I -> R) at rate `gamma * I`
//!
//! Waiting times are exponential with the total propensity as rate, and the
//! event is picked by a linear scan over the cumulative propensities.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Uniform};
use tracing::{debug, trace, warn};

use crate::error::{Result, SimulationError};
use crate::params::EpidemicParams;
use crate::types::{Event, Propensities, RunState, RunSummary, Sample, StepOutcome, Termination};

/// Event rates for the given compartment counts
///
/// Returns zero rates for an empty population instead of dividing by zero.
pub fn propensities(scaled_beta: f64, gamma: f64, s: u64, i: u64, r: u64) -> Propensities {
    let n_pop = s + i + r;
    if n_pop == 0 {
        return Propensities { infection: 0.0, recovery: 0.0 };
    }

    let (s, i) = (s as f64, i as f64);
    let effective_beta = scaled_beta * s / n_pop as f64;

    Propensities {
        infection: effective_beta * s * i,
        recovery: gamma * i,
    }
}

/// Single-run SSA engine
///
/// Owns the run state, the trajectory and its random source. The generator
/// is injected so runs are reproducible and parallel runs never share a
/// stream.
pub struct SsaEngine<R: Rng> {
    params: EpidemicParams,
    state: RunState,
    trajectory: Vec<Sample>,
    rng: R,
    unit: Uniform<f64>,
    termination: Option<Termination>,

    // Event counters
    infections: u64,
    recoveries: u64,
    idle_steps: u64,
}

impl SsaEngine<StdRng> {
    /// Create an engine backed by a `StdRng` seeded with `seed`
    pub fn seeded(params: EpidemicParams, seed: u64) -> Result<Self> {
        Self::new(params, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SsaEngine<R> {
    /// Create a new engine at the initial condition `(N - 1, 1, 0)` at `t = 0`
    ///
    /// Fails fast on parameters outside their domain.
    pub fn new(params: EpidemicParams, rng: R) -> Result<Self> {
        params.validate()?;

        let state = RunState::initial(params.population_size);
        debug!(
            r0 = params.r0,
            tau_i = params.tau_i,
            population_size = params.population_size,
            t_end = params.t_end,
            "created SSA engine"
        );

        Ok(SsaEngine {
            params,
            state,
            trajectory: vec![Sample::from(state)],
            rng,
            unit: Uniform::new(0.0, 1.0),
            termination: None,
            infections: 0,
            recoveries: 0,
            idle_steps: 0,
        })
    }

    pub fn params(&self) -> &EpidemicParams {
        &self.params
    }

    /// Current state (always equal to the last trajectory sample)
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Recorded samples in chronological order; sample 0 is the initial condition
    pub fn trajectory(&self) -> &[Sample] {
        &self.trajectory
    }

    /// Consume the engine, keeping only its trajectory
    pub fn into_trajectory(self) -> Vec<Sample> {
        self.trajectory
    }

    /// `(S, I, R, t)` at the last recorded sample
    pub fn final_state(&self) -> RunState {
        self.state
    }

    /// Why the run stopped, once it has
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Event rates at the current state
    pub fn propensities(&self) -> Propensities {
        propensities(
            self.params.scaled_beta(),
            self.params.gamma(),
            self.state.s,
            self.state.i,
            self.state.r,
        )
    }

    /// Stopping condition for the current state, if any holds
    fn stopping_condition(&self) -> Option<Termination> {
        let state = &self.state;
        if state.t >= self.params.t_end {
            Some(Termination::Horizon)
        } else if state.population() == 0 {
            Some(Termination::Depleted)
        } else if state.s == 0 {
            Some(Termination::SusceptiblesExhausted)
        } else if state.i == 0 {
            Some(Termination::InfectionCleared)
        } else {
            None
        }
    }

    fn terminate(&mut self, reason: Termination) -> StepOutcome {
        if self.termination.is_none() {
            debug!(
                s = self.state.s,
                i = self.state.i,
                r = self.state.r,
                t = self.state.t,
                %reason,
                "run terminated"
            );
            self.termination = Some(reason);
        }
        StepOutcome::Terminated(reason)
    }

    /// Fire one event and append the resulting sample
    ///
    /// The termination reason is recorded as soon as the new state meets a
    /// stopping condition. Returns `StepOutcome::Terminated` without touching
    /// the state once any stopping condition holds; further calls keep
    /// returning it.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if let Some(reason) = self.termination {
            return Ok(StepOutcome::Terminated(reason));
        }
        if let Some(reason) = self.stopping_condition() {
            return Ok(self.terminate(reason));
        }

        let propensities = self.propensities();
        let total = propensities.total();
        if total == 0.0 {
            return Ok(self.terminate(Termination::NoPropensity));
        }

        let waiting = Exp::new(total)
            .map_err(|e| SimulationError::sampling(format!("exponential rate {total}: {e}")))?;
        let time_step = waiting.sample(&mut self.rng);
        let u = self.unit.sample(&mut self.rng);

        // A zero-rate infection is never selected, even when u == 0
        let event = if u * total <= propensities.infection
            && propensities.infection > 0.0
            && self.state.s > 0
        {
            self.state.s -= 1;
            self.state.i += 1;
            self.infections += 1;
            Event::Infection
        } else if self.state.i > 0 {
            self.state.i -= 1;
            self.state.r += 1;
            self.recoveries += 1;
            Event::Recovery
        } else {
            warn!(
                s = self.state.s,
                i = self.state.i,
                t = self.state.t,
                "selected event has no eligible individual; advancing time only"
            );
            self.idle_steps += 1;
            Event::Idle
        };

        self.state.t += time_step;
        self.trajectory.push(Sample::from(self.state));

        trace!(
            t = self.state.t,
            s = self.state.s,
            i = self.state.i,
            r = self.state.r,
            ?event,
            "event fired"
        );

        if let Some(reason) = self.stopping_condition() {
            self.terminate(reason);
        }

        Ok(StepOutcome::Advanced { event, time_step })
    }

    /// Step until a terminal condition is reached
    pub fn run(&mut self) -> Result<RunSummary> {
        loop {
            if let StepOutcome::Terminated(_) = self.step()? {
                break;
            }
        }
        Ok(self.summary())
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            final_state: self.state,
            termination: self.termination.unwrap_or(Termination::Horizon),
            infections: self.infections,
            recoveries: self.recoveries,
            idle_steps: self.idle_steps,
        }
    }
}
