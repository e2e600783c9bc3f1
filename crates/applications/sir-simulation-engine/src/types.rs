//! Core types for the simulation engine

use serde::{Deserialize, Serialize};

/// Current compartment counts and elapsed time of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub s: u64,
    pub i: u64,
    pub r: u64,
    pub t: f64,
}

impl RunState {
    /// Initial condition: one infected individual, everyone else susceptible
    pub fn initial(population_size: u64) -> Self {
        RunState {
            s: population_size.saturating_sub(1),
            i: 1,
            r: 0,
            t: 0.0,
        }
    }

    pub fn population(&self) -> u64 {
        self.s + self.i + self.r
    }

    /// `(S, I, R, t)` in the order callers expect from a final state
    pub fn as_tuple(&self) -> (u64, u64, u64, f64) {
        (self.s, self.i, self.r, self.t)
    }
}

/// One recorded point of a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub t: f64,
    pub s: u64,
    pub i: u64,
    pub r: u64,
}

impl From<RunState> for Sample {
    fn from(state: RunState) -> Self {
        Sample {
            t: state.t,
            s: state.s,
            i: state.i,
            r: state.r,
        }
    }
}

/// Instantaneous event rates for a given state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Propensities {
    pub infection: f64,
    pub recovery: f64,
}

impl Propensities {
    pub fn total(&self) -> f64 {
        self.infection + self.recovery
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0.0
    }
}

/// Event fired by a single SSA step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// S -> I
    Infection,
    /// I -> R
    Recovery,
    /// Selected event's precondition failed; time advanced, counts unchanged
    Idle,
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Elapsed time reached `t_end`
    Horizon,
    /// `S + I + R == 0`
    Depleted,
    /// No susceptibles left to infect
    SusceptiblesExhausted,
    /// No infecteds left; the epidemic burned out
    InfectionCleared,
    /// Both propensities are zero
    NoPropensity,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Horizon => write!(f, "time horizon reached"),
            Termination::Depleted => write!(f, "population depleted"),
            Termination::SusceptiblesExhausted => write!(f, "susceptibles exhausted"),
            Termination::InfectionCleared => write!(f, "infection cleared"),
            Termination::NoPropensity => write!(f, "no further events possible"),
        }
    }
}

/// Result of a single call to `SsaEngine::step`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// An event fired and a new sample was appended
    Advanced { event: Event, time_step: f64 },
    /// The run is over; nothing was appended
    Terminated(Termination),
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepOutcome::Terminated(_))
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub final_state: RunState,
    pub termination: Termination,
    pub infections: u64,
    pub recoveries: u64,
    pub idle_steps: u64,
}

impl RunSummary {
    pub fn events(&self) -> u64 {
        self.infections + self.recoveries + self.idle_steps
    }
}
