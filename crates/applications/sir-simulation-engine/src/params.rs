//! Epidemiological parameters for a single run

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Default calibration factor applied to the raw transmission rate
pub const DEFAULT_INFECTION_SCALE: f64 = 0.01;

/// Immutable parameters of one SIR run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpidemicParams {
    /// Basic reproduction number
    pub r0: f64,
    /// Mean infectious period (days)
    pub tau_i: f64,
    /// Initial total population (one of them infected)
    pub population_size: u64,
    /// Simulated-time horizon (days)
    pub t_end: f64,
    /// Calibration factor turning `beta` into the per-step `scaled_beta`
    pub infection_scale: f64,
}

impl Default for EpidemicParams {
    fn default() -> Self {
        EpidemicParams {
            r0: 1.34,
            tau_i: 6.3,
            population_size: 1000,
            t_end: 200.0,
            infection_scale: DEFAULT_INFECTION_SCALE,
        }
    }
}

impl EpidemicParams {
    /// Create parameters with the default infection scale
    ///
    /// # Arguments
    /// * `r0` - Basic reproduction number (e.g., 1.34)
    /// * `tau_i` - Mean infectious period in days (e.g., 6.3)
    /// * `population_size` - Total population, including the index case
    /// * `t_end` - Time horizon in days
    pub fn new(r0: f64, tau_i: f64, population_size: u64, t_end: f64) -> Result<Self> {
        let params = EpidemicParams {
            r0,
            tau_i,
            population_size,
            t_end,
            infection_scale: DEFAULT_INFECTION_SCALE,
        };
        params.validate()?;
        Ok(params)
    }

    /// Override the infection scale
    pub fn with_infection_scale(mut self, infection_scale: f64) -> Result<Self> {
        self.infection_scale = infection_scale;
        self.validate()?;
        Ok(self)
    }

    /// Check every parameter against its domain
    pub fn validate(&self) -> Result<()> {
        if !self.r0.is_finite() || self.r0 < 0.0 {
            return Err(SimulationError::invalid("r0", self.r0, "must be finite and non-negative"));
        }
        if !self.tau_i.is_finite() || self.tau_i <= 0.0 {
            return Err(SimulationError::invalid("tau_i", self.tau_i, "must be finite and positive"));
        }
        if self.population_size == 0 {
            return Err(SimulationError::invalid(
                "population_size",
                0.0,
                "must contain at least the index case",
            ));
        }
        if !self.t_end.is_finite() || self.t_end < 0.0 {
            return Err(SimulationError::invalid("t_end", self.t_end, "must be finite and non-negative"));
        }
        if !self.infection_scale.is_finite() || self.infection_scale < 0.0 {
            return Err(SimulationError::invalid(
                "infection_scale",
                self.infection_scale,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Raw transmission rate `R0 / tau_i`
    pub fn beta(&self) -> f64 {
        self.r0 / self.tau_i
    }

    /// Recovery rate `1 / tau_i`
    pub fn gamma(&self) -> f64 {
        1.0 / self.tau_i
    }

    /// Transmission rate after calibration
    pub fn scaled_beta(&self) -> f64 {
        self.beta() * self.infection_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_rates() {
        let params = EpidemicParams::new(1.34, 6.3, 1000, 200.0).unwrap();
        assert!((params.beta() - 1.34 / 6.3).abs() < 1e-12);
        assert!((params.gamma() - 1.0 / 6.3).abs() < 1e-12);
        assert!((params.scaled_beta() - 0.01 * 1.34 / 6.3).abs() < 1e-12);
    }

    #[test]
    fn test_zero_r0_is_allowed() {
        let params = EpidemicParams::new(0.0, 1.0, 2, 10.0).unwrap();
        assert_eq!(params.beta(), 0.0);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(EpidemicParams::new(1.0, 0.0, 10, 10.0).is_err());
        assert!(EpidemicParams::new(1.0, -2.0, 10, 10.0).is_err());
        assert!(EpidemicParams::new(1.0, f64::NAN, 10, 10.0).is_err());
        assert!(EpidemicParams::new(-0.5, 1.0, 10, 10.0).is_err());
        assert!(EpidemicParams::new(1.0, 1.0, 0, 10.0).is_err());
        assert!(EpidemicParams::new(1.0, 1.0, 10, f64::INFINITY).is_err());

        let params = EpidemicParams::default();
        assert!(params.with_infection_scale(-1.0).is_err());
    }

    #[test]
    fn test_error_names_parameter() {
        let err = EpidemicParams::new(1.0, 0.0, 10, 10.0).unwrap_err();
        match err {
            SimulationError::InvalidParameter { name, .. } => assert_eq!(name, "tau_i"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
