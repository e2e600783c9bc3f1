//! Simulation configuration loaded from JSON
//!
//! Every field is optional in the file; anything missing falls back to the
//! reference scenario (R0 = 1.34, tau_i = 6.3 days, N = 1000, 200 days,
//! 100 runs, extinction at S >= 500).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ensemble::EnsembleConfig;
use crate::error::Result;
use crate::params::EpidemicParams;

/// Full configuration of a `sir-sim` invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub params: EpidemicParams,
    pub ensemble: EnsembleConfig,
}

impl SimulationConfig {
    /// Read and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse and validate a JSON config document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.params.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SimulationConfig::from_json("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.params.population_size, 1000);
        assert_eq!(config.ensemble.runs, 100);
    }

    #[test]
    fn test_partial_document() {
        let config = SimulationConfig::from_json(
            r#"{ "params": { "r0": 2.0, "infection_scale": 0.02 }, "ensemble": { "runs": 5 } }"#,
        )
        .unwrap();

        assert_eq!(config.params.r0, 2.0);
        assert_eq!(config.params.infection_scale, 0.02);
        assert_eq!(config.params.tau_i, 6.3);
        assert_eq!(config.ensemble.runs, 5);
        assert_eq!(config.ensemble.extinction_threshold, 500);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SimulationConfig::from_json(r#"{ "params": { "tau_i": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameter { name: "tau_i", .. }));

        let err = SimulationConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SimulationError::Json(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "params": {{ "population_size": 50, "t_end": 30.0 }} }}"#).unwrap();

        let config = SimulationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.params.population_size, 50);
        assert_eq!(config.params.t_end, 30.0);

        let missing = SimulationConfig::from_file("/nonexistent/sir.json").unwrap_err();
        assert!(matches!(missing, SimulationError::Io(_)));
    }
}
