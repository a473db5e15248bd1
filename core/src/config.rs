//! Scenario configuration — classifier rules plus simulation
//! parameters, loaded from the data directory.

use crate::classifier::ClassifierRules;
use crate::error::SimResult;
use crate::params::SimParams;
use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub params: SimParams,
    pub rules: ClassifierRules,
}

impl ScenarioConfig {
    /// Load from the data/ directory and validate the parameter
    /// bundle. Read failures surface as SimError::Other, malformed
    /// JSON as SimError::Serialization. In tests, use
    /// ScenarioConfig::default_test().
    pub fn load(data_dir: &str) -> SimResult<Self> {
        let path = format!("{data_dir}/scenario.json");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {path}"))?;
        let config: ScenarioConfig = serde_json::from_str(&content)?;
        config.params.validate()?;
        Ok(config)
    }

    pub fn default_test() -> Self {
        Self {
            params: SimParams::default_test(),
            rules: ClassifierRules::default_test(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "burndown_config_{tag}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn malformed_scenario_json_is_a_serialization_error() {
        let dir = scratch_dir("malformed");
        std::fs::write(dir.join("scenario.json"), "{ not json").unwrap();

        let err = ScenarioConfig::load(dir.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SimError::Serialization(_)));
    }

    #[test]
    fn missing_scenario_file_is_a_read_error() {
        let dir = scratch_dir("missing");

        let err = ScenarioConfig::load(dir.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SimError::Other(_)));
        assert!(err.to_string().contains("Cannot read"));
    }

    #[test]
    fn loaded_parameters_are_validated() {
        let dir = scratch_dir("invalid");
        let mut config = ScenarioConfig::default_test();
        config.params.utilization = 1.4;
        std::fs::write(
            dir.join("scenario.json"),
            serde_json::to_string(&config).unwrap(),
        )
        .unwrap();

        let err = ScenarioConfig::load(dir.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }));
    }
}
