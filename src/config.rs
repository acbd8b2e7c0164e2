use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::json::read_json;
use crate::error::LoadError;

pub const TURN_PENALTY: f64 = -0.1;
pub const SUCCESS_REWARD: f64 = 10.0;

/// Where the catalog and template corpus live on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub template_dir: PathBuf,
    pub catalog: PathBuf,
    pub genre_map: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            template_dir: PathBuf::from("./data/template/"),
            catalog: PathBuf::from("./data/chinese_artist.json"),
            genre_map: PathBuf::from("./data/genre_map.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Added once per turn when a dialogue is scored.
    pub turn_penalty: f64,
    /// Bonus for a dialogue whose final belief equals the goal.
    pub success_reward: f64,
    pub positive_prefixes: Vec<String>,
    /// Prepended to a negation body without any separator.
    pub negative_prefixes: Vec<String>,
    pub seed: Option<u64>,
    pub data: DataPaths,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            turn_penalty: TURN_PENALTY,
            success_reward: SUCCESS_REWARD,
            positive_prefixes: ["是的", "對", "恩", "對阿", "沒錯", "是"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            negative_prefixes: ["不是 ", "錯了 ", "不對 "].iter().map(|p| p.to_string()).collect(),
            seed: None,
            data: DataPaths::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, LoadError> {
        let config: SimulatorConfig = read_json(path)?;
        config.validate()?;
        return Ok(config);
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.positive_prefixes.is_empty() {
            return Err(invalid("positive_prefixes is empty"));
        }
        if self.negative_prefixes.is_empty() {
            return Err(invalid("negative_prefixes is empty"));
        }
        if !self.turn_penalty.is_finite() || !self.success_reward.is_finite() {
            return Err(invalid("rewards must be finite"));
        }
        return Ok(());
    }
}

fn invalid(reason: &str) -> LoadError {
    LoadError::InvalidConfig { reason: reason.to_string() }
}


#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::config::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.turn_penalty, -0.1);
        assert_eq!(config.success_reward, 10.0);
        assert_eq!(config.negative_prefixes.len(), 3);
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"seed": 42, "data": {{"catalog": "/tmp/catalog.json"}}}}"#).unwrap();

        let config = SimulatorConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.data.catalog, PathBuf::from("/tmp/catalog.json"));
        assert_eq!(config.data.template_dir, PathBuf::from("./data/template/"));
        assert_eq!(config.positive_prefixes, SimulatorConfig::default().positive_prefixes);
    }

    #[test]
    fn test_empty_prefix_pool_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"negative_prefixes": []}}"#).unwrap();

        let result = SimulatorConfig::from_json_file(file.path());
        assert!(matches!(result, Err(LoadError::InvalidConfig { .. })));
    }
}
