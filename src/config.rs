//! Configuration for the counselor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CounselorError, Result};

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounselorConfig {
    /// Probability that an eligible response is addressed to the user by name
    #[serde(default = "default_name_chance")]
    pub name_chance: f64,
    /// Seed for spur selection and name prefixing; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Custom script JSON replacing the bundled one
    #[serde(default)]
    pub script_path: Option<PathBuf>,
    /// Where the console host writes the transcript on exit
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
}

fn default_name_chance() -> f64 {
    0.2
}

impl Default for CounselorConfig {
    fn default() -> Self {
        Self {
            name_chance: default_name_chance(),
            seed: None,
            script_path: None,
            transcript_path: None,
        }
    }
}

impl CounselorConfig {
    /// Create a new config from environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("COUNSELOR_NAME_CHANCE") {
            config.name_chance = val.trim().parse().map_err(|_| {
                CounselorError::InvalidConfig(format!("COUNSELOR_NAME_CHANCE: `{}`", val))
            })?;
        }

        if let Ok(val) = std::env::var("COUNSELOR_SEED") {
            let seed = val.trim().parse().map_err(|_| {
                CounselorError::InvalidConfig(format!("COUNSELOR_SEED: `{}`", val))
            })?;
            config.seed = Some(seed);
        }

        if let Ok(val) = std::env::var("COUNSELOR_SCRIPT_PATH") {
            if !val.trim().is_empty() {
                config.script_path = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("COUNSELOR_TRANSCRIPT_PATH") {
            if !val.trim().is_empty() {
                config.transcript_path = Some(PathBuf::from(val));
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON; `""`, `"null"` and `"{}"` yield the default.
    pub fn from_json(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(trimmed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.name_chance) {
            return Err(CounselorError::InvalidConfig(format!(
                "name_chance must be within [0, 1], got {}",
                self.name_chance
            )));
        }
        Ok(())
    }

    /// Builder-style seed override.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder-style name chance override.
    pub fn with_name_chance(mut self, name_chance: f64) -> Self {
        self.name_chance = name_chance;
        self
    }
}
