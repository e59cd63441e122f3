use crate::options::DEFAULT_INDUSTRY;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sampling parameters forwarded to the completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl SamplingParams {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::new(0.7, 2000)
    }
}

/// Process-wide synthesis settings.
///
/// All fields are optional in JSON/YAML sources; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisConfig {
    /// Sampling for regular generation.
    pub sampling: SamplingParams,
    /// Sampling for the regenerate-from-corrupted-code prompt.
    pub repair_sampling: SamplingParams,
    /// Stamped into every diagram's metadata.
    pub version: String,
    /// Industry used when the caller supplies none.
    pub default_industry: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingParams::default(),
            repair_sampling: SamplingParams::new(0.2, 2000),
            version: "1.0".to_string(),
            default_industry: DEFAULT_INDUSTRY.to_string(),
        }
    }
}

impl SynthesisConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validated()
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validated()
    }

    fn validated(self) -> Result<Self> {
        for (name, params) in [
            ("sampling", &self.sampling),
            ("repairSampling", &self.repair_sampling),
        ] {
            if !(params.temperature.is_finite() && (0.0..=2.0).contains(&params.temperature)) {
                return Err(Error::InvalidConfig {
                    message: format!("{name}.temperature must be within 0.0..=2.0"),
                });
            }
            if params.max_tokens == 0 {
                return Err(Error::InvalidConfig {
                    message: format!("{name}.maxTokens must be positive"),
                });
            }
        }
        Ok(self)
    }
}
