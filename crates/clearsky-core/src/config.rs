use serde::{Deserialize, Serialize};

use crate::composite::CompositeSpec;
use crate::error::{ClearskyError, Result};
use crate::mask::MaskConfig;

/// Full processing configuration: masking parameters and composite settings.
///
/// Every field has a default, so an empty TOML document is a valid config.
///
/// ```toml
/// [mask]
/// cloud_prob_threshold = 60.0
///
/// [composite]
/// method = "medoid"
/// apply_mask = true
///
/// [composite.ordering]
/// kind = "date_proximity"
/// target = "2022-04-01T00:00:00Z"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default)]
    pub mask: MaskConfig,
    #[serde(default)]
    pub composite: CompositeSpec,
}

impl ProcessingConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ClearskyError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.mask.validate()
    }
}
