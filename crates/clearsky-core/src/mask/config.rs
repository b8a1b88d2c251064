use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CLOUD_PROB_THRESHOLD, DEFAULT_CLOUD_PROJ_DIST_KM, DEFAULT_MAX_CLOUD_DISTANCE_M,
    DEFAULT_OPENING_RADIUS_PX, DEFAULT_SHADOW_BUFFER_M,
};
use crate::error::{ClearskyError, Result};

/// Parameters of cloud/shadow masking and cloud-distance scoring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskConfig {
    /// Cloud probability (%) above which a Sentinel-2 pixel is cloud.
    #[serde(default = "default_cloud_prob_threshold")]
    pub cloud_prob_threshold: f32,
    /// Maximum distance (km) from a cloud at which its shadow is searched for.
    #[serde(default = "default_cloud_proj_dist_km")]
    pub cloud_proj_dist_km: f64,
    /// Dilation (m) applied to the SR dark/shadow classes.
    #[serde(default = "default_shadow_buffer_m")]
    pub shadow_buffer_m: f64,
    /// Neighbourhood (m) searched for cloud when scoring.
    #[serde(default = "default_max_cloud_distance_m")]
    pub max_cloud_distance_m: f64,
    /// Radius (px) of the speckle-removing opening applied before scoring.
    #[serde(default = "default_opening_radius_px")]
    pub opening_radius_px: f64,
}

fn default_cloud_prob_threshold() -> f32 {
    DEFAULT_CLOUD_PROB_THRESHOLD
}
fn default_cloud_proj_dist_km() -> f64 {
    DEFAULT_CLOUD_PROJ_DIST_KM
}
fn default_shadow_buffer_m() -> f64 {
    DEFAULT_SHADOW_BUFFER_M
}
fn default_max_cloud_distance_m() -> f64 {
    DEFAULT_MAX_CLOUD_DISTANCE_M
}
fn default_opening_radius_px() -> f64 {
    DEFAULT_OPENING_RADIUS_PX
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            cloud_prob_threshold: DEFAULT_CLOUD_PROB_THRESHOLD,
            cloud_proj_dist_km: DEFAULT_CLOUD_PROJ_DIST_KM,
            shadow_buffer_m: DEFAULT_SHADOW_BUFFER_M,
            max_cloud_distance_m: DEFAULT_MAX_CLOUD_DISTANCE_M,
            opening_radius_px: DEFAULT_OPENING_RADIUS_PX,
        }
    }
}

impl MaskConfig {
    /// Reject values no algorithm can work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.cloud_prob_threshold) {
            return Err(ClearskyError::InvalidConfig(format!(
                "cloud_prob_threshold must be in [0, 100], got {}",
                self.cloud_prob_threshold
            )));
        }
        let distances = [
            ("cloud_proj_dist_km", self.cloud_proj_dist_km),
            ("shadow_buffer_m", self.shadow_buffer_m),
            ("max_cloud_distance_m", self.max_cloud_distance_m),
            ("opening_radius_px", self.opening_radius_px),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ClearskyError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Stable hash of every field, used as part of derived-value cache keys.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.cloud_prob_threshold.to_bits().hash(&mut hasher);
        self.cloud_proj_dist_km.to_bits().hash(&mut hasher);
        self.shadow_buffer_m.to_bits().hash(&mut hasher);
        self.max_cloud_distance_m.to_bits().hash(&mut hasher);
        self.opening_radius_px.to_bits().hash(&mut hasher);
        hasher.finish()
    }
}
