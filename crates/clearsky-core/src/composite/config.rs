use std::str::FromStr;

use chrono::{DateTime, Utc};
use geo::Polygon;
use serde::{Deserialize, Serialize};

use crate::error::ClearskyError;

/// Per-pixel reduction applied across the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeMethod {
    /// First valid pixel in stack order.
    Mosaic,
    /// Valid pixel farthest from cloud; earliest in stack order on ties.
    QMosaic,
    Mean,
    Median,
    /// Most frequent value, smallest on ties.
    Mode,
    /// Whole-pixel medoid over the spectral bands.
    Medoid,
}

impl CompositeMethod {
    pub const ALL: [CompositeMethod; 6] = [
        Self::Mosaic,
        Self::QMosaic,
        Self::Mean,
        Self::Median,
        Self::Mode,
        Self::Medoid,
    ];

    /// Whether the result depends on stack order.
    pub fn is_positional(self) -> bool {
        matches!(self, Self::Mosaic | Self::QMosaic)
    }
}

impl std::fmt::Display for CompositeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mosaic => write!(f, "mosaic"),
            Self::QMosaic => write!(f, "q-mosaic"),
            Self::Mean => write!(f, "mean"),
            Self::Median => write!(f, "median"),
            Self::Mode => write!(f, "mode"),
            Self::Medoid => write!(f, "medoid"),
        }
    }
}

impl FromStr for CompositeMethod {
    type Err = ClearskyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|m| m.to_string() == key || (key == "qmosaic" && *m == Self::QMosaic))
            .ok_or_else(|| ClearskyError::InvalidConfig(format!("unknown composite method '{s}'")))
    }
}

/// Resampling used when an image must be reprojected onto the stack grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResamplingMethod {
    #[default]
    Near,
    Bilinear,
    Bicubic,
}

impl std::fmt::Display for ResamplingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Near => write!(f, "near"),
            Self::Bilinear => write!(f, "bilinear"),
            Self::Bicubic => write!(f, "bicubic"),
        }
    }
}

/// How the stack is ordered before positional reductions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StackOrdering {
    /// Closest acquisition to `target` first.
    DateProximity { target: DateTime<Utc> },
    /// Highest cloudless portion inside `region` first.
    RegionPortion { region: Polygon<f64> },
    /// Earliest acquisition first.
    #[default]
    CaptureOrder,
}

/// Everything needed to build one composite.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeSpec {
    #[serde(default = "default_method")]
    pub method: CompositeMethod,
    /// Exclude cloud/shadow pixels from the stack.
    #[serde(default = "default_apply_mask")]
    pub apply_mask: bool,
    #[serde(default)]
    pub resampling: ResamplingMethod,
    #[serde(default)]
    pub ordering: StackOrdering,
}

fn default_method() -> CompositeMethod {
    CompositeMethod::QMosaic
}

fn default_apply_mask() -> bool {
    true
}

impl Default for CompositeSpec {
    fn default() -> Self {
        Self {
            method: default_method(),
            apply_mask: default_apply_mask(),
            resampling: ResamplingMethod::default(),
            ordering: StackOrdering::default(),
        }
    }
}

impl CompositeSpec {
    pub fn new(method: CompositeMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_apply_mask(mut self, apply_mask: bool) -> Self {
        self.apply_mask = apply_mask;
        self
    }

    pub fn with_resampling(mut self, resampling: ResamplingMethod) -> Self {
        self.resampling = resampling;
        self
    }

    pub fn with_ordering(mut self, ordering: StackOrdering) -> Self {
        self.ordering = ordering;
        self
    }
}
