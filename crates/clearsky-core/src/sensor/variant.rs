use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClearskyError;

/// Satellite product a raster image comes from.
///
/// Determines which mask algorithm and sensor profile apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorVariant {
    /// Any product without mask support. Only fill coverage is meaningful.
    Generic,
    /// Landsat 4/5/7 collection 2 level 2.
    LandsatLegacy,
    /// Landsat 8/9 collection 2 level 2, with the SR aerosol QA band.
    LandsatAerosol,
    /// Sentinel-2 masked with the QA60 band.
    Sentinel2Qa,
    /// Sentinel-2 TOA masked with the companion cloud probability raster.
    Sentinel2CloudProbToa,
    /// Sentinel-2 SR masked with the companion cloud probability raster and SCL.
    Sentinel2CloudProbSr,
    /// MODIS nadir BRDF-adjusted reflectance.
    ModisNbar,
}

/// Groups of variants that may be mixed in one collection or composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SensorFamily {
    Generic,
    LandsatLegacy,
    LandsatAerosol,
    Sentinel2Toa,
    Sentinel2Sr,
    Sentinel2Qa,
    Modis,
}

impl SensorVariant {
    pub const ALL: [SensorVariant; 7] = [
        SensorVariant::Generic,
        SensorVariant::LandsatLegacy,
        SensorVariant::LandsatAerosol,
        SensorVariant::Sentinel2Qa,
        SensorVariant::Sentinel2CloudProbToa,
        SensorVariant::Sentinel2CloudProbSr,
        SensorVariant::ModisNbar,
    ];

    pub fn family(&self) -> SensorFamily {
        match self {
            Self::Generic => SensorFamily::Generic,
            Self::LandsatLegacy => SensorFamily::LandsatLegacy,
            Self::LandsatAerosol => SensorFamily::LandsatAerosol,
            Self::Sentinel2Qa => SensorFamily::Sentinel2Qa,
            Self::Sentinel2CloudProbToa => SensorFamily::Sentinel2Toa,
            Self::Sentinel2CloudProbSr => SensorFamily::Sentinel2Sr,
            Self::ModisNbar => SensorFamily::Modis,
        }
    }

    /// Whether the variant produces cloud/shadow masks (and hence a useful
    /// cloudless portion and quality score).
    pub fn supports_cloud_mask(&self) -> bool {
        !matches!(self, Self::Generic | Self::ModisNbar)
    }

    pub fn is_compatible_with(&self, other: &SensorVariant) -> bool {
        self.family() == other.family()
    }
}

impl std::fmt::Display for SensorVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generic => write!(f, "Generic"),
            Self::LandsatLegacy => write!(f, "Landsat 4/5/7"),
            Self::LandsatAerosol => write!(f, "Landsat 8/9"),
            Self::Sentinel2Qa => write!(f, "Sentinel-2 (QA60)"),
            Self::Sentinel2CloudProbToa => write!(f, "Sentinel-2 TOA (cloud probability)"),
            Self::Sentinel2CloudProbSr => write!(f, "Sentinel-2 SR (cloud probability)"),
            Self::ModisNbar => write!(f, "MODIS NBAR"),
        }
    }
}

impl FromStr for SensorVariant {
    type Err = ClearskyError;

    /// Parse a short collection key or a catalog collection name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let variant = match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Self::Generic,
            "landsat4_c2_l2" | "landsat5_c2_l2" | "landsat7_c2_l2" | "landsat/lt04/c02/t1_l2"
            | "landsat/lt05/c02/t1_l2" | "landsat/le07/c02/t1_l2" => Self::LandsatLegacy,
            "landsat8_c2_l2" | "landsat9_c2_l2" | "landsat/lc08/c02/t1_l2"
            | "landsat/lc09/c02/t1_l2" => Self::LandsatAerosol,
            "sentinel2_qa" => Self::Sentinel2Qa,
            "sentinel2_toa" | "copernicus/s2" | "copernicus/s2_harmonized" => {
                Self::Sentinel2CloudProbToa
            }
            "sentinel2_sr" | "copernicus/s2_sr" | "copernicus/s2_sr_harmonized" => {
                Self::Sentinel2CloudProbSr
            }
            "modis_nbar" | "modis/006/mcd43a4" | "modis/061/mcd43a4" => Self::ModisNbar,
            _ => return Err(ClearskyError::UnsupportedVariant(s.to_string())),
        };
        Ok(variant)
    }
}
