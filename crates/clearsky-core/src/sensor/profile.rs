use super::variant::SensorVariant;

/// A contiguous group of bits inside an integer QA value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitField {
    pub shift: u32,
    pub width: u32,
}

impl BitField {
    pub const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }

    pub fn decode(&self, value: u32) -> u32 {
        (value >> self.shift) & ((1 << self.width) - 1)
    }
}

/// Bit layout of a pixel quality band.
#[derive(Clone, Copy, Debug)]
pub struct QaLayout {
    pub band: &'static str,
    /// Bit set where the pixel holds no data.
    pub fill_bit: Option<u32>,
    /// Any of these bits set marks cloud.
    pub cloud_bits: u32,
    pub shadow_bit: Option<u32>,
}

/// Aerosol level field of the Landsat 8/9 SR aerosol QA band.
#[derive(Clone, Copy, Debug)]
pub struct AerosolLayout {
    pub band: &'static str,
    pub level: BitField,
    /// Levels above this are treated as cloud (1 = low, 2 = medium, 3 = high).
    pub max_level: u32,
}

/// Inputs of the Sentinel-2 cloud probability method.
#[derive(Clone, Copy, Debug)]
pub struct CloudProbLayout {
    /// Companion band holding cloud probability (0-100).
    pub probability_band: &'static str,
    /// Scene classification band used to confirm shadows (SR only).
    pub scl_band: Option<&'static str>,
    /// SCL classes counted as dark or shadow.
    pub scl_shadow_classes: &'static [u32],
}

/// Linear scaling of stored DN to reflectance: `refl = dn * gain + offset`.
#[derive(Clone, Copy, Debug)]
pub struct ReflectanceScale {
    pub band_prefix: &'static str,
    pub gain: f32,
    pub offset: f32,
}

/// Static metadata for one sensor product.
#[derive(Clone, Copy, Debug)]
pub struct SensorProfile {
    pub variant: SensorVariant,
    /// Short collection key.
    pub key: &'static str,
    pub spectral_bands: &'static [&'static str],
    /// Finest native resolution (m).
    pub native_scale: f64,
    pub qa: Option<QaLayout>,
    pub aerosol: Option<AerosolLayout>,
    pub cloud_prob: Option<CloudProbLayout>,
    /// `None` when bands are already stored as 0-10000 reflectance.
    pub reflectance: Option<ReflectanceScale>,
}

const LANDSAT_QA: QaLayout = QaLayout {
    band: "QA_PIXEL",
    fill_bit: Some(0),
    // dilated cloud, cirrus, cloud
    cloud_bits: (1 << 1) | (1 << 2) | (1 << 3),
    shadow_bit: Some(4),
};

const LANDSAT_REFLECTANCE: ReflectanceScale = ReflectanceScale {
    band_prefix: "SR_B",
    gain: 2.75e-5,
    offset: -0.2,
};

const SENTINEL2_BANDS: &[&str] = &[
    "B1", "B2", "B3", "B4", "B5", "B6", "B7", "B8", "B8A", "B9", "B11", "B12",
];

const SENTINEL2_PROBABILITY: &str = "probability";

static PROFILES: [SensorProfile; 7] = [
    SensorProfile {
        variant: SensorVariant::Generic,
        key: "generic",
        spectral_bands: &[],
        native_scale: 0.0,
        qa: None,
        aerosol: None,
        cloud_prob: None,
        reflectance: None,
    },
    SensorProfile {
        variant: SensorVariant::LandsatLegacy,
        key: "landsat7_c2_l2",
        spectral_bands: &["SR_B1", "SR_B2", "SR_B3", "SR_B4", "SR_B5", "SR_B7", "ST_B6"],
        native_scale: 30.0,
        qa: Some(LANDSAT_QA),
        aerosol: None,
        cloud_prob: None,
        reflectance: Some(LANDSAT_REFLECTANCE),
    },
    SensorProfile {
        variant: SensorVariant::LandsatAerosol,
        key: "landsat8_c2_l2",
        spectral_bands: &[
            "SR_B1", "SR_B2", "SR_B3", "SR_B4", "SR_B5", "SR_B6", "SR_B7", "ST_B10",
        ],
        native_scale: 30.0,
        qa: Some(LANDSAT_QA),
        aerosol: Some(AerosolLayout {
            band: "SR_QA_AEROSOL",
            level: BitField::new(6, 2),
            max_level: 2,
        }),
        cloud_prob: None,
        reflectance: Some(LANDSAT_REFLECTANCE),
    },
    SensorProfile {
        variant: SensorVariant::Sentinel2Qa,
        key: "sentinel2_qa",
        spectral_bands: SENTINEL2_BANDS,
        native_scale: 10.0,
        // opaque cloud, cirrus
        qa: Some(QaLayout {
            band: "QA60",
            fill_bit: None,
            cloud_bits: (1 << 10) | (1 << 11),
            shadow_bit: None,
        }),
        aerosol: None,
        cloud_prob: None,
        reflectance: None,
    },
    SensorProfile {
        variant: SensorVariant::Sentinel2CloudProbToa,
        key: "sentinel2_toa",
        spectral_bands: SENTINEL2_BANDS,
        native_scale: 10.0,
        qa: None,
        aerosol: None,
        cloud_prob: Some(CloudProbLayout {
            probability_band: SENTINEL2_PROBABILITY,
            scl_band: None,
            scl_shadow_classes: &[],
        }),
        reflectance: None,
    },
    SensorProfile {
        variant: SensorVariant::Sentinel2CloudProbSr,
        key: "sentinel2_sr",
        spectral_bands: SENTINEL2_BANDS,
        native_scale: 10.0,
        qa: None,
        aerosol: None,
        // 2 = dark area pixels, 3 = cloud shadows
        cloud_prob: Some(CloudProbLayout {
            probability_band: SENTINEL2_PROBABILITY,
            scl_band: Some("SCL"),
            scl_shadow_classes: &[2, 3],
        }),
        reflectance: None,
    },
    SensorProfile {
        variant: SensorVariant::ModisNbar,
        key: "modis_nbar",
        spectral_bands: &[
            "Nadir_Reflectance_Band1",
            "Nadir_Reflectance_Band2",
            "Nadir_Reflectance_Band3",
            "Nadir_Reflectance_Band4",
            "Nadir_Reflectance_Band5",
            "Nadir_Reflectance_Band6",
            "Nadir_Reflectance_Band7",
        ],
        native_scale: 500.0,
        qa: None,
        aerosol: None,
        cloud_prob: None,
        reflectance: None,
    },
];

/// Look up the static profile of a variant.
pub fn profile(variant: SensorVariant) -> &'static SensorProfile {
    PROFILES
        .iter()
        .find(|p| p.variant == variant)
        .unwrap_or(&PROFILES[0])
}
