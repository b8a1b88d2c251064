/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum image count to derive masks with image-level Rayon parallelism.
pub const PARALLEL_IMAGE_THRESHOLD: usize = 4;

/// Default cloud probability (%) above which a Sentinel-2 pixel is cloud.
pub const DEFAULT_CLOUD_PROB_THRESHOLD: f32 = 35.0;

/// Default maximum distance (km) a cloud is projected to find its shadow.
pub const DEFAULT_CLOUD_PROJ_DIST_KM: f64 = 1.0;

/// Default dilation (m) of the Sentinel-2 SR dark/shadow classes.
pub const DEFAULT_SHADOW_BUFFER_M: f64 = 100.0;

/// Default neighbourhood (m) searched for cloud when scoring.
pub const DEFAULT_MAX_CLOUD_DISTANCE_M: f64 = 2000.0;

/// Radius (px) of the speckle-removing opening applied before scoring.
pub const DEFAULT_OPENING_RADIUS_PX: f64 = 1.5;

/// Percentage scale applied to spatial mask means.
pub const PORTION_SCALE: f64 = 100.0;

/// Upper end of the integer reflectance range (0-10000).
pub const REFLECTANCE_RANGE: f32 = 10_000.0;

/// Band names attached to derived images.
pub const CLOUD_MASK_BAND: &str = "CLOUD_MASK";
pub const SHADOW_MASK_BAND: &str = "SHADOW_MASK";
pub const FILL_MASK_BAND: &str = "FILL_MASK";
pub const VALID_MASK_BAND: &str = "VALID_MASK";
pub const CLOUD_DIST_BAND: &str = "CLOUD_DIST";

/// All derived band names, in the order they are attached.
pub const DERIVED_BANDS: [&str; 5] = [
    CLOUD_MASK_BAND,
    SHADOW_MASK_BAND,
    FILL_MASK_BAND,
    VALID_MASK_BAND,
    CLOUD_DIST_BAND,
];
