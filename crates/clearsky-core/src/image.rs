use chrono::{DateTime, Utc};
use geo::Polygon;
use ndarray::Array2;

use crate::consts::DERIVED_BANDS;
use crate::error::{ClearskyError, Result};
use crate::geo_grid::GeoGrid;
use crate::sensor::{profile, SensorVariant};

/// One named raster layer on the image grid.
#[derive(Clone, Debug)]
pub struct Band {
    pub name: String,
    /// Pixel values, row-major, shape = (height, width).
    pub data: Array2<f32>,
    /// Native resolution of the band before it was placed on the grid (m).
    pub scale: f64,
}

impl Band {
    pub fn new(name: impl Into<String>, data: Array2<f32>, scale: f64) -> Self {
        Self {
            name: name.into(),
            data,
            scale,
        }
    }
}

/// Catalog properties used by the mask algorithms.
#[derive(Clone, Debug, Default)]
pub struct ImageProperties {
    /// Mean solar azimuth (degrees clockwise from north).
    pub solar_azimuth: Option<f64>,
    /// Catalog-reported cloud cover (%), informational only.
    pub cloud_cover: Option<f64>,
}

/// A multi-band satellite image.
///
/// Immutable once built: derived images (masked, annotated, rescaled) are new
/// values.
#[derive(Clone, Debug)]
pub struct RasterImage {
    pub id: String,
    /// Acquisition time.
    pub timestamp: DateTime<Utc>,
    /// `None` for products without a fixed footprint (e.g. global composites).
    pub footprint: Option<Polygon<f64>>,
    pub grid: GeoGrid,
    pub variant: SensorVariant,
    pub properties: ImageProperties,
    bands: Vec<Band>,
    companions: Vec<Band>,
    mask: Option<Array2<bool>>,
}

impl RasterImage {
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        grid: GeoGrid,
        variant: SensorVariant,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            footprint: None,
            grid,
            variant,
            properties: ImageProperties::default(),
            bands: Vec::new(),
            companions: Vec::new(),
            mask: None,
        }
    }

    /// Append a band. Its shape must match the grid.
    pub fn with_band(mut self, band: Band) -> Result<Self> {
        self.check_shape(band.data.dim())?;
        self.bands.retain(|b| b.name != band.name);
        self.bands.push(band);
        Ok(self)
    }

    /// Attach a co-registered companion raster (e.g. cloud probability).
    pub fn with_companion(mut self, band: Band) -> Result<Self> {
        self.check_shape(band.data.dim())?;
        self.companions.retain(|b| b.name != band.name);
        self.companions.push(band);
        Ok(self)
    }

    /// Set the per-pixel validity (true = has data).
    pub fn with_mask(mut self, mask: Array2<bool>) -> Result<Self> {
        self.check_shape(mask.dim())?;
        self.mask = Some(mask);
        Ok(self)
    }

    pub fn with_footprint(mut self, footprint: Polygon<f64>) -> Self {
        self.footprint = Some(footprint);
        self
    }

    pub fn with_properties(mut self, properties: ImageProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band(&self, name: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.name == name)
    }

    /// Fetch a band the caller cannot proceed without.
    pub fn require_band(&self, name: &str) -> Result<&Band> {
        self.band(name)
            .ok_or_else(|| ClearskyError::missing(&self.id, name))
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn companion(&self, name: &str) -> Option<&Band> {
        self.companions.iter().find(|b| b.name == name)
    }

    pub fn require_companion(&self, name: &str) -> Result<&Band> {
        self.companion(name)
            .ok_or_else(|| ClearskyError::missing(&self.id, name))
    }

    pub fn mask(&self) -> Option<&Array2<bool>> {
        self.mask.as_ref()
    }

    /// Validity mask, all-true when the image carries none.
    pub fn validity(&self) -> Array2<bool> {
        match &self.mask {
            Some(m) => m.clone(),
            None => Array2::from_elem(self.shape(), true),
        }
    }

    /// Finest native band resolution (m), falling back to the grid cell size.
    pub fn min_scale(&self) -> f64 {
        self.bands
            .iter()
            .map(|b| b.scale)
            .filter(|s| *s > 0.0)
            .reduce(f64::min)
            .unwrap_or_else(|| self.grid.pixel_size())
    }

    /// Coarsest native band resolution (m), falling back to the grid cell size.
    pub fn max_scale(&self) -> f64 {
        self.bands
            .iter()
            .map(|b| b.scale)
            .filter(|s| *s > 0.0)
            .reduce(f64::max)
            .unwrap_or_else(|| self.grid.pixel_size())
    }

    /// Names of the reflectance bands used for spectral comparisons.
    ///
    /// Uses the sensor profile's band list when the image carries any of
    /// them; otherwise every band that is not a derived mask/score band.
    pub fn spectral_band_names(&self) -> Vec<String> {
        let listed: Vec<String> = profile(self.variant)
            .spectral_bands
            .iter()
            .filter(|name| self.band(name).is_some())
            .map(|name| name.to_string())
            .collect();
        if !listed.is_empty() {
            return listed;
        }
        self.bands
            .iter()
            .filter(|b| !DERIVED_BANDS.contains(&b.name.as_str()))
            .map(|b| b.name.clone())
            .collect()
    }

    /// Copy of this image with every band transformed by `f`.
    pub fn map_bands<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Band) -> Array2<f32>,
    {
        let mut out = self.clone();
        for band in out.bands.iter_mut() {
            let data = f(band);
            band.data = data;
        }
        out
    }

    fn check_shape(&self, found: (usize, usize)) -> Result<()> {
        let expected = self.shape();
        if found != expected {
            return Err(ClearskyError::InvalidDimensions { expected, found });
        }
        Ok(())
    }
}
