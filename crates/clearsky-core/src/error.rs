use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClearskyError {
    #[error("No mask algorithm for sensor variant: {0}")]
    UnsupportedVariant(String),

    #[error("Image {image_id} is missing required data: {name}")]
    MissingAuxData { image_id: String, name: String },

    #[error("Image {0} has no fixed footprint and no region was supplied")]
    MissingRegion(String),

    #[error("Incompatible image stack: {0}")]
    IncompatibleStack(String),

    #[error("Image not found in collection: {0}")]
    UnknownImage(String),

    #[error("Empty image stack")]
    EmptyStack,

    #[error("Invalid band dimensions: expected {expected:?}, found {found:?}")]
    InvalidDimensions {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ClearskyError {
    pub(crate) fn missing(image_id: &str, name: &str) -> Self {
        Self::MissingAuxData {
            image_id: image_id.to_string(),
            name: name.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClearskyError>;
