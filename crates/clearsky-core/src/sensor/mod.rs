pub mod profile;
pub mod variant;

pub use profile::{profile, BitField, SensorProfile};
pub use variant::{SensorFamily, SensorVariant};
