pub mod annotate;
pub mod cache;
pub mod catalog;
pub mod composite;
pub mod config;
pub mod consts;
pub mod error;
pub mod geo_grid;
pub mod image;
pub mod mask;
pub mod portion;
pub mod reflectance;
pub mod score;
pub mod search;
pub mod sensor;
pub mod stack;
